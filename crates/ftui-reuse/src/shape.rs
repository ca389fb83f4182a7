#![forbid(unsafe_code)]

//! Reuse differentiators.
//!
//! A [`ViewShape`] pairs the kind of resource a view is built from with the
//! configuration that cannot change once the view exists. Two items with
//! equal shapes can share one view: only content updates are needed to move
//! the view from one item to the other.
//!
//! The configuration is a type parameter rather than a type-erased value, so
//! shape equality is resolved statically. Heterogeneous item kinds are
//! usually expressed with a closed enum:
//!
//! ```
//! use ftui_reuse::shape::ViewShape;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum CellConfig {
//!     Header { bold: bool },
//!     Day { rounded: bool },
//! }
//!
//! let a = ViewShape::new("label", CellConfig::Day { rounded: true });
//! let b = ViewShape::new("label", CellConfig::Day { rounded: true });
//! let c = ViewShape::new("label", CellConfig::Header { bold: true });
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! ```

use std::borrow::Cow;
use std::fmt;

/// Name of the resource type a view is built from (e.g. `"day_cell"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    /// Create a kind from a static or owned name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The kind's name.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ResourceKind {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resource kind plus invariant configuration.
///
/// `C` defaults to `()` for views whose structure depends on the kind alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewShape<C = ()> {
    kind: ResourceKind,
    config: C,
}

impl<C> ViewShape<C> {
    /// Create a shape from a kind and its invariant configuration.
    #[must_use]
    pub fn new(kind: impl Into<ResourceKind>, config: C) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }

    /// The resource kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// The invariant configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &C {
        &self.config
    }
}

impl ViewShape<()> {
    /// Shape determined by the kind alone.
    #[must_use]
    pub fn of_kind(kind: impl Into<ResourceKind>) -> Self {
        Self::new(kind, ())
    }
}

impl<C: fmt::Debug> fmt::Display for ViewShape<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn kind_from_static_and_owned_compare_equal() {
        let a = ResourceKind::from("day");
        let b = ResourceKind::from(String::from("day"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "day");
    }

    #[test]
    fn config_participates_in_equality() {
        let a = ViewShape::new("cell", 1u8);
        let b = ViewShape::new("cell", 2u8);
        assert_ne!(a, b);
        assert_eq!(a, ViewShape::new("cell", 1u8));
    }

    #[test]
    fn kind_participates_in_equality() {
        assert_ne!(ViewShape::of_kind("header"), ViewShape::of_kind("day"));
    }

    #[test]
    fn equal_shapes_hash_together() {
        let mut set = FxHashSet::default();
        set.insert(ViewShape::new("cell", "rounded"));
        set.insert(ViewShape::new(String::from("cell"), "rounded"));
        set.insert(ViewShape::new("cell", "square"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_includes_kind_and_config() {
        let shape = ViewShape::new("cell", "rounded");
        assert_eq!(shape.to_string(), "cell(\"rounded\")");
        assert_eq!(ViewShape::of_kind("header").to_string(), "header(())");
    }
}
