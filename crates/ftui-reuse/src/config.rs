#![forbid(unsafe_code)]

//! Reuse manager configuration (deterministic, env-overridable).
//!
//! # Environment Variables
//! - `FTUI_REUSE_VACATED` (bool)
//! - `FTUI_REUSE_CLAIM_ORDER` = fifo|lifo
//! - `FTUI_REUSE_ON_CREATE_FAILURE` = isolate|abort
//! - `FTUI_REUSE_CAPACITY_HINT` (usize)
//!
//! Invalid values are reported as [`ReuseConfigError`] diagnostics and the
//! field keeps its default.

use std::env;
use std::fmt;

const ENV_REUSE_VACATED: &str = "FTUI_REUSE_VACATED";
const ENV_REUSE_CLAIM_ORDER: &str = "FTUI_REUSE_CLAIM_ORDER";
const ENV_REUSE_ON_CREATE_FAILURE: &str = "FTUI_REUSE_ON_CREATE_FAILURE";
const ENV_REUSE_CAPACITY_HINT: &str = "FTUI_REUSE_CAPACITY_HINT";

/// Upper bound accepted for [`ReuseConfig::capacity_hint`].
pub const MAX_CAPACITY_HINT: usize = 1 << 20;

/// Which vacated view a shape bucket hands out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClaimOrder {
    /// Oldest first, in the previous pass's binding order.
    #[default]
    Fifo,
    /// Most recently vacated first.
    Lifo,
}

impl ClaimOrder {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fifo" | "queue" => Some(Self::Fifo),
            "lifo" | "stack" => Some(Self::Lifo),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fifo => "fifo",
            Self::Lifo => "lifo",
        }
    }
}

impl fmt::Display for ClaimOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolve pass does when view creation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FailurePolicy {
    /// Leave the failing item unbound and keep resolving the rest.
    #[default]
    Isolate,
    /// Stop at the first failure and return it as an error.
    Abort,
}

impl FailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isolate" | "skip" => Some(Self::Isolate),
            "abort" | "stop" => Some(Self::Abort),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Isolate => "isolate",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for [`ReuseManager`](crate::manager::ReuseManager).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReuseConfig {
    /// Let items take over views vacated by other identities of the same
    /// shape. When off, every non-continued item gets a new view and every
    /// vacated view is released (useful while animating, so a view never
    /// jumps between items).
    /// Default: true
    pub reuse_vacated: bool,

    /// Order in which a shape bucket hands out vacated views.
    /// Default: Fifo
    pub claim_order: ClaimOrder,

    /// Behavior when the creation callback fails.
    /// Default: Isolate
    pub on_creation_failure: FailurePolicy,

    /// Expected number of live items, used to pre-size the binding table.
    /// Default: 0
    pub capacity_hint: usize,
}

impl Default for ReuseConfig {
    fn default() -> Self {
        Self {
            reuse_vacated: true,
            claim_order: ClaimOrder::Fifo,
            on_creation_failure: FailurePolicy::Isolate,
            capacity_hint: 0,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct ReuseConfigParse {
    pub config: ReuseConfig,
    pub errors: Vec<ReuseConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuseConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ReuseConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ReuseConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ReuseConfigError {}

impl ReuseConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> ReuseConfig {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ReuseConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ReuseConfigError>> {
        let mut errors = Vec::new();
        if self.capacity_hint > MAX_CAPACITY_HINT {
            errors.push(ReuseConfigError::new(
                "capacity_hint",
                self.capacity_hint.to_string(),
                format!("must be <= {MAX_CAPACITY_HINT}"),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    #[must_use]
    pub fn with_reuse_vacated(mut self, enabled: bool) -> Self {
        self.reuse_vacated = enabled;
        self
    }

    #[must_use]
    pub fn with_claim_order(mut self, order: ClaimOrder) -> Self {
        self.claim_order = order;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_creation_failure = policy;
        self
    }

    #[must_use]
    pub fn with_capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = capacity;
        self
    }

    /// Short human-readable summary for debug overlays.
    #[must_use]
    pub fn summary_short(&self) -> String {
        let reuse = if self.reuse_vacated { "on" } else { "off" };
        format!(
            "Reuse: {reuse} · {} · {}",
            self.claim_order, self.on_creation_failure
        )
    }
}

impl ReuseConfig {
    /// Parse config through an injected variable lookup instead of the process
    /// environment. Unset variables keep their defaults.
    ///
    /// ```
    /// use ftui_reuse::{ClaimOrder, ReuseConfig};
    ///
    /// let parsed = ReuseConfig::from_env_with(|key| {
    ///     (key == "FTUI_REUSE_CLAIM_ORDER").then(|| "lifo".to_string())
    /// });
    /// assert!(parsed.errors.is_empty());
    /// assert_eq!(parsed.config.claim_order, ClaimOrder::Lifo);
    /// ```
    #[must_use]
    pub fn from_env_with<F>(mut get: F) -> ReuseConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = ReuseConfig::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_REUSE_VACATED) {
            match parse_bool(&value) {
                Some(parsed) => config.reuse_vacated = parsed,
                None => errors.push(ReuseConfigError::new(
                    "reuse_vacated",
                    value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        if let Some(value) = get(ENV_REUSE_CLAIM_ORDER) {
            match ClaimOrder::parse(&value) {
                Some(parsed) => config.claim_order = parsed,
                None => errors.push(ReuseConfigError::new(
                    "claim_order",
                    value,
                    "expected fifo|lifo",
                )),
            }
        }

        if let Some(value) = get(ENV_REUSE_ON_CREATE_FAILURE) {
            match FailurePolicy::parse(&value) {
                Some(parsed) => config.on_creation_failure = parsed,
                None => errors.push(ReuseConfigError::new(
                    "on_creation_failure",
                    value,
                    "expected isolate|abort",
                )),
            }
        }

        if let Some(value) = get(ENV_REUSE_CAPACITY_HINT) {
            match parse_usize(&value) {
                Some(parsed) if parsed <= MAX_CAPACITY_HINT => config.capacity_hint = parsed,
                Some(_) => errors.push(ReuseConfigError::new(
                    "capacity_hint",
                    value,
                    format!("must be <= {MAX_CAPACITY_HINT}"),
                )),
                None => errors.push(ReuseConfigError::new(
                    "capacity_hint",
                    value,
                    "expected non-negative integer",
                )),
            }
        }

        ReuseConfigParse { config, errors }
    }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(pairs: &[(&'static str, &'static str)]) -> ReuseConfigParse {
        let env: HashMap<&str, &str> = pairs.iter().copied().collect();
        ReuseConfig::from_env_with(|key| env.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn defaults_when_env_empty() {
        let parsed = parse(&[]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config, ReuseConfig::default());
        assert!(parsed.config.validate().is_ok());
    }

    #[test]
    fn env_overrides_applied() {
        let parsed = parse(&[
            (ENV_REUSE_VACATED, "off"),
            (ENV_REUSE_CLAIM_ORDER, " LIFO "),
            (ENV_REUSE_ON_CREATE_FAILURE, "abort"),
            (ENV_REUSE_CAPACITY_HINT, "256"),
        ]);
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        assert!(!parsed.config.reuse_vacated);
        assert_eq!(parsed.config.claim_order, ClaimOrder::Lifo);
        assert_eq!(parsed.config.on_creation_failure, FailurePolicy::Abort);
        assert_eq!(parsed.config.capacity_hint, 256);
    }

    #[test]
    fn invalid_values_reported_and_defaults_kept() {
        let parsed = parse(&[
            (ENV_REUSE_VACATED, "maybe"),
            (ENV_REUSE_CLAIM_ORDER, "random"),
            (ENV_REUSE_ON_CREATE_FAILURE, "retry"),
            (ENV_REUSE_CAPACITY_HINT, "-4"),
        ]);
        let fields: Vec<_> = parsed.errors.iter().map(|err| err.field).collect();
        assert_eq!(
            fields,
            [
                "reuse_vacated",
                "claim_order",
                "on_creation_failure",
                "capacity_hint"
            ]
        );
        assert_eq!(parsed.config, ReuseConfig::default());
    }

    #[test]
    fn oversized_capacity_hint_rejected() {
        let parsed = parse(&[(ENV_REUSE_CAPACITY_HINT, "99999999")]);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.config.capacity_hint, 0);

        let config = ReuseConfig::default().with_capacity_hint(MAX_CAPACITY_HINT + 1);
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "capacity_hint");
    }

    #[test]
    fn error_display_names_field() {
        let err = ReuseConfigError::new("claim_order", "random", "expected fifo|lifo");
        assert_eq!(err.to_string(), "claim_order=random (expected fifo|lifo)");
    }

    #[test]
    fn builder_and_summary() {
        let config = ReuseConfig::default()
            .with_reuse_vacated(false)
            .with_claim_order(ClaimOrder::Lifo)
            .with_failure_policy(FailurePolicy::Abort);
        assert_eq!(config.summary_short(), "Reuse: off · lifo · abort");
        assert_eq!(
            ReuseConfig::default().summary_short(),
            "Reuse: on · fifo · isolate"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let config: ReuseConfig =
            serde_json::from_str(r#"{"claim_order":"lifo"}"#).expect("deserialize");
        assert_eq!(config.claim_order, ClaimOrder::Lifo);
        assert!(config.reuse_vacated);
        assert_eq!(config.on_creation_failure, FailurePolicy::Isolate);
    }
}
