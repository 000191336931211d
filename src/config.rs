//! Runtime configuration.
//!
//! `Config` can be built from defaults, a JSON document, or `TASKDESK_*`
//! environment variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TASKDESK_INVOICE_PREFIX` | `invoice_prefix` | `INV` |
//! | `TASKDESK_INVOICE_NUMBER_WIDTH` | `invoice_number_width` | `3` |
//! | `TASKDESK_PAYMENT_TERMS_DAYS` | `payment_terms_days` | `30` |
//! | `TASKDESK_LATENCY_MS` | `latency_ms` | `0` |
//! | `TASKDESK_SEED_FIXTURES` | `seed_fixtures` | `false` |

use crate::error::{Error, Result};
use crate::observability::{dashboard_latency, LatencyPolicy};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Prefix shared by every environment variable.
pub const ENV_PREFIX: &str = "TASKDESK_";

/// Taskdesk configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Leading segment of invoice numbers (`INV` in `INV-2026-001`).
    pub invoice_prefix: String,

    /// Zero-padding width of the invoice sequence.
    pub invoice_number_width: usize,

    /// Days between issue date and due date when a draft has no due date.
    pub payment_terms_days: u32,

    /// Simulated store latency. `0` disables it; the special value
    /// `u64::MAX` selects the per-operation dashboard delays.
    pub latency_ms: u64,

    /// Load the bundled demo records when building a workspace.
    pub seed_fixtures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            invoice_prefix: "INV".to_string(),
            invoice_number_width: 3,
            payment_terms_days: 30,
            latency_ms: 0,
            seed_fixtures: false,
        }
    }
}

impl Config {
    /// Parse a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns `Error::Config` for malformed JSON or invalid values
    pub fn from_json(document: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(document).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `TASKDESK_*` variables from the process environment.
    ///
    /// # Errors
    /// Returns `Error::Config` when a variable is present but unparsable
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (used by `from_env` and tests).
    ///
    /// # Errors
    /// Returns `Error::Config` when a variable is present but unparsable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(prefix) = var("INVOICE_PREFIX") {
            config.invoice_prefix = prefix;
        }
        if let Some(raw) = var("INVOICE_NUMBER_WIDTH") {
            config.invoice_number_width = parse_var("INVOICE_NUMBER_WIDTH", &raw)?;
        }
        if let Some(raw) = var("PAYMENT_TERMS_DAYS") {
            config.payment_terms_days = parse_var("PAYMENT_TERMS_DAYS", &raw)?;
        }
        if let Some(raw) = var("LATENCY_MS") {
            config.latency_ms = if raw.eq_ignore_ascii_case("dashboard") {
                u64::MAX
            } else {
                parse_var("LATENCY_MS", &raw)?
            };
        }
        if let Some(raw) = var("SEED_FIXTURES") {
            config.seed_fixtures = parse_var("SEED_FIXTURES", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.invoice_prefix.trim().is_empty() {
            return Err(Error::Config("invoice_prefix must not be empty".into()));
        }
        if self.invoice_number_width == 0 || self.invoice_number_width > 12 {
            return Err(Error::Config(format!(
                "invoice_number_width must be between 1 and 12, got {}",
                self.invoice_number_width
            )));
        }
        Ok(())
    }

    /// Latency policy implied by `latency_ms`.
    pub fn latency_policy(&self) -> LatencyPolicy {
        match self.latency_ms {
            0 => LatencyPolicy::None,
            u64::MAX => LatencyPolicy::PerOperation(dashboard_latency),
            ms => LatencyPolicy::Fixed(Duration::from_millis(ms)),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        Error::Config(format!("{}{}={:?}: {}", ENV_PREFIX, name, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.invoice_prefix, "INV");
        assert_eq!(config.invoice_number_width, 3);
        assert_eq!(config.payment_terms_days, 30);
        assert!(matches!(config.latency_policy(), LatencyPolicy::None));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TASKDESK_INVOICE_PREFIX", "BILL"),
            ("TASKDESK_PAYMENT_TERMS_DAYS", "14"),
            ("TASKDESK_LATENCY_MS", "25"),
            ("TASKDESK_SEED_FIXTURES", "true"),
        ]))
        .unwrap();

        assert_eq!(config.invoice_prefix, "BILL");
        assert_eq!(config.payment_terms_days, 14);
        assert!(config.seed_fixtures);
        assert_eq!(
            config
                .latency_policy()
                .delay_for(crate::observability::StoreOperation::Read),
            Some(Duration::from_millis(25))
        );
    }

    #[test]
    fn test_dashboard_latency_keyword() {
        let config = Config::from_lookup(lookup(&[("TASKDESK_LATENCY_MS", "dashboard")])).unwrap();
        assert!(matches!(
            config.latency_policy(),
            LatencyPolicy::PerOperation(_)
        ));
    }

    #[test]
    fn test_unparsable_variable_is_config_error() {
        let err = Config::from_lookup(lookup(&[("TASKDESK_PAYMENT_TERMS_DAYS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "invoice_number_width": 5 }"#).unwrap();
        assert_eq!(config.invoice_number_width, 5);
        assert_eq!(config.invoice_prefix, "INV");
    }

    #[test]
    fn test_from_json_rejects_zero_width() {
        let err = Config::from_json(r#"{ "invoice_number_width": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
