//! Quota descriptions and provider presets.

use crate::{RateLimitError, RateLimitErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Quotas enforced for one model endpoint.
///
/// `None` leaves that dimension unlimited.
///
/// # Examples
///
/// ```
/// use sahayak_rate_limit::{RateLimitConfig, RateLimitTier};
///
/// let free = RateLimitTier::Free.config();
/// assert_eq!(*free.requests_per_minute(), Some(10));
///
/// let custom = RateLimitConfig::unlimited().with_max_concurrent(Some(4));
/// assert_eq!(*custom.max_concurrent(), Some(4));
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per minute
    requests_per_minute: Option<u32>,
    /// Tokens per minute
    tokens_per_minute: Option<u64>,
    /// Requests per day
    requests_per_day: Option<u32>,
    /// Requests in flight at once
    max_concurrent: Option<u32>,
}

impl RateLimitConfig {
    /// No quota in any dimension.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Rejects zero quotas, which would block every request forever.
    pub fn validate(&self) -> Result<(), RateLimitError> {
        let zero = [
            ("requests_per_minute", self.requests_per_minute.map(u64::from)),
            ("tokens_per_minute", self.tokens_per_minute),
            ("requests_per_day", self.requests_per_day.map(u64::from)),
            ("max_concurrent", self.max_concurrent.map(u64::from)),
        ]
        .into_iter()
        .find(|(_, value)| *value == Some(0));

        match zero {
            Some((name, _)) => Err(RateLimitError::new(RateLimitErrorKind::Config(format!(
                "{} must be greater than zero",
                name
            )))),
            None => Ok(()),
        }
    }
}

/// Named Gemini quota presets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RateLimitTier {
    /// Gemini free tier
    #[default]
    Free,
    /// Gemini pay-as-you-go tier
    Paid,
    /// No client-side limiting
    Unlimited,
}

impl RateLimitTier {
    /// Quotas for this tier.
    pub fn config(&self) -> RateLimitConfig {
        match self {
            RateLimitTier::Free => RateLimitConfig {
                requests_per_minute: Some(10),
                tokens_per_minute: Some(250_000),
                requests_per_day: Some(250),
                max_concurrent: Some(1),
            },
            RateLimitTier::Paid => RateLimitConfig {
                requests_per_minute: Some(1_000),
                tokens_per_minute: Some(1_000_000),
                requests_per_day: Some(10_000),
                max_concurrent: Some(8),
            },
            RateLimitTier::Unlimited => RateLimitConfig::unlimited(),
        }
    }
}

impl FromStr for RateLimitTier {
    type Err = RateLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(RateLimitTier::Free),
            "paid" | "tier1" => Ok(RateLimitTier::Paid),
            "unlimited" | "none" => Ok(RateLimitTier::Unlimited),
            other => Err(RateLimitError::new(RateLimitErrorKind::InvalidTier(
                other.to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_names_parse() {
        assert_eq!("FREE".parse::<RateLimitTier>().unwrap(), RateLimitTier::Free);
        assert_eq!("tier1".parse::<RateLimitTier>().unwrap(), RateLimitTier::Paid);
        assert_eq!(
            "none".parse::<RateLimitTier>().unwrap(),
            RateLimitTier::Unlimited
        );

        let err = "platinum".parse::<RateLimitTier>().unwrap_err();
        assert_eq!(
            err.kind(),
            &RateLimitErrorKind::InvalidTier("platinum".to_string())
        );
    }

    #[test]
    fn presets_are_valid() {
        use strum::IntoEnumIterator;
        for tier in RateLimitTier::iter() {
            assert!(tier.config().validate().is_ok(), "{} preset invalid", tier);
        }
    }

    #[test]
    fn zero_quota_is_rejected() {
        let config = RateLimitConfig::unlimited().with_requests_per_minute(Some(0));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("requests_per_minute"));
    }

    #[test]
    fn missing_fields_default_to_unlimited() {
        let config: RateLimitConfig = toml::from_str("requests_per_minute = 60").unwrap();
        assert_eq!(*config.requests_per_minute(), Some(60));
        assert_eq!(*config.tokens_per_minute(), None);
        assert_eq!(*config.max_concurrent(), None);
    }
}
