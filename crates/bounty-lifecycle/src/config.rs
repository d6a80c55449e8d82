//! # Engine Configuration
//!
//! Roles, payload limits and application policy for one engine instance.
//! Several independent engines can run in one process; nothing here is
//! global.
//!
//! ## Environment
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CBB_OWNER` | required | Owner address (hex) |
//! | `CBB_VERIFIER` | required | Verifier address (hex) |
//! | `CBB_MAX_CIPHERTEXT_BYTES` | 8192 | Ciphertext bound |
//! | `CBB_MAX_PROOF_BYTES` | 65536 | Proof bound |
//! | `CBB_MAX_TEXT_BYTES` | 4096 | Text field bound |
//! | `CBB_ALLOW_DUPLICATE_APPLICATIONS` | true | Multiple applications per applicant and bounty |

use crate::domain::access::Roles;
use crate::domain::invariants::PayloadLimits;
use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Application multiplicity policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPolicy {
    /// Whether one applicant may apply to the same bounty more than once.
    pub allow_duplicate_applications: bool,
}

impl Default for ApplicationPolicy {
    fn default() -> Self {
        Self {
            allow_duplicate_applications: true,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Owner and initial verifier.
    pub roles: Roles,
    /// Payload bounds.
    #[serde(default)]
    pub limits: PayloadLimits,
    /// Application multiplicity.
    #[serde(default)]
    pub applications: ApplicationPolicy,
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Parse failure.
        reason: String,
    },

    /// Owner or verifier is the zero address.
    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    /// A limit was zero.
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

impl EngineConfig {
    /// Configuration with default limits and policy.
    #[must_use]
    pub fn new(owner: Address, verifier: Address) -> Self {
        Self {
            roles: Roles { owner, verifier },
            limits: PayloadLimits::default(),
            applications: ApplicationPolicy::default(),
        }
    }

    /// Load from `CBB_*` environment variables.
    ///
    /// # Errors
    ///
    /// `ConfigError` for missing roles or unparsable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// `ConfigError` for missing roles or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = |key: &'static str| -> Result<Address, ConfigError> {
            let raw = lookup(key).ok_or(ConfigError::Missing(key))?;
            raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key,
                reason: format!("{e}"),
            })
        };
        let number = |key: &'static str, default: usize| -> Result<usize, ConfigError> {
            lookup(key).map_or(Ok(default), |raw| {
                raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    key,
                    reason: format!("{e}"),
                })
            })
        };

        let defaults = PayloadLimits::default();
        let config = Self {
            roles: Roles {
                owner: address("CBB_OWNER")?,
                verifier: address("CBB_VERIFIER")?,
            },
            limits: PayloadLimits {
                max_ciphertext_bytes: number(
                    "CBB_MAX_CIPHERTEXT_BYTES",
                    defaults.max_ciphertext_bytes,
                )?,
                max_proof_bytes: number("CBB_MAX_PROOF_BYTES", defaults.max_proof_bytes)?,
                max_text_bytes: number("CBB_MAX_TEXT_BYTES", defaults.max_text_bytes)?,
            },
            applications: ApplicationPolicy {
                allow_duplicate_applications: match lookup("CBB_ALLOW_DUPLICATE_APPLICATIONS") {
                    None => true,
                    Some(raw) => parse_bool("CBB_ALLOW_DUPLICATE_APPLICATIONS", &raw)?,
                },
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can drive an engine.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` for an unset role, `ZeroLimit` for a zero bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roles.owner.is_zero() {
            return Err(ConfigError::ZeroAddress("owner"));
        }
        if self.roles.verifier.is_zero() {
            return Err(ConfigError::ZeroAddress("verifier"));
        }
        if self.limits.max_ciphertext_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_ciphertext_bytes"));
        }
        if self.limits.max_proof_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_proof_bytes"));
        }
        if self.limits.max_text_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_text_bytes"));
        }
        Ok(())
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const OWNER: &str = "0x1111111111111111111111111111111111111111";
    const VERIFIER: &str = "2222222222222222222222222222222222222222";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config =
            EngineConfig::from_lookup(lookup_from(&[("CBB_OWNER", OWNER), ("CBB_VERIFIER", VERIFIER)]))
                .unwrap();
        assert_eq!(config.roles.owner, Address::new([0x11; 20]));
        assert_eq!(config.roles.verifier, Address::new([0x22; 20]));
        assert_eq!(config.limits, PayloadLimits::default());
        assert!(config.applications.allow_duplicate_applications);
    }

    #[test]
    fn test_missing_owner() {
        let err = EngineConfig::from_lookup(lookup_from(&[("CBB_VERIFIER", VERIFIER)])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("CBB_OWNER"));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("CBB_OWNER", OWNER),
            ("CBB_VERIFIER", VERIFIER),
            ("CBB_MAX_PROOF_BYTES", "128"),
            ("CBB_ALLOW_DUPLICATE_APPLICATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.limits.max_proof_bytes, 128);
        assert!(!config.applications.allow_duplicate_applications);
    }

    #[test]
    fn test_invalid_values() {
        let err = EngineConfig::from_lookup(lookup_from(&[
            ("CBB_OWNER", "0x12"),
            ("CBB_VERIFIER", VERIFIER),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CBB_OWNER", .. }));

        let err = EngineConfig::from_lookup(lookup_from(&[
            ("CBB_OWNER", OWNER),
            ("CBB_VERIFIER", VERIFIER),
            ("CBB_MAX_TEXT_BYTES", "0"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroLimit("max_text_bytes"));
    }

    #[test]
    fn test_zero_verifier_rejected() {
        let config = EngineConfig::new(Address::new([1; 20]), Address::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroAddress("verifier")));
    }

    #[test]
    fn test_deserialize_json_with_defaults() {
        let json = format!(r#"{{"roles":{{"owner":"{OWNER}","verifier":"{VERIFIER}"}}}}"#);
        let config: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.limits, PayloadLimits::default());
        assert!(config.validate().is_ok());
    }
}
