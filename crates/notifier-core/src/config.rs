//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Library configuration
///
/// Read once at process start; `backends` is the ordered list of delivery
/// backend identifiers to activate at bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Backend identifiers to activate, in activation order
    pub backends: Vec<String>,

    /// Email sender settings
    pub email: EmailConfig,

    /// SMS sender settings
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub from_address: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Sender number; deliveries go out without one if unset
    pub from_number: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backends: vec!["email".to_string()],
            email: EmailConfig {
                from_address: "notifier@example.com".to_string(),
                from_name: "Notifier".to_string(),
            },
            sms: SmsConfig { from_number: None },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl NotifierConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(list) = std::env::var("NOTIFIER_BACKENDS") {
            let backends = parse_backend_list(&list);
            if backends.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "NOTIFIER_BACKENDS".to_string(),
                    message: "expected a comma-separated list of backend names".to_string(),
                });
            }
            config.backends = backends;
        }

        if let Ok(from) = std::env::var("NOTIFIER_FROM_EMAIL") {
            config.email.from_address = from;
        }
        if let Ok(name) = std::env::var("NOTIFIER_FROM_NAME") {
            config.email.from_name = name;
        }
        if let Ok(number) = std::env::var("NOTIFIER_SMS_FROM") {
            config.sms.from_number = Some(number);
        }

        Ok(config)
    }
}

fn parse_backend_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NotifierConfig::default();
        assert_eq!(config.backends, vec!["email".to_string()]);
        assert!(config.sms.from_number.is_none());
    }

    #[test]
    fn test_parse_backend_list() {
        assert_eq!(
            parse_backend_list("email, sms"),
            vec!["email".to_string(), "sms".to_string()]
        );
        assert_eq!(parse_backend_list("email,,"), vec!["email".to_string()]);
        assert!(parse_backend_list(" , ").is_empty());
    }
}
