use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub email: String,
    pub password: String,
    pub server: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsSettings {
    pub gateway_url: String,
    pub token: Option<String>,
}

/// Runtime settings read from `.env` and the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    /// Email delivery is logged instead of sent when this is `None`.
    pub smtp: Option<SmtpSettings>,
    /// Phone delivery is logged instead of sent when this is `None`.
    pub sms: Option<SmsSettings>,
    pub otp_ttl_secs: i64,
    pub otp_max_attempts: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("Invalid PORT")?
            .unwrap_or(8080);

        let smtp = match (var("SMTP_EMAIL"), var("SMTP_PASSWORD")) {
            (Some(email), Some(password)) => {
                let port = var("SMTP_PORT")
                    .map(|p| p.parse::<u16>())
                    .transpose()
                    .context("Invalid SMTP_PORT")?
                    .unwrap_or(587);
                Some(SmtpSettings {
                    email,
                    password,
                    server: var("SMTP_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                    port,
                })
            }
            _ => None,
        };

        let sms = var("SMS_GATEWAY_URL").map(|gateway_url| SmsSettings {
            gateway_url,
            token: var("SMS_GATEWAY_TOKEN"),
        });

        let otp_ttl_secs = var("OTP_TTL_SECS")
            .map(|v| v.parse::<i64>())
            .transpose()
            .context("Invalid OTP_TTL_SECS")?
            .unwrap_or(600);
        let otp_max_attempts = var("OTP_MAX_ATTEMPTS")
            .map(|v| v.parse::<i32>())
            .transpose()
            .context("Invalid OTP_MAX_ATTEMPTS")?
            .unwrap_or(5);

        Ok(Self {
            database_url,
            bind_addr,
            port,
            smtp,
            sms,
            otp_ttl_secs,
            otp_max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn database_url_is_required() {
        let err = config_from(&[("PORT", "9000")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/app")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.smtp.is_none());
        assert!(config.sms.is_none());
        assert_eq!(config.otp_ttl_secs, 600);
        assert_eq!(config.otp_max_attempts, 5);
    }

    #[test]
    fn smtp_needs_both_credentials() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("SMTP_EMAIL", "noreply@example.com"),
        ])
        .unwrap();
        assert!(config.smtp.is_none());

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("SMTP_EMAIL", "noreply@example.com"),
            ("SMTP_PASSWORD", "hunter2"),
            ("SMTP_PORT", "2525"),
        ])
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.server, "smtp.gmail.com");
        assert_eq!(smtp.port, 2525);
    }

    #[test]
    fn sms_gateway_token_is_optional() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("SMS_GATEWAY_URL", "https://sms.example.com/send"),
        ])
        .unwrap();
        assert_eq!(
            config.sms,
            Some(SmsSettings {
                gateway_url: "https://sms.example.com/send".to_string(),
                token: None,
            })
        );
    }

    #[test]
    fn rejects_unparseable_port() {
        let err = config_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
