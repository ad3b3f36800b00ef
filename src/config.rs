use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::mail::SmtpSettings;

const LOCAL_HOSTED_URL: &str = "http://localhost:54321";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "yoga-gateway")]
#[command(about = "Booking, auth and payment gateway for the yoga studio site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Custom backend API base URL
    #[arg(long, env = "API_URL", default_value = "https://api.yogforever.com")]
    pub api_url: String,

    // Hosted backend (auth + tables)
    #[arg(long, env = "SUPABASE_URL")]
    pub hosted_url: Option<String>,

    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub hosted_anon_key: Option<String>,

    // SMTP relay
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    // Support mailbox, defaults to the SMTP user
    #[arg(long, env = "SUPPORT_MAILBOX")]
    pub support_mailbox: Option<String>,

    // Public site origin, used for auth redirect links
    #[arg(long, env = "SITE_URL", default_value = "http://localhost:3000")]
    pub site_url: String,

    // Pricing cache TTL in seconds
    #[arg(short, long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Upstream health check interval in seconds
    #[arg(long, default_value_t = 30)]
    pub health_interval: u64,

    // Outbound request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub request_timeout: u64,

    #[arg(
        long,
        env = "CHECKOUT_SCRIPT_URL",
        default_value = "https://checkout.razorpay.com/v1/payment-button.js"
    )]
    pub checkout_script_url: String,

    #[arg(long, env = "MEET_LINK", default_value = "https://meet.google.com/eis-yetd-uqt")]
    pub meet_link: String,

    #[arg(long, env = "ZOOM_LINK", default_value = "https://us06web.zoom.us/j/89432205986")]
    pub zoom_link: String,

    // Refuse to start without hosted backend and SMTP settings
    #[arg(long, env = "STRICT_CONFIG")]
    pub strict: bool,
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    })
}

impl Args {
    // malformed URLs always fail; missing collaborators only fail in strict mode
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_url("API_URL", &self.api_url)?;
        parse_url("SITE_URL", &self.site_url)?;
        parse_url("CHECKOUT_SCRIPT_URL", &self.checkout_script_url)?;
        if let Some(url) = &self.hosted_url {
            parse_url("SUPABASE_URL", url)?;
        }

        if self.strict {
            let required = [
                ("SUPABASE_URL", &self.hosted_url),
                ("SUPABASE_ANON_KEY", &self.hosted_anon_key),
                ("SMTP_HOST", &self.smtp_host),
                ("SMTP_USER", &self.smtp_user),
                ("SMTP_PASS", &self.smtp_pass),
            ];
            for (name, value) in required {
                if value.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::Missing(name));
                }
            }
        }
        Ok(())
    }

    // unset outside strict mode: the local development stack
    pub fn hosted_url(&self) -> Result<Url, ConfigError> {
        parse_url(
            "SUPABASE_URL",
            self.hosted_url.as_deref().unwrap_or(LOCAL_HOSTED_URL),
        )
    }

    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: self.smtp_host.clone()?,
            port: self.smtp_port,
            user: self.smtp_user.clone()?,
            pass: self.smtp_pass.clone()?,
        })
    }

    pub fn support_mailbox(&self) -> String {
        self.support_mailbox
            .clone()
            .or_else(|| self.smtp_user.clone())
            .unwrap_or_else(|| "support@localhost".to_string())
    }

    pub fn password_reset_redirect(&self) -> String {
        format!("{}/reset-password", self.site_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["yoga-gateway"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn relaxed_mode_accepts_missing_collaborators() {
        let a = args(&["--api-url", "https://api.test"]);
        assert_eq!(a.validate(), Ok(()));
        assert!(a.smtp_settings().is_none());
        assert_eq!(a.hosted_url().unwrap().as_str(), "http://localhost:54321/");
    }

    #[test]
    fn strict_mode_requires_hosted_and_smtp() {
        let a = args(&["--strict", "--hosted-url", "https://proj.supabase.co", "--hosted-anon-key", "k"]);
        assert_eq!(a.validate(), Err(ConfigError::Missing("SMTP_HOST")));

        let a = args(&[
            "--strict",
            "--hosted-url", "https://proj.supabase.co",
            "--hosted-anon-key", "k",
            "--smtp-host", "smtp.test",
            "--smtp-user", "s@yoga.test",
            "--smtp-pass", "pw",
        ]);
        assert_eq!(a.validate(), Ok(()));
        assert_eq!(a.support_mailbox(), "s@yoga.test");
    }

    #[test]
    fn malformed_urls_always_fail() {
        let a = args(&["--api-url", "not a url"]);
        assert!(matches!(a.validate(), Err(ConfigError::InvalidUrl { name: "API_URL", .. })));
    }

    #[test]
    fn reset_redirect_joins_site_url() {
        let a = args(&["--site-url", "https://yoga.test/"]);
        assert_eq!(a.password_reset_redirect(), "https://yoga.test/reset-password");
    }
}
