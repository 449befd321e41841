// Application configuration loaded from environment variables
// `.env` is loaded by main before this runs

use std::fmt;

/// Default HTTP bind host
const DEFAULT_HOST: &str = "0.0.0.0";
/// Default HTTP port
const DEFAULT_PORT: &str = "8080";
/// Default sender used for booking emails
const DEFAULT_FROM_EMAIL: &str = "Ohana B&B Prenotazioni <onboarding@resend.dev>";
/// Fallback contact address, also the default notification recipient
const DEFAULT_CONTACT_EMAIL: &str = "ohanab.and.b@gmail.com";
const DEFAULT_CONTACT_PHONE: &str = "+39 376 297 9866";
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_RESEND_API_BASE: &str = "https://api.resend.com";

/// Stripe credentials
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

/// Resend credentials and sender
#[derive(Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    pub api_base: String,
}

/// Process-wide configuration
///
/// Every optional collaborator is `None` when its variables are unset or
/// blank; the corresponding feature then degrades as documented on each
/// consumer.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: String,
    pub redis_url: Option<String>,
    pub admin_secret: Option<String>,
    /// Raw `CODE:VALUE,...` list, parsed on every evaluation
    pub discount_codes: String,
    pub stripe: Option<StripeConfig>,
    /// Public site URL used to build payment success/cancel redirects
    pub public_base_url: Option<String>,
    pub resend: Option<ResendConfig>,
    pub notify_email: String,
    pub contact_email: String,
    pub contact_phone: String,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function
    ///
    /// Values are trimmed; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let stripe = get("STRIPE_SECRET_KEY").map(|secret_key| StripeConfig {
            secret_key,
            webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            api_base: get("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
        });

        let resend = get("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            from: normalize_sender(
                &get("RESEND_FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            ),
            api_base: get("RESEND_API_BASE")
                .unwrap_or_else(|| DEFAULT_RESEND_API_BASE.to_string()),
        });

        let contact_email =
            get("CONTACT_EMAIL").unwrap_or_else(|| DEFAULT_CONTACT_EMAIL.to_string());

        Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            redis_url: get("REDIS_URL"),
            admin_secret: get("ADMIN_SECRET").or_else(|| get("REVIEW_ADMIN_SECRET")),
            discount_codes: get("DISCOUNT_CODES").unwrap_or_default(),
            stripe,
            public_base_url: get("PUBLIC_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            resend,
            notify_email: get("BOOKING_NOTIFY_EMAIL").unwrap_or_else(|| contact_email.clone()),
            contact_email,
            contact_phone: get("CONTACT_PHONE")
                .unwrap_or_else(|| DEFAULT_CONTACT_PHONE.to_string()),
        }
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Wrap a bare address in a display name
fn normalize_sender(from: &str) -> String {
    if from.contains('<') {
        from.to_string()
    } else {
        format!("Ohana B&B Prenotazioni <{}>", from)
    }
}

// Secrets stay out of logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("redis", &self.redis_url.is_some())
            .field("admin_secret", &self.admin_secret.is_some())
            .field("stripe", &self.stripe.is_some())
            .field("public_base_url", &self.public_base_url)
            .field("resend", &self.resend.is_some())
            .field("notify_email", &self.notify_email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert!(config.redis_url.is_none());
        assert!(config.admin_secret.is_none());
        assert!(config.stripe.is_none());
        assert!(config.resend.is_none());
        assert_eq!(config.notify_email, DEFAULT_CONTACT_EMAIL);
        assert!(config.discount_codes.is_empty());
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("ADMIN_SECRET", "   "), ("STRIPE_SECRET_KEY", "")]);
        assert!(config.admin_secret.is_none());
        assert!(config.stripe.is_none());
    }

    #[test]
    fn test_admin_secret_alias() {
        let config = config_from(&[("REVIEW_ADMIN_SECRET", " s3cret ")]);
        assert_eq!(config.admin_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_sender_gets_display_name() {
        let config = config_from(&[
            ("RESEND_API_KEY", "re_123"),
            ("RESEND_FROM_EMAIL", "prenotazioni@ohana-bnb.it"),
        ]);
        let resend = config.resend.unwrap();
        assert_eq!(resend.from, "Ohana B&B Prenotazioni <prenotazioni@ohana-bnb.it>");
        assert_eq!(resend.api_base, DEFAULT_RESEND_API_BASE);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = config_from(&[("PUBLIC_BASE_URL", "https://ohana-bnb.it/")]);
        assert_eq!(config.public_base_url.as_deref(), Some("https://ohana-bnb.it"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = config_from(&[
            ("ADMIN_SECRET", "top-secret"),
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
        ]);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("sk_test_abc"));
    }
}
