use std::env;

/// Environment configuration, loaded once at startup and handed down to the
/// components that need it. Missing payment or SMTP settings disable those
/// bridges instead of aborting.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub stripe_secret_key: Option<String>,
    pub stripe_publishable_key: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub server: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Self {
        let smtp = match (var("SMTP_SERVER"), var("SMTP_EMAIL"), var("SMTP_PASSWORD")) {
            (Some(server), Some(email), Some(password)) => Some(SmtpConfig {
                server,
                email,
                password,
            }),
            _ => None,
        };

        Config {
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://./data/care-booking.db".to_string()),
            port: var("PORT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(8080),
            stripe_secret_key: var("STRIPE_SECRET_KEY"),
            stripe_publishable_key: var("STRIPE_PUBLISHABLE_KEY"),
            smtp,
            admin_email: var("ADMIN_EMAIL").unwrap_or_else(|| "admin@care.local".to_string()),
            admin_password: var("ADMIN_PASSWORD").unwrap_or_else(|| "admin".to_string()),
            admin_name: var("ADMIN_NAME").unwrap_or_else(|| "Super Admin".to_string()),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
