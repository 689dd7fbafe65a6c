use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origin: String,
    pub access_token_minutes: i64,
    pub log_level: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the one-shot bootstrap administrator. Present only when
/// both ADMIN_EMAIL and ADMIN_PASSWORD are set.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("LEADTRACK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEADTRACK_HOST: {e}"))?;

        let port: u16 = env_or("LEADTRACK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEADTRACK_PORT: {e}"))?;

        let cors_origin = env_or("LEADTRACK_CORS_ORIGIN", "http://localhost:5173");

        let access_token_minutes: i64 = env_or("ACCESS_TOKEN_MINUTES", "60")
            .parse()
            .map_err(|e| format!("Invalid ACCESS_TOKEN_MINUTES: {e}"))?;

        let log_level = env_or("LEADTRACK_LOG_LEVEL", "info");

        let bootstrap_admin = match (
            std::env::var("ADMIN_EMAIL").ok(),
            std::env::var("ADMIN_PASSWORD").ok(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { email, password })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            cors_origin,
            access_token_minutes,
            log_level,
            bootstrap_admin,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
