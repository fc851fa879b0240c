use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Shared secret gating the privileged admin-registration route.
    pub admin_secret_key: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let admin_secret_key = std::env::var("ADMIN_SECRET_KEY")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userhub-clients".into()),
            ttl_minutes: positive_minutes(std::env::var("JWT_TTL_MINUTES").ok(), 60 * 24),
        };
        Ok(Self {
            database_url,
            admin_secret_key,
            jwt,
        })
    }
}

/// TTLs must be positive; anything else falls back to the default.
fn positive_minutes(raw: Option<String>, default: i64) -> i64 {
    raw.and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_falls_back_on_missing_malformed_or_non_positive() {
        assert_eq!(positive_minutes(None, 1440), 1440);
        assert_eq!(positive_minutes(Some("abc".into()), 1440), 1440);
        assert_eq!(positive_minutes(Some("0".into()), 1440), 1440);
        assert_eq!(positive_minutes(Some("-5".into()), 1440), 1440);
        assert_eq!(positive_minutes(Some("60".into()), 1440), 60);
    }
}
