//! API configuration.

use std::net::SocketAddr;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Max request body size in bytes
    pub max_body_size: usize,
    /// Free-form deployment label, only logged
    pub environment: String,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 10 * 1024 * 1024,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    ///
    /// `API_PORT` wins over the platform-provided `PORT`. Unparseable values
    /// fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: parse_value(lookup("API_PORT"))
                .or_else(|| parse_value(lookup("PORT")))
                .unwrap_or(defaults.port),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_size: parse_value(lookup("MAX_BODY_SIZE")).unwrap_or(defaults.max_body_size),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| matches!(v.trim(), "true" | "1"))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn parse_value<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ApiConfig {
        ApiConfig::from_lookup(|name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_port_precedence() {
        assert_eq!(from_pairs(&[("PORT", "3000")]).port, 3000);
        assert_eq!(from_pairs(&[("PORT", "3000"), ("API_PORT", "9000")]).port, 9000);
        assert_eq!(from_pairs(&[("API_PORT", "nope"), ("PORT", "3000")]).port, 3000);
    }

    #[test]
    fn test_cors_and_flags() {
        let config = from_pairs(&[
            ("CORS_ORIGINS", "https://a.test, https://b.test,"),
            ("METRICS_ENABLED", "0"),
        ]);
        assert_eq!(config.cors_origins, vec!["https://a.test", "https://b.test"]);
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let config = from_pairs(&[("API_HOST", "not a host")]);
        assert!(config.bind_addr().is_err());
    }
}
