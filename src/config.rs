use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FALLBACK_PORT: u16 = 5001;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub fallback_port: u16,
    pub production: bool,
    /// `production`, else the first non-blank of `APP_ENV`/`ENV`, else `development`.
    pub environment: String,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
    pub persist: bool,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_values: Vec<String> = ["APP_ENV", "ENV"]
            .iter()
            .filter_map(|key| lookup(*key))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        let production = env_values
            .iter()
            .any(|value| value.eq_ignore_ascii_case("production"));
        let environment = if production {
            "production".to_string()
        } else {
            env_values
                .into_iter()
                .next()
                .unwrap_or_else(|| "development".to_string())
        };

        let port = lookup("PORT")
            .and_then(|value| parse_port(&value))
            .unwrap_or(DEFAULT_PORT);
        let fallback_port = lookup("FALLBACK_PORT")
            .and_then(|value| parse_port(&value))
            .unwrap_or(DEFAULT_FALLBACK_PORT);

        let host = lookup("HOST")
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
            .unwrap_or(if production {
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            } else {
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            });

        let log_level = lookup("RUST_LOG")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());

        Self {
            host,
            port,
            fallback_port,
            production,
            environment,
            log_level,
            file_logs: lookup("ENABLE_FILE_LOGS").and_then(|v| env_bool(&v)).unwrap_or(false),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./logs")),
            persist: lookup("PERSIST").and_then(|v| env_bool(&v)).unwrap_or(true),
            data_dir: lookup("DATA_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn fallback_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.fallback_port)
    }
}

/// Keeps only the digits of `raw` (hosting platforms sometimes hand over
/// quoted or decorated values) and accepts 1..=65535.
pub fn parse_port(raw: &str) -> Option<u16> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let port = digits.parse::<u32>().ok()?;
    if (1..=u32::from(u16::MAX)).contains(&port) {
        Some(port as u16)
    } else {
        None
    }
}

fn env_bool(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.fallback_port, 5001);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.log_level, "info");
        assert!(config.persist);
        assert!(!config.file_logs);
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn test_production_binds_all_interfaces() {
        let config = config(&[("ENV", "Production"), ("PORT", "8080")]);
        assert!(config.production);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_environment_name_agrees_with_production_flag() {
        let mixed = config(&[("APP_ENV", "dev"), ("ENV", "production")]);
        assert!(mixed.production);
        assert_eq!(mixed.environment, "production");

        assert_eq!(config(&[("APP_ENV", "staging")]).environment, "staging");
        assert_eq!(config(&[("APP_ENV", " "), ("ENV", "test")]).environment, "test");
        assert_eq!(config(&[]).environment, "development");
    }

    #[test]
    fn test_explicit_host_wins() {
        let config = config(&[("ENV", "production"), ("HOST", "127.0.0.1")]);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port("'8080'\n"), Some(8080));
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("70000"), None);
        assert_eq!(parse_port("abc"), None);
    }

    #[test]
    fn test_persist_toggle() {
        assert!(!config(&[("PERSIST", "false")]).persist);
        assert!(config(&[("PERSIST", "maybe")]).persist);
        assert!(config(&[("ENABLE_FILE_LOGS", "1")]).file_logs);
    }
}
