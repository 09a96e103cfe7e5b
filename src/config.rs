use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILTER: &str = "rusty_library_lending=debug,tower_http=debug";

/// 設定の読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// アプリケーション設定
///
/// 環境変数から読み込む。未設定の項目は既定値を使う。
/// - `LIBRARY_HOST` (既定: 0.0.0.0)
/// - `PORT` (既定: 3000)
/// - `LIBRARY_LOG` (既定: rusty_library_lending=debug,tower_http=debug)
/// - `LIBRARY_SEED_DEMO` (既定: true)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を組み立てる
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("LIBRARY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let log_filter = lookup("LIBRARY_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let seed_demo_data = match lookup("LIBRARY_SEED_DEMO") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: "LIBRARY_SEED_DEMO",
                value,
            })?,
            None => true,
        };

        Ok(Self {
            host,
            port,
            log_filter,
            seed_demo_data,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a HashMap<&str, &str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| vars.get(key).map(|value| value.to_string())
    }

    #[test]
    fn test_defaults() {
        let vars = HashMap::new();
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(config.seed_demo_data);
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("LIBRARY_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LIBRARY_LOG", "info"),
            ("LIBRARY_SEED_DEMO", "no"),
        ]);
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_filter, "info");
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_invalid_port() {
        let vars = HashMap::from([("PORT", "http")]);
        assert_eq!(
            AppConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue {
                key: "PORT",
                value: "http".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_seed_flag() {
        let vars = HashMap::from([("LIBRARY_SEED_DEMO", "maybe")]);
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }
}
