//! Runtime configuration, read once from the environment.

use std::time::Duration;

use umlforge_core::DecodeOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Generator base URL. `None` makes every request fail.
    pub base_url: Option<String>,
    /// Sent as `X-API-Key` on every outbound call.
    pub api_key: String,
    pub bind: String,
    pub port: u16,
    /// Unset means the call may hang forever.
    pub request_timeout: Option<Duration>,
    pub decode: DecodeOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            bind: "127.0.0.1".into(),
            port: 3010,
            request_timeout: None,
            decode: DecodeOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let defaults = Self::default();

        let base_url = get("UMLFORGE_SERVER_BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let port_raw = env_or("UMLFORGE_PORT", &defaults.port.to_string());
        let port = port_raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            key: "UMLFORGE_PORT",
            value: port_raw.clone(),
            reason: e.to_string(),
        })?;

        let request_timeout = match get("UMLFORGE_REQUEST_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        key: "UMLFORGE_REQUEST_TIMEOUT_SECS",
                        value: raw.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        let sniff = match get("UMLFORGE_SNIFF_IMAGES") {
            None => defaults.decode.sniff,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "UMLFORGE_SNIFF_IMAGES",
                value: raw.clone(),
                reason: "expected true/false".into(),
            })?,
        };

        let decode = DecodeOptions {
            mime: env_or("UMLFORGE_IMAGE_MIME", &defaults.decode.mime),
            sniff,
            ..defaults.decode
        };

        Ok(Self {
            base_url,
            api_key: env_or("UMLFORGE_API_KEY", ""),
            bind: env_or("UMLFORGE_BIND", &defaults.bind),
            port,
            request_timeout,
            decode,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
