use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GlimpseConfig {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectorConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IdentityConfig {
    pub path: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            path: "~/.glimpse/user_id".to_string(),
        }
    }
}

impl GlimpseConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
