use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub search: SearchConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Live-typing suggestions accept loose matches
    pub suggest_threshold: f64,
    /// "Did you mean" fallback when an exact lookup misses
    pub fallback_threshold: f64,
    /// General matching
    pub match_threshold: f64,
    pub max_suggestions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            search: SearchConfig {
                suggest_threshold: 0.5,
                fallback_threshold: 0.6,
                match_threshold: search::fuzzy::DEFAULT_THRESHOLD,
                max_suggestions: 8,
            },
            upload: UploadConfig {
                // Roster exports run to a few hundred thousand rows
                max_body_bytes: 64 * 1024 * 1024,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, with the bind address overridable from the
    /// environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("ROSTER_API_ADDR") {
            if !addr.is_empty() {
                config.bind_addr = addr;
            }
        }
        config
    }
}
