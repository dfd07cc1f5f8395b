use crate::errors::ConfigError;
use crate::models::Mode;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Real seconds per logical scenario minute.
pub const DEFAULT_TIME_SCALE_SECS: f64 = 10.0;

/// Upper bound for `time_scale_secs`: one real hour per logical minute.
pub const MAX_TIME_SCALE_SECS: f64 = 3600.0;

// One scenario column bound to one room
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoomColumn {
    pub column: usize,
    pub room_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunnerConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_time_scale_secs")]
    pub time_scale_secs: f64,
    #[serde(default = "default_rooms")]
    pub rooms: Vec<RoomColumn>,
    #[serde(default)]
    pub default_mode: Mode,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_expect_failure_marker")]
    pub expect_failure_marker: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_time_scale_secs() -> f64 {
    DEFAULT_TIME_SCALE_SECS
}

// Columns 1..=5 -> rooms 101..=105
fn default_rooms() -> Vec<RoomColumn> {
    (1..=5)
        .map(|column| RoomColumn {
            column,
            room_id: format!("{}", 100 + column),
        })
        .collect()
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(30)
}

fn default_expect_failure_marker() -> String {
    "!".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            time_scale_secs: default_time_scale_secs(),
            rooms: default_rooms(),
            default_mode: Mode::default(),
            request_timeout_secs: default_request_timeout_secs(),
            expect_failure_marker: default_expect_failure_marker(),
        }
    }
}

impl RunnerConfig {
    /// Applies `AC_API_BASE_URL` and `AC_TIME_SCALE_SECS` on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var("AC_API_BASE_URL") {
            self.api_base_url = url;
        }

        if let Ok(scale) = std::env::var("AC_TIME_SCALE_SECS") {
            self.time_scale_secs = scale.parse().map_err(|e| ConfigError::Invalid {
                field: "time_scale_secs".to_string(),
                message: format!("'{}' is not a number: {}", scale, e),
            })?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_TIME_SCALE_SECS).contains(&self.time_scale_secs) {
            return Err(ConfigError::Invalid {
                field: "time_scale_secs".to_string(),
                message: format!(
                    "must be between 0 and {} seconds, got {}",
                    MAX_TIME_SCALE_SECS, self.time_scale_secs
                ),
            });
        }

        if self.rooms.is_empty() {
            return Err(ConfigError::Invalid {
                field: "rooms".to_string(),
                message: "at least one room column is required".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for room in &self.rooms {
            if room.column == 0 {
                return Err(ConfigError::Invalid {
                    field: "rooms".to_string(),
                    message: format!("column 0 holds the time point, cannot map room {}", room.room_id),
                });
            }
            if !seen.insert(room.column) {
                return Err(ConfigError::Invalid {
                    field: "rooms".to_string(),
                    message: format!("column {} is mapped more than once", room.column),
                });
            }
        }

        Ok(())
    }

    /// Real-time wait for one logical minute. Values outside the range
    /// accepted by [`RunnerConfig::validate`] are clamped; NaN maps to zero.
    pub fn time_scale(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_scale_secs.clamp(0.0, MAX_TIME_SCALE_SECS)).unwrap_or(Duration::ZERO)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Loads a JSON config file; missing keys fall back to the defaults.
pub fn load_config(path: &Path) -> Result<RunnerConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let config: RunnerConfig = serde_json::from_reader(reader).map_err(|e| ConfigError::MalformedJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Loaded config from {}: {:?}", path.display(), config);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_room_table() {
        let config = RunnerConfig::default();
        assert_eq!(config.rooms.len(), 5);
        assert_eq!(config.rooms[0], RoomColumn { column: 1, room_id: "101".to_string() });
        assert_eq!(config.rooms[4], RoomColumn { column: 5, room_id: "105".to_string() });
        assert_eq!(config.time_scale(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_base_url": "http://10.0.0.2:8080/api", "time_scale_secs": 0.5}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.2:8080/api");
        assert_eq!(config.time_scale(), Duration::from_millis(500));
        assert_eq!(config.rooms.len(), 5);
        assert_eq!(config.default_mode, Mode::Cool);
        assert_eq!(config.expect_failure_marker, "!");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
        assert_eq!(err.to_string(), "No runner config at /definitely/not/here.json");
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedJson { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = RunnerConfig {
            time_scale_secs: -1.0,
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunnerConfig {
            rooms: Vec::new(),
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = RunnerConfig::default();
        config.rooms[1].column = 1;
        assert!(config.validate().is_err());

        let mut config = RunnerConfig::default();
        config.rooms[0].column = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_time_scale_bounds() {
        let at_bound = RunnerConfig {
            time_scale_secs: MAX_TIME_SCALE_SECS,
            ..RunnerConfig::default()
        };
        assert!(at_bound.validate().is_ok());
        assert_eq!(at_bound.time_scale(), Duration::from_secs(3600));

        let zero = RunnerConfig {
            time_scale_secs: 0.0,
            ..RunnerConfig::default()
        };
        assert!(zero.validate().is_ok());
        assert_eq!(zero.time_scale(), Duration::ZERO);

        for scale in [1e10, f64::INFINITY, f64::NAN] {
            let config = RunnerConfig {
                time_scale_secs: scale,
                ..RunnerConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "time_scale_secs"));
            // Never panics, even when validation was skipped.
            assert!(config.time_scale() <= Duration::from_secs(3600));
        }
    }
}
