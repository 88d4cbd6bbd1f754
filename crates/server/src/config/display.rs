use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

/// Text rendering settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// IANA zone shift end times are rendered in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
        }
    }
}

impl DisplayConfig {
    /// The configured zone, or UTC when it does not parse.
    pub fn tz(&self) -> Tz {
        self.time_zone.parse().unwrap_or_else(|_| {
            warn!(time_zone = %self.time_zone, "unknown display time zone, using UTC");
            Tz::UTC
        })
    }
}

fn default_time_zone() -> String {
    "UTC".to_owned()
}
