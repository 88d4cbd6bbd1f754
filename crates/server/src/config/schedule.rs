use chrono::TimeDelta;
use serde::Deserialize;

/// Schedule detail defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Window rendered when a request names neither `until` nor `hours`.
    #[serde(default = "default_window_hours")]
    pub default_window_hours: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_window_hours: default_window_hours(),
        }
    }
}

impl ScheduleConfig {
    pub fn default_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.default_window_hours))
    }
}

fn default_window_hours() -> u32 {
    168
}
