use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Days, Utc};
use chrono_tz::Tz;
use pagerbridge_client::{OnCall, OnCallsResponse, Schedule, SchedulesResponse};

const UNKNOWN_SCHEDULE: &str = "Unknown Schedule";

pub fn help_text() -> &'static str {
    "### PagerDuty Plugin Commands

* **/pagerduty help** - Show this help message
* **/pagerduty schedules** - List all PagerDuty schedules
* **/pagerduty oncall** - Show who's currently on-call

You can also click the PagerDuty icon in the channel header to open the sidebar view for more detailed information."
}

pub fn render_schedules(response: &SchedulesResponse) -> String {
    if response.schedules.is_empty() {
        return "No PagerDuty schedules found.".to_owned();
    }

    let mut text = String::from("### PagerDuty Schedules\n\n");
    for schedule in &response.schedules {
        let _ = write!(text, "**{}**", schedule.name);
        if let Some(description) = schedule.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(text, " - {description}");
        }
        let _ = write!(text, "\n_Timezone: {}_\n\n", schedule.time_zone);
    }
    text.push_str(
        "\n_Use `/pagerduty oncall` to see who's currently on-call, or click the PagerDuty icon in the channel header for detailed schedule views._",
    );
    text
}

/// Render current on-calls grouped by schedule, schedule names sorted.
///
/// Shift ends are shown in `tz` relative to `now`.
pub fn render_on_calls(response: &OnCallsResponse, tz: Tz, now: DateTime<Utc>) -> String {
    if response.on_calls.is_empty() {
        return "No one is currently on-call.".to_owned();
    }

    let mut by_schedule: BTreeMap<&str, Vec<&OnCall>> = BTreeMap::new();
    for on_call in &response.on_calls {
        let name = on_call
            .schedule
            .as_ref()
            .map_or(UNKNOWN_SCHEDULE, Schedule::display_name);
        by_schedule.entry(name).or_default().push(on_call);
    }

    let mut text = String::from("### Currently On-Call\n\n");
    for (schedule, on_calls) in by_schedule {
        let _ = writeln!(text, "**{schedule}**");
        for on_call in on_calls {
            let _ = write!(text, "• {}", on_call.user.display_name());
            if !on_call.user.email.is_empty() {
                let _ = write!(text, " ({})", on_call.user.email);
            }
            if let Some(until) = on_call.end.as_deref().and_then(|end| shift_end(end, tz, now)) {
                let _ = write!(text, " - until {until}");
            }
            if on_call.escalation_level > 0 {
                let _ = write!(text, " _(escalation level {})_", on_call.escalation_level);
            }
            text.push('\n');
        }
        text.push('\n');
    }
    text.push_str(
        "_Click the PagerDuty icon in the channel header to see the full 24-hour schedule timeline._",
    );
    text
}

/// `3:04 PM today`, `3:04 PM tomorrow`, or `Mon 3:04 PM`.
///
/// Unparseable timestamps yield `None` and the line is rendered without an
/// end time.
fn shift_end(end: &str, tz: Tz, now: DateTime<Utc>) -> Option<String> {
    let end = DateTime::parse_from_rfc3339(end).ok()?.with_timezone(&tz);
    let today = now.with_timezone(&tz).date_naive();
    let end_day = end.date_naive();

    let rendered = if end_day == today {
        format!("{} today", end.format("%-I:%M %p"))
    } else if today.checked_add_days(Days::new(1)) == Some(end_day) {
        format!("{} tomorrow", end.format("%-I:%M %p"))
    } else {
        end.format("%a %-I:%M %p").to_string()
    };
    Some(rendered)
}
