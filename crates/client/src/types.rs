use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ─── Pagination ──────────────────────────────────────────────────────

/// Pagination metadata carried by every list response.
///
/// `PagerDuty` only computes `total` when the request asks for it, so it is
/// `None` on most responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

impl ListResponse {
    /// Offset of the following page, or `None` when this was the last one.
    ///
    /// `returned` is the number of items in the page this metadata came with.
    pub fn next_offset(&self, returned: usize) -> Option<u32> {
        if !self.more {
            return None;
        }
        let returned = u32::try_from(returned).unwrap_or(u32::MAX);
        Some(self.offset.saturating_add(returned))
    }

    /// Check `offset + returned <= total` on the final page.
    ///
    /// Pages that are not final, or that carry no `total`, are always
    /// consistent.
    pub fn is_consistent(&self, returned: usize) -> bool {
        match (self.more, self.total) {
            (false, Some(total)) => u64::from(self.offset) + returned as u64 <= total,
            _ => true,
        }
    }
}

// ─── Users ───────────────────────────────────────────────────────────

/// A lightweight pointer to a user, as embedded in schedule layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReference {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
}

/// A `PagerDuty` user.
///
/// Everything except `id` defaults when absent: responses that did not ask
/// for `include[]=users` only carry the reference fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_methods: Vec<ContactMethod>,
}

impl User {
    /// Name to show for this user, falling back to the summary and then the id.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.summary.is_empty() {
            &self.summary
        } else {
            &self.id
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMethod {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub address: String,
}

// ─── Schedules ───────────────────────────────────────────────────────

/// An on-call rotation definition.
///
/// On-call entries fetched without `include[]=schedules` embed only a
/// reference (`id`, `type`, `summary`), so `name` defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// IANA time zone the schedule is defined in.
    #[serde(default)]
    pub time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule_layers: Vec<ScheduleLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_subcycle: Option<OverrideSubcycle>,
    /// The materialized rotation, only present on single-schedule responses
    /// fetched with a `since`/`until` window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_schedule: Option<FinalSchedule>,
}

impl Schedule {
    /// Name to show for this schedule, falling back to the summary and then the id.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if let Some(summary) = self.summary.as_deref().filter(|s| !s.is_empty()) {
            summary
        } else {
            &self.id
        }
    }
}

/// Single-schedule responses share the list shape; only `final_schedule`
/// is reliably populated on them.
pub type ScheduleDetail = Schedule;

/// A named rotation rule within a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLayer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub start: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<FixedOffset>>,
    pub rotation_virtual_start: DateTime<FixedOffset>,
    #[serde(default)]
    pub rotation_turn_length_seconds: u64,
    #[serde(default)]
    pub users: Vec<LayerUser>,
}

impl ScheduleLayer {
    /// A layer is well formed when it has no end, or ends at or after it starts.
    pub fn is_well_formed(&self) -> bool {
        self.end.is_none_or(|end| end >= self.start)
    }
}

/// Layer members are wrapped one level deeper than plain references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerUser {
    pub user: UserReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSubcycle {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSchedule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rendered_schedule_entries: Vec<RenderedScheduleEntry>,
}

/// One materialized on-call interval.
///
/// `start` and `end` are kept as the exact strings the API sent. Parse them
/// where they are displayed, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedScheduleEntry {
    pub user: User,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulesResponse {
    #[serde(flatten)]
    pub pagination: ListResponse,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScheduleResponse {
    pub schedule: ScheduleDetail,
}

// ─── On-calls ────────────────────────────────────────────────────────

/// A user's current or upcoming on-call assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCall {
    pub user: User,
    /// Absent for escalation-policy rules that target users directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_policy: Option<EscalationPolicy>,
    /// 0 is the first responder.
    #[serde(default)]
    pub escalation_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// `None` for an open-ended final shift.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub num_loops: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallsResponse {
    #[serde(flatten)]
    pub pagination: ListResponse,
    #[serde(default, rename = "oncalls")]
    pub on_calls: Vec<OnCall>,
}

// ─── Services ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesResponse {
    #[serde(flatten)]
    pub pagination: ListResponse,
    #[serde(default)]
    pub services: Vec<Service>,
}

// ─── Incidents ───────────────────────────────────────────────────────

pub(crate) const INCIDENT_TYPE: &str = "incident";
pub(crate) const SERVICE_REFERENCE_TYPE: &str = "service_reference";
pub(crate) const USER_REFERENCE_TYPE: &str = "user_reference";

/// An incident, both as sent on creation and as echoed back by the API.
///
/// The read-back fields are `None` on the outbound payload and are then
/// left off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub service: ServiceReference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl Incident {
    /// Build the outbound payload for a new incident.
    ///
    /// An empty `description` is left out, and so is `assignments` when no
    /// assignee ids are given.
    pub fn new<S: AsRef<str>>(
        title: impl Into<String>,
        description: impl Into<String>,
        service_id: impl Into<String>,
        assignee_ids: &[S],
    ) -> Self {
        let description = description.into();
        Self {
            kind: INCIDENT_TYPE.to_owned(),
            title: title.into(),
            description: (!description.is_empty()).then_some(description),
            service: ServiceReference {
                id: service_id.into(),
                kind: SERVICE_REFERENCE_TYPE.to_owned(),
                summary: None,
            },
            assignments: assignee_ids
                .iter()
                .map(|id| Assignment {
                    assignee: AssigneeReference {
                        id: id.as_ref().to_owned(),
                        kind: USER_REFERENCE_TYPE.to_owned(),
                        summary: None,
                    },
                })
                .collect(),
            id: None,
            incident_number: None,
            status: None,
            created_at: None,
            html_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignee: AssigneeReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIncidentRequest {
    pub incident: Incident,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIncidentResponse {
    pub incident: Incident,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Error envelope returned with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub errors: Vec<String>,
}
