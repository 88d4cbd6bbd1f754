use async_trait::async_trait;
use pagerbridge_client::{Error, OnCallsResponse, PagerDutyClient, SchedulesResponse};

/// Page size used when listing schedules for a command response.
const SCHEDULES_PAGE_SIZE: u32 = 100;

/// Where the command gets its data.
#[async_trait]
pub trait OnCallSource: Send + Sync {
    /// First page of schedules.
    async fn schedules(&self) -> Result<SchedulesResponse, Error>;

    /// Current on-call entries across every schedule.
    async fn current_on_calls(&self) -> Result<OnCallsResponse, Error>;
}

#[async_trait]
impl OnCallSource for PagerDutyClient {
    async fn schedules(&self) -> Result<SchedulesResponse, Error> {
        self.get_schedules(SCHEDULES_PAGE_SIZE, 0).await
    }

    async fn current_on_calls(&self) -> Result<OnCallsResponse, Error> {
        self.get_current_on_calls().await
    }
}
