pub mod cache;
pub mod error;
pub mod store;
pub mod testing;

pub use cache::{SCHEDULES_CACHE_KEY, ScheduleCache};
pub use error::KvError;
pub use store::KvStore;
