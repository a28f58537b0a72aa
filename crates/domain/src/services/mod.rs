//! Domain services for Shopdesk analytics.
//!
//! Services contain business logic that operates on domain models.

pub mod aggregation;
pub mod clock;
pub mod date_range;
pub mod memory_store;
pub mod report_engine;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_range::{resolve_range, trailing_days, RangePolicy};
pub use memory_store::InMemoryAnalyticsStore;
pub use report_engine::{ReportEngine, ReportError};
pub use store::{AnalyticsStore, OrderFilter, StoreError, TimeWindow};
