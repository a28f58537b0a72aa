//! HTTP middleware components.

pub mod admin_auth;
pub mod logging;
pub mod metrics;
pub mod trace_id;

pub use admin_auth::{require_admin, AdminAuth};
pub use metrics::{init_metrics, metrics_handler, metrics_middleware, record_report_generated};
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
