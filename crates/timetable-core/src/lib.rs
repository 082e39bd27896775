//! Core types: credentials, calendar request settings, tracing

pub mod credentials;
pub mod request;
pub mod tracing;

pub use credentials::Credentials;
pub use request::{format_bound, SyncRequestConfig, BOUND_DATE_FORMAT};
pub use self::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
