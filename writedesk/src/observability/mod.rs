//! Observability utilities.

mod tracing;

pub use self::tracing::{init_tracing, request_span, LogFormat, SpanTimer, DEFAULT_FILTER};
