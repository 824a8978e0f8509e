//! Utility functions for timestamps, text normalization and markup.

pub mod html;
pub mod text;
pub mod timestamps;

pub use text::{
    display_keywords, escape_html, escape_js, normalize_keywords, rawurlencode, sanitize_for_url,
    strip_space,
};
pub use timestamps::{
    compose_timestamp, compose_timestamp_with_defaults, format_iso8601, format_local, Clock,
    ManualClock, SystemClock, Timestamp, TimestampError,
};
