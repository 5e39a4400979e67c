//! Logging setup shared by `sentry-server` and `sentry-cli`.

mod logger;
pub use logger::*;
