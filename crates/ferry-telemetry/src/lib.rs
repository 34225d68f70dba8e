//! Tracing setup and per-invocation correlation for Ferry.
//!
//! The `ferry` binary installs one subscriber from its `[logging]` config
//! section with [`setup_logging`]. The bridge wraps every worker in a
//! [`RequestGuard`], so entries from one invocation share an `invocation`
//! span.
//!
//! ```rust,no_run
//! use ferry_telemetry::{LogConfig, LogFormat, RequestContext, RequestGuard, setup_logging};
//!
//! # fn main() -> Result<(), ferry_telemetry::TelemetryError> {
//! setup_logging(&LogConfig::new("info").with_format(LogFormat::Json))?;
//!
//! let _guard = RequestGuard::new(RequestContext::new("healthCheck").with_worker(0));
//! tracing::info!("served");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod context;
mod error;
mod logging;

pub use context::{RequestContext, RequestGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
