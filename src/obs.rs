//! Optional observability helpers for relay stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_relay.stage` with the `stage`
//!   (component) and `kind` (response kind) fields, plus console copies of every diagnostic log
//!   line.
//! - Enable `metrics` to increment the `oauth2_relay_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Relay stages observed by the instrumentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Location parsing into an [`AuthResult`](crate::auth::AuthResult).
	Extract,
	/// Deep-link redirect cascade.
	Redirect,
	/// Manual-fallback presentation and clipboard handling.
	Fallback,
}
impl StageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::Extract => "extract",
			StageKind::Redirect => "redirect",
			StageKind::Fallback => "fallback",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage (one per redirect attempt fired).
	Attempt,
	/// Stage reached its designed success signal.
	Success,
	/// Stage exhausted its options or degraded.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
