//! Capability-checked clipboard strategy pair: a primary writer with a legacy fallback.
//!
//! The primary writer maps to the host's modern asynchronous clipboard API. The legacy writer is
//! the selection-and-execute-copy technique: the host materializes a transient off-screen text
//! field, selects it, issues the copy command, and removes the field again regardless of outcome.
//! Selection happens at runtime per copy, never through inheritance.

// self
use crate::{_prelude::*, status::StatusReporter};

/// Clipboard failures raised by a single writer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClipboardError {
	/// The writer's capability check failed; the API is not exposed by this host.
	#[error("Clipboard API is unavailable on this host.")]
	Unavailable,
	/// The writer is available but refused the payload.
	#[error("Clipboard write was rejected: {reason}.")]
	Rejected {
		/// Host-supplied rejection detail.
		reason: String,
	},
}

/// Mechanism that ended up performing a successful copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyMechanism {
	/// The modern clipboard API accepted the payload.
	Primary,
	/// The transient-field selection technique accepted the payload.
	Legacy,
}

/// A single clipboard mechanism offered by the host.
pub trait ClipboardWriter
where
	Self: Send + Sync,
{
	/// Capability check evaluated before each write.
	fn is_available(&self) -> bool;

	/// Writes the text to the clipboard.
	fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Runtime strategy pair that prefers the primary writer and recovers via the legacy one.
///
/// Primary failures are logged and recovered, never surfaced; only a failure of both writers
/// propagates, and even then callers are expected to log rather than abort.
pub struct CopyStrategy {
	primary: Arc<dyn ClipboardWriter>,
	legacy: Arc<dyn ClipboardWriter>,
	reporter: StatusReporter,
}
impl CopyStrategy {
	/// Creates the pair with the host's two writers.
	pub fn new(
		primary: Arc<dyn ClipboardWriter>,
		legacy: Arc<dyn ClipboardWriter>,
		reporter: StatusReporter,
	) -> Self {
		Self { primary, legacy, reporter }
	}

	/// Copies the text, reporting which mechanism succeeded.
	pub fn copy(&self, text: &str) -> Result<CopyMechanism, ClipboardError> {
		if self.primary.is_available() {
			match self.primary.write(text) {
				Ok(()) => return Ok(CopyMechanism::Primary),
				Err(e) => self.reporter.log_debug(format!("Failed to copy: {e}")),
			}
		} else {
			self.reporter.log_debug("Primary clipboard API is unavailable; using fallback.");
		}

		match self.legacy.write(text) {
			Ok(()) => Ok(CopyMechanism::Legacy),
			Err(e) => {
				self.reporter.log_debug(format!("Fallback copy method failed: {e}"));

				Err(e)
			},
		}
	}
}
impl Debug for CopyStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("CopyStrategy(..)")
	}
}
