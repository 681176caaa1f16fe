//! Human-readable progress reporting: one status line plus an optional diagnostic log.

// self
use crate::_prelude::*;

#[derive(Debug, Default)]
struct StatusState {
	status: String,
	log: Vec<String>,
	log_visible: bool,
}

/// Cloneable handle over the page's status line and diagnostic log.
///
/// The status line is last-write-wins; the log is append-only and starts hidden. Nothing in the
/// relay is gated on log visibility; it is purely observational. When the `tracing` feature is
/// enabled every debug line is also forwarded to the console sink.
#[derive(Clone, Debug, Default)]
pub struct StatusReporter {
	inner: Arc<Mutex<StatusState>>,
}
impl StatusReporter {
	/// Creates a reporter with an empty status line and a hidden log.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the visible status line.
	pub fn set_status(&self, message: impl Into<String>) {
		self.inner.lock().status = message.into();
	}

	/// Returns the current status line.
	pub fn status(&self) -> String {
		self.inner.lock().status.clone()
	}

	/// Appends a line to the diagnostic log and forwards it to the console sink.
	pub fn log_debug(&self, message: impl Into<String>) {
		let message = message.into();

		#[cfg(feature = "tracing")]
		tracing::debug!(target: "oauth2_relay", "{message}");

		self.inner.lock().log.push(message);
	}

	/// Returns a snapshot of the diagnostic log.
	pub fn log_lines(&self) -> Vec<String> {
		self.inner.lock().log.clone()
	}

	/// Flips the log visibility flag, returning the new value.
	pub fn toggle_log(&self) -> bool {
		let mut guard = self.inner.lock();

		guard.log_visible = !guard.log_visible;

		guard.log_visible
	}

	/// Returns whether the diagnostic log is currently shown.
	pub fn is_log_visible(&self) -> bool {
		self.inner.lock().log_visible
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_line_is_last_write_wins() {
		let reporter = StatusReporter::new();

		reporter.set_status("first");
		reporter.set_status("second");

		assert_eq!(reporter.status(), "second");
	}

	#[test]
	fn log_appends_and_visibility_toggles() {
		let reporter = StatusReporter::new();

		reporter.log_debug("one");
		reporter.log_debug("two");

		assert_eq!(reporter.log_lines(), ["one", "two"]);
		assert!(!reporter.is_log_visible());
		assert!(reporter.toggle_log());
		assert!(!reporter.toggle_log());
	}

	#[test]
	fn clones_share_state() {
		let reporter = StatusReporter::new();
		let clone = reporter.clone();

		clone.set_status("shared");
		clone.log_debug("line");

		assert_eq!(reporter.status(), "shared");
		assert_eq!(reporter.log_lines(), ["line"]);
	}
}
