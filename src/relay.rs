//! High-level relay facade wiring extraction, the redirect cascade, and the manual fallback.

// self
use crate::{
	_prelude::*,
	auth::AuthResult,
	extract::Extractor,
	fallback::{CopyStrategy, FallbackPresenter, clipboard::ClipboardWriter},
	obs::{StageKind, StageSpan},
	page::{RedirectPort, Surface},
	redirect::{RelayTarget, RelayTiming, Sequencer, SequencerState, attempt},
	sched::{Clock, Scheduler, SystemClock, TimerQueue},
	status::StatusReporter,
	store::{DiagnosticStore, MemoryStore},
};

/// Errors raised while assembling a [`Relay`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum RelayBuildError {
	/// A redirect port is required.
	#[error("Missing redirect port.")]
	MissingPort,
	/// A surface is required.
	#[error("Missing surface.")]
	MissingSurface,
	/// A primary clipboard writer is required.
	#[error("Missing primary clipboard writer.")]
	MissingPrimaryClipboard,
	/// A legacy clipboard writer is required.
	#[error("Missing legacy clipboard writer.")]
	MissingLegacyClipboard,
}

/// Coordinates the whole callback page lifecycle for one relay target.
///
/// The relay owns the extractor, the presenter, and every host seam so one
/// [`Relay::handle_page_load`] call can drive the original page's control flow: extract once,
/// cascade redirects, and land on the manual fallback only when every automated path failed.
pub struct Relay {
	target: RelayTarget,
	timing: RelayTiming,
	extractor: Extractor,
	presenter: Arc<FallbackPresenter>,
	port: Arc<dyn RedirectPort>,
	scheduler: Arc<dyn Scheduler>,
	reporter: StatusReporter,
	sequencer: Mutex<Option<Arc<Sequencer>>>,
}
impl Relay {
	/// Returns a builder for the provided target.
	pub fn builder(target: RelayTarget) -> RelayBuilder {
		RelayBuilder::new(target)
	}

	/// Processes the page location exactly once per load.
	///
	/// Extracts the authorization response, updates the status line, and starts the redirect
	/// cascade with exhaustion wired to the fallback presenter. [`AuthResult::Empty`] builds no
	/// attempts and presents nothing; the returned result lets hosts inspect what was found.
	pub fn handle_page_load(&self, search: &str, hash: &str) -> AuthResult {
		let result = self.extractor.extract(search, hash);

		match &result {
			AuthResult::Empty => {
				self.reporter.set_status("No authentication data found. Please try again.");

				return result;
			},
			AuthResult::Error { reason } => {
				self.reporter
					.set_status(format!("Authentication error: {reason}. Please try again."));
			},
			AuthResult::Code(_) | AuthResult::Token(_) => {
				self.reporter
					.set_status("Authentication successful! Redirecting back to app...");
			},
		}

		let _guard = StageSpan::new(StageKind::Redirect, result.kind()).entered();

		match Sequencer::new(
			&result,
			&self.target,
			self.timing,
			self.port.clone(),
			self.scheduler.clone(),
			self.reporter.clone(),
		) {
			Ok(sequencer) => {
				let presenter = self.presenter.clone();
				let presented = result.clone();

				sequencer.start(move || presenter.present(&presented));
				*self.sequencer.lock() = Some(sequencer);
			},
			Err(e) => {
				// Attempt construction failing leaves manual transfer as the only path.
				self.reporter.log_debug(format!("Failed to build redirect attempts: {e}"));
				self.presenter.present(&result);
			},
		}

		result
	}

	/// Services a click on the fallback copy control.
	pub fn copy_credential(&self) {
		self.presenter.copy_credential();
	}

	/// Services a click on the fallback "return to app" control.
	pub fn return_to_app(&self) {
		self.presenter.return_to_app();
	}

	/// Flips the diagnostic-log visibility, returning the new value.
	pub fn toggle_log(&self) -> bool {
		self.reporter.toggle_log()
	}

	/// Reporter shared across every relay component.
	pub fn reporter(&self) -> &StatusReporter {
		&self.reporter
	}

	/// State of the cascade started by the last page load, if any.
	pub fn sequencer_state(&self) -> Option<SequencerState> {
		self.sequencer.lock().as_ref().map(|sequencer| sequencer.state())
	}
}
impl Debug for Relay {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("target", &self.target)
			.field("timing", &self.timing)
			.finish()
	}
}

/// Builder for [`Relay`] values.
///
/// Clock, scheduler, store, reporter, and timing have working defaults; the redirect port, the
/// surface, and both clipboard writers are host-specific and required.
pub struct RelayBuilder {
	target: RelayTarget,
	timing: RelayTiming,
	clock: Arc<dyn Clock>,
	scheduler: Arc<dyn Scheduler>,
	store: Arc<dyn DiagnosticStore>,
	reporter: StatusReporter,
	port: Option<Arc<dyn RedirectPort>>,
	surface: Option<Arc<dyn Surface>>,
	primary_clipboard: Option<Arc<dyn ClipboardWriter>>,
	legacy_clipboard: Option<Arc<dyn ClipboardWriter>>,
}
impl RelayBuilder {
	/// Creates a builder seeded with the provided target and default seams.
	pub fn new(target: RelayTarget) -> Self {
		Self {
			target,
			timing: RelayTiming::default(),
			clock: Arc::new(SystemClock),
			scheduler: Arc::new(TimerQueue::new()),
			store: Arc::new(MemoryStore::default()),
			reporter: StatusReporter::new(),
			port: None,
			surface: None,
			primary_clipboard: None,
			legacy_clipboard: None,
		}
	}

	/// Overrides the cascade/copy timing.
	pub fn timing(mut self, timing: RelayTiming) -> Self {
		self.timing = timing;

		self
	}

	/// Overrides the clock used for expiry math.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Overrides the scheduler driving every delay.
	pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
		self.scheduler = scheduler;

		self
	}

	/// Overrides the diagnostic store.
	pub fn store(mut self, store: Arc<dyn DiagnosticStore>) -> Self {
		self.store = store;

		self
	}

	/// Shares an existing reporter with the relay.
	pub fn reporter(mut self, reporter: StatusReporter) -> Self {
		self.reporter = reporter;

		self
	}

	/// Sets the host redirect port.
	pub fn port(mut self, port: Arc<dyn RedirectPort>) -> Self {
		self.port = Some(port);

		self
	}

	/// Sets the host surface.
	pub fn surface(mut self, surface: Arc<dyn Surface>) -> Self {
		self.surface = Some(surface);

		self
	}

	/// Sets the primary clipboard writer.
	pub fn primary_clipboard(mut self, writer: Arc<dyn ClipboardWriter>) -> Self {
		self.primary_clipboard = Some(writer);

		self
	}

	/// Sets the legacy clipboard writer.
	pub fn legacy_clipboard(mut self, writer: Arc<dyn ClipboardWriter>) -> Self {
		self.legacy_clipboard = Some(writer);

		self
	}

	/// Consumes the builder and assembles the relay.
	pub fn build(self) -> Result<Relay> {
		let port = self.port.ok_or(RelayBuildError::MissingPort)?;
		let surface = self.surface.ok_or(RelayBuildError::MissingSurface)?;
		let primary = self.primary_clipboard.ok_or(RelayBuildError::MissingPrimaryClipboard)?;
		let legacy = self.legacy_clipboard.ok_or(RelayBuildError::MissingLegacyClipboard)?;
		let return_uri = attempt::bare_return_uri(&self.target)?;
		let extractor = Extractor::new(self.clock, self.store, self.reporter.clone());
		let copy = CopyStrategy::new(primary, legacy, self.reporter.clone());
		let presenter = Arc::new(FallbackPresenter::new(
			surface,
			port.clone(),
			copy,
			self.scheduler.clone(),
			self.reporter.clone(),
			return_uri,
			self.timing.copy_revert_delay,
		));

		Ok(Relay {
			target: self.target,
			timing: self.timing,
			extractor,
			presenter,
			port,
			scheduler: self.scheduler,
			reporter: self.reporter,
			sequencer: Mutex::new(None),
		})
	}
}
impl Debug for RelayBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RelayBuilder")
			.field("target", &self.target)
			.field("timing", &self.timing)
			.field("port_set", &self.port.is_some())
			.field("surface_set", &self.surface.is_some())
			.finish()
	}
}
