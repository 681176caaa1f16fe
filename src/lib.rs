//! OAuth 2.0 callback relay. Catches authorization redirects on a host page and hands codes or
//! tokens to a native app through a deep-link cascade with a manual-copy fallback.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod obs;
pub mod page;
pub mod redirect;
pub mod relay;
pub mod sched;
pub mod status;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Recording test doubles and helpers for deterministic relay tests; enabled via `cfg(test)`
	//! or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		fallback::{
			FallbackView,
			clipboard::{ClipboardError, ClipboardWriter},
		},
		page::{RedirectPort, Surface, Visibility},
		redirect::RelayTarget,
		relay::{Relay, RelayBuilder},
		sched::{ManualClock, TimerQueue},
		status::StatusReporter,
		store::MemoryStore,
	};

	/// Events observed by [`RecordingPort`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum PortEvent {
		/// An invisible probe was fired at the URI.
		Probe(String),
		/// The page navigated to the URI.
		Navigate(String),
	}

	/// Redirect port double that records every probe/navigation and plays back a scripted
	/// visibility value.
	#[derive(Debug, Default)]
	pub struct RecordingPort {
		events: Mutex<Vec<PortEvent>>,
		hidden: Mutex<bool>,
	}
	impl RecordingPort {
		/// Marks the page as hidden, as if the OS had foregrounded the native app.
		pub fn hide(&self) {
			*self.hidden.lock() = true;
		}

		/// Returns the recorded events in dispatch order.
		pub fn events(&self) -> Vec<PortEvent> {
			self.events.lock().clone()
		}
	}
	impl RedirectPort for RecordingPort {
		fn probe(&self, uri: &Url) {
			self.events.lock().push(PortEvent::Probe(uri.to_string()));
		}

		fn navigate(&self, uri: &Url) {
			self.events.lock().push(PortEvent::Navigate(uri.to_string()));
		}

		fn visibility(&self) -> Visibility {
			if *self.hidden.lock() { Visibility::Hidden } else { Visibility::Visible }
		}
	}

	/// Surface double that keeps every rendered view and the copy-label history.
	#[derive(Debug, Default)]
	pub struct RecordingSurface {
		views: Mutex<Vec<FallbackView>>,
		labels: Mutex<Vec<String>>,
	}
	impl RecordingSurface {
		/// Number of full renders performed so far.
		pub fn render_count(&self) -> usize {
			self.views.lock().len()
		}

		/// Returns the most recently rendered view, if any.
		pub fn last_view(&self) -> Option<FallbackView> {
			self.views.lock().last().cloned()
		}

		/// Returns every copy-label update in order.
		pub fn labels(&self) -> Vec<String> {
			self.labels.lock().clone()
		}
	}
	impl Surface for RecordingSurface {
		fn render(&self, view: &FallbackView) {
			self.views.lock().push(view.clone());
		}

		fn set_copy_label(&self, label: &str) {
			self.labels.lock().push(label.to_owned());
		}
	}

	/// Clipboard double with a scripted availability/outcome and a record of written payloads.
	#[derive(Debug)]
	pub struct ScriptedClipboard {
		available: bool,
		accept: bool,
		writes: Mutex<Vec<String>>,
	}
	impl ScriptedClipboard {
		/// A writer that is available and accepts every payload.
		pub fn accepting() -> Self {
			Self { available: true, accept: true, writes: Mutex::new(Vec::new()) }
		}

		/// A writer that is available but rejects every payload.
		pub fn rejecting() -> Self {
			Self { available: true, accept: false, writes: Mutex::new(Vec::new()) }
		}

		/// A writer whose capability check fails outright.
		pub fn unavailable() -> Self {
			Self { available: false, accept: false, writes: Mutex::new(Vec::new()) }
		}

		/// Payloads successfully written so far.
		pub fn writes(&self) -> Vec<String> {
			self.writes.lock().clone()
		}
	}
	impl ClipboardWriter for ScriptedClipboard {
		fn is_available(&self) -> bool {
			self.available
		}

		fn write(&self, text: &str) -> Result<(), ClipboardError> {
			if !self.available {
				return Err(ClipboardError::Unavailable);
			}
			if !self.accept {
				return Err(ClipboardError::Rejected { reason: "scripted rejection".into() });
			}

			self.writes.lock().push(text.to_owned());

			Ok(())
		}
	}

	/// Fully wired deterministic relay plus the doubles backing it.
	pub struct TestRelay {
		/// Relay under test.
		pub relay: Relay,
		/// Deterministic timer queue driving every delay.
		pub timers: Arc<TimerQueue>,
		/// Settable clock used for expiry math.
		pub clock: Arc<ManualClock>,
		/// Recording redirect port.
		pub port: Arc<RecordingPort>,
		/// Recording surface.
		pub surface: Arc<RecordingSurface>,
		/// Primary clipboard double.
		pub primary: Arc<ScriptedClipboard>,
		/// Legacy clipboard double.
		pub legacy: Arc<ScriptedClipboard>,
		/// Diagnostic store backing the relay.
		pub store: Arc<MemoryStore>,
		/// Reporter shared with the relay.
		pub reporter: StatusReporter,
	}

	/// Target mirroring the schemes the reference native app registers.
	pub fn test_target() -> RelayTarget {
		RelayTarget::builder()
			.scheme("rateme")
			.scheme("com.ali3nated0.rateme")
			.scheme("com.rateme.app")
			.callback_path("spotify-callback")
			.build()
			.expect("Test relay target should build successfully.")
	}

	/// Builds a relay wired entirely to recording doubles and a manual clock.
	pub fn build_test_relay() -> TestRelay {
		build_test_relay_with(Arc::new(ScriptedClipboard::accepting()))
	}

	/// Builds a relay with a caller-provided primary clipboard double.
	pub fn build_test_relay_with(primary: Arc<ScriptedClipboard>) -> TestRelay {
		let timers = Arc::new(TimerQueue::new());
		let clock = Arc::new(ManualClock::new(time::macros::datetime!(2025-01-01 00:00 UTC)));
		let port = Arc::new(RecordingPort::default());
		let surface = Arc::new(RecordingSurface::default());
		let legacy = Arc::new(ScriptedClipboard::accepting());
		let store = Arc::new(MemoryStore::default());
		let reporter = StatusReporter::new();
		let relay = RelayBuilder::new(test_target())
			.clock(clock.clone())
			.scheduler(timers.clone())
			.port(port.clone())
			.surface(surface.clone())
			.primary_clipboard(primary.clone())
			.legacy_clipboard(legacy.clone())
			.store(store.clone())
			.reporter(reporter.clone())
			.build()
			.expect("Test relay should build successfully.");

		TestRelay { relay, timers, clock, port, surface, primary, legacy, store, reporter }
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
