//! The redirect cascade state machine.
//!
//! The cascade is an explicit `Pending(i) -> Done` machine driven purely by scheduled timers:
//! every attempt fires an invisible probe, the very first attempt additionally schedules a direct
//! navigation of the page (platforms disagree about which mechanism wakes a deep-link handler),
//! and after the last scheme a generic desktop-handler URI gets one final shot. Losing page
//! visibility is the only observable success signal; once the page hides, the machine finishes
//! silently and any timer still in flight fires harmlessly.

// self
use crate::{
	_prelude::*,
	auth::AuthResult,
	obs::{self, StageKind, StageOutcome},
	page::RedirectPort,
	redirect::{
		RelayTarget, RelayTiming,
		attempt::{self, RedirectAttempt},
	},
	sched::{Scheduler, Task},
	status::StatusReporter,
};

/// Observable sequencer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
	/// Attempt at the given index is in flight; the next transition is timer-driven.
	Pending(usize),
	/// The cascade finished, either silently (page hidden) or by exhaustion.
	Done,
}

/// Drives the ordered redirect attempts for one authorization result.
///
/// Attempts are strictly monotonic: none is ever retried, and exactly one exhaustion callback
/// fires if the machine reaches [`SequencerState::Done`] with the page still visible. Callers
/// must tolerate the full `(attempts × attempt delay) + handler grace` wall-clock budget before
/// the callback runs.
pub struct Sequencer {
	attempts: Vec<RedirectAttempt>,
	handler: Option<Url>,
	timing: RelayTiming,
	port: Arc<dyn RedirectPort>,
	scheduler: Arc<dyn Scheduler>,
	reporter: StatusReporter,
	state: Mutex<SequencerState>,
	on_exhausted: Mutex<Option<Task>>,
}
impl Sequencer {
	/// Builds the cascade for the result; [`AuthResult::Empty`] yields an empty attempt list.
	pub fn new(
		result: &AuthResult,
		target: &RelayTarget,
		timing: RelayTiming,
		port: Arc<dyn RedirectPort>,
		scheduler: Arc<dyn Scheduler>,
		reporter: StatusReporter,
	) -> Result<Arc<Self>> {
		let attempts = RedirectAttempt::build_list(result, target)?;
		let handler = attempt::desktop_handler_uri(result, target)?;

		Ok(Arc::new(Self {
			attempts,
			handler,
			timing,
			port,
			scheduler,
			reporter,
			state: Mutex::new(SequencerState::Done),
			on_exhausted: Mutex::new(None),
		}))
	}

	/// Attempts built for this cascade, in firing order.
	pub fn attempts(&self) -> &[RedirectAttempt] {
		&self.attempts
	}

	/// Current machine state.
	pub fn state(&self) -> SequencerState {
		*self.state.lock()
	}

	/// Starts the cascade; `on_exhausted` fires at most once, and immediately when there is
	/// nothing to attempt.
	pub fn start(self: &Arc<Self>, on_exhausted: impl FnOnce() + Send + 'static) {
		*self.on_exhausted.lock() = Some(Box::new(on_exhausted));

		if self.attempts.is_empty() {
			self.reporter.log_debug("Nothing to redirect; falling through immediately.");
			self.exhaust();

			return;
		}

		*self.state.lock() = SequencerState::Pending(0);

		self.fire(0);
		self.schedule_advance(0);
	}

	fn fire(self: &Arc<Self>, index: usize) {
		let Some(attempt) = self.attempts.get(index) else {
			return;
		};

		self.reporter.log_debug(format!(
			"Redirect attempt {}/{} via the `{}` scheme.",
			index + 1,
			self.attempts.len(),
			attempt.scheme,
		));
		obs::record_stage_outcome(StageKind::Redirect, StageOutcome::Attempt);
		self.port.probe(&attempt.uri);

		// Direct navigation is only worth racing on the first attempt; later schemes rely on the
		// probe alone so a half-working first scheme cannot strand the page mid-cascade.
		if index == 0 {
			let sequencer = self.clone();
			let uri = attempt.uri.clone();

			self.scheduler.schedule(
				self.timing.navigation_delay,
				Box::new(move || {
					if !sequencer.port.visibility().is_hidden() {
						sequencer.port.navigate(&uri);
					}
				}),
			);
		}
	}

	fn schedule_advance(self: &Arc<Self>, index: usize) {
		let sequencer = self.clone();

		self.scheduler
			.schedule(self.timing.attempt_delay, Box::new(move || sequencer.advance(index)));
	}

	fn advance(self: &Arc<Self>, index: usize) {
		{
			let mut state = self.state.lock();

			if matches!(*state, SequencerState::Done) {
				return;
			}
			if self.port.visibility().is_hidden() {
				*state = SequencerState::Done;
				drop(state);
				self.finish_hidden();

				return;
			}

			let next = index + 1;

			if next < self.attempts.len() {
				*state = SequencerState::Pending(next);
				drop(state);
				self.fire(next);
				self.schedule_advance(next);

				return;
			}
		}

		self.fire_desktop_handler();
	}

	fn fire_desktop_handler(self: &Arc<Self>) {
		match self.handler.as_ref() {
			Some(handler) => {
				self.reporter
					.log_debug("Trying the desktop default-handler URI as the final attempt.");
				obs::record_stage_outcome(StageKind::Redirect, StageOutcome::Attempt);
				self.port.navigate(handler);

				let sequencer = self.clone();

				self.scheduler
					.schedule(self.timing.handler_delay, Box::new(move || sequencer.settle()));
			},
			None => self.settle(),
		}
	}

	fn settle(&self) {
		{
			let mut state = self.state.lock();

			if matches!(*state, SequencerState::Done) {
				return;
			}

			*state = SequencerState::Done;
		}

		if self.port.visibility().is_hidden() {
			self.finish_hidden();
		} else {
			self.reporter
				.log_debug("All automatic redirect attempts failed; showing manual instructions.");
			obs::record_stage_outcome(StageKind::Redirect, StageOutcome::Failure);
			self.exhaust();
		}
	}

	fn finish_hidden(&self) {
		self.reporter.log_debug("Page lost visibility; assuming the app handled the deep link.");
		obs::record_stage_outcome(StageKind::Redirect, StageOutcome::Success);
	}

	fn exhaust(&self) {
		*self.state.lock() = SequencerState::Done;

		let callback = self.on_exhausted.lock().take();

		if let Some(callback) = callback {
			callback();
		}
	}
}
impl Debug for Sequencer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Sequencer")
			.field("attempts", &self.attempts.len())
			.field("handler", &self.handler.is_some())
			.field("state", &*self.state.lock())
			.finish()
	}
}
