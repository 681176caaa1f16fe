//! Manual-fallback presentation: the safety net for every failed redirect path.

pub mod clipboard;

pub use clipboard::{ClipboardWriter, CopyMechanism, CopyStrategy};

// self
use crate::{
	_prelude::*,
	auth::AuthResult,
	obs::{self, StageKind, StageOutcome},
	page::{RedirectPort, Surface},
	sched::Scheduler,
	status::StatusReporter,
};

/// Copy-control label for authorization codes.
pub const COPY_CODE_LABEL: &str = "Copy Code";
/// Copy-control label for access tokens.
pub const COPY_TOKEN_LABEL: &str = "Copy Token";
/// Transient confirmation label shown after a successful copy.
pub const COPIED_LABEL: &str = "Copied!";

const HEADING: &str = "Manual Authentication";
const RETURN_LABEL: &str = "Return to App";
const CODE_EXPIRY_NOTICE: &str =
	"Note: This code will expire in 10 minutes. Complete authentication in the app promptly.";

/// Flow-specific body of the manual-fallback view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FallbackBody {
	/// A credential to transfer by hand.
	Credential {
		/// Flow-specific instructions.
		instructions: String,
		/// Read-only credential text.
		credential: String,
		/// Label for the copy control.
		copy_label: String,
		/// Flow-specific expiry notice.
		expiry_notice: String,
	},
	/// Server-reported failure, rendered with an error style and no copy/expiry controls.
	Failure {
		/// Fixed failure instructions.
		instructions: String,
		/// Server-supplied reason.
		reason: String,
	},
	/// Nothing was extracted; nothing to transfer.
	Missing {
		/// Fixed no-data instructions.
		instructions: String,
	},
}

/// Complete content of the manual-fallback region.
///
/// Rendering a view replaces everything previously shown, so presenting twice can never
/// accumulate duplicate elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackView {
	/// Section heading.
	pub heading: String,
	/// Flow-specific body.
	pub body: FallbackBody,
	/// Label of the manual "return to app" control.
	pub return_label: String,
	/// Bare, parameter-less deep link the return control issues.
	pub return_uri: Url,
}
impl FallbackView {
	/// Composes the view for a result. Pure: the same result and return URI always compose the
	/// identical view, including the expiry string.
	pub fn compose(result: &AuthResult, return_uri: Url) -> Self {
		let body = match result {
			AuthResult::Code(grant) => FallbackBody::Credential {
				instructions: "Return to the app and enter this authorization code manually:"
					.into(),
				credential: grant.code.expose().into(),
				copy_label: COPY_CODE_LABEL.into(),
				expiry_notice: CODE_EXPIRY_NOTICE.into(),
			},
			AuthResult::Token(grant) => {
				let hours = (grant.expires_in.whole_seconds() + 1800) / 3600;
				let expiry_notice = match grant.expiry_rfc3339() {
					Ok(stamp) =>
						format!("Token expires in approximately {hours} hours ({stamp})."),
					Err(_) => format!("Token expires in approximately {hours} hours."),
				};

				FallbackBody::Credential {
					instructions: "Return to the app and enter this access token manually:".into(),
					credential: grant.access_token.expose().into(),
					copy_label: COPY_TOKEN_LABEL.into(),
					expiry_notice,
				}
			},
			AuthResult::Error { reason } => FallbackBody::Failure {
				instructions: "Authentication error. Please try again in the app.".into(),
				reason: reason.clone(),
			},
			AuthResult::Empty => FallbackBody::Missing {
				instructions: "No authentication data found. Please try again.".into(),
			},
		};

		Self { heading: HEADING.into(), body, return_label: RETURN_LABEL.into(), return_uri }
	}
}

#[derive(Clone, Debug)]
struct ActiveCopy {
	credential: String,
	label: &'static str,
}

/// Renders the manual-fallback UI and services its copy/return controls.
pub struct FallbackPresenter {
	surface: Arc<dyn Surface>,
	port: Arc<dyn RedirectPort>,
	copy: CopyStrategy,
	scheduler: Arc<dyn Scheduler>,
	reporter: StatusReporter,
	return_uri: Url,
	revert_delay: Duration,
	active: Mutex<Option<ActiveCopy>>,
}
impl FallbackPresenter {
	/// Wires the presenter to the host surface, redirect port, and clipboard pair.
	pub fn new(
		surface: Arc<dyn Surface>,
		port: Arc<dyn RedirectPort>,
		copy: CopyStrategy,
		scheduler: Arc<dyn Scheduler>,
		reporter: StatusReporter,
		return_uri: Url,
		revert_delay: Duration,
	) -> Self {
		Self {
			surface,
			port,
			copy,
			scheduler,
			reporter,
			return_uri,
			revert_delay,
			active: Mutex::new(None),
		}
	}

	/// Replaces the surface content with the manual instructions for the result.
	///
	/// Idempotent: presenting again fully replaces the prior content and copy context.
	pub fn present(&self, result: &AuthResult) {
		obs::record_stage_outcome(StageKind::Fallback, StageOutcome::Attempt);

		let view = FallbackView::compose(result, self.return_uri.clone());

		*self.active.lock() = match &view.body {
			FallbackBody::Credential { credential, .. } => {
				let label = match result {
					AuthResult::Code(_) => COPY_CODE_LABEL,
					_ => COPY_TOKEN_LABEL,
				};

				self.reporter.set_status(match result {
					AuthResult::Code(_) => "Please copy this code to the app",
					_ => "Please copy this token to the app",
				});

				Some(ActiveCopy { credential: credential.clone(), label })
			},
			FallbackBody::Failure { .. } | FallbackBody::Missing { .. } => None,
		};

		self.surface.render(&view);
	}

	/// Services a click on the copy control.
	///
	/// On success the label flips to [`COPIED_LABEL`] and reverts to its flow-specific label once
	/// the revert delay elapses. A failure of both clipboard writers is logged, never surfaced.
	pub fn copy_credential(&self) {
		let Some(active) = self.active.lock().clone() else {
			self.reporter.log_debug("No credential is available to copy.");

			return;
		};

		match self.copy.copy(&active.credential) {
			Ok(mechanism) => {
				if matches!(mechanism, CopyMechanism::Legacy) {
					self.reporter.log_debug("Credential copied via the fallback technique.");
				}

				obs::record_stage_outcome(StageKind::Fallback, StageOutcome::Success);
				self.surface.set_copy_label(COPIED_LABEL);

				let surface = self.surface.clone();
				let label = active.label;

				self.scheduler
					.schedule(self.revert_delay, Box::new(move || surface.set_copy_label(label)));
			},
			// Already logged by the strategy; the credential stays on screen for hand transfer.
			Err(_) => obs::record_stage_outcome(StageKind::Fallback, StageOutcome::Failure),
		}
	}

	/// Services a click on the manual "return to app" control.
	pub fn return_to_app(&self) {
		self.reporter.log_debug("Returning to the app via the bare deep link.");
		self.port.navigate(&self.return_uri);
	}
}
impl Debug for FallbackPresenter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FallbackPresenter")
			.field("return_uri", &self.return_uri)
			.field("revert_delay", &self.revert_delay)
			.finish()
	}
}
