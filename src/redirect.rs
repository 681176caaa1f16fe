//! Deep-link redirect cascade: target descriptor, attempt construction, and the sequencer.

pub mod attempt;
pub mod sequencer;

pub use attempt::RedirectAttempt;
pub use sequencer::{Sequencer, SequencerState};

// self
use crate::_prelude::*;

/// Errors raised while constructing or validating relay targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RelayTargetError {
	/// At least one custom scheme must be registered.
	#[error("Target must declare at least one custom scheme.")]
	NoSchemes,
	/// Scheme must match `ALPHA *( ALPHA / DIGIT / \"+\" / \"-\" / \".\" )`.
	#[error("The `{scheme}` scheme is not a valid URI scheme.")]
	InvalidScheme {
		/// Offending scheme string.
		scheme: String,
	},
	/// Callback path is required.
	#[error("Missing callback path.")]
	MissingCallbackPath,
	/// Callback path must be a single URI authority-ish token.
	#[error("The `{path}` callback path contains separator characters.")]
	InvalidCallbackPath {
		/// Offending path string.
		path: String,
	},
	/// A deep-link URI could not be assembled for a scheme.
	#[error("Failed to assemble a deep-link URI for the `{scheme}` scheme.")]
	UnroutableScheme {
		/// Offending scheme string.
		scheme: String,
	},
}

/// Descriptor for the native application's deep-link surface.
///
/// Platforms register custom schemes inconsistently, so the target carries every equivalent
/// scheme the app registers (primary first) and the sequencer walks them in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTarget {
	/// Registered custom schemes, primary first. Never empty.
	pub schemes: Vec<String>,
	/// Callback route the native app listens on (e.g. `spotify-callback`).
	pub callback_path: String,
	/// Generic desktop handler scheme tried after every custom scheme (e.g. `xdg-open`), for
	/// desktop environments without native scheme registration.
	pub desktop_handler: Option<String>,
}
impl RelayTarget {
	/// Returns a builder with the default desktop handler enabled.
	pub fn builder() -> RelayTargetBuilder {
		RelayTargetBuilder::new()
	}

	/// Returns the primary (first) scheme.
	pub fn primary_scheme(&self) -> &str {
		self.schemes.first().map(String::as_str).unwrap_or_default()
	}

	fn validate(&self) -> Result<(), RelayTargetError> {
		if self.schemes.is_empty() {
			return Err(RelayTargetError::NoSchemes);
		}

		for scheme in self.schemes.iter().chain(self.desktop_handler.as_ref()) {
			validate_scheme(scheme)?;
		}

		if self.callback_path.is_empty() {
			return Err(RelayTargetError::MissingCallbackPath);
		}
		if self.callback_path.chars().any(|c| "/?#".contains(c) || c.is_whitespace()) {
			return Err(RelayTargetError::InvalidCallbackPath { path: self.callback_path.clone() });
		}

		Ok(())
	}
}

/// Builder for [`RelayTarget`] values.
#[derive(Clone, Debug)]
pub struct RelayTargetBuilder {
	schemes: Vec<String>,
	callback_path: Option<String>,
	desktop_handler: Option<String>,
}
impl RelayTargetBuilder {
	/// Desktop handler used unless overridden: the XDG default-application opener.
	pub const DEFAULT_DESKTOP_HANDLER: &'static str = "xdg-open";

	fn new() -> Self {
		Self {
			schemes: Vec::new(),
			callback_path: None,
			desktop_handler: Some(Self::DEFAULT_DESKTOP_HANDLER.into()),
		}
	}

	/// Appends a custom scheme; the first one registered becomes the primary.
	pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
		self.schemes.push(scheme.into());

		self
	}

	/// Sets the callback route shared by every scheme.
	pub fn callback_path(mut self, path: impl Into<String>) -> Self {
		self.callback_path = Some(path.into());

		self
	}

	/// Overrides the desktop handler scheme.
	pub fn desktop_handler(mut self, handler: impl Into<String>) -> Self {
		self.desktop_handler = Some(handler.into());

		self
	}

	/// Disables the final desktop-handler attempt.
	pub fn without_desktop_handler(mut self) -> Self {
		self.desktop_handler = None;

		self
	}

	/// Consumes the builder and validates the resulting target.
	pub fn build(self) -> Result<RelayTarget, RelayTargetError> {
		let target = RelayTarget {
			schemes: self.schemes,
			callback_path: self.callback_path.ok_or(RelayTargetError::MissingCallbackPath)?,
			desktop_handler: self.desktop_handler,
		};

		target.validate()?;

		Ok(target)
	}
}

/// Delays coordinating the cascade and the copy-confirmation revert.
///
/// Defaults mirror the timings the redirect technique was tuned with: a short window before the
/// first direct navigation, a longer pause between scheme attempts, a grace period after the
/// desktop handler, and a two-second copy confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayTiming {
	/// Delay before the first attempt also navigates the page directly.
	pub navigation_delay: Duration,
	/// Pause between consecutive scheme attempts.
	pub attempt_delay: Duration,
	/// Grace period after the desktop-handler attempt before declaring exhaustion.
	pub handler_delay: Duration,
	/// How long the copy control shows its confirmation label.
	pub copy_revert_delay: Duration,
}
impl RelayTiming {
	/// Overrides the direct-navigation delay (negative values clamp to zero).
	pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
		self.navigation_delay = delay.max(Duration::ZERO);

		self
	}

	/// Overrides the inter-attempt delay (negative values clamp to zero).
	pub fn with_attempt_delay(mut self, delay: Duration) -> Self {
		self.attempt_delay = delay.max(Duration::ZERO);

		self
	}

	/// Overrides the desktop-handler grace delay (negative values clamp to zero).
	pub fn with_handler_delay(mut self, delay: Duration) -> Self {
		self.handler_delay = delay.max(Duration::ZERO);

		self
	}

	/// Overrides the copy-confirmation revert delay (negative values clamp to zero).
	pub fn with_copy_revert_delay(mut self, delay: Duration) -> Self {
		self.copy_revert_delay = delay.max(Duration::ZERO);

		self
	}
}
impl Default for RelayTiming {
	fn default() -> Self {
		Self {
			navigation_delay: Duration::milliseconds(200),
			attempt_delay: Duration::milliseconds(800),
			handler_delay: Duration::milliseconds(1000),
			copy_revert_delay: Duration::seconds(2),
		}
	}
}

fn validate_scheme(scheme: &str) -> Result<(), RelayTargetError> {
	let mut chars = scheme.chars();
	let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
		&& chars.all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c));

	if valid { Ok(()) } else { Err(RelayTargetError::InvalidScheme { scheme: scheme.into() }) }
}
