//! Host-page seams for side effects the relay cannot perform itself.
//!
//! The relay never touches a DOM, a window location, or an OS clipboard directly. Hosts implement
//! these traits with whatever mechanism their embedding offers (hidden iframe, location change,
//! webview bridge) and the relay stays deterministic and testable.

// self
use crate::{_prelude::*, fallback::FallbackView};

/// Page visibility as reported by the host.
///
/// Losing visibility is the only observable signal that a deep link woke the native app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
	/// The page is still in the foreground.
	Visible,
	/// The page lost focus; the native app is assumed launched.
	Hidden,
}
impl Visibility {
	/// Returns `true` for [`Visibility::Hidden`].
	pub fn is_hidden(self) -> bool {
		matches!(self, Visibility::Hidden)
	}
}

/// Redirect mechanisms the host must provide.
///
/// Different browser/OS combinations honor different deep-link triggers, so the sequencer fires
/// both: an invisible probe for every attempt and a direct navigation for the first one.
pub trait RedirectPort
where
	Self: Send + Sync,
{
	/// Fires an invisible, non-navigating probe at the URI (e.g. a hidden iframe).
	fn probe(&self, uri: &Url);

	/// Navigates the current page to the URI.
	fn navigate(&self, uri: &Url);

	/// Reports whether the page is still visible.
	fn visibility(&self) -> Visibility;
}

/// Content region the fallback presenter renders into.
///
/// `render` replaces the whole region, which is what makes repeated presentation idempotent.
pub trait Surface
where
	Self: Send + Sync,
{
	/// Replaces the region content with the provided view.
	fn render(&self, view: &FallbackView);

	/// Updates the copy-control label in place.
	fn set_copy_label(&self, label: &str);
}
