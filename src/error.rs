//! Relay-level error types shared across extraction, redirects, fallback, and storage.
//!
//! Nothing in this taxonomy is fatal to the hosting page: extraction failures degrade to
//! [`AuthResult::Empty`](crate::auth::AuthResult::Empty), clipboard failures fall back to the
//! legacy writer, and an exhausted redirect cascade lands on the manual-fallback UI.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Diagnostic-store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Callback parameters could not be parsed.
	#[error(transparent)]
	Extraction(#[from] crate::extract::ExtractionError),
	/// Both clipboard strategies rejected the credential.
	#[error(transparent)]
	Clipboard(#[from] crate::fallback::clipboard::ClipboardError),
	/// Relay target descriptor is invalid.
	#[error(transparent)]
	Target(#[from] crate::redirect::RelayTargetError),
	/// Relay assembly is missing a required host seam.
	#[error(transparent)]
	Build(#[from] crate::relay::RelayBuildError),
	/// Timestamp could not be rendered as RFC 3339.
	#[error("Failed to format a timestamp.")]
	TimeFormat(#[from] time::error::Format),
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_relay_error_with_source() {
		let store_error = StoreError::Backend { message: "storage unreachable".into() };
		let relay_error: Error = store_error.clone().into();

		assert!(matches!(relay_error, Error::Storage(_)));
		assert!(relay_error.to_string().contains("storage unreachable"));

		let source = StdError::source(&relay_error)
			.expect("Relay error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
