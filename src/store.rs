//! Page-scoped durable key-value storage used as a diagnostic/manual-recovery aid.
//!
//! The relay only ever writes here (token value + expiry stamp); nothing reads the values back.
//! Hosts map the contract onto whatever page-scoped storage they have: browser local storage, a
//! webview preference bag, or a JSON file on disk.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Well-known keys written by the extractor.
pub mod keys {
	/// Raw access-token value persisted after an implicit-flow extraction.
	pub const ACCESS_TOKEN: &str = "access_token";
	/// RFC 3339 expiry stamp persisted alongside [`ACCESS_TOKEN`].
	pub const TOKEN_EXPIRY: &str = "token_expiry";
}

/// Storage backend contract implemented by diagnostic stores.
pub trait DiagnosticStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the value under the key.
	fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

	/// Fetches the value stored under the key, if present.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Error type produced by [`DiagnosticStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_messages_carry_payload() {
		let error = StoreError::Backend { message: "disk full".into() };

		assert_eq!(error.to_string(), "Backend failure: disk full.");
	}
}
