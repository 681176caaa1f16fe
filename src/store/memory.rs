//! Thread-safe in-memory [`DiagnosticStore`] implementation for hosts without durable storage
//! and for tests.

// std
use std::collections::HashMap;
// self
use crate::{
	_prelude::*,
	store::{DiagnosticStore, StoreError},
};

/// Keeps diagnostic values in-process; contents vanish with the page.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<String, String>>>);
impl DiagnosticStore for MemoryStore {
	fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key.to_owned(), value.to_owned());

		Ok(())
	}

	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(key).cloned())
	}
}
