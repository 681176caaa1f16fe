//! Normalized authorization outcomes extracted from the callback page location.

// self
use crate::_prelude::*;

/// Default lifetime applied when the server omits `expires_in` or sends an unparsable value.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::seconds(3600);

/// Redacted credential wrapper keeping codes and tokens out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret(String);
impl CredentialSecret {
	/// Wraps a new credential string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for CredentialSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CredentialSecret").field(&"<redacted>").finish()
	}
}
impl Display for CredentialSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Authorization-code grant returned via the callback query string.
///
/// The code is server-ephemeral; this relay never tracks its lifetime, it only warns the user
/// that the value is short-lived when manual transfer is needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeGrant {
	/// Authorization code to exchange inside the native app.
	pub code: CredentialSecret,
	/// Opaque state echoed by the authorization server, when present.
	pub state: Option<String>,
}

/// Implicit-flow access token returned via the callback fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
	/// Bearer access token.
	pub access_token: CredentialSecret,
	/// Advertised token lifetime.
	pub expires_in: Duration,
	/// Opaque state echoed by the authorization server, when present.
	pub state: Option<String>,
	/// Absolute expiry instant, computed once at extraction time and immutable afterwards.
	pub expires_at: OffsetDateTime,
}
impl TokenGrant {
	/// Builds a grant whose expiry instant is anchored to the provided extraction instant.
	pub fn new(
		access_token: impl Into<String>,
		expires_in: Duration,
		state: Option<String>,
		extracted_at: OffsetDateTime,
	) -> Self {
		Self {
			access_token: CredentialSecret::new(access_token),
			expires_in,
			state,
			expires_at: extracted_at + expires_in,
		}
	}

	/// Returns `true` once the provided instant has passed the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Renders the expiry instant as an RFC 3339 string.
	///
	/// The rendering is a pure function of `expires_at`, so repeated calls always produce the
	/// identical string.
	pub fn expiry_rfc3339(&self) -> Result<String> {
		Ok(self.expires_at.format(&time::format_description::well_known::Rfc3339)?)
	}
}

/// Normalized outcome of extracting the callback page location.
///
/// At most one variant is produced per page load; the first recognized signal wins and the value
/// is never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthResult {
	/// Authorization-code flow response.
	Code(CodeGrant),
	/// Implicit-flow response, retained for backward compatibility.
	Token(TokenGrant),
	/// Authorization server reported a failure.
	Error {
		/// Server-supplied error code or description.
		reason: String,
	},
	/// No recognizable parameters were present; terminal, nothing further to do.
	Empty,
}
impl AuthResult {
	/// Returns the response kind label for status lines, spans, and metrics.
	pub fn kind(&self) -> ResponseKind {
		match self {
			AuthResult::Code(_) => ResponseKind::Code,
			AuthResult::Token(_) => ResponseKind::Token,
			AuthResult::Error { .. } => ResponseKind::Error,
			AuthResult::Empty => ResponseKind::Empty,
		}
	}

	/// Returns `true` when no recognizable parameters were present.
	pub fn is_empty(&self) -> bool {
		matches!(self, AuthResult::Empty)
	}

	/// Returns the credential to hand over manually, when the variant carries one.
	pub fn credential(&self) -> Option<&CredentialSecret> {
		match self {
			AuthResult::Code(grant) => Some(&grant.code),
			AuthResult::Token(grant) => Some(&grant.access_token),
			AuthResult::Error { .. } | AuthResult::Empty => None,
		}
	}
}

/// Response kind labels observed across the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKind {
	/// Authorization-code flow.
	Code,
	/// Implicit (token) flow.
	Token,
	/// Server-reported failure.
	Error,
	/// Nothing recognizable in the location.
	Empty,
}
impl ResponseKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponseKind::Code => "code",
			ResponseKind::Token => "token",
			ResponseKind::Error => "error",
			ResponseKind::Empty => "empty",
		}
	}
}
impl Display for ResponseKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
