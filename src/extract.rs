//! Response extraction: parses the callback page location into an [`AuthResult`].
//!
//! Priority order matches the authorization server conventions the native app registered for:
//! query `code` first, then query `error`, then fragment `access_token`, else
//! [`AuthResult::Empty`]. Extraction never fails outward; malformed input degrades to `Empty` with
//! the reason forwarded to the status reporter.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AuthResult, CodeGrant, CredentialSecret, DEFAULT_EXPIRES_IN, TokenGrant},
	obs::{self, StageKind, StageOutcome},
	sched::Clock,
	status::StatusReporter,
	store::{DiagnosticStore, keys},
};

/// Upper bound accepted for `expires_in`; larger values are treated as unparsable.
const MAX_EXPIRES_IN: Duration = Duration::days(3650);

/// Malformed-parameter failures raised while parsing the location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ExtractionError {
	/// A parameter value decoded to garbage (invalid percent-encoding or control bytes).
	#[error("The `{name}` parameter is malformed.")]
	MalformedParameter {
		/// Offending parameter name.
		name: &'static str,
	},
}

/// Parses the page location into a normalized authorization result.
pub struct Extractor {
	clock: Arc<dyn Clock>,
	store: Arc<dyn DiagnosticStore>,
	reporter: StatusReporter,
}
impl Extractor {
	/// Creates an extractor anchored to the provided clock, store, and reporter.
	pub fn new(
		clock: Arc<dyn Clock>,
		store: Arc<dyn DiagnosticStore>,
		reporter: StatusReporter,
	) -> Self {
		Self { clock, store, reporter }
	}

	/// Extracts the authorization response from the location search and hash strings.
	///
	/// Runs once per page load. Any parsing failure is caught, logged, and degraded to
	/// [`AuthResult::Empty`].
	pub fn extract(&self, search: &str, hash: &str) -> AuthResult {
		match self.try_extract(search, hash) {
			Ok(result) => result,
			Err(e) => {
				self.reporter.log_debug(format!("Failed to parse callback parameters: {e}"));
				obs::record_stage_outcome(StageKind::Extract, StageOutcome::Failure);

				AuthResult::Empty
			},
		}
	}

	fn try_extract(&self, search: &str, hash: &str) -> Result<AuthResult, ExtractionError> {
		obs::record_stage_outcome(StageKind::Extract, StageOutcome::Attempt);

		let query = parse_pairs(strip_marker(search, '?'));

		if let Some(code) = pick(&query, "code") {
			validate_value("code", &code)?;
			self.reporter.log_debug("Found authorization code in query.");
			obs::record_stage_outcome(StageKind::Extract, StageOutcome::Success);

			return Ok(AuthResult::Code(CodeGrant {
				code: CredentialSecret::new(code),
				state: pick(&query, "state"),
			}));
		}
		if let Some(reason) = pick(&query, "error") {
			validate_value("error", &reason)?;
			self.reporter.log_debug(format!("Error from authorization server: {reason}"));
			obs::record_stage_outcome(StageKind::Extract, StageOutcome::Success);

			return Ok(AuthResult::Error { reason });
		}

		let fragment = parse_pairs(strip_marker(hash, '#'));

		if let Some(access_token) = pick(&fragment, "access_token") {
			validate_value("access_token", &access_token)?;

			let expires_in = parse_expires_in(pick(&fragment, "expires_in").as_deref());
			let grant =
				TokenGrant::new(access_token, expires_in, pick(&fragment, "state"), self.clock.now());

			self.reporter.log_debug("Found access token in fragment.");
			self.persist_token(&grant);
			obs::record_stage_outcome(StageKind::Extract, StageOutcome::Success);

			return Ok(AuthResult::Token(grant));
		}

		self.reporter.log_debug("No code, token, or error found in the location.");

		Ok(AuthResult::Empty)
	}

	// Diagnostic copy only; the native app never reads these keys back through this relay.
	fn persist_token(&self, grant: &TokenGrant) {
		let stamp = match grant.expiry_rfc3339() {
			Ok(stamp) => stamp,
			Err(e) => {
				self.reporter.log_debug(format!("Failed to render token expiry stamp: {e}"));

				return;
			},
		};
		let outcome = self
			.store
			.put(keys::ACCESS_TOKEN, grant.access_token.expose())
			.and_then(|()| self.store.put(keys::TOKEN_EXPIRY, &stamp));

		if let Err(e) = outcome {
			self.reporter.log_debug(format!("Failed to persist diagnostic token copy: {e}"));
		}
	}
}
impl Debug for Extractor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Extractor(..)")
	}
}

fn strip_marker(raw: &str, marker: char) -> &str {
	raw.strip_prefix(marker).unwrap_or(raw)
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
	form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

/// First occurrence wins; empty values are treated as absent, mirroring the original page's
/// truthiness checks.
fn pick(pairs: &[(String, String)], name: &str) -> Option<String> {
	pairs.iter().find(|(key, value)| key == name && !value.is_empty()).map(|(_, value)| value.clone())
}

fn validate_value(name: &'static str, value: &str) -> Result<(), ExtractionError> {
	if value.chars().any(|c| c.is_control() || c == '\u{FFFD}') {
		Err(ExtractionError::MalformedParameter { name })
	} else {
		Ok(())
	}
}

fn parse_expires_in(raw: Option<&str>) -> Duration {
	let parsed = raw.and_then(|value| value.trim().parse::<i64>().ok()).map(Duration::seconds);

	match parsed {
		Some(lifetime) if lifetime.is_positive() && lifetime <= MAX_EXPIRES_IN => lifetime,
		_ => DEFAULT_EXPIRES_IN,
	}
}
