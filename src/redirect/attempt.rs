//! Candidate deep-link URI construction from a normalized authorization result.

// self
use crate::{
	_prelude::*,
	auth::AuthResult,
	redirect::{RelayTarget, RelayTargetError},
};

/// One candidate deep-link URI aimed at a registered custom scheme.
///
/// Attempts are built once per page load and consumed strictly in order; firing one is
/// best-effort and its success is not observable from the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectAttempt {
	/// Custom scheme this attempt targets.
	pub scheme: String,
	/// Fully assembled URI carrying the variant's parameter set, URL-encoded.
	pub uri: Url,
}
impl RedirectAttempt {
	/// Builds the ordered attempt list for the result: one URI per registered scheme.
	///
	/// [`AuthResult::Empty`] builds no attempts.
	pub fn build_list(result: &AuthResult, target: &RelayTarget) -> Result<Vec<Self>> {
		if result.is_empty() {
			return Ok(Vec::new());
		}

		target
			.schemes
			.iter()
			.map(|scheme| {
				let mut uri = base_uri(scheme, &target.callback_path)?;

				append_params(&mut uri, result)?;

				Ok(Self { scheme: scheme.clone(), uri })
			})
			.collect()
	}
}

/// Assembles the final desktop-handler URI wrapping the primary-scheme attempt, when the target
/// configures one (e.g. `xdg-open:rateme://spotify-callback?code=...`).
pub fn desktop_handler_uri(result: &AuthResult, target: &RelayTarget) -> Result<Option<Url>> {
	let Some(handler) = target.desktop_handler.as_deref() else {
		return Ok(None);
	};

	if result.is_empty() {
		return Ok(None);
	}

	let mut inner = base_uri(target.primary_scheme(), &target.callback_path)?;

	append_params(&mut inner, result)?;

	let uri = Url::parse(&format!("{handler}:{inner}")).map_err(|_| {
		Error::from(RelayTargetError::UnroutableScheme { scheme: handler.into() })
	})?;

	Ok(Some(uri))
}

/// Assembles the bare, parameter-less deep link used by the manual "return to app" control.
pub fn bare_return_uri(target: &RelayTarget) -> Result<Url> {
	base_uri(target.primary_scheme(), &target.callback_path)
}

fn base_uri(scheme: &str, callback_path: &str) -> Result<Url> {
	Url::parse(&format!("{scheme}://{callback_path}"))
		.map_err(|_| Error::from(RelayTargetError::UnroutableScheme { scheme: scheme.into() }))
}

fn append_params(uri: &mut Url, result: &AuthResult) -> Result<()> {
	let mut pairs = uri.query_pairs_mut();

	match result {
		AuthResult::Code(grant) => {
			pairs.append_pair("code", grant.code.expose());

			if let Some(state) = grant.state.as_deref() {
				pairs.append_pair("state", state);
			}
		},
		AuthResult::Token(grant) => {
			drop(pairs);

			let stamp = grant.expiry_rfc3339()?;
			let mut pairs = uri.query_pairs_mut();

			pairs.append_pair("access_token", grant.access_token.expose());
			pairs.append_pair("expires_in", &grant.expires_in.whole_seconds().to_string());
			pairs.append_pair("expiry_time", &stamp);

			if let Some(state) = grant.state.as_deref() {
				pairs.append_pair("state", state);
			}

			return Ok(());
		},
		AuthResult::Error { reason } => {
			pairs.append_pair("error", reason);
		},
		AuthResult::Empty => {},
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::{CodeGrant, CredentialSecret, TokenGrant};

	fn target() -> RelayTarget {
		RelayTarget::builder()
			.scheme("rateme")
			.scheme("com.ali3nated0.rateme")
			.scheme("com.rateme.app")
			.callback_path("spotify-callback")
			.build()
			.expect("Attempt test target should build successfully.")
	}

	#[test]
	fn code_attempts_use_every_scheme_in_order() {
		let result = AuthResult::Code(CodeGrant {
			code: CredentialSecret::new("abc123"),
			state: Some("xyz".into()),
		});
		let attempts = RedirectAttempt::build_list(&result, &target())
			.expect("Code attempts should build successfully.");

		assert_eq!(attempts.len(), 3);
		assert_eq!(attempts[0].scheme, "rateme");
		assert_eq!(attempts[0].uri.as_str(), "rateme://spotify-callback?code=abc123&state=xyz");
		assert_eq!(
			attempts[1].uri.as_str(),
			"com.ali3nated0.rateme://spotify-callback?code=abc123&state=xyz"
		);
		assert_eq!(
			attempts[2].uri.as_str(),
			"com.rateme.app://spotify-callback?code=abc123&state=xyz"
		);
	}

	#[test]
	fn credential_values_are_url_encoded() {
		let result = AuthResult::Code(CodeGrant {
			code: CredentialSecret::new("a/b&c=d"),
			state: None,
		});
		let attempts = RedirectAttempt::build_list(&result, &target())
			.expect("Encoded attempts should build successfully.");
		let query = attempts[0].uri.query().expect("Attempt URI should carry a query.");

		assert!(!query.contains("a/b&c=d"));
		assert_eq!(attempts[0].uri.query_pairs().next(), Some(("code".into(), "a/b&c=d".into())));
	}

	#[test]
	fn token_attempts_carry_lifetime_and_expiry_stamp() {
		let grant = TokenGrant::new(
			"tok",
			Duration::seconds(7200),
			Some("s1".into()),
			macros::datetime!(2025-01-01 00:00 UTC),
		);
		let attempts = RedirectAttempt::build_list(&AuthResult::Token(grant), &target())
			.expect("Token attempts should build successfully.");

		assert_eq!(
			attempts[0].uri.as_str(),
			"rateme://spotify-callback?access_token=tok&expires_in=7200&expiry_time=2025-01-01T02%3A00%3A00Z&state=s1"
		);
	}

	#[test]
	fn error_attempts_carry_only_the_reason() {
		let attempts =
			RedirectAttempt::build_list(&AuthResult::Error { reason: "access_denied".into() }, &target())
				.expect("Error attempts should build successfully.");

		assert_eq!(attempts[0].uri.as_str(), "rateme://spotify-callback?error=access_denied");
	}

	#[test]
	fn empty_results_build_no_attempts() {
		let attempts = RedirectAttempt::build_list(&AuthResult::Empty, &target())
			.expect("Empty attempt list should build successfully.");

		assert!(attempts.is_empty());
		assert_eq!(
			desktop_handler_uri(&AuthResult::Empty, &target())
				.expect("Empty handler URI should build successfully."),
			None
		);
	}

	#[test]
	fn desktop_handler_wraps_the_primary_attempt() {
		let result = AuthResult::Error { reason: "denied".into() };
		let uri = desktop_handler_uri(&result, &target())
			.expect("Handler URI should build successfully.")
			.expect("Default target should configure a desktop handler.");

		assert_eq!(uri.as_str(), "xdg-open:rateme://spotify-callback?error=denied");
	}

	#[test]
	fn bare_return_uri_carries_no_parameters() {
		let uri = bare_return_uri(&target()).expect("Bare return URI should build successfully.");

		assert_eq!(uri.as_str(), "rateme://spotify-callback");
		assert_eq!(uri.query(), None);
	}
}
