#![cfg(feature = "test")]

// self
use oauth2_relay::{
	_preludet::*,
	auth::AuthResult,
	fallback::FallbackBody,
	redirect::SequencerState,
	store::{DiagnosticStore, keys},
};

#[test]
fn happy_path_never_reaches_the_fallback() {
	let harness = build_test_relay();
	let result = harness.relay.handle_page_load("?code=abc123&state=xyz", "");

	assert!(matches!(result, AuthResult::Code(_)));
	assert_eq!(
		harness.reporter.status(),
		"Authentication successful! Redirecting back to app..."
	);

	// The app answers the second scheme; the page goes to the background mid-cascade.
	harness.timers.advance(Duration::milliseconds(900));
	harness.port.hide();
	harness.timers.run_until_idle();

	assert_eq!(harness.relay.sequencer_state(), Some(SequencerState::Done));
	assert_eq!(harness.surface.render_count(), 0);
	assert_eq!(harness.reporter.status(), "Authentication successful! Redirecting back to app...");
}

#[test]
fn stranded_page_walks_from_redirects_into_manual_transfer() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?code=abc123", "");
	harness.timers.run_until_idle();
	harness.relay.copy_credential();
	harness.timers.run_until_idle();
	harness.relay.return_to_app();

	// Cascade (5 events), then the manual return navigation.
	assert_eq!(harness.port.events().len(), 6);
	assert_eq!(harness.primary.writes(), ["abc123"]);
	assert_eq!(harness.reporter.status(), "Please copy this code to the app");
}

#[test]
fn token_load_persists_diagnostics_even_when_the_redirect_succeeds() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("", "#access_token=tok&expires_in=7200");
	harness.port.hide();
	harness.timers.run_until_idle();

	assert_eq!(harness.surface.render_count(), 0);
	assert_eq!(
		harness.store.get(keys::ACCESS_TOKEN).expect("Diagnostic store get should succeed."),
		Some("tok".into())
	);
	assert_eq!(
		harness.store.get(keys::TOKEN_EXPIRY).expect("Diagnostic store get should succeed."),
		Some("2025-01-01T02:00:00Z".into())
	);
}

#[test]
fn server_error_is_relayed_then_shown_manually() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?error=access_denied", "");

	assert_eq!(
		harness.reporter.status(),
		"Authentication error: access_denied. Please try again."
	);
	// The error rides the cascade too, so the app hears about the denial.
	assert_eq!(
		harness.port.events()[0],
		PortEvent::Probe("rateme://spotify-callback?error=access_denied".into())
	);

	harness.timers.run_until_idle();

	let view = harness.surface.last_view().expect("Exhaustion should render the fallback view.");

	assert!(matches!(view.body, FallbackBody::Failure { .. }));
}

#[test]
fn empty_load_goes_straight_to_the_no_data_status() {
	let harness = build_test_relay();
	let result = harness.relay.handle_page_load("", "");

	assert!(result.is_empty());
	assert_eq!(harness.reporter.status(), "No authentication data found. Please try again.");
	assert!(harness.port.events().is_empty());
	assert_eq!(harness.surface.render_count(), 0);
	assert_eq!(harness.timers.pending(), 0);
}

#[test]
fn diagnostic_log_is_hidden_by_default_and_toggles_through_the_facade() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?code=abc123", "");

	assert!(!harness.reporter.is_log_visible());
	assert!(!harness.reporter.log_lines().is_empty());
	assert!(harness.relay.toggle_log());
	assert!(!harness.relay.toggle_log());
}
