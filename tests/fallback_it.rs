#![cfg(feature = "test")]

// self
use oauth2_relay::{
	_preludet::*,
	fallback::{COPIED_LABEL, COPY_CODE_LABEL, COPY_TOKEN_LABEL, FallbackBody},
};

fn exhaust(harness: &TestRelay, search: &str, hash: &str) {
	harness.relay.handle_page_load(search, hash);
	harness.timers.run_until_idle();
}

#[test]
fn exhausted_code_cascade_lands_on_manual_instructions() {
	let harness = build_test_relay();

	exhaust(&harness, "?code=abc123", "");

	let view = harness.surface.last_view().expect("Exhaustion should render the fallback view.");

	assert_eq!(view.heading, "Manual Authentication");
	assert_eq!(view.return_uri.as_str(), "rateme://spotify-callback");

	let FallbackBody::Credential { credential, copy_label, expiry_notice, .. } = view.body else {
		panic!("Code exhaustion should render a credential body.");
	};

	assert_eq!(credential, "abc123");
	assert_eq!(copy_label, COPY_CODE_LABEL);
	assert!(expiry_notice.contains("10 minutes"));
	assert_eq!(harness.reporter.status(), "Please copy this code to the app");
}

#[test]
fn copy_flips_the_label_and_reverts_after_the_confirmation_window() {
	let harness = build_test_relay();

	exhaust(&harness, "?code=abc123", "");
	harness.relay.copy_credential();

	assert_eq!(harness.primary.writes(), ["abc123"]);
	assert_eq!(harness.surface.labels(), [COPIED_LABEL]);

	harness.timers.advance(Duration::milliseconds(1999));

	assert_eq!(harness.surface.labels(), [COPIED_LABEL]);

	harness.timers.advance(Duration::milliseconds(1));

	assert_eq!(harness.surface.labels(), [COPIED_LABEL, COPY_CODE_LABEL]);
}

#[test]
fn rejected_primary_clipboard_recovers_through_the_legacy_writer() {
	let harness = build_test_relay_with(Arc::new(ScriptedClipboard::rejecting()));

	exhaust(&harness, "", "#access_token=tok&expires_in=7200");
	harness.relay.copy_credential();
	harness.timers.run_until_idle();

	assert!(harness.primary.writes().is_empty());
	assert_eq!(harness.legacy.writes(), ["tok"]);
	assert_eq!(harness.surface.labels(), [COPIED_LABEL, COPY_TOKEN_LABEL]);
}

#[test]
fn error_exhaustion_renders_a_failure_body_without_copy_context() {
	let harness = build_test_relay();

	exhaust(&harness, "?error=access_denied", "");

	let view = harness.surface.last_view().expect("Exhaustion should render the fallback view.");

	assert!(matches!(view.body, FallbackBody::Failure { ref reason, .. } if reason == "access_denied"));

	harness.relay.copy_credential();

	assert!(harness.primary.writes().is_empty());
	assert!(harness.surface.labels().is_empty());
}

#[test]
fn return_control_issues_the_bare_primary_deep_link() {
	let harness = build_test_relay();

	exhaust(&harness, "?code=abc123", "");

	let before = harness.port.events().len();

	harness.relay.return_to_app();

	let events = harness.port.events();

	assert_eq!(events.len(), before + 1);
	assert_eq!(events[before], PortEvent::Navigate("rateme://spotify-callback".into()));
}
