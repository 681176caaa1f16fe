#![cfg(feature = "test")]

// self
use oauth2_relay::{_preludet::*, redirect::{RelayTiming, SequencerState}};

#[test]
fn code_cascade_walks_every_scheme_then_the_desktop_handler() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?code=abc123", "");
	harness.timers.run_until_idle();

	assert_eq!(harness.relay.sequencer_state(), Some(SequencerState::Done));
	assert_eq!(
		harness.port.events(),
		[
			PortEvent::Probe("rateme://spotify-callback?code=abc123".into()),
			PortEvent::Navigate("rateme://spotify-callback?code=abc123".into()),
			PortEvent::Probe("com.ali3nated0.rateme://spotify-callback?code=abc123".into()),
			PortEvent::Probe("com.rateme.app://spotify-callback?code=abc123".into()),
			PortEvent::Navigate("xdg-open:rateme://spotify-callback?code=abc123".into()),
		]
	);
}

#[test]
fn token_attempts_carry_the_full_parameter_set() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("", "#access_token=tok&expires_in=7200&state=s1");
	harness.timers.run_until_idle();

	assert_eq!(
		harness.port.events()[0],
		PortEvent::Probe(
			"rateme://spotify-callback?access_token=tok&expires_in=7200&expiry_time=2025-01-01T02%3A00%3A00Z&state=s1"
				.into()
		)
	);
}

#[test]
fn losing_visibility_stops_the_cascade_and_skips_the_fallback() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?code=abc123", "");
	// The app caught the very first probe and the OS backgrounded the page.
	harness.port.hide();
	harness.timers.run_until_idle();

	assert_eq!(harness.relay.sequencer_state(), Some(SequencerState::Done));
	assert_eq!(harness.port.events().len(), 1);
	assert_eq!(harness.surface.render_count(), 0);
}

#[test]
fn exhaustion_lands_exactly_at_the_attempt_and_grace_budget() {
	let harness = build_test_relay();

	harness.relay.handle_page_load("?code=abc123", "");
	// 3 attempts x 800 ms, then the 1000 ms desktop-handler grace period.
	harness.timers.advance(Duration::milliseconds(3399));

	assert_eq!(harness.surface.render_count(), 0);

	harness.timers.advance(Duration::milliseconds(1));

	assert_eq!(harness.surface.render_count(), 1);
	assert_eq!(harness.relay.sequencer_state(), Some(SequencerState::Done));
}

#[test]
fn custom_timing_stretches_the_cascade_proportionally() {
	let timers = Arc::new(oauth2_relay::sched::TimerQueue::new());
	let port = Arc::new(RecordingPort::default());
	let surface = Arc::new(RecordingSurface::default());
	let timing = RelayTiming::default()
		.with_attempt_delay(Duration::milliseconds(100))
		.with_handler_delay(Duration::milliseconds(50));
	let relay = oauth2_relay::relay::RelayBuilder::new(test_target())
		.timing(timing)
		.scheduler(timers.clone())
		.port(port.clone())
		.surface(surface.clone())
		.primary_clipboard(Arc::new(ScriptedClipboard::accepting()))
		.legacy_clipboard(Arc::new(ScriptedClipboard::accepting()))
		.build()
		.expect("Custom-timing relay should build successfully.");

	relay.handle_page_load("?code=abc123", "");
	timers.advance(Duration::milliseconds(349));

	assert_eq!(surface.render_count(), 0);

	timers.advance(Duration::milliseconds(1));

	assert_eq!(surface.render_count(), 1);
}
