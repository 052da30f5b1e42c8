//! Host-side bridge controller.
//!
//! A [`BridgeController`] is attached to one frame and one target URL. It
//! walks a small state machine driven purely by validated inbound messages:
//!
//! ```text
//! Unattached ──attach──▶ Unsupported ──HELLO──▶ Supported ──READY──▶ Ready
//!      ▲                                                                │
//!      └──────────────── detach / reset / target URL change ────────────┘
//! ```
//!
//! Validation happens before any transition:
//!
//! 1. the event's source must be the tracked frame's current content window,
//! 2. the payload must decode as a current-version message,
//! 3. the sender origin must be a tuple origin.
//!
//! The sender origin then replaces the trusted origin for all later sends
//! (the origin ratchet). A reset is the only way back to the statically
//! resolved origin.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`ControllerBuilder`] |
//! | `core` | Struct, lifecycle, inbound validation |
//! | `commands` | Outbound `NAV` / `PING` |
//! | `session` | [`BridgeSession`], [`BridgeState`] |

// ============================================================================
// Submodules
// ============================================================================

mod builder;
mod commands;
mod core;
mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ControllerBuilder;
pub use core::BridgeController;
pub use session::{BridgeSession, BridgeState};

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::*;
    use crate::origin::{Origin, TargetOrigin};
    use crate::protocol::{BridgeMessage, Capability, NavCommand, PROTOCOL_VERSION, decode};
    use crate::transport::{
        BrowsingContext, Inbox, MemoryFrame, MemoryWindow, MessageEvent, MessageTarget,
    };

    const HOST: &str = "https://host.example";
    const APP: &str = "https://app.example";
    const APP_URL: &str = "https://app.example/preview";

    struct Harness {
        host: Arc<MemoryWindow>,
        host_inbox: Inbox,
        app: Arc<MemoryWindow>,
        app_inbox: Inbox,
        app_seen: Arc<Mutex<Vec<MessageEvent>>>,
        frame: Arc<MemoryFrame>,
        controller: BridgeController,
    }

    fn window(origin: &str) -> (Arc<MemoryWindow>, Inbox) {
        MemoryWindow::new(Origin::parse(origin).expect("valid origin"))
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn harness(target_url: &str) -> Harness {
        init_tracing();

        let (host, host_inbox) = window(HOST);
        let (app, app_inbox) = window(APP);

        let app_seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&app_seen);
        app.add_message_listener(Arc::new(move |event: &MessageEvent| {
            sink.lock().push(event.clone());
        }));

        let frame = MemoryFrame::new(Arc::clone(&host));
        frame.load(Arc::clone(&app));

        let controller = BridgeController::builder()
            .frame(frame.clone())
            .host(host.clone())
            .target_url(target_url)
            .base_url(format!("{HOST}/dashboard"))
            .build()
            .expect("build controller");

        Harness {
            host,
            host_inbox,
            app,
            app_inbox,
            app_seen,
            frame,
            controller,
        }
    }

    impl Harness {
        fn from_window(&mut self, sender: &Arc<MemoryWindow>, data: Value) {
            sender
                .port_to(&self.host)
                .post_message(data, &TargetOrigin::Any)
                .expect("post to host");
            self.host_inbox.dispatch_pending();
        }

        fn from_app(&mut self, data: Value) {
            let app = Arc::clone(&self.app);
            self.from_window(&app, data);
        }

        fn hello(&mut self, caps: &[&str]) {
            self.from_app(json!({ "v": 1, "t": "HELLO", "caps": caps }));
        }

        fn received_by_app(&mut self) -> Vec<BridgeMessage> {
            self.app_inbox.dispatch_pending();
            self.app_seen
                .lock()
                .drain(..)
                .filter_map(|event| decode(&event.data))
                .collect()
        }
    }

    // ------------------------------------------------------------------------
    // Attach / initial state
    // ------------------------------------------------------------------------

    #[test]
    fn test_attach_installs_listener_with_initial_state() {
        let h = harness(APP_URL);
        let state = h.controller.snapshot();

        assert_eq!(state.state(), BridgeState::Unsupported);
        assert!(state.id.is_some());
        assert!(!state.is_supported);
        assert_eq!(state.trusted_origin.as_ref().map(Origin::as_str), Some(APP));
        assert!(!state.origin_verified);
        assert_eq!(h.host.listener_count(), 1);
    }

    #[test]
    fn test_relative_target_resolves_against_base() {
        let h = harness("/preview/7");
        let origin = h.controller.static_origin().expect("resolved");
        assert_eq!(origin.as_str(), HOST);
    }

    // ------------------------------------------------------------------------
    // Inbound transitions
    // ------------------------------------------------------------------------

    #[test]
    fn test_hello_marks_supported_and_sticks() {
        let mut h = harness(APP_URL);
        h.hello(&["history", "logs"]);

        let state = h.controller.snapshot();
        assert!(state.is_supported);
        assert_eq!(state.state(), BridgeState::Supported);
        assert_eq!(
            state.capabilities.iter().cloned().collect::<Vec<_>>(),
            vec![Capability::History, Capability::Logs]
        );

        h.from_app(json!({ "v": 1, "t": "GARBAGE" }));
        h.from_app(json!("not even an object"));
        h.from_app(json!({ "v": 9, "t": "READY" }));
        assert!(h.controller.snapshot().is_supported);
    }

    #[test]
    fn test_ready_is_idempotent() {
        let mut h = harness(APP_URL);
        h.hello(&[]);
        h.from_app(json!({ "v": 1, "t": "READY" }));
        assert!(h.controller.snapshot().is_ready);

        h.from_app(json!({ "v": 1, "t": "READY" }));
        let state = h.controller.snapshot();
        assert!(state.is_ready);
        assert_eq!(state.state(), BridgeState::Ready);
    }

    #[test]
    fn test_ready_before_hello_ignored() {
        let mut h = harness(APP_URL);
        h.from_app(json!({ "v": 1, "t": "READY" }));

        let state = h.controller.snapshot();
        assert!(!state.is_ready);
        assert_eq!(state.state(), BridgeState::Unsupported);
    }

    #[test]
    fn test_location_updates_navigation_fields() {
        let mut h = harness(APP_URL);
        h.hello(&["history"]);
        h.from_app(json!({
            "v": 1, "t": "LOCATION", "href": "/start", "canGoBack": false, "canGoFwd": true
        }));
        h.from_app(json!({
            "v": 1, "t": "LOCATION", "href": "/pricing", "canGoBack": true, "canGoFwd": false
        }));

        let state = h.controller.snapshot();
        assert_eq!(state.href, "/pricing");
        assert!(state.can_go_back);
        assert!(!state.can_go_forward);
        assert!(!state.is_ready);
    }

    #[test]
    fn test_foreign_sender_is_ignored() {
        let mut h = harness(APP_URL);
        let (evil, _evil_inbox) = window(APP);
        let before = h.controller.snapshot();

        h.from_window(&evil, json!({ "v": 1, "t": "HELLO", "caps": ["history"] }));
        assert_eq!(h.controller.snapshot(), before);
    }

    #[test]
    fn test_message_without_content_window_is_ignored() {
        let mut h = harness(APP_URL);
        h.frame.unload();
        let before = h.controller.snapshot();

        h.hello(&["history"]);
        assert_eq!(h.controller.snapshot(), before);
    }

    // ------------------------------------------------------------------------
    // Origin ratchet
    // ------------------------------------------------------------------------

    #[test]
    fn test_observed_origin_supersedes_static_origin() {
        // Target URL points elsewhere (e.g. the app was served after a redirect).
        let mut h = harness("https://static.example/app");
        assert_eq!(
            h.controller.target_origin().map(|o| o.to_string()).as_deref(),
            Some("https://static.example")
        );

        // Before any inbound message the post is aimed at the wrong origin,
        // so the browser silently discards it.
        assert!(h.controller.go_back());
        assert!(h.received_by_app().is_empty());

        h.hello(&[]);
        let state = h.controller.snapshot();
        assert!(state.origin_verified);
        assert_eq!(state.trusted_origin.as_ref().map(Origin::as_str), Some(APP));

        assert!(h.controller.go_back());
        assert!(h.controller.send_ping());
        let received = h.received_by_app();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], BridgeMessage::nav(NavCommand::Back, None));
        assert!(matches!(received[1], BridgeMessage::Ping { .. }));
    }

    #[test]
    fn test_origin_ratchet_survives_invalid_messages() {
        let mut h = harness("https://static.example/app");
        h.hello(&[]);
        h.from_app(json!({ "v": 2, "t": "HELLO" }));
        h.from_app(json!(null));

        assert_eq!(
            h.controller.target_origin().map(|o| o.to_string()).as_deref(),
            Some(APP)
        );
    }

    #[test]
    fn test_unresolved_static_origin_blocks_sends_until_hello() {
        let mut h = harness("http://[::1");
        assert!(h.controller.static_origin().is_none());
        assert!(!h.controller.go_forward());

        h.hello(&[]);
        assert!(h.controller.go_forward());
        assert_eq!(
            h.received_by_app(),
            vec![BridgeMessage::nav(NavCommand::Forward, None)]
        );
    }

    #[test]
    fn test_opaque_sender_origin_is_ignored() {
        let h = harness(APP_URL);
        let session_id = h.controller.snapshot().id.expect("attached");
        let before = h.controller.snapshot();

        h.controller.inner.handle_message(
            session_id,
            &MessageEvent {
                source: Some(h.app.id()),
                origin: "null".into(),
                data: json!({ "v": 1, "t": "HELLO", "caps": [] }),
            },
        );
        assert_eq!(h.controller.snapshot(), before);
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    #[test]
    fn test_send_without_content_window_fails_without_side_effects() {
        let mut h = harness(APP_URL);
        h.hello(&["history"]);
        h.frame.unload();
        let before = h.controller.snapshot();

        assert!(!h.controller.send_nav(NavCommand::Back, None));
        assert!(!h.controller.send_ping());
        assert_eq!(h.controller.snapshot(), before);
    }

    #[test]
    fn test_send_to_closed_window_returns_false() {
        let mut h = harness(APP_URL);
        h.hello(&[]);
        h.app.close();

        assert!(!h.controller.navigate_to("/docs"));
    }

    #[test]
    fn test_navigate_to_carries_target() {
        let mut h = harness(APP_URL);
        h.hello(&["deeplink"]);
        assert!(h.controller.navigate_to("/docs/intro"));

        assert_eq!(
            h.received_by_app(),
            vec![BridgeMessage::nav(NavCommand::Go, Some("/docs/intro".into()))]
        );
    }

    #[test]
    fn test_nav_then_location_round_trip() {
        for frame_present in [true, false] {
            let mut h = harness(APP_URL);
            h.hello(&["history"]);
            h.from_app(json!({
                "v": 1, "t": "LOCATION", "href": "/b", "canGoBack": true, "canGoFwd": false
            }));

            if !frame_present {
                h.frame.unload();
            }
            let sent = h.controller.go_back();
            assert_eq!(sent, frame_present);
            // State never moves on a send alone.
            assert_eq!(h.controller.snapshot().href, "/b");

            h.frame.load(Arc::clone(&h.app));
            h.from_app(json!({
                "v": 1, "t": "LOCATION", "href": "/a", "canGoBack": false, "canGoFwd": true
            }));

            let state = h.controller.snapshot();
            assert_eq!(state.href, "/a");
            assert!(!state.can_go_back);
        }
    }

    // ------------------------------------------------------------------------
    // Reset / target change / teardown
    // ------------------------------------------------------------------------

    #[test]
    fn test_target_url_change_resets_to_initial_state() {
        let mut h = harness(APP_URL);
        h.hello(&["history", "logs"]);
        h.from_app(json!({ "v": 1, "t": "READY" }));
        h.from_app(json!({
            "v": 1, "t": "LOCATION", "href": "/pricing", "canGoBack": true, "canGoFwd": false
        }));
        let old_id = h.controller.snapshot().id;

        assert!(h.controller.set_target_url("https://other.example/app"));

        let state = h.controller.snapshot();
        assert_ne!(state.id, old_id);
        assert_eq!(state.state(), BridgeState::Unsupported);
        assert!(!state.is_supported);
        assert!(!state.is_ready);
        assert_eq!(state.href, "");
        assert!(state.capabilities.is_empty());
        assert!(!state.origin_verified);
        assert_eq!(
            state.trusted_origin.as_ref().map(Origin::as_str),
            Some("https://other.example")
        );
        assert_eq!(h.host.listener_count(), 1);
    }

    #[test]
    fn test_unchanged_target_url_is_noop() {
        let mut h = harness(APP_URL);
        h.hello(&[]);
        assert!(!h.controller.set_target_url(APP_URL));
        assert!(h.controller.snapshot().is_supported);
    }

    #[test]
    fn test_stale_ready_after_reset_not_attributed() {
        let mut h = harness(APP_URL);
        h.hello(&[]);
        h.from_app(json!({ "v": 1, "t": "READY" }));

        h.controller.reset();
        h.from_app(json!({ "v": 1, "t": "READY" }));
        h.from_app(json!({ "v": 1, "t": "LOCATION", "href": "/old" }));

        let state = h.controller.snapshot();
        assert!(!state.is_ready);
        assert_eq!(state.href, "");
    }

    #[test]
    fn test_message_for_previous_session_dropped() {
        let h = harness(APP_URL);
        let old_id = h.controller.snapshot().id.expect("attached");
        h.controller.reset();

        h.controller.inner.handle_message(
            old_id,
            &MessageEvent {
                source: Some(h.app.id()),
                origin: APP.into(),
                data: json!({ "v": 1, "t": "HELLO", "caps": [] }),
            },
        );
        assert!(!h.controller.snapshot().is_supported);
    }

    #[test]
    fn test_detach_and_drop_remove_listener() {
        let h = harness(APP_URL);
        h.controller.detach();
        assert_eq!(h.controller.snapshot().state(), BridgeState::Unattached);
        assert_eq!(h.host.listener_count(), 0);

        h.controller.attach();
        assert_eq!(h.host.listener_count(), 1);

        let host = Arc::clone(&h.host);
        drop(h);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let mut h = harness(APP_URL);
        let mut rx = h.controller.subscribe();
        rx.mark_unchanged();

        h.hello(&["resize"]);
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().supports(&Capability::Resize));

        // Invalid traffic publishes nothing.
        h.from_app(json!({ "v": 1, "t": "NOPE" }));
        assert!(!rx.has_changed().expect("sender alive"));
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_unknown_version_leaves_state_unchanged(
            v in any::<u64>().prop_filter("not the current version", |v| *v != PROTOCOL_VERSION),
            kind in prop::sample::select(vec!["HELLO", "READY", "LOCATION"]),
        ) {
            let mut h = harness(APP_URL);
            let before = h.controller.snapshot();

            h.from_app(json!({ "v": v, "t": kind, "caps": ["history"], "href": "/x" }));
            prop_assert_eq!(h.controller.snapshot(), before);
        }

        #[test]
        fn prop_foreign_sender_leaves_state_unchanged(
            kind in prop::sample::select(vec!["HELLO", "READY", "LOCATION"]),
            href in "/[a-z]{0,12}",
            back in any::<bool>(),
        ) {
            let mut h = harness(APP_URL);
            h.hello(&["history"]);
            let before = h.controller.snapshot();

            let (evil, _evil_inbox) = window("https://evil.example");
            h.from_window(&evil, json!({
                "v": 1, "t": kind, "caps": ["logs"], "href": href, "canGoBack": back
            }));
            prop_assert_eq!(h.controller.snapshot(), before);
        }
    }
}
