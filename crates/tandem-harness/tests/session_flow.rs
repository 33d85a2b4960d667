//! End-to-end host and companion flows over the in-memory link.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks on what each side persisted, rendered and
//! scheduled, not on intermediate manager state.

use std::time::Duration;

use tandem_app::{
    Action, CompanionEvent, HostEvent, NotificationResponse, REPEATING_IDENTIFIER, Transition,
};
use tandem_core::{ActivationState, SendOptions, memory::SentRecord};
use tandem_harness::{Frame, InvariantRegistry, ModeConvergence, SimDriver, SimPair, SystemSnapshot};
use tandem_proto::{ClearNotificationCommand, CommandKey, CommandMessage, Messageable, Mode};

fn checked_pair(seed: u64) -> SimPair {
    SimPair::with_drivers(
        seed,
        SimDriver::new().with_invariants(InvariantRegistry::standard()),
        SimDriver::new().with_invariants(InvariantRegistry::standard()),
    )
    .unwrap()
}

/// Launch both apps and bring the companion screen on screen.
fn launched(seed: u64) -> SimPair {
    let mut pair = checked_pair(seed);
    pair.host.launch().unwrap();
    pair.companion.launch(None).unwrap();
    pair.companion.dispatch(CompanionEvent::DidAppear).unwrap();
    pair.companion.became_active().unwrap();
    pair
}

fn assert_converged(pair: &SimPair) {
    let mut registry = InvariantRegistry::standard();
    registry.add(ModeConvergence);
    let snapshot = SystemSnapshot::pair(pair.host.app(), pair.companion.app());
    registry.assert_all(&snapshot, "at quiescence");
}

#[test]
fn queued_traffic_replays_on_activation() {
    let mut pair = checked_pair(1);
    pair.host_modes.set(Mode::Primary).unwrap();
    pair.host.launch().unwrap();
    pair.companion.launch(None).unwrap();
    pair.companion.became_active().unwrap();

    // Broadcast and mode request are both waiting on activation
    assert_eq!(pair.host_manager.pending_len(), 1);
    assert_eq!(pair.companion_manager.pending_len(), 1);

    pair.activate();
    pair.pump().unwrap();

    assert_eq!(pair.host_manager.pending_len(), 0);
    assert_eq!(pair.companion_manager.pending_len(), 0);
    assert_eq!(pair.companion.app().mode(), Mode::Primary);
    assert_eq!(pair.companion_modes.current(), Mode::Primary);
    assert_eq!(pair.companion_session().sent_log(), vec![SentRecord::Message(
        CommandMessage::new(CommandKey::RequestMode).to_message()
    )]);
    assert_converged(&pair);
}

#[test]
fn host_selection_reaches_companion() {
    let mut pair = launched(2);
    pair.activate();
    pair.pump().unwrap();

    pair.host.dispatch(HostEvent::SelectMode(Mode::Secondary)).unwrap();
    pair.pump().unwrap();

    assert_eq!(pair.host_modes.current(), Mode::Secondary);
    assert_eq!(pair.companion_modes.current(), Mode::Secondary);
    assert_eq!(pair.companion.app().visible_group(), Some(Mode::Secondary));
    assert!(matches!(
        pair.host.driver().last_frame(),
        Some(Frame::Host(h)) if h.mode == Mode::Secondary
    ));
    assert_converged(&pair);
}

#[test]
fn companion_mode_change_is_not_echoed() {
    let mut pair = launched(3);
    pair.activate();
    pair.pump().unwrap();

    pair.host.dispatch(HostEvent::SelectMode(Mode::Primary)).unwrap();
    pair.pump().unwrap();

    let echoed = pair
        .companion_session()
        .sent_log()
        .into_iter()
        .filter(|record| matches!(record, SentRecord::Message(m) if Mode::from_message(m).is_ok()))
        .count();
    assert_eq!(echoed, 0);
}

#[test]
fn modal_notification_presents_detail() {
    let mut pair = launched(4);
    pair.host_modes.set(Mode::Primary).unwrap();
    pair.activate();
    pair.pump().unwrap();
    assert_eq!(pair.companion.app().mode(), Mode::Primary);

    pair.companion.dispatch(CompanionEvent::RequestLocalNotification).unwrap();
    pair.env.advance(Duration::from_secs(10));
    let delivered =
        pair.deliver_companion_notifications(Some(NotificationResponse::action(Action::Modal)));
    pair.pump().unwrap();

    assert_eq!(delivered, 1);
    insta::assert_debug_snapshot!(pair.companion.driver().transitions(), @r#"
    [
        PresentModal(
            DetailView {
                description: "Notification Processed",
                detail: Some(
                    "2017-01-09 22:13",
                ),
            },
        ),
    ]
    "#);
}

#[test]
fn notification_waits_for_mode_then_pushes_detail() {
    let mut pair = launched(5);

    pair.companion.dispatch(CompanionEvent::RequestLocalNotification).unwrap();
    pair.env.advance(Duration::from_secs(10));
    pair.deliver_companion_notifications(None);
    pair.pump().unwrap();

    // No mode yet: held, groups hidden
    assert!(pair.companion.app().pending().is_some());
    assert_eq!(pair.companion.app().visible_group(), None);

    pair.activate();
    pair.host.dispatch(HostEvent::SelectMode(Mode::Primary)).unwrap();
    pair.pump().unwrap();

    assert!(pair.companion.app().pending().is_none());
    assert_eq!(pair.companion.app().navigation().len(), 1);
    assert!(matches!(pair.companion.driver().transitions(), [Transition::PushDetail(_)]));
}

#[test]
fn dismissing_repeating_reminder_cancels_it() {
    let mut pair = launched(6);

    pair.companion.dispatch(CompanionEvent::RequestRepeatingNotification).unwrap();
    assert_eq!(pair.companion_center.pending_identifiers(), vec![REPEATING_IDENTIFIER]);

    pair.env.advance(Duration::from_secs(60));
    pair.deliver_companion_notifications(Some(NotificationResponse::dismiss()));
    pair.pump().unwrap();

    assert!(pair.companion_center.pending_identifiers().is_empty());
    assert!(pair.companion.app().pending().is_none());
}

#[test]
fn clear_command_removes_host_notification() {
    let mut pair = launched(7);
    pair.activate();
    pair.pump().unwrap();

    pair.host.dispatch(HostEvent::SendKnownNotification).unwrap();
    pair.env.advance(Duration::from_secs(10));
    let delivered = pair.host_center.deliver_due();
    let identifier = delivered[0].request.identifier.clone();
    assert_eq!(delivered[0].request.content.attachment_identifier(), Some("GeneralOrgana"));

    let clear = ClearNotificationCommand::new(identifier).to_message();
    pair.companion_manager.send(clear, SendOptions::default());
    pair.pump().unwrap();

    assert!(pair.host_center.delivered_identifiers().is_empty());
}

#[test]
fn unreachable_companion_misses_broadcast() {
    let mut pair = launched(8);
    pair.activate();
    pair.pump().unwrap();

    pair.host_session().set_reachable(false);
    pair.host.dispatch(HostEvent::SelectMode(Mode::Primary)).unwrap();
    pair.pump().unwrap();

    assert_eq!(pair.host_manager.pending_len(), 0);
    assert_eq!(pair.companion.app().mode(), Mode::Undefined);
}

#[test]
fn missing_companion_app_gates_broadcast() {
    let mut pair = launched(9);
    pair.activate();
    pair.pump().unwrap();

    pair.host_session().set_companion_app_installed(false);
    pair.host.dispatch(HostEvent::SelectMode(Mode::Secondary)).unwrap();
    pair.pump().unwrap();

    assert_eq!(pair.companion.app().mode(), Mode::Undefined);
}

#[test]
fn failed_activation_keeps_queue_until_retry() {
    let mut pair = checked_pair(10);
    pair.host_modes.set(Mode::Secondary).unwrap();
    pair.host.launch().unwrap();
    pair.companion.launch(None).unwrap();

    pair.host_session().complete_activation(ActivationState::NotActivated);
    pair.pump().unwrap();
    assert_eq!(pair.host_manager.pending_len(), 1);

    pair.activate();
    pair.pump().unwrap();
    assert_eq!(pair.host_manager.pending_len(), 0);
    assert_eq!(pair.companion.app().mode(), Mode::Secondary);
}

#[test]
fn terminate_stops_runtime() {
    let mut pair = launched(11);

    assert!(pair.companion.dispatch(CompanionEvent::Terminate).unwrap());
    assert!(pair.host.dispatch(HostEvent::Terminate).unwrap());
}

#[test]
fn same_seed_same_notification_identifiers() {
    let schedule = |seed| {
        let mut pair = launched(seed);
        pair.host.dispatch(HostEvent::SendKnownNotification).unwrap();
        pair.host.dispatch(HostEvent::SendUnknownNotification).unwrap();
        pair.host_center.pending_identifiers()
    };

    assert_eq!(schedule(42), schedule(42));
    assert_ne!(schedule(42), schedule(43));
}
