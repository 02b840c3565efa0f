//! Remote link behaviour as seen through the control loop.

use shutterlink::adapters::mqtt::ThingsBoardEndpoint;
use shutterlink::app::commands::AppCommand;
use shutterlink::app::events::AppEvent;
use shutterlink::app::ports::SettingsPort;
use shutterlink::app::service::AppService;
use shutterlink::config::SystemConfig;
use shutterlink::link::LinkState;
use shutterlink::rpc::RpcInbox;
use shutterlink::settings::ConnectionConfig;

use crate::mock_hw::{creds, MemorySettings, MockEndpoint, MockHardware, RecordingSink};

const TICK_MS: u64 = 100;

fn run(
    app: &mut AppService,
    ep: &mut MockEndpoint,
    settings: &MemorySettings,
    from_ms: u64,
    to_ms: u64,
) {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut t = from_ms;
    while t <= to_ms {
        app.tick(t, &mut hw, ep, settings, &mut sink);
        t += TICK_MS;
    }
}

#[test]
fn stored_credentials_subscribe_within_two_ticks() {
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut ep = MockEndpoint::new();
    let settings = MemorySettings::with(creds());

    run(&mut app, &mut ep, &settings, 0, 0);
    assert_eq!(app.link_state(), LinkState::Connected);
    run(&mut app, &mut ep, &settings, 100, 100);
    assert_eq!(app.link_state(), LinkState::Subscribed);

    assert_eq!(ep.connects, [("10.0.0.5".to_owned(), "abc123".to_owned())]);
    assert_eq!(settings.writes.get(), 0, "unchanged record is not rewritten");
}

#[test]
fn unreachable_endpoint_is_retried_once_per_backoff() {
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut ep = MockEndpoint {
        refuse_connect: true,
        ..MockEndpoint::new()
    };
    let settings = MemorySettings::new();

    run(&mut app, &mut ep, &settings, 0, 30_000);
    // 0, 5000, 10000, ..., 30000
    assert_eq!(ep.connects.len(), 7);
    assert!(!app.link_state().is_connected());
    assert_eq!(settings.writes.get(), 0);
}

#[test]
fn liveness_loss_backs_off_before_reconnecting() {
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut ep = MockEndpoint::new();
    let settings = MemorySettings::new();

    run(&mut app, &mut ep, &settings, 0, 1_000);
    assert_eq!(app.link_state(), LinkState::Subscribed);

    ep.alive = false;
    run(&mut app, &mut ep, &settings, 1_100, 1_100);
    assert_eq!(app.link_state(), LinkState::Disconnected);
    assert!(!app.link_state().is_subscribed());

    run(&mut app, &mut ep, &settings, 1_200, 6_000);
    assert_eq!(ep.connects.len(), 1, "no attempt before the backoff elapses");
    assert_eq!(app.link_state(), LinkState::ConnectPending);

    run(&mut app, &mut ep, &settings, 6_100, 6_200);
    assert_eq!(ep.connects.len(), 2);
    assert_eq!(app.link_state(), LinkState::Subscribed);
}

#[test]
fn subscribe_failure_keeps_session_and_retries() {
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut ep = MockEndpoint {
        refuse_subscribe: true,
        ..MockEndpoint::new()
    };
    let settings = MemorySettings::new();

    run(&mut app, &mut ep, &settings, 0, 500);
    assert_eq!(app.link_state(), LinkState::Connected);
    assert_eq!(ep.subscribes, 5);
    assert_eq!(ep.connects.len(), 1);

    ep.refuse_subscribe = false;
    run(&mut app, &mut ep, &settings, 600, 600);
    assert_eq!(app.link_state(), LinkState::Subscribed);
}

#[test]
fn commands_before_subscription_are_dropped() {
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut ep = MockEndpoint::new();
    let settings = MemorySettings::new();

    ep.deliver(1, "set_ForceUp", r#"{"ForceUp":true}"#);
    run(&mut app, &mut ep, &settings, 0, 0);

    assert!(!app.control_state().force_up);
    assert!(ep.acks.is_empty());
    assert!(ep.inbound.is_empty());
}

#[test]
fn failed_save_does_not_block_the_session() {
    let mut app = AppService::new(SystemConfig::default(), ConnectionConfig::default());
    let mut ep = MockEndpoint::new();
    let mut sink = RecordingSink::new();
    let settings = MemorySettings::new();
    settings.fail_writes.set(true);

    app.handle_command(AppCommand::Provision(creds()), &mut ep, &mut sink);
    run(&mut app, &mut ep, &settings, 0, 100);

    assert_eq!(app.link_state(), LinkState::Subscribed);
    assert!(settings.load().is_err());
}

#[test]
fn reconnect_with_same_credentials_writes_once() {
    let mut app = AppService::new(SystemConfig::default(), ConnectionConfig::default());
    let mut ep = MockEndpoint::new();
    let mut sink = RecordingSink::new();
    let settings = MemorySettings::new();

    app.handle_command(AppCommand::Provision(creds()), &mut ep, &mut sink);
    run(&mut app, &mut ep, &settings, 0, 1_000);
    ep.alive = false;
    run(&mut app, &mut ep, &settings, 1_100, 10_000);

    assert_eq!(ep.connects.len(), 2);
    assert_eq!(settings.writes.get(), 1);
}

#[test]
fn thingsboard_endpoint_round_trip() {
    static INBOX: RpcInbox = RpcInbox::new();
    let mut ep = ThingsBoardEndpoint::new(&INBOX);
    let mut app = AppService::new(SystemConfig::default(), creds());
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let settings = MemorySettings::new();

    app.tick(0, &mut hw, &mut ep, &settings, &mut sink);
    app.tick(100, &mut hw, &mut ep, &settings, &mut sink);
    assert_eq!(app.link_state(), LinkState::Subscribed);
    assert_eq!(ep.sim().last_username, "abc123");

    ep.sim_deliver(
        "v1/devices/me/rpc/request/31",
        br#"{"method":"set_InvertButtons","params":{"InvertButtons":true}}"#,
    );
    app.tick(200, &mut hw, &mut ep, &settings, &mut sink);

    assert!(app.control_state().invert_buttons);
    assert!(
        ep.sim()
            .published
            .iter()
            .any(|(topic, body)| topic == "v1/devices/me/rpc/response/31" && body == b"{}")
    );
    assert!(
        ep.sim()
            .published
            .iter()
            .any(|(topic, body)| topic == "v1/devices/me/attributes"
                && body == br#"{"InvertButtons":true}"#)
    );

    ep.sim_drop_session();
    app.tick(300, &mut hw, &mut ep, &settings, &mut sink);
    assert_eq!(app.link_state(), LinkState::Disconnected);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::LinkChanged { to: LinkState::Disconnected, .. }))
    );
}
