//! Integration tests for the portal → control loop → NVS provisioning flow.
//!
//! Verifies the end-to-end sequence: the portal submits credentials, the
//! loop installs them as the connect candidate, and only a successful
//! connection writes them to the settings store.

use shutterlink::adapters::nvs::NvsAdapter;
use shutterlink::adapters::provisioning::PortalBridge;
use shutterlink::app::commands::AppCommand;
use shutterlink::app::events::AppEvent;
use shutterlink::app::ports::{ProvisioningPort, SettingsPort};
use shutterlink::app::service::AppService;
use shutterlink::config::SystemConfig;
use shutterlink::error::ConfigError;
use shutterlink::link::LinkState;
use shutterlink::settings::{ConnectionConfig, RECORD_LEN};

use crate::mock_hw::{creds, MockEndpoint, MockHardware, RecordingSink};

/// Boot path: a missing or unreadable record means "unprovisioned".
fn boot_credentials(nvs: &NvsAdapter) -> ConnectionConfig {
    nvs.load().unwrap_or_default()
}

fn step(
    app: &mut AppService,
    portal: &PortalBridge,
    now_ms: u64,
    ep: &mut MockEndpoint,
    nvs: &NvsAdapter,
    sink: &mut RecordingSink,
) {
    let mut port = portal;
    if let Some(cfg) = port.take_pending() {
        app.handle_command(AppCommand::Provision(cfg), ep, sink);
    }
    app.tick(now_ms, &mut MockHardware::new(), ep, nvs, sink);
}

#[test]
fn first_boot_waits_then_connects_after_provisioning() {
    let nvs = NvsAdapter::new().unwrap();
    let portal = PortalBridge::new();
    let mut ep = MockEndpoint::new();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), boot_credentials(&nvs));

    for t in 0..10 {
        step(&mut app, &portal, t * 100, &mut ep, &nvs, &mut sink);
    }
    assert_eq!(app.link_state(), LinkState::ConnectPending);
    assert!(ep.connects.is_empty());

    portal.submit("10.0.0.5", "abc123").unwrap();
    assert_eq!(nvs.load(), Err(ConfigError::NotFound), "not persisted yet");

    step(&mut app, &portal, 1_000, &mut ep, &nvs, &mut sink);
    assert_eq!(app.link_state(), LinkState::Connected);
    assert_eq!(nvs.load().unwrap(), creds());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CredentialsProvisioned)),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CredentialsPersisted)), 1);
}

#[test]
fn provisioning_does_not_tear_down_an_active_session() {
    let nvs = NvsAdapter::new().unwrap();
    nvs.save(&creds()).unwrap();
    let portal = PortalBridge::new();
    let mut ep = MockEndpoint::new();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), boot_credentials(&nvs));

    step(&mut app, &portal, 0, &mut ep, &nvs, &mut sink);
    step(&mut app, &portal, 100, &mut ep, &nvs, &mut sink);
    assert_eq!(app.link_state(), LinkState::Subscribed);

    portal.submit("tb.example.net", "newtoken").unwrap();
    step(&mut app, &portal, 200, &mut ep, &nvs, &mut sink);
    assert_eq!(app.link_state(), LinkState::Subscribed);
    assert_eq!(ep.connects.len(), 1);
    assert_eq!(nvs.load().unwrap(), creds());

    // Next session uses, then persists, the new credentials.
    ep.alive = false;
    for t in 3..=60 {
        step(&mut app, &portal, t * 100, &mut ep, &nvs, &mut sink);
    }
    assert_eq!(
        ep.connects.last().unwrap(),
        &("tb.example.net".to_owned(), "newtoken".to_owned())
    );
    assert_eq!(nvs.load().unwrap().auth_token(), "newtoken");
}

#[test]
fn rejected_credentials_never_persist() {
    let nvs = NvsAdapter::new().unwrap();
    let portal = PortalBridge::new();
    let mut ep = MockEndpoint {
        refuse_connect: true,
        ..MockEndpoint::new()
    };
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), boot_credentials(&nvs));

    portal.submit("10.0.0.99", "wrong").unwrap();
    for t in 0..100 {
        step(&mut app, &portal, t * 100, &mut ep, &nvs, &mut sink);
    }
    assert_eq!(ep.connects.len(), 2);
    assert_eq!(nvs.load(), Err(ConfigError::NotFound));
}

#[test]
fn corrupted_record_boots_unprovisioned() {
    let nvs = NvsAdapter::new().unwrap();
    nvs.write_raw(&[0xFF; RECORD_LEN]);

    let stored = boot_credentials(&nvs);
    assert!(!stored.is_complete());

    let mut ep = MockEndpoint::new();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(SystemConfig::default(), stored);
    step(&mut app, &PortalBridge::new(), 0, &mut ep, &nvs, &mut sink);
    assert!(ep.connects.is_empty());
}

#[test]
fn oversized_portal_input_is_refused() {
    let portal = PortalBridge::new();
    let long_token = "t".repeat(32);
    assert!(portal.submit("10.0.0.5", &long_token).is_err());
    assert!(portal.submit("10.0.0.5", "tab\there").is_err());
    assert!(!portal.has_pending());
}
