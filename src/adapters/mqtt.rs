//! ThingsBoard MQTT endpoint adapter.
//!
//! Implements [`EndpointPort`] over the ThingsBoard device MQTT API:
//!
//! | Direction | Topic                               | Body                 |
//! |-----------|-------------------------------------|----------------------|
//! | out       | `v1/devices/me/telemetry`           | `{"<name>": bool}`   |
//! | out       | `v1/devices/me/attributes`          | `{"<name>": bool}`   |
//! | in        | `v1/devices/me/rpc/request/{id}`    | `{"method","params"}`|
//! | out       | `v1/devices/me/rpc/response/{id}`   | `{}`                 |
//!
//! The access token is the MQTT username.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//!   Its event callback runs in the MQTT task and only touches the
//!   connected flag and the [`RpcInbox`].
//! - **all other targets**: an in-process simulated broker that records
//!   publishes, for host-side tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::app::ports::EndpointPort;
use crate::error::EndpointError;
use crate::rpc::{RpcInbox, RpcRequest, REQUEST_TOPIC_PREFIX};

#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::delay::FreeRtos;
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

pub const TELEMETRY_TOPIC: &str = "v1/devices/me/telemetry";
pub const ATTRIBUTES_TOPIC: &str = "v1/devices/me/attributes";
pub const RPC_SUBSCRIBE_TOPIC: &str = "v1/devices/me/rpc/request/+";
pub const RPC_RESPONSE_PREFIX: &str = "v1/devices/me/rpc/response/";
pub const MQTT_PORT: u16 = 1883;

#[cfg(target_os = "espidf")]
const CLIENT_ID: &str = "shutterlink";
#[cfg(target_os = "espidf")]
const KEEP_ALIVE_SECS: u64 = 15;
/// Upper bound on one connect attempt; the control loop stalls for at
/// most this long.
#[cfg(target_os = "espidf")]
const CONNECT_TIMEOUT_MS: u32 = 3000;
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u32 = 20;

/// Route one inbound MQTT message.  Runs in the network task.
fn handle_inbound(inbox: &RpcInbox, topic: &str, data: &[u8]) {
    if !topic.starts_with(REQUEST_TOPIC_PREFIX) {
        debug!("MQTT: ignoring message on '{}'", topic);
        return;
    }
    if let Some(req) = RpcRequest::from_message(topic, data) {
        inbox.push(req);
    }
}

/// `{"<name>": <value>}`
fn bool_payload(name: &str, value: bool) -> Result<Vec<u8>, EndpointError> {
    let mut body = Map::new();
    body.insert(name.to_owned(), Value::Bool(value));
    serde_json::to_vec(&body).map_err(|_| EndpointError::PublishFailed)
}

// ───────────────────────────────────────────────────────────────
// Simulated broker (host only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimBroker {
    /// When false every connect attempt is refused.
    pub reachable: bool,
    pub connects: u32,
    pub last_username: String,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, Vec<u8>)>,
}

// ───────────────────────────────────────────────────────────────
// Endpoint adapter
// ───────────────────────────────────────────────────────────────

pub struct ThingsBoardEndpoint {
    inbox: &'static RpcInbox,
    connected: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl ThingsBoardEndpoint {
    pub fn new(inbox: &'static RpcInbox) -> Self {
        Self {
            inbox,
            connected: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker {
                reachable: true,
                ..SimBroker::default()
            },
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, server_address: &str, auth_token: &str) -> Result<(), EndpointError> {
        let url = format!("mqtt://{}:{}", server_address, MQTT_PORT);
        let conf = MqttClientConfiguration {
            client_id: Some(CLIENT_ID),
            username: Some(auth_token),
            keep_alive_interval: Some(core::time::Duration::from_secs(KEEP_ALIVE_SECS)),
            ..Default::default()
        };

        let connected = self.connected.clone();
        let inbox = self.inbox;
        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => connected.store(true, Ordering::Release),
            EventPayload::Disconnected => connected.store(false, Ordering::Release),
            EventPayload::Received {
                topic: Some(topic),
                data,
                ..
            } => handle_inbound(inbox, topic, data),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {}", e);
            EndpointError::ConnectFailed
        })?;

        let mut waited = 0;
        while !self.connected.load(Ordering::Acquire) {
            if waited >= CONNECT_TIMEOUT_MS {
                warn!("MQTT: no CONNACK from {} within {} ms", url, CONNECT_TIMEOUT_MS);
                return Err(EndpointError::ConnectFailed);
            }
            FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += CONNECT_POLL_MS;
        }
        self.client = Some(client);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, server_address: &str, auth_token: &str) -> Result<(), EndpointError> {
        self.sim.connects += 1;
        if !self.sim.reachable {
            warn!("MQTT(sim): {}:{} unreachable", server_address, MQTT_PORT);
            return Err(EndpointError::ConnectFailed);
        }
        self.sim.last_username = auth_token.to_owned();
        self.sim.subscriptions.clear();
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        // Dropping the client stops its task.
        self.client = None;
        self.connected.store(false, Ordering::Release);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.connected.store(false, Ordering::Release);
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), EndpointError> {
        let client = self.client.as_mut().ok_or(EndpointError::NotConnected)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| EndpointError::PublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), EndpointError> {
        self.sim.published.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), EndpointError> {
        let client = self.client.as_mut().ok_or(EndpointError::NotConnected)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| EndpointError::SubscribeFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), EndpointError> {
        self.sim.subscriptions.push(topic.to_owned());
        Ok(())
    }

    fn publish_bool(&mut self, topic: &str, name: &str, value: bool) -> Result<(), EndpointError> {
        if !self.is_connected() {
            return Err(EndpointError::NotConnected);
        }
        let payload = bool_payload(name, value)?;
        self.platform_publish(topic, &payload)
    }
}

// ── Simulation controls ───────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl ThingsBoardEndpoint {
    pub fn sim(&self) -> &SimBroker {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimBroker {
        &mut self.sim
    }

    /// Broker drops the session (keep-alive timeout, server restart).
    pub fn sim_drop_session(&mut self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Deliver a message as the network task would.
    pub fn sim_deliver(&self, topic: &str, body: &[u8]) {
        handle_inbound(self.inbox, topic, body);
    }
}

// ───────────────────────────────────────────────────────────────
// EndpointPort
// ───────────────────────────────────────────────────────────────

impl EndpointPort for ThingsBoardEndpoint {
    fn connect(&mut self, server_address: &str, auth_token: &str) -> Result<(), EndpointError> {
        self.platform_disconnect();
        // Requests from a previous session can no longer be acknowledged.
        self.inbox.clear();
        info!("MQTT: connecting to {}:{}", server_address, MQTT_PORT);
        self.platform_connect(server_address, auth_token)?;
        info!("MQTT: session open");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn send_telemetry_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError> {
        self.publish_bool(TELEMETRY_TOPIC, name, value)
    }

    fn send_attribute_bool(&mut self, name: &str, value: bool) -> Result<(), EndpointError> {
        self.publish_bool(ATTRIBUTES_TOPIC, name, value)
    }

    fn subscribe_rpc(&mut self, methods: &[&str]) -> Result<(), EndpointError> {
        if !self.is_connected() {
            return Err(EndpointError::NotConnected);
        }
        // One wildcard topic carries every method; unknown methods are
        // dropped when decoded.
        info!("MQTT: subscribing {} for {:?}", RPC_SUBSCRIBE_TOPIC, methods);
        self.platform_subscribe(RPC_SUBSCRIBE_TOPIC)
    }

    fn next_request(&mut self) -> Option<RpcRequest> {
        self.inbox.pop()
    }

    fn acknowledge(&mut self, request_id: u32) -> Result<(), EndpointError> {
        if !self.is_connected() {
            return Err(EndpointError::NotConnected);
        }
        let topic = format!("{}{}", RPC_RESPONSE_PREFIX, request_id);
        self.platform_publish(&topic, b"{}")
            .map_err(|_| EndpointError::AckFailed)
    }
}
