//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                 |
//! |----------------|---------------------|-----------------------------|
//! | `hardware`     | InputPort           | button GPIOs                |
//! |                | OutputPort          | relay GPIOs, status LED     |
//! | `log_sink`     | EventSink           | Serial log output           |
//! | `mqtt`         | EndpointPort        | ThingsBoard over MQTT       |
//! | `nvs`          | SettingsPort        | NVS / in-memory store       |
//! | `provisioning` | ProvisioningPort    | provisioning portal task    |
//! | `time`         | —                   | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod provisioning;
pub mod time;
