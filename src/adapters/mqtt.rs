//! MQTT command subscriber.
//!
//! Subscribes to one command topic; every message payload is one raw
//! command pushed straight into the inbox from the MQTT client's task.

use crate::inbox::MAX_COMMAND_LEN;

/// Turn a payload into a command token: UTF-8, trimmed, non-empty and
/// short enough to be a command.
pub fn decode_payload(payload: &[u8]) -> Option<&str> {
    let text = core::str::from_utf8(payload).ok()?.trim();
    (!text.is_empty() && text.len() <= MAX_COMMAND_LEN).then_some(text)
}

/// Forward one payload to the inbox.
pub fn deliver(payload: &[u8]) {
    match decode_payload(payload) {
        Some(cmd) => {
            log::info!("mqtt: received {:?}", cmd);
            if let Err(e) = crate::inbox::push_command(cmd) {
                log::warn!("mqtt: dropped {:?} ({:?})", cmd, e);
            }
        }
        None => log::debug!("mqtt: ignoring {}-byte payload", payload.len()),
    }
}

#[cfg(target_os = "espidf")]
pub use esp::MqttCommands;

#[cfg(target_os = "espidf")]
mod esp {
    use core::time::Duration;

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

    use crate::config::MqttCredentials;

    const SUBSCRIBE_ATTEMPTS: u32 = 10;

    /// Keeps the MQTT client (and its subscription) alive.
    pub struct MqttCommands {
        _client: EspMqttClient<'static>,
    }

    impl MqttCommands {
        pub fn start(creds: &MqttCredentials) -> anyhow::Result<Self> {
            let conf = MqttClientConfiguration {
                client_id: Some("garagewatch"),
                username: creds.username,
                password: creds.password,
                ..Default::default()
            };
            let mut client = EspMqttClient::new_cb(creds.url, &conf, |event| match event.payload() {
                EventPayload::Received { data, .. } => super::deliver(data),
                EventPayload::Connected(_) => log::info!("mqtt: connected"),
                EventPayload::Disconnected => log::warn!("mqtt: disconnected"),
                EventPayload::Error(e) => log::warn!("mqtt: {:?}", e),
                _ => {}
            })?;

            // The broker only accepts the subscription once connected.
            let mut attempt = 0;
            loop {
                match client.subscribe(creds.topic, QoS::AtLeastOnce) {
                    Ok(_) => break,
                    Err(e) if attempt < SUBSCRIBE_ATTEMPTS => {
                        attempt += 1;
                        log::debug!("mqtt: subscribe not ready ({}), retrying", e);
                        std::thread::sleep(Duration::from_millis(500));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            log::info!("mqtt: subscribed to {}", creds.topic);
            Ok(Self { _client: client })
        }
    }
}
