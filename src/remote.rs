//! Remote pointer feed over MQTT
//!
//! Subscribes to a topic and forwards each message as a pointer movement,
//! through the same channel as local mouse and touch input.

use std::thread;
use std::time::Duration;

use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;

use crate::config::MqttConfig;
use crate::error::{Error, Result};
use crate::input::PointerSender;

const CLIENT_ID: &str = "glowfield";

/// JSON form of a pointer message
#[derive(Deserialize)]
struct JsonPointer {
    x: f32,
    y: f32,
}

/// Parse `{"x": .., "y": ..}` or plain `x,y`
fn parse_pointer(payload: &[u8]) -> Option<(f32, f32)> {
    let text = std::str::from_utf8(payload).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    let (x, y) = match serde_json::from_str::<JsonPointer>(text) {
        Ok(json) => (json.x, json.y),
        Err(_) => {
            let (x, y) = text.split_once(',')?;
            (x.trim().parse().ok()?, y.trim().parse().ok()?)
        },
    };
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Background MQTT subscriber feeding pointer samples
pub struct PointerFeed {
    _thread: thread::JoinHandle<()>,
}

impl PointerFeed {
    /// Connect to the broker and start forwarding.
    /// Fails immediately if the connection cannot be established.
    pub fn connect(config: &MqttConfig, pointer: PointerSender) -> Result<Self> {
        let mut options = MqttOptions::new(CLIENT_ID, config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(config.topic.as_str(), QoS::AtMostOnce)
            .map_err(|e| Error::Mqtt(format!("failed to subscribe to '{}': {}", config.topic, e)))?;

        // Poll once so an unreachable broker fails fast
        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(Error::Mqtt(format!(
                    "failed to connect to {}:{} - {}",
                    config.host, config.port, e
                )));
            },
            None => {
                return Err(Error::Mqtt(format!(
                    "failed to connect to {}:{} - connection closed",
                    config.host, config.port
                )));
            },
        }

        let topic = config.topic.clone();
        let handle = thread::spawn(move || {
            // keep the client alive as long as the loop runs
            let _client = client;
            Self::message_loop(connection, pointer, &topic);
        });

        log::info!(
            "MQTT: connected to {}:{}, pointer feed on '{}'",
            config.host,
            config.port,
            config.topic
        );

        Ok(Self { _thread: handle })
    }

    fn message_loop(mut connection: Connection, pointer: PointerSender, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    match parse_pointer(&publish.payload) {
                        Some((x, y)) => {
                            if !pointer.moved(x, y) {
                                // field gone, nothing left to steer
                                break;
                            }
                        },
                        None => log::debug!("MQTT: ignoring malformed pointer message"),
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    log::warn!("MQTT error: {}", e);
                    // keep polling, rumqttc reconnects on the next iteration
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
        log::info!("MQTT: pointer feed stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_pointer() {
        assert_eq!(parse_pointer(br#"{"x": 12.5, "y": 40}"#), Some((12.5, 40.0)));
    }

    #[test]
    fn test_parse_plain_pointer() {
        assert_eq!(parse_pointer(b" 100, 200.5 \n"), Some((100.0, 200.5)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_pointer(b""), None);
        assert_eq!(parse_pointer(b"hello"), None);
        assert_eq!(parse_pointer(b"1,two"), None);
        assert_eq!(parse_pointer(br#"{"x": 1}"#), None);
        assert_eq!(parse_pointer(b"NaN,1"), None);
        assert_eq!(parse_pointer(&[0xff, 0xfe]), None);
    }
}
