//! Gaze feed over MQTT
//!
//! Subscribes to a topic carrying brush positions from an eye tracker (or any
//! other pointer source) and forwards them to the main loop.

use crate::geometry::Point;
use rumqttc::{Client, Connection, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "tendril/gaze";
const CLIENT_ID: &str = "tendril";

/// One brush position from the feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub point: Point,
    /// Whether the brush is touching the canvas
    pub down: bool,
}

#[derive(Deserialize)]
struct JsonSample {
    x: f64,
    y: f64,
    #[serde(default = "pen_down")]
    down: bool,
}

fn pen_down() -> bool {
    true
}

/// Parse `{"x":..,"y":..,"down":bool}` or plain `x,y` (brush down).
/// Non-finite coordinates are rejected.
pub fn parse_sample(payload: &str) -> Option<GazeSample> {
    let text = payload.trim();
    if text.is_empty() {
        return None;
    }

    let sample = if let Ok(json) = serde_json::from_str::<JsonSample>(text) {
        GazeSample {
            point: Point::new(json.x, json.y),
            down: json.down,
        }
    } else {
        let (x, y) = text.split_once(',')?;
        GazeSample {
            point: Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?),
            down: true,
        }
    };

    sample.point.is_finite().then_some(sample)
}

/// MQTT subscription delivering samples from a background thread
pub struct GazeFeed {
    receiver: Receiver<GazeSample>,
    _thread: thread::JoinHandle<()>,
}

impl GazeFeed {
    /// Connect and subscribe.
    /// Fails immediately if the broker cannot be reached.
    pub fn connect(host: &str, topic: &str) -> Result<Self, String> {
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new(CLIENT_ID, host, DEFAULT_PORT);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);

        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| format!("Failed to subscribe to topic '{}': {}", topic, e))?;

        // Poll once so an unreachable broker fails fast
        match connection.iter().next() {
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                return Err(format!("Failed to connect to MQTT broker at {}:{} - {}", host, DEFAULT_PORT, e));
            }
            None => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - connection closed",
                    host, DEFAULT_PORT
                ));
            }
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();

        let handle = thread::spawn(move || {
            Self::message_loop(connection, sender, &topic_owned);
        });

        info!(host, port = DEFAULT_PORT, topic, "gaze feed connected");

        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: Connection, sender: Sender<GazeSample>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    let Ok(text) = std::str::from_utf8(&publish.payload) else {
                        continue;
                    };
                    match parse_sample(text) {
                        Some(sample) => {
                            if sender.send(sample).is_err() {
                                // Main thread gone
                                break;
                            }
                        }
                        None => warn!(payload = text, "unreadable gaze payload"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // Keep going; rumqttc reconnects on the next iteration
                    warn!(error = %e, "MQTT error");
                }
            }
        }
    }

    /// Every sample that arrived since the last poll, oldest first
    pub fn poll(&self) -> Vec<GazeSample> {
        self.receiver.try_iter().collect()
    }
}
