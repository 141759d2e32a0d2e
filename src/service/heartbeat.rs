//! Periodic server-time broadcast.
//!
//! Independent of client traffic, the heartbeat injects a
//! `Server time: <RFC 3339>` text frame through [`Hub::broadcast`], the same
//! path client frames take.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::Frame;
use crate::hub::Hub;

/// Builds the frame sent on every heartbeat tick.
#[must_use]
pub fn server_time_frame() -> Frame {
    Frame::text(format!(
        "Server time: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    ))
}

/// Spawns a task that broadcasts [`server_time_frame`] every `period`.
///
/// The first frame goes out one full period after start. The task ends when
/// the hub closes.
#[must_use]
pub fn spawn_heartbeat(hub: Hub, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if hub.broadcast(server_time_frame()).await.is_err() {
                tracing::debug!("hub closed, stopping heartbeat");
                break;
            }
        }
    })
}
