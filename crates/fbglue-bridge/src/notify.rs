// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification hand-off from host-runtime threads to the adapter's owner.
//
// The Java side delivers session and request results on its own UI thread.
// Those threads only ever enqueue here; engine callbacks run on whichever
// thread drains the receiver.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use fbglue_core::error::{FacebookError, Result};
use fbglue_core::types::{Notification, SessionStatus};

/// Create a connected sender/receiver pair.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotificationSender { tx }, NotificationReceiver { rx })
}

/// Producer half, safe to clone into any thread.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: UnboundedSender<Notification>,
}

impl NotificationSender {
    pub fn send(&self, notification: Notification) -> Result<()> {
        self.tx
            .send(notification)
            .map_err(|_| FacebookError::ChannelClosed)
    }

    pub fn session_status(&self, state: i32, permissions: String, error_code: i32) -> Result<()> {
        debug!(state, error_code, "queueing session status");
        self.send(Notification::SessionStatus(SessionStatus {
            state,
            permissions,
            error_code,
        }))
    }

    pub fn frictionless_request(&self, success: bool) -> Result<()> {
        debug!(success, "queueing frictionless request result");
        self.send(Notification::FrictionlessRequest { success })
    }

    /// True once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the adapter.
#[derive(Debug)]
pub struct NotificationReceiver {
    rx: UnboundedReceiver<Notification>,
}

impl NotificationReceiver {
    /// Pop the oldest pending notification without blocking.
    pub fn try_next(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next notification. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_arrive_in_order() {
        let (tx, mut rx) = notification_channel();
        tx.frictionless_request(true).expect("send");
        tx.session_status(1, "email".into(), 0).expect("send");

        assert_eq!(
            rx.try_next(),
            Some(Notification::FrictionlessRequest { success: true })
        );
        assert!(matches!(rx.try_next(), Some(Notification::SessionStatus(_))));
        assert_eq!(rx.try_next(), None);
    }

    #[test]
    fn send_after_receiver_dropped_is_channel_closed() {
        let (tx, rx) = notification_channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(matches!(
            tx.frictionless_request(false),
            Err(FacebookError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn delivery_from_another_thread() {
        let (tx, mut rx) = notification_channel();
        let worker = std::thread::spawn(move || {
            tx.session_status(3, "publish_actions".into(), 0)
                .expect("send from host thread");
        });
        worker.join().expect("join");

        match rx.next().await {
            Some(Notification::SessionStatus(status)) => {
                assert_eq!(status.state, 3);
                assert_eq!(status.permissions, "publish_actions");
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        // Sender dropped with the thread.
        assert_eq!(rx.next().await, None);
    }
}
