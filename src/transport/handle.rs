//! Completion handle for a send attempt.

use tokio::sync::oneshot;

/// Result of a single send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Sending is disabled; no request was made.
    Disabled,
    /// The server answered. Any status counts.
    Delivered { status: u16 },
    /// Connection, timeout, or endpoint failure. Already swallowed.
    Failed,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered { .. })
    }

    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            Delivery::Disabled => "disabled",
            Delivery::Delivered { .. } => "delivered",
            Delivery::Failed => "failed",
        }
    }
}

/// Handle to an in-flight send.
///
/// Dropping it is the fire-and-forget path; the send carries on in the
/// background. Awaiting [`SendHandle::wait`] observes the outcome.
#[derive(Debug)]
pub struct SendHandle {
    state: State,
}

#[derive(Debug)]
enum State {
    Ready(Delivery),
    Pending(oneshot::Receiver<Delivery>),
}

impl SendHandle {
    pub(crate) fn ready(delivery: Delivery) -> Self {
        Self {
            state: State::Ready(delivery),
        }
    }

    pub(crate) fn pending(rx: oneshot::Receiver<Delivery>) -> Self {
        Self {
            state: State::Pending(rx),
        }
    }

    /// Wait for the attempt to finish. Never fails; a send task that vanished
    /// counts as [`Delivery::Failed`].
    pub async fn wait(self) -> Delivery {
        match self.state {
            State::Ready(delivery) => delivery,
            State::Pending(rx) => rx.await.unwrap_or(Delivery::Failed),
        }
    }
}
