//! Global paste events as an explicit subscription.
//!
//! Whatever captures paste events publishes the clipboard payload on a
//! [`PasteHub`]. A session receives them only while it holds a
//! [`PasteSubscription`]; dropping or detaching it is the teardown.

use tokio::sync::broadcast;
use tracing::warn;

use snap_core::ClipboardItem;

const PASTE_BUFFER: usize = 16;

#[derive(Clone, Debug)]
pub struct PasteHub {
    tx: broadcast::Sender<Vec<ClipboardItem>>,
}

impl Default for PasteHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PasteHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(PASTE_BUFFER);
        Self { tx }
    }

    /// Deliver a paste to every attached listener. Returns how many
    /// listeners received it; zero when nobody is attached.
    pub fn publish(&self, items: Vec<ClipboardItem>) -> usize {
        self.tx.send(items).unwrap_or(0)
    }

    pub fn subscribe(&self) -> PasteSubscription {
        PasteSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[derive(Debug)]
pub struct PasteSubscription {
    rx: broadcast::Receiver<Vec<ClipboardItem>>,
}

impl PasteSubscription {
    /// Next paste payload, or `None` once the hub is gone.
    pub async fn recv(&mut self) -> Option<Vec<ClipboardItem>> {
        loop {
            match self.rx.recv().await {
                Ok(items) => return Some(items),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Paste listener fell behind, dropping old pastes");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
