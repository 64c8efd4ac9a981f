//! In-process reference channel.
//!
//! [`pair`] returns two connected endpoints. Each endpoint pushes frames into
//! the other's pump task over an unbounded mpsc duct; a reply is matched to
//! its request by uuid through a pending table — the same correlation
//! discipline a socket-backed channel would use. Every inbound request is
//! dispatched on its own task, so any number of calls can be in flight in
//! both directions without cross-delivery.
//!
//! Dispatch defects travel back as channel-level errors, never as response
//! envelopes, so the caller sees them as transport failures rather than as
//! one of the four response kinds.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::channel::{Channel, InboundHandler};
use crate::protocol::{RequestEnvelope, ResponseEnvelope};

enum Frame {
    Request {
        id: Uuid,
        envelope: RequestEnvelope,
    },
    Reply {
        id: Uuid,
        outcome: Result<ResponseEnvelope, String>,
    },
}

type Pending = Arc<DashMap<Uuid, oneshot::Sender<Result<ResponseEnvelope, String>>>>;
type HandlerSlot = Arc<OnceCell<Arc<dyn InboundHandler>>>;

/// One endpoint of an in-process channel pair.
pub struct LocalChannel {
    peer_tx: mpsc::UnboundedSender<Frame>,
    pending: Pending,
    handler: HandlerSlot,
}

/// Create two connected endpoints.
///
/// Their pump tasks run on the current tokio runtime until it shuts down.
pub fn pair() -> (Arc<LocalChannel>, Arc<LocalChannel>) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();

    let a = Arc::new(LocalChannel {
        peer_tx: b_tx.clone(),
        pending: Arc::new(DashMap::new()),
        handler: Arc::new(OnceCell::new()),
    });
    let b = Arc::new(LocalChannel {
        peer_tx: a_tx.clone(),
        pending: Arc::new(DashMap::new()),
        handler: Arc::new(OnceCell::new()),
    });

    // Frames addressed to an endpoint arrive on its own pump; replies it
    // produces are addressed back to the peer.
    tokio::spawn(pump(a_rx, a.handler.clone(), a.pending.clone(), b_tx));
    tokio::spawn(pump(b_rx, b.handler.clone(), b.pending.clone(), a_tx));

    (a, b)
}

/// Frame loop for one endpoint: inbound requests are dispatched on their own
/// task, inbound replies are routed to the waiting caller.
async fn pump(
    mut rx: mpsc::UnboundedReceiver<Frame>,
    handler: HandlerSlot,
    pending: Pending,
    reply_tx: mpsc::UnboundedSender<Frame>,
) {
    while let Some(frame) = rx.recv().await {
        match frame {
            Frame::Request { id, envelope } => {
                let handler = handler.clone();
                let reply_tx = reply_tx.clone();
                tokio::spawn(async move {
                    let outcome = match handler.get() {
                        Some(handler) => handler
                            .handle(envelope)
                            .map_err(|defect| defect.to_string()),
                        None => Err("no handler bound on this endpoint".to_string()),
                    };
                    let _ = reply_tx.send(Frame::Reply { id, outcome });
                });
            }
            Frame::Reply { id, outcome } => match pending.remove(&id) {
                Some((_, tx)) => {
                    let _ = tx.send(outcome);
                }
                None => log::warn!("dropping reply for unknown request {}", id),
            },
        }
    }
}

#[async_trait]
impl Channel for LocalChannel {
    fn bind(&self, handler: Arc<dyn InboundHandler>) {
        if self.handler.set(handler).is_err() {
            log::warn!("ignoring rebind on an already-bound local channel endpoint");
        }
    }

    async fn request(&self, envelope: RequestEnvelope) -> Result<ResponseEnvelope, anyhow::Error> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        if self.peer_tx.send(Frame::Request { id, envelope }).is_err() {
            self.pending.remove(&id);
            anyhow::bail!("peer endpoint is gone");
        }

        match rx.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(defect)) => Err(anyhow::anyhow!("remote dispatch defect: {}", defect)),
            Err(_) => Err(anyhow::anyhow!("channel closed before a response arrived")),
        }
    }
}
