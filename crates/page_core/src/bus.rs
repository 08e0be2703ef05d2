//! Message bus between a page and the authoritative store: request/response
//! calls plus a subscribe-to-broadcast primitive with reconnect detection.

use async_trait::async_trait;
use shared::{
    error::ApiError,
    protocol::{Envelope, PageRequest, PageResponse},
};
use store::{BusSignal, StoreHandle};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("store rejected request: {0}")]
    Rejected(ApiError),
    #[error("transport closed")]
    Closed,
    #[error("message bus unavailable")]
    Unavailable,
}

/// Event stream of one page's subscription.
#[derive(Debug, Clone)]
pub enum SubEvent {
    /// Fires once per (re)connection, including the first. When `will_reset`
    /// is true the channel was silently re-established after a transport
    /// reset: the page must refetch full snapshots before trusting further
    /// deliveries.
    Connected { will_reset: bool },
    Deliver(Envelope),
}

/// A page's live broadcast channel. Exactly one per page per lifetime;
/// subscribing twice from the same page is a caller error.
pub struct Subscription {
    rx: broadcast::Receiver<BusSignal>,
    connected_sent: bool,
    alive: bool,
}

impl Subscription {
    fn new(rx: broadcast::Receiver<BusSignal>) -> Self {
        Self {
            rx,
            connected_sent: false,
            alive: true,
        }
    }

    /// Next event in store emission order. No reordering, no deduplication.
    /// Returns `None` once the transport is gone for good.
    pub async fn next(&mut self) -> Option<SubEvent> {
        if !self.alive {
            return None;
        }
        if !self.connected_sent {
            self.connected_sent = true;
            return Some(SubEvent::Connected { will_reset: false });
        }
        match self.rx.recv().await {
            Ok(BusSignal::Deliver(envelope)) => Some(SubEvent::Deliver(envelope)),
            Ok(BusSignal::Reset) => {
                // Re-establish at the tail: anything still queued was emitted
                // before the reset and is superseded.
                self.rx = self.rx.resubscribe();
                Some(SubEvent::Connected { will_reset: true })
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "subscription lagged behind the broadcast; treating as transport reset");
                Some(SubEvent::Connected { will_reset: true })
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.alive = false;
                None
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Asynchronous request/response. No built-in timeout; callers must not
    /// assume failure means non-delivery.
    async fn call(&self, request: PageRequest) -> Result<PageResponse, BusError>;

    async fn subscribe(&self) -> Result<Subscription, BusError>;
}

/// Stand-in for construction without a transport; rejects every call.
pub struct MissingMessageBus;

#[async_trait]
impl MessageBus for MissingMessageBus {
    async fn call(&self, _request: PageRequest) -> Result<PageResponse, BusError> {
        Err(BusError::Unavailable)
    }

    async fn subscribe(&self) -> Result<Subscription, BusError> {
        Err(BusError::Unavailable)
    }
}

/// In-process transport to a local store.
pub struct StoreBus {
    handle: StoreHandle,
}

impl StoreBus {
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl MessageBus for StoreBus {
    async fn call(&self, request: PageRequest) -> Result<PageResponse, BusError> {
        self.handle.call(request).await.map_err(BusError::Rejected)
    }

    async fn subscribe(&self) -> Result<Subscription, BusError> {
        Ok(Subscription::new(self.handle.subscribe()))
    }
}
