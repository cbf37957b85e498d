//! Store-change notifications.
//!
//! The store list is fetched once per session, so create/update/delete must
//! tell interested components to refetch. An explicit broadcast channel
//! replaces an ambient process-wide event: mutation sites publish, holders of
//! a [`StoreDirectory`] refresh on their next check.

use crate::api::{ApiClient, ApiError};
use crate::model::Store;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Created,
    Updated,
    Removed,
}

#[derive(Clone)]
pub struct StoreEvents {
    tx: broadcast::Sender<StoreChange>,
}

impl StoreEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Delivery is best-effort: with no live subscribers the change is
    /// simply dropped.
    pub fn publish(&self, change: StoreChange) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }
}

impl Default for StoreEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A session-cached store list that refetches when a change was published.
pub struct StoreDirectory {
    stores: Vec<Store>,
    rx: broadcast::Receiver<StoreChange>,
}

impl StoreDirectory {
    pub async fn load(api: &ApiClient, events: &StoreEvents) -> Result<Self, ApiError> {
        let rx = events.subscribe();
        let stores = api.list_stores().await?;
        Ok(Self { stores, rx })
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn find(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    /// Refetch the list if any change notification is pending. Returns
    /// whether a refetch happened.
    pub async fn refresh_if_notified(&mut self, api: &ApiClient) -> Result<bool, ApiError> {
        let mut notified = false;
        loop {
            match self.rx.try_recv() {
                Ok(_) => notified = true,
                Err(broadcast::error::TryRecvError::Lagged(_)) => notified = true,
                Err(_) => break,
            }
        }
        if notified {
            self.stores = api.list_stores().await?;
        }
        Ok(notified)
    }
}
