use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::entities::load::LoadType;

/// Domain events emitted by the services after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Load events
    LoadProcessed {
        load_id: Uuid,
        load_type: LoadType,
        total_sheets: u64,
        total_transactions: u64,
    },
    LoadReverted {
        load_id: Uuid,
        reverted_sheets: u64,
        reverted_transactions: u64,
    },

    // Client events
    ClientCreated(Uuid),
    ClientUpdated(Uuid),
    ClientDeleted(Uuid),

    // Product events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),

    // Category events
    CategoryCreated(Uuid),
    CategoryUpdated(Uuid),
    CategoryDeleted(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Background consumer draining the event channel. Events are observational
/// only; the transaction that produced them has already committed.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LoadProcessed {
                load_id,
                load_type,
                total_sheets,
                total_transactions,
            } => {
                info!(
                    load_id = %load_id,
                    load_type = load_type.as_str(),
                    total_sheets,
                    total_transactions,
                    "load processed"
                );
            }
            Event::LoadReverted {
                load_id,
                reverted_sheets,
                reverted_transactions,
            } => {
                info!(
                    load_id = %load_id,
                    reverted_sheets,
                    reverted_transactions,
                    "load reverted"
                );
            }
            other => {
                info!(event = ?other, "domain event");
            }
        }
    }
}
