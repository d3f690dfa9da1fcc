//! Live order event feed
//!
//! Best-effort change notification for admin/kitchen dashboards: every
//! order creation and status change publishes an [`OrderEvent`] on a
//! broadcast channel, surfaced to subscribers as SSE. The channel is
//! lossy by design (lagging receivers drop events); dashboards re-read
//! current state on receipt rather than trusting the payload alone.

use serde::Serialize;
use shared::models::OrderStatus;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A change to an order, pushed to subscribed dashboards
#[derive(Debug, Clone, Serialize)]
pub struct OrderEvent {
    pub order_id: Uuid,
    pub restaurant_id: Uuid,
    pub status: OrderStatus,
}

/// Broadcast hub for order events
#[derive(Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderEvent>,
}

impl OrderEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event; silently drops when no dashboard is listening
    pub fn publish(&self, event: OrderEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let events = OrderEvents::new();
        let mut rx = events.subscribe();

        let order_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        events.publish(OrderEvent {
            order_id,
            restaurant_id,
            status: OrderStatus::Confirmed,
        });

        let got = rx.recv().await.unwrap();
        assert_eq!(got.order_id, order_id);
        assert_eq!(got.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let events = OrderEvents::new();
        events.publish(OrderEvent {
            order_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            status: OrderStatus::Pending,
        });
    }
}
