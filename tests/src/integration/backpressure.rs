//! # Backpressure Under Slow Consumers
//!
//! Each overflow policy bounds a subscription's buffer in its own way:
//! `DropOldest` keeps the newest events, `DropNewest` keeps the oldest,
//! `Block` makes the emitting call wait for the consumer.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use relay_bus::{EventHub, EventRelay, HubConfig, OverflowPolicy};
    use relay_types::{EventSchema, FieldSchema, FieldType, ServiceDefinition};
    use serde_json::json;

    fn counter_service() -> ServiceDefinition {
        let mut data = BTreeMap::new();
        data.insert("seq".to_string(), FieldSchema::required(FieldType::Number));
        let mut events = BTreeMap::new();
        events.insert("tick".to_string(), EventSchema::with_fields(data));
        ServiceDefinition::new(events)
    }

    fn tick(seq: u64) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("seq".to_string(), json!(seq));
        map
    }

    fn hub(capacity: usize, overflow: OverflowPolicy) -> EventHub {
        EventHub::with_config(HubConfig {
            channel_capacity: capacity,
            overflow,
        })
    }

    #[tokio::test]
    async fn test_drop_oldest_keeps_newest_events() {
        let hub = hub(2, OverflowPolicy::DropOldest);
        let mut session = hub.open_listen(counter_service());

        let mut dropped = 0;
        for seq in 0..4u64 {
            let receipt = hub
                .emit(counter_service(), "tick".to_string(), tick(seq))
                .await
                .expect("emit accepted");
            dropped += receipt.dropped;
        }
        assert_eq!(dropped, 2);

        // The two oldest were discarded; the newest two survive in order.
        for expected in 2..4u64 {
            let envelope = session.recv().await.unwrap().unwrap();
            assert_eq!(envelope.data["seq"], json!(expected));
        }
    }

    #[tokio::test]
    async fn test_drop_newest_keeps_oldest_events() {
        let hub = hub(2, OverflowPolicy::DropNewest);
        let mut session = hub.open_listen(counter_service());

        for seq in 0..4u64 {
            hub.emit(counter_service(), "tick".to_string(), tick(seq))
                .await
                .expect("emit accepted");
        }

        for expected in 0..2u64 {
            let envelope = session.recv().await.unwrap().unwrap();
            assert_eq!(envelope.data["seq"], json!(expected));
        }
    }

    #[tokio::test]
    async fn test_block_suspends_emitter_until_consumed() {
        let hub = Arc::new(hub(1, OverflowPolicy::Block));
        let mut session = hub.open_listen(counter_service());

        hub.emit(counter_service(), "tick".to_string(), tick(0))
            .await
            .expect("emit accepted");

        let blocked = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                hub.emit(counter_service(), "tick".to_string(), tick(1))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!blocked.is_finished(), "emitter should wait for queue space");

        assert_eq!(session.recv().await.unwrap().unwrap().data["seq"], json!(0));

        let receipt = timeout(Duration::from_millis(500), blocked)
            .await
            .expect("emitter unblocked in bounded time")
            .unwrap()
            .expect("emit accepted");
        assert_eq!(receipt.delivered, 1);
        assert_eq!(session.recv().await.unwrap().unwrap().data["seq"], json!(1));
    }

    #[tokio::test]
    async fn test_block_emitter_released_by_listener_cancel() {
        let hub = Arc::new(hub(1, OverflowPolicy::Block));
        let session = hub.open_listen(counter_service());

        hub.emit(counter_service(), "tick".to_string(), tick(0))
            .await
            .expect("emit accepted");

        let blocked = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                hub.emit(counter_service(), "tick".to_string(), tick(1))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Cancelling the only listener must not strand the emitter.
        session.cancel();
        let receipt = timeout(Duration::from_millis(500), blocked)
            .await
            .expect("emitter unblocked in bounded time")
            .unwrap()
            .expect("emit still succeeds");
        assert_eq!(receipt.delivered, 0);
    }
}
