//! # End-to-End Relay Flows
//!
//! Emit → validate → fan-out → listen, across relay-types and relay-bus,
//! exercised the way independently running services would drive the hub.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use relay_bus::{EventHub, EventRelay, HubConfig, OverflowPolicy};
    use relay_types::{EventSchema, FieldSchema, FieldType, ServiceDefinition};
    use serde_json::json;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// A service declaring `eventX(foo: String, bar?: Boolean)` and
    /// `tick(seq: Number)`.
    fn chat_service() -> ServiceDefinition {
        let mut event_x = BTreeMap::new();
        event_x.insert("foo".to_string(), FieldSchema::required(FieldType::String));
        event_x.insert("bar".to_string(), FieldSchema::optional(FieldType::Boolean));

        let mut tick = BTreeMap::new();
        tick.insert("seq".to_string(), FieldSchema::required(FieldType::Number));

        let mut events = BTreeMap::new();
        events.insert("eventX".to_string(), EventSchema::with_fields(event_x));
        events.insert("tick".to_string(), EventSchema::with_fields(tick));
        ServiceDefinition::new(events)
    }

    /// A structurally different service, to prove emissions do not cross.
    fn metrics_service() -> ServiceDefinition {
        let mut sample = BTreeMap::new();
        sample.insert("value".to_string(), FieldSchema::required(FieldType::Number));
        let mut events = BTreeMap::new();
        events.insert("sample".to_string(), EventSchema::with_fields(sample));
        ServiceDefinition::new(events)
    }

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn tick(seq: u64) -> serde_json::Map<String, serde_json::Value> {
        object(json!({ "seq": seq }))
    }

    const RECV_BOUND: Duration = Duration::from_millis(500);

    // =============================================================================
    // SINGLE LISTENER
    // =============================================================================

    #[tokio::test]
    async fn test_listener_receives_exactly_one_matching_event() {
        let hub = EventHub::new();
        let mut session = hub.open_listen(chat_service());

        let payload = object(json!({"foo": "hello", "bar": false}));
        hub.emit(chat_service(), "eventX".to_string(), payload.clone())
            .await
            .expect("emit accepted");

        let envelope = timeout(RECV_BOUND, session.recv())
            .await
            .expect("delivery in bounded time")
            .expect("stream open")
            .expect("no stream error");
        assert_eq!(envelope.key, "eventX");
        assert_eq!(envelope.data, payload);

        // Exactly one: nothing further arrives.
        let nothing = timeout(Duration::from_millis(50), session.recv()).await;
        assert!(nothing.is_err(), "no second delivery expected");
    }

    #[tokio::test]
    async fn test_rejected_emit_reaches_no_listener() {
        let hub = EventHub::new();
        let mut session = hub.open_listen(chat_service());

        let err = hub
            .emit(
                chat_service(),
                "unknownEvent".to_string(),
                object(json!({"foo": "hello"})),
            )
            .await
            .expect_err("unknown key rejected");
        assert_eq!(err.to_string(), "unknown event key: unknownEvent");

        let nothing = timeout(Duration::from_millis(50), session.recv()).await;
        assert!(nothing.is_err(), "rejected event must not be delivered");
    }

    #[tokio::test]
    async fn test_events_before_registration_not_delivered() {
        let hub = EventHub::new();
        hub.emit(chat_service(), "tick".to_string(), tick(0))
            .await
            .expect("emit accepted");

        let mut session = hub.open_listen(chat_service());
        hub.emit(chat_service(), "tick".to_string(), tick(1))
            .await
            .expect("emit accepted");

        let envelope = timeout(RECV_BOUND, session.recv())
            .await
            .expect("delivery in bounded time")
            .unwrap()
            .unwrap();
        assert_eq!(envelope.data["seq"], json!(1));
    }

    #[tokio::test]
    async fn test_emissions_do_not_cross_services() {
        let hub = EventHub::new();
        let mut chat = hub.open_listen(chat_service());
        let mut metrics = hub.open_listen(metrics_service());

        hub.emit(
            metrics_service(),
            "sample".to_string(),
            object(json!({"value": 42})),
        )
        .await
        .expect("emit accepted");

        let envelope = timeout(RECV_BOUND, metrics.recv())
            .await
            .expect("delivery in bounded time")
            .unwrap()
            .unwrap();
        assert_eq!(envelope.key, "sample");

        let nothing = timeout(Duration::from_millis(50), chat.recv()).await;
        assert!(nothing.is_err(), "chat listener must not see metrics events");
    }

    // =============================================================================
    // FAN-OUT
    // =============================================================================

    #[tokio::test]
    async fn test_two_concurrent_listeners_both_receive_everything() {
        let hub = Arc::new(EventHub::new());
        let mut first = hub.open_listen(chat_service());
        let mut second = hub.open_listen(chat_service());

        for seq in 0..5u64 {
            let receipt = hub
                .emit(chat_service(), "tick".to_string(), tick(seq))
                .await
                .expect("emit accepted");
            assert_eq!(receipt.delivered, 2);
        }

        for session in [&mut first, &mut second] {
            for expected in 0..5u64 {
                let envelope = timeout(RECV_BOUND, session.recv())
                    .await
                    .expect("delivery in bounded time")
                    .unwrap()
                    .unwrap();
                assert_eq!(envelope.data["seq"], json!(expected));
            }
        }
    }

    #[tokio::test]
    async fn test_per_emitter_order_preserved_under_concurrency() {
        let hub = Arc::new(EventHub::new());
        let mut chat = hub.open_listen(chat_service());
        let mut metrics = hub.open_listen(metrics_service());

        let chat_emitter = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for seq in 0..20u64 {
                    hub.emit(chat_service(), "tick".to_string(), tick(seq))
                        .await
                        .expect("emit accepted");
                }
            })
        };
        let metrics_emitter = {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move {
                for value in 0..20u64 {
                    hub.emit(
                        metrics_service(),
                        "sample".to_string(),
                        object(json!({"value": value})),
                    )
                    .await
                    .expect("emit accepted");
                }
            })
        };
        chat_emitter.await.unwrap();
        metrics_emitter.await.unwrap();

        for expected in 0..20u64 {
            let envelope = timeout(RECV_BOUND, chat.recv())
                .await
                .expect("delivery in bounded time")
                .unwrap()
                .unwrap();
            assert_eq!(envelope.data["seq"], json!(expected));
        }
        for expected in 0..20u64 {
            let envelope = timeout(RECV_BOUND, metrics.recv())
                .await
                .expect("delivery in bounded time")
                .unwrap()
                .unwrap();
            assert_eq!(envelope.data["value"], json!(expected));
        }
    }

    // =============================================================================
    // CANCELLATION & LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_cancelled_listener_is_removed_and_silent() {
        let hub = EventHub::new();
        let cancelled = hub.open_listen(chat_service());
        let mut surviving = hub.open_listen(chat_service());
        assert_eq!(hub.subscription_count(), 2);

        cancelled.cancel();
        assert_eq!(hub.subscription_count(), 1);

        let receipt = hub
            .emit(chat_service(), "tick".to_string(), tick(7))
            .await
            .expect("emit accepted");
        assert_eq!(receipt.delivered, 1);

        let envelope = timeout(RECV_BOUND, surviving.recv())
            .await
            .expect("delivery in bounded time")
            .unwrap()
            .unwrap();
        assert_eq!(envelope.data["seq"], json!(7));
    }

    #[tokio::test]
    async fn test_shutdown_after_cancel_is_harmless() {
        let hub = EventHub::new();
        let session = hub.open_listen(chat_service());
        session.cancel();

        // Double removal of the same handle must be a no-op.
        hub.shutdown();
        hub.shutdown();
        assert_eq!(hub.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_new_session_after_shutdown_works() {
        let hub = EventHub::new();
        let mut old = hub.open_listen(chat_service());
        hub.shutdown();
        assert!(old.recv().await.is_none());

        let mut fresh = hub.open_listen(chat_service());
        hub.emit(chat_service(), "tick".to_string(), tick(1))
            .await
            .expect("emit accepted");
        let envelope = timeout(RECV_BOUND, fresh.recv())
            .await
            .expect("delivery in bounded time")
            .unwrap()
            .unwrap();
        assert_eq!(envelope.data["seq"], json!(1));
    }

    // =============================================================================
    // STREAM INTERFACE
    // =============================================================================

    #[tokio::test]
    async fn test_stream_combinators_over_session() {
        let hub = EventHub::with_config(HubConfig {
            channel_capacity: 16,
            overflow: OverflowPolicy::DropOldest,
        });
        let stream = hub.open_listen(chat_service()).into_stream();

        for seq in 0..3u64 {
            hub.emit(chat_service(), "tick".to_string(), tick(seq))
                .await
                .expect("emit accepted");
        }

        let keys: Vec<_> = timeout(RECV_BOUND, stream.take(3).collect::<Vec<_>>())
            .await
            .expect("delivery in bounded time")
            .into_iter()
            .map(|item| item.expect("no stream error").key.clone())
            .collect();
        assert_eq!(keys, vec!["tick", "tick", "tick"]);
    }
}
