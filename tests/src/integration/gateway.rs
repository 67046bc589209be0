//! # Gateway Wire Mapping
//!
//! Drives the gateway router directly: emit replies always come back HTTP
//! 200 with the outcome in the body, and events emitted over the wire reach
//! in-process listeners.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use relay_bus::{EventHub, EventRelay};
    use relay_gateway::{GatewayConfig, GatewayService};
    use relay_types::{EventSchema, FieldSchema, FieldType, ServiceDefinition};
    use serde_json::json;

    fn definition() -> ServiceDefinition {
        let mut data = BTreeMap::new();
        data.insert("foo".to_string(), FieldSchema::required(FieldType::String));
        data.insert("bar".to_string(), FieldSchema::optional(FieldType::Boolean));
        let mut events = BTreeMap::new();
        events.insert("eventX".to_string(), EventSchema::with_fields(data));
        ServiceDefinition::new(events)
    }

    fn definition_json() -> serde_json::Value {
        serde_json::to_value(definition()).unwrap()
    }

    fn gateway(hub: Arc<EventHub>) -> GatewayService {
        GatewayService::new(GatewayConfig::default(), hub).unwrap()
    }

    fn emit_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/events/emit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn reply_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_emit_success_reply_is_empty_error() {
        let router = gateway(Arc::new(EventHub::new())).router();

        let response = router
            .oneshot(emit_request(json!({
                "service": definition_json(),
                "eventKey": "eventX",
                "eventData": json!({"foo": "hello", "bar": false}).to_string(),
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(reply_body(response).await, json!({"error": ""}));
    }

    #[tokio::test]
    async fn test_emit_validation_failures_surface_in_reply() {
        let router = gateway(Arc::new(EventHub::new())).router();

        let cases = [
            (
                json!({
                    "service": definition_json(),
                    "eventKey": "unknownEvent",
                    "eventData": "{}",
                }),
                "unknown event key: unknownEvent",
            ),
            (
                json!({
                    "service": definition_json(),
                    "eventKey": "eventX",
                    "eventData": "{}",
                }),
                "missing required field: foo",
            ),
            (
                json!({
                    "service": definition_json(),
                    "eventKey": "eventX",
                    "eventData": json!({"foo": 42}).to_string(),
                }),
                "type mismatch for field foo: expected string, got number",
            ),
        ];

        for (body, expected) in cases {
            let response = router.clone().oneshot(emit_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(reply_body(response).await, json!({ "error": expected }));
        }
    }

    #[tokio::test]
    async fn test_emit_over_wire_reaches_in_process_listener() {
        let hub = Arc::new(EventHub::new());
        let router = gateway(Arc::clone(&hub)).router();
        let mut session = hub.open_listen(definition());

        let response = router
            .oneshot(emit_request(json!({
                "service": definition_json(),
                "eventKey": "eventX",
                "eventData": json!({"foo": "hello"}).to_string(),
            })))
            .await
            .unwrap();
        assert_eq!(reply_body(response).await, json!({"error": ""}));

        let envelope = timeout(Duration::from_millis(500), session.recv())
            .await
            .expect("delivery in bounded time")
            .unwrap()
            .unwrap();
        assert_eq!(envelope.key, "eventX");
        assert_eq!(envelope.data["foo"], json!("hello"));
    }

    #[tokio::test]
    async fn test_health_reports_hub_state() {
        let hub = Arc::new(EventHub::new());
        hub.register_service(definition());
        let router = gateway(Arc::clone(&hub)).router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = reply_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["services"], 1);
        assert_eq!(body["events_routed"], 0);
    }
}
