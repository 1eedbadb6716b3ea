use std::sync::Arc;
use std::time::Duration;

use eventgate::{
    BuildError, EnvironmentError, EnvironmentManager, EventDocument, EventQueue, LogSink,
    RouteBuilder, RoutePredicate, Router, RouterConfig, StoreError, TableStore,
};
use serde_json::{json, Value};

struct AcceptAllBuilder;

impl RouteBuilder for AcceptAllBuilder {
    fn build_route(&self, _name: &str) -> Result<RoutePredicate, BuildError> {
        Ok(Box::new(|_event: &EventDocument| true))
    }
}

struct NullEnvironments;

impl EnvironmentManager for NullEnvironments {
    fn add_environment(&self, _name: &str) -> Result<(), EnvironmentError> {
        Ok(())
    }

    fn delete_environment(&self, _name: &str) -> Result<(), EnvironmentError> {
        Ok(())
    }

    fn forward_event(
        &self,
        _target: &str,
        _worker: usize,
        _event: EventDocument,
    ) -> Result<(), EnvironmentError> {
        Ok(())
    }
}

struct NullStore;

impl TableStore for NullStore {
    fn update(&self, _name: &str, _table: Value) -> Result<(), StoreError> {
        Ok(())
    }
}

fn admin_router() -> Router {
    Router::new(
        RouterConfig {
            workers: 1,
            dequeue_timeout: Duration::from_millis(50),
        },
        Arc::new(AcceptAllBuilder),
        Arc::new(NullEnvironments),
        Arc::new(NullStore),
        LogSink::default(),
    )
}

#[test]
fn set_adds_a_route_and_reports_it() {
    let router = admin_router();
    let response = router.dispatch_command(&json!({
        "action": "set", "name": "r1", "priority": 7, "target": "env1",
    }));
    assert_eq!(response.message, "Route 'r1' added");
    assert_eq!(router.get_route_table().len(), 1);
}

#[test]
fn set_reports_missing_fields_one_at_a_time() {
    let router = admin_router();
    let response = router.dispatch_command(&json!({"action": "set"}));
    assert_eq!(response.message, "Error: Missing \"name\" parameter");

    let response = router.dispatch_command(&json!({"action": "set", "name": "r1"}));
    assert_eq!(response.message, "Error: Missing \"priority\" parameter");

    let response =
        router.dispatch_command(&json!({"action": "set", "name": "r1", "priority": 2}));
    assert_eq!(response.message, "Error: Missing \"target\" parameter");
}

#[test]
fn set_surfaces_operational_errors() {
    let router = admin_router();
    router.add_route("r1", "env1", 7).unwrap();
    let response = router.dispatch_command(&json!({
        "action": "set", "name": "r2", "priority": 7, "target": "env2",
    }));
    assert_eq!(response.message, "Error: priority '7' already taken");
}

#[test]
fn get_returns_the_sorted_table() {
    let router = admin_router();
    router.add_route("low", "env_low", 9).unwrap();
    router.add_route("high", "env_high", 1).unwrap();

    let response = router.dispatch_command(&json!({"action": "get"}));
    assert_eq!(response.message, "Ok");
    assert_eq!(
        response.data,
        Some(json!([
            {"name": "high", "priority": 1, "target": "env_high"},
            {"name": "low", "priority": 9, "target": "env_low"},
        ]))
    );
}

#[test]
fn delete_removes_a_route() {
    let router = admin_router();
    router.add_route("r1", "env1", 1).unwrap();

    let response = router.dispatch_command(&json!({"action": "delete", "name": "r1"}));
    assert_eq!(response.message, "Route 'r1' deleted");
    assert!(router.get_route_table().is_empty());

    let response = router.dispatch_command(&json!({"action": "delete", "name": "r1"}));
    assert_eq!(response.message, "Error: route 'r1' not found");

    let response = router.dispatch_command(&json!({"action": "delete"}));
    assert_eq!(response.message, "Error: Missing \"name\" parameter");
}

#[test]
fn change_priority_reports_the_new_value() {
    let router = admin_router();
    router.add_route("r1", "env1", 1).unwrap();

    let response = router.dispatch_command(&json!({
        "action": "change_priority", "name": "r1", "priority": 4,
    }));
    assert_eq!(response.message, "Route 'r1' priority changed to '4'");
    assert_eq!(router.get_route_table()[0].priority, 4);

    let response = router.dispatch_command(&json!({"action": "change_priority", "name": "r1"}));
    assert_eq!(response.message, "Error: Missing \"priority\" parameter");
}

#[test]
fn enqueue_event_parses_and_offers_the_payload() {
    let router = admin_router();
    router.add_route("all", "env_all", 1).unwrap();

    // The intake is rejected until the pool runs.
    let response = router.dispatch_command(&json!({
        "action": "enqueue_event", "event": "{\"tag\": \"x\"}",
    }));
    assert_eq!(response.message, "Error: the router is not running");

    router.run(Arc::new(EventQueue::new(4))).unwrap();
    let response = router.dispatch_command(&json!({
        "action": "enqueue_event", "event": "{\"tag\": \"x\"}",
    }));
    assert_eq!(response.message, "Ok");

    let response = router.dispatch_command(&json!({
        "action": "enqueue_event", "event": "not json",
    }));
    assert!(response.message.starts_with("Error: "));

    let response = router.dispatch_command(&json!({"action": "enqueue_event"}));
    assert_eq!(response.message, "Error: Missing \"event\" parameter");
    router.stop();
}

#[test]
fn unknown_and_missing_actions_are_reported() {
    let router = admin_router();
    let response = router.dispatch_command(&json!({"action": "reboot"}));
    assert_eq!(response.message, "Invalid action 'reboot'");

    let response = router.dispatch_command(&json!({"name": "r1"}));
    assert_eq!(response.message, "Error: Missing \"action\" parameter");
}

#[test]
fn responses_serialize_with_optional_data() {
    let router = admin_router();
    let listed = router.dispatch_command(&json!({"action": "get"}));
    let wire = serde_json::to_value(&listed).unwrap();
    assert_eq!(wire, json!({"data": [], "message": "Ok"}));

    let message_only = router.dispatch_command(&json!({"action": "reboot"}));
    let wire = serde_json::to_value(&message_only).unwrap();
    assert_eq!(wire, json!({"message": "Invalid action 'reboot'"}));
}
