//! Administrative command surface, dispatched on an `action` string.

use super::core::Router;
use crate::event::document::EventDocument;
use serde::Serialize;
use serde_json::Value;

/// Structured reply returned to the administrative transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
}

impl ApiResponse {
    /// Reply carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
        }
    }

    /// Reply carrying a payload and a message.
    pub fn with_data(data: Value, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            message: message.into(),
        }
    }
}

fn missing_parameter(field: &str) -> ApiResponse {
    ApiResponse::message(format!("Error: Missing \"{field}\" parameter"))
}

fn get_str<'a>(params: &'a Value, field: &str) -> Option<&'a str> {
    params.get(field).and_then(Value::as_str)
}

fn get_int(params: &Value, field: &str) -> Option<i32> {
    params
        .get(field)
        .and_then(Value::as_i64)
        .and_then(|value| i32::try_from(value).ok())
}

impl Router {
    /// Entry point for the administrative request/response transport.
    pub fn dispatch_command(&self, params: &Value) -> ApiResponse {
        let action = match get_str(params, "action") {
            Some(action) => action,
            None => return missing_parameter("action"),
        };
        match action {
            "set" => self.api_set_route(params),
            "get" => self.api_get_routes(),
            "delete" => self.api_delete_route(params),
            "change_priority" => self.api_change_route_priority(params),
            "enqueue_event" => self.api_enqueue_event(params),
            other => ApiResponse::message(format!("Invalid action '{other}'")),
        }
    }

    fn api_set_route(&self, params: &Value) -> ApiResponse {
        let Some(name) = get_str(params, "name") else {
            return missing_parameter("name");
        };
        let Some(priority) = get_int(params, "priority") else {
            return missing_parameter("priority");
        };
        let Some(target) = get_str(params, "target") else {
            return missing_parameter("target");
        };
        match self.add_route(name, target, priority) {
            Ok(()) => ApiResponse::message(format!("Route '{name}' added")),
            Err(error) => ApiResponse::message(format!("Error: {error}")),
        }
    }

    fn api_get_routes(&self) -> ApiResponse {
        ApiResponse::with_data(self.table_to_json(), "Ok")
    }

    fn api_delete_route(&self, params: &Value) -> ApiResponse {
        let Some(name) = get_str(params, "name") else {
            return missing_parameter("name");
        };
        match self.remove_route(name) {
            Ok(()) => ApiResponse::message(format!("Route '{name}' deleted")),
            Err(error) => ApiResponse::message(format!("Error: {error}")),
        }
    }

    fn api_change_route_priority(&self, params: &Value) -> ApiResponse {
        let Some(name) = get_str(params, "name") else {
            return missing_parameter("name");
        };
        let Some(priority) = get_int(params, "priority") else {
            return missing_parameter("priority");
        };
        match self.change_route_priority(name, priority) {
            Ok(()) => {
                ApiResponse::message(format!("Route '{name}' priority changed to '{priority}'"))
            }
            Err(error) => ApiResponse::message(format!("Error: {error}")),
        }
    }

    fn api_enqueue_event(&self, params: &Value) -> ApiResponse {
        let Some(raw) = get_str(params, "event") else {
            return missing_parameter("event");
        };
        let event = match EventDocument::parse(raw) {
            Ok(event) => event,
            Err(error) => {
                self.log()
                    .debug("router", &format!("rejected ingress payload: {error}"));
                return ApiResponse::message(format!("Error: {error}"));
            }
        };
        match self.enqueue_event(event) {
            Ok(()) => ApiResponse::message("Ok"),
            Err(error) => ApiResponse::message(format!("Error: {error}")),
        }
    }
}
