//! Registry of named test sessions binding policies, filters, and routes.

use crate::observability::logging::LogSink;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Error raised while creating a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session name '{name}' already exists")]
    SessionExists { name: String },
    #[error("policy '{policy}' is already assigned to route '{route}'")]
    PolicyBound { policy: String, route: String },
}

/// Request shape for creating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    pub name: String,
    pub policy: String,
    pub filter: String,
    pub route: String,
    /// Seconds the session should live; 0 means unbounded.
    pub lifespan: u32,
    pub description: String,
}

/// Immutable record of an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: u32,
    session_name: String,
    policy_name: String,
    filter_name: String,
    route_name: String,
    lifespan: u32,
    description: String,
    creation_date: u64,
}

impl Session {
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    /// Seconds the session should live; 0 means unbounded.
    pub fn lifespan(&self) -> u32 {
        self.lifespan
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Wall-clock epoch seconds captured at construction.
    pub fn creation_date(&self) -> u64 {
        self.creation_date
    }
}

#[derive(Default)]
struct SessionState {
    active_sessions: HashMap<String, Session>,
    route_map: HashMap<String, String>,
    policy_map: HashMap<String, String>,
}

/// Process-wide session registry.
///
/// An ordinary owning handle constructed once at application wiring and
/// cloned to collaborators; readers take the shared lock, mutators the
/// exclusive one. Enforces name uniqueness and the one-route-per-policy
/// invariant across all live sessions.
#[derive(Clone)]
pub struct SessionManager {
    state: Arc<RwLock<SessionState>>,
    next_id: Arc<AtomicU32>,
    log: LogSink,
}

impl SessionManager {
    pub fn new(log: LogSink) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            next_id: Arc::new(AtomicU32::new(1)),
            log,
        }
    }

    /// Creates a session, enforcing name and policy uniqueness. All three
    /// indices are updated under one exclusive-lock section.
    pub fn create_session(&self, spec: SessionSpec) -> Result<Session, SessionError> {
        let mut state = self.state.write().unwrap();

        if state.active_sessions.contains_key(&spec.name) {
            return Err(SessionError::SessionExists { name: spec.name });
        }
        if let Some(route) = state.policy_map.get(&spec.policy) {
            return Err(SessionError::PolicyBound {
                policy: spec.policy,
                route: route.clone(),
            });
        }

        let session = Session {
            session_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            session_name: spec.name.clone(),
            policy_name: spec.policy.clone(),
            filter_name: spec.filter,
            route_name: spec.route.clone(),
            lifespan: spec.lifespan,
            description: spec.description,
            creation_date: epoch_seconds(),
        };

        state
            .active_sessions
            .insert(spec.name.clone(), session.clone());
        state.route_map.insert(spec.route, spec.name);
        state.policy_map.insert(spec.policy, session.route_name.clone());

        self.log.debug(
            "session",
            &format!(
                "session created: id={}, name={}, policy={}, route={}, lifespan={}",
                session.session_id,
                session.session_name,
                session.policy_name,
                session.route_name,
                session.lifespan,
            ),
        );

        Ok(session)
    }

    /// Returns the session record under the name, if any.
    pub fn get_session(&self, name: &str) -> Option<Session> {
        self.state.read().unwrap().active_sessions.get(name).cloned()
    }

    /// Names of every active session.
    pub fn sessions(&self) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .active_sessions
            .keys()
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .active_sessions
            .contains_key(name)
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.state.read().unwrap().active_sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes one session and its route/policy bindings atomically.
    /// Returns false when the name is unknown.
    pub fn delete_session(&self, name: &str) -> bool {
        let mut state = self.state.write().unwrap();
        let Some(session) = state.active_sessions.remove(name) else {
            return false;
        };
        state.route_map.remove(session.route_name());
        state.policy_map.remove(session.policy_name());
        true
    }

    /// Clears all three indices in one exclusive-lock section.
    pub fn delete_all_sessions(&self) {
        let mut state = self.state.write().unwrap();
        state.active_sessions.clear();
        state.route_map.clear();
        state.policy_map.clear();
    }

    /// Session name bound to a route, if any.
    pub fn session_of_route(&self, route: &str) -> Option<String> {
        self.state.read().unwrap().route_map.get(route).cloned()
    }

    /// Route a policy is bound to, if any.
    pub fn route_of_policy(&self, policy: &str) -> Option<String> {
        self.state.read().unwrap().policy_map.get(policy).cloned()
    }
}

fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
