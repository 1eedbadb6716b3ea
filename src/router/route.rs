use crate::event::document::EventDocument;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Compiled route predicate. Built once per worker so it may carry
/// non-shareable scratch state (compiled automata, buffers).
pub type RoutePredicate = Box<dyn FnMut(&EventDocument) -> bool + Send>;

/// One per-worker instance of a route: predicate plus dispatch metadata.
pub struct Route {
    name: String,
    target: String,
    priority: i32,
    predicate: Mutex<RoutePredicate>,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        priority: i32,
        predicate: RoutePredicate,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            priority,
            predicate: Mutex::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Environment the route dispatches to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Evaluates the predicate against an event. Each instance belongs to a
    /// single worker, so the inner lock is never contended.
    pub fn accept(&self, event: &EventDocument) -> bool {
        (self.predicate.lock().unwrap())(event)
    }
}

/// Serialized shape of one route, shared by the persisted snapshot and the
/// administrative listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableEntry {
    pub name: String,
    pub priority: i32,
    pub target: String,
}

/// Priority-ordered set of routes with two consistent indices: name to
/// priority, and priority to the per-worker route group.
///
/// Every name maps to exactly one priority and every priority to exactly one
/// group; the ascending `BTreeMap` order is the dispatch order.
#[derive(Default)]
pub struct RouteTable {
    name_priority: HashMap<String, i32>,
    priority_route: BTreeMap<i32, Vec<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.name_priority.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_priority.is_empty()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.name_priority.contains_key(name)
    }

    pub fn contains_priority(&self, priority: i32) -> bool {
        self.priority_route.contains_key(&priority)
    }

    pub fn priority_of(&self, name: &str) -> Option<i32> {
        self.name_priority.get(name).copied()
    }

    /// Inserts a route group. The caller has already ruled out name and
    /// priority conflicts; the group carries one instance per worker.
    pub fn insert(&mut self, group: Vec<Route>) {
        let (name, priority) = match group.first() {
            Some(route) => (route.name().to_string(), route.priority()),
            None => return,
        };
        self.name_priority.insert(name, priority);
        self.priority_route.insert(priority, group);
    }

    /// Removes the named route, returning its group.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Route>> {
        let priority = self.name_priority.remove(name)?;
        self.priority_route.remove(&priority)
    }

    /// Re-keys the named route under a new priority, updating every
    /// per-worker instance. The caller has already ruled out conflicts.
    pub fn change_priority(&mut self, name: &str, new_priority: i32) {
        let Some(old_priority) = self.name_priority.get(name).copied() else {
            return;
        };
        let Some(mut group) = self.priority_route.remove(&old_priority) else {
            return;
        };
        for route in &mut group {
            route.set_priority(new_priority);
        }
        self.priority_route.insert(new_priority, group);
        self.name_priority.insert(name.to_string(), new_priority);
    }

    /// Route groups in ascending priority order.
    pub fn groups(&self) -> impl Iterator<Item = &Vec<Route>> {
        self.priority_route.values()
    }

    /// Listing of the table sorted ascending by priority.
    pub fn entries(&self) -> Vec<RouteTableEntry> {
        self.priority_route
            .values()
            .filter_map(|group| group.first())
            .map(|route| RouteTableEntry {
                name: route.name().to_string(),
                priority: route.priority(),
                target: route.target().to_string(),
            })
            .collect()
    }
}
