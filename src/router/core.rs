use super::route::{Route, RoutePredicate, RouteTable, RouteTableEntry};
use crate::event::document::EventDocument;
use crate::event::queue::{EventQueue, OfferError};
use crate::helper::base::BuildError;
use crate::observability::logging::LogSink;
use serde_json::Value;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Store key the serialized route table is persisted under.
pub const ROUTES_TABLE_NAME: &str = "internal/routes_table";

/// Compiles a named route definition into an executable predicate. Invoked
/// once per worker so each instance owns its state.
pub trait RouteBuilder: Send + Sync {
    fn build_route(&self, name: &str) -> Result<RoutePredicate, BuildError>;
}

/// Error reported by the environment manager.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EnvironmentError(pub String);

/// Error reported by the snapshot store.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Registry of compiled environments; consumes dispatched events.
pub trait EnvironmentManager: Send + Sync {
    fn add_environment(&self, name: &str) -> Result<(), EnvironmentError>;
    fn delete_environment(&self, name: &str) -> Result<(), EnvironmentError>;
    fn forward_event(
        &self,
        target: &str,
        worker: usize,
        event: EventDocument,
    ) -> Result<(), EnvironmentError>;
}

/// Persistence surface the route table is snapshotted to on every mutation.
pub trait TableStore: Send + Sync {
    fn update(&self, name: &str, table: Value) -> Result<(), StoreError>;
}

/// Error raised by router operations.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("route '{name}' already exists")]
    AlreadyExists { name: String },
    #[error("route '{name}' not found")]
    NotFound { name: String },
    #[error("priority '{priority}' already taken")]
    PriorityTaken { priority: i32 },
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("the intake queue is in high load")]
    HighLoad,
    #[error("the router is not running")]
    NotRunning,
    #[error("the router is already running")]
    AlreadyRunning,
    #[error("environment manager: {0}")]
    Environment(String),
}

/// Worker-pool sizing and liveness cadence.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub workers: usize,
    /// Upper bound on how long a worker blocks on the intake queue before
    /// re-checking the running flag.
    pub dequeue_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            dequeue_timeout: Duration::from_secs(1),
        }
    }
}

type FatalHandler = Arc<dyn Fn(&StoreError) + Send + Sync>;

/// Priority-ordered event dispatcher.
///
/// Owns the route table, a bounded intake queue slot, and a fixed pool of
/// worker threads. Each worker evaluates its own predicate instances, picks
/// the lowest-priority accepting route, and forwards the event to that
/// route's environment with the table lock released.
pub struct Router {
    config: RouterConfig,
    table: Arc<RwLock<RouteTable>>,
    builder: Arc<dyn RouteBuilder>,
    environments: Arc<dyn EnvironmentManager>,
    store: Arc<dyn TableStore>,
    log: LogSink,
    running: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    queue: RwLock<Option<Arc<EventQueue>>>,
    fatal: FatalHandler,
}

impl Router {
    pub fn new(
        config: RouterConfig,
        builder: Arc<dyn RouteBuilder>,
        environments: Arc<dyn EnvironmentManager>,
        store: Arc<dyn TableStore>,
        log: LogSink,
    ) -> Self {
        let config = RouterConfig {
            workers: config.workers.max(1),
            ..config
        };
        let exit_log = log.clone();
        Self {
            config,
            table: Arc::new(RwLock::new(RouteTable::new())),
            builder,
            environments,
            store,
            log,
            running: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
            queue: RwLock::new(None),
            fatal: Arc::new(move |error: &StoreError| {
                exit_log.error(
                    "router",
                    &format!("routes table snapshot failed, terminating: {error}"),
                );
                process::exit(1);
            }),
        }
    }

    /// Worker-pool configuration in effect.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Replaces the handler invoked when a table snapshot cannot be
    /// persisted. The default logs and terminates the process; tests install
    /// a recording handler.
    pub fn set_fatal_handler(&mut self, handler: impl Fn(&StoreError) + Send + Sync + 'static) {
        self.fatal = Arc::new(handler);
    }

    /// Registers a route and its environment, then snapshots the table.
    ///
    /// The predicate is compiled once per worker before any shared state is
    /// touched; a name or priority conflict rolls the environment
    /// registration back.
    pub fn add_route(
        &self,
        name: &str,
        env_name: &str,
        priority: i32,
    ) -> Result<(), RouterError> {
        let mut group = Vec::with_capacity(self.config.workers);
        for _ in 0..self.config.workers {
            let predicate = self.builder.build_route(name)?;
            group.push(Route::new(name, env_name, priority, predicate));
        }

        self.environments
            .add_environment(env_name)
            .map_err(|error| RouterError::Environment(error.to_string()))?;

        {
            let mut table = self.table.write().unwrap();
            let conflict = if table.contains_name(name) {
                Some(RouterError::AlreadyExists {
                    name: name.to_string(),
                })
            } else if table.contains_priority(priority) {
                Some(RouterError::PriorityTaken { priority })
            } else {
                None
            };
            if let Some(error) = conflict {
                drop(table);
                if let Err(env_error) = self.environments.delete_environment(env_name) {
                    self.log.error(
                        "router",
                        &format!("failed to roll back environment '{env_name}': {env_error}"),
                    );
                }
                return Err(error);
            }
            table.insert(group);
        }

        self.snapshot_table();
        Ok(())
    }

    /// Unregisters a route, snapshots the table, and drops its environment.
    pub fn remove_route(&self, name: &str) -> Result<(), RouterError> {
        let target = {
            let mut table = self.table.write().unwrap();
            let group = table.remove(name).ok_or_else(|| RouterError::NotFound {
                name: name.to_string(),
            })?;
            group
                .first()
                .map(|route| route.target().to_string())
                .unwrap_or_default()
        };

        self.snapshot_table();
        self.environments
            .delete_environment(&target)
            .map_err(|error| RouterError::Environment(error.to_string()))
    }

    /// Moves a route to a new priority. A no-op when the priority matches.
    pub fn change_route_priority(
        &self,
        name: &str,
        new_priority: i32,
    ) -> Result<(), RouterError> {
        {
            let mut table = self.table.write().unwrap();
            let old_priority = table.priority_of(name).ok_or_else(|| RouterError::NotFound {
                name: name.to_string(),
            })?;
            if old_priority == new_priority {
                return Ok(());
            }
            if table.contains_priority(new_priority) {
                return Err(RouterError::PriorityTaken {
                    priority: new_priority,
                });
            }
            table.change_priority(name, new_priority);
        }

        self.snapshot_table();
        Ok(())
    }

    /// Current table listing, sorted ascending by priority.
    pub fn get_route_table(&self) -> Vec<RouteTableEntry> {
        self.table.read().unwrap().entries()
    }

    /// Serialized table, as persisted and as listed by the admin surface.
    pub fn table_to_json(&self) -> Value {
        serde_json::to_value(self.get_route_table())
            .expect("route table entries always serialize")
    }

    /// Offers an event to the intake queue without blocking.
    pub fn enqueue_event(&self, event: EventDocument) -> Result<(), RouterError> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(RouterError::NotRunning);
        }
        let guard = self.queue.read().unwrap();
        let queue = guard.as_ref().ok_or(RouterError::NotRunning)?;
        match queue.try_push(event) {
            Ok(()) => Ok(()),
            Err(OfferError::Full(_)) => Err(RouterError::HighLoad),
        }
    }

    /// Installs the intake queue and spawns the worker pool.
    pub fn run(&self, queue: Arc<EventQueue>) -> Result<(), RouterError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RouterError::AlreadyRunning);
        }
        *self.queue.write().unwrap() = Some(Arc::clone(&queue));

        let mut workers = self.workers.lock().unwrap();
        for index in 0..self.config.workers {
            let table = Arc::clone(&self.table);
            let environments = Arc::clone(&self.environments);
            let running = Arc::clone(&self.running);
            let queue = Arc::clone(&queue);
            let log = self.log.clone();
            let timeout = self.config.dequeue_timeout;
            let handle = thread::Builder::new()
                .name(format!("router_worker_{index}"))
                .spawn(move || {
                    worker_loop(index, table, environments, running, queue, log, timeout)
                })
                .expect("failed to spawn router worker");
            workers.push(handle);
        }
        Ok(())
    }

    /// Stops the worker pool. Returns once every worker has observed the
    /// flag and exited. Safe to call when not running.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut workers = self.workers.lock().unwrap();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
        self.log.debug("router", "router stopped");
    }

    pub(super) fn log(&self) -> &LogSink {
        &self.log
    }

    fn snapshot_table(&self) {
        if let Err(error) = self.store.update(ROUTES_TABLE_NAME, self.table_to_json()) {
            self.log.error(
                "router",
                &format!("error updating routes table: {error}"),
            );
            (self.fatal)(&error);
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    index: usize,
    table: Arc<RwLock<RouteTable>>,
    environments: Arc<dyn EnvironmentManager>,
    running: Arc<AtomicBool>,
    queue: Arc<EventQueue>,
    log: LogSink,
    timeout: Duration,
) {
    while running.load(Ordering::Relaxed) {
        let Some(event) = queue.pop_timeout(timeout) else {
            continue;
        };
        // The forward call must not run under the table lock.
        let mut chosen: Option<String> = None;
        {
            let table = table.read().unwrap();
            for group in table.groups() {
                let route = &group[index];
                if route.accept(&event) {
                    chosen = Some(route.target().to_string());
                    break;
                }
            }
        }
        match chosen {
            Some(target) => {
                if let Err(error) = environments.forward_event(&target, index, event) {
                    log.error(
                        "router",
                        &format!("worker {index}: failed to forward event to '{target}': {error}"),
                    );
                }
            }
            None => {
                // Unrouted events are discarded, not errors.
                log.debug("router", &format!("worker {index}: event matched no route"));
            }
        }
    }
    log.debug("router", &format!("worker {index} finished"));
}
