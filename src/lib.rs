//! Eventgate engine root crate: priority-routed ingestion of structured
//! events with per-environment transformation pipelines.

pub mod event {
    pub mod document;
    pub mod queue;
    pub mod result;

    pub use document::*;
    pub use queue::*;
    pub use result::*;
}

pub mod helper {
    pub mod array;
    pub mod base;
    pub mod field;
    pub mod hash;
    pub mod net;
    pub mod numeric;
    pub mod pattern;
    pub mod string;
    pub mod time;

    pub use base::*;
}

pub mod router {
    pub mod api;
    pub mod core;
    pub mod route;

    pub use self::api::*;
    pub use self::core::*;
    pub use self::route::*;
}

pub mod observability {
    pub mod logging;

    pub use logging::*;
}

pub mod session;

pub use event::{pointer_of, EventDocument, EventQueue, HelperResult, OfferError, ValueType};
pub use helper::base::{
    BuildError, Helper, HelperBuilder, HelperDefinition, HelperRegistry, Parameter,
    ParameterKind, REFERENCE_ANCHOR,
};
pub use observability::logging::{JsonLineLogger, LogLevel, LogRotationPolicy, LogSink};
pub use router::api::ApiResponse;
pub use router::core::{
    EnvironmentError, EnvironmentManager, RouteBuilder, Router, RouterConfig, RouterError,
    StoreError, TableStore, ROUTES_TABLE_NAME,
};
pub use router::route::{Route, RoutePredicate, RouteTable, RouteTableEntry};
pub use session::{Session, SessionError, SessionManager, SessionSpec};
