use eventgate::{LogSink, SessionError, SessionManager, SessionSpec};

fn spec(name: &str, policy: &str, route: &str) -> SessionSpec {
    SessionSpec {
        name: name.to_string(),
        policy: policy.to_string(),
        filter: format!("{name}_filter"),
        route: route.to_string(),
        lifespan: 0,
        description: String::new(),
    }
}

#[test]
fn sessions_are_created_with_monotonic_ids() {
    let manager = SessionManager::new(LogSink::default());
    let first = manager.create_session(spec("one", "p1", "r1")).unwrap();
    let second = manager.create_session(spec("two", "p2", "r2")).unwrap();

    assert!(second.session_id() > first.session_id());
    assert_eq!(first.session_name(), "one");
    assert_eq!(first.policy_name(), "p1");
    assert_eq!(first.route_name(), "r1");
    assert_eq!(first.lifespan(), 0);
    assert!(first.creation_date() > 1_500_000_000);
}

#[test]
fn duplicate_session_names_are_rejected() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("dup", "p1", "r1")).unwrap();
    let error = manager.create_session(spec("dup", "p2", "r2")).unwrap_err();
    assert_eq!(
        error,
        SessionError::SessionExists {
            name: "dup".to_string()
        }
    );
}

#[test]
fn a_policy_binds_to_at_most_one_route() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("one", "shared", "r1")).unwrap();
    let error = manager
        .create_session(spec("two", "shared", "r2"))
        .unwrap_err();
    // The error quotes the route the policy is already bound to.
    assert_eq!(
        error,
        SessionError::PolicyBound {
            policy: "shared".to_string(),
            route: "r1".to_string(),
        }
    );
    assert_eq!(manager.len(), 1);
}

#[test]
fn lookups_reflect_the_three_indices() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("s", "p", "r")).unwrap();

    assert!(manager.contains("s"));
    assert!(!manager.contains("ghost"));
    assert_eq!(manager.get_session("s").unwrap().filter_name(), "s_filter");
    assert!(manager.get_session("ghost").is_none());
    assert_eq!(manager.session_of_route("r").as_deref(), Some("s"));
    assert_eq!(manager.route_of_policy("p").as_deref(), Some("r"));
    assert_eq!(manager.sessions(), vec!["s".to_string()]);
}

#[test]
fn deleting_a_session_releases_its_route_and_policy() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("s", "p", "r")).unwrap();

    assert!(manager.delete_session("s"));
    assert!(!manager.delete_session("s"));
    assert!(manager.session_of_route("r").is_none());
    assert!(manager.route_of_policy("p").is_none());

    // The policy is reusable once the owning session is gone.
    manager.create_session(spec("reborn", "p", "r")).unwrap();
}

#[test]
fn delete_all_clears_every_index() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("a", "p1", "r1")).unwrap();
    manager.create_session(spec("b", "p2", "r2")).unwrap();

    manager.delete_all_sessions();
    assert!(manager.is_empty());
    assert!(manager.session_of_route("r1").is_none());
    assert!(manager.route_of_policy("p2").is_none());

    manager.create_session(spec("a", "p1", "r1")).unwrap();
}

#[test]
fn every_bound_policy_and_route_maps_back_to_a_live_session() {
    let manager = SessionManager::new(LogSink::default());
    manager.create_session(spec("a", "p1", "r1")).unwrap();
    manager.create_session(spec("b", "p2", "r2")).unwrap();
    manager.create_session(spec("c", "p3", "r3")).unwrap();
    manager.delete_session("b");

    for name in manager.sessions() {
        let session = manager.get_session(&name).unwrap();
        assert_eq!(
            manager.session_of_route(session.route_name()).as_deref(),
            Some(name.as_str())
        );
        assert_eq!(
            manager.route_of_policy(session.policy_name()).as_deref(),
            Some(session.route_name())
        );
    }
}
