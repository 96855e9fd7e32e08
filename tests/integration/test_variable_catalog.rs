//! Integration Tests for the Variable Catalog
//!
//! Hierarchy flattening over typed scope listings.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use test_utils::{design_with_hierarchy, start_session, MockEngineConfig, ScopeEntry};
use ucli_driver::Variable;

fn names(vars: &[Variable]) -> Vec<&str> {
    vars.iter().map(|v| v.name.as_str()).collect()
}

#[tokio::test]
async fn test_hierarchy_is_flattened_depth_first() {
    let (session, _engine) = start_session(design_with_hierarchy()).await;

    let vars = session.list_vars().await;
    assert_eq!(
        names(&vars),
        vec![
            "clock",
            "reset",
            "u_core.data",
            "u_core.genblk1[0].bus$a",
            "u_core.genblk1[0].lane",
            "u_core.status",
        ]
    );
    let kinds: Vec<&str> = vars.iter().map(|v| v.kind.as_str()).collect();
    assert_eq!(kinds, vec!["WIRE", "REG", "REG", "WIRE", "REG", "WIRE"]);
    assert!(vars.iter().all(|v| !v.is_instance() && !v.is_placeholder()));
}

#[tokio::test]
async fn test_each_scope_listed_once() {
    let (session, engine) = start_session(design_with_hierarchy()).await;
    let skip = engine.command_count();

    session.list_vars().await;
    assert_eq!(
        engine.commands_since(skip),
        vec![
            "show -type",
            "show -type u_core.*",
            "show -type u_core.genblk1[0].*",
        ]
    );
}

#[tokio::test]
async fn test_listing_is_stable_across_calls() {
    let (session, _engine) = start_session(design_with_hierarchy()).await;

    let first = session.list_vars().await;
    let second = session.catalog().list_vars().await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_flat_design() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    let skip = engine.command_count();

    let vars = session.list_vars().await;
    assert_eq!(
        vars,
        vec![Variable::new("clock", "WIRE"), Variable::new("reset", "REG")]
    );
    assert_eq!(engine.commands_since(skip), vec!["show -type"]);
}

#[tokio::test]
async fn test_repeated_instance_and_signal_entries() {
    let mut design = design_with_hierarchy();
    design.scopes.insert(
        String::new(),
        vec![
            ScopeEntry::new("u_core", "{INSTANCE}"),
            ScopeEntry::new("clock", "{WIRE}"),
            ScopeEntry::new("u_core", "{INSTANCE}"),
            ScopeEntry::new("clock", "{WIRE}"),
        ],
    );
    let (session, engine) = start_session(design).await;
    let skip = engine.command_count();

    let vars = session.list_vars().await;
    assert_eq!(
        names(&vars),
        vec![
            "u_core.data",
            "u_core.genblk1[0].bus$a",
            "u_core.genblk1[0].lane",
            "u_core.status",
            "clock",
        ]
    );
    let scope_queries = engine
        .commands_since(skip)
        .iter()
        .filter(|c| c.as_str() == "show -type u_core.*")
        .count();
    assert_eq!(scope_queries, 1);
}

#[tokio::test]
async fn test_empty_catalog_after_engine_exit() {
    let (session, engine) = start_session(design_with_hierarchy()).await;
    engine.kill();
    let mut state = session.subscribe_state();
    let _ = state.wait_for(|s| s.is_terminal()).await.map(|_| ());

    assert!(session.list_vars().await.is_empty());
}
