mod common;

use common::FakeEngine;
use docker_image_builder::{Logger, RoutineLoader, RoutineRegistry, StagingOrchestrator};

fn orchestrator(engine: &std::sync::Arc<FakeEngine>) -> StagingOrchestrator {
    let loader = RoutineLoader::new(Vec::new(), RoutineRegistry::new(), &Logger::disabled());
    StagingOrchestrator::new(common::gateway(engine), loader, &Logger::disabled())
}

#[test]
fn test_halt_by_name_and_id() {
    let engine = FakeEngine::new();
    let a = engine.add_container("stg", "base:1.0");
    let b = engine.add_container("web", "nginx:1.25");
    let keep = engine.add_container("db", "postgres:16");

    let remaining = orchestrator(&engine).halt(&["stg".to_string(), b.clone()], false);
    assert_eq!(remaining, vec![keep]);
    assert_eq!(engine.calls_with("stop")[0], vec!["stop".to_string(), a.clone(), b.clone()]);
    assert_eq!(engine.calls_with("rm")[0], vec!["rm".to_string(), a, b]);
}

#[test]
fn test_halt_all() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    engine.add_container("web", "nginx:1.25");

    let remaining = orchestrator(&engine).halt(&[], true);
    assert!(remaining.is_empty());
    assert!(engine.containers().is_empty());
}

#[test]
fn test_halt_unknown_target_is_logged_failure() {
    let engine = FakeEngine::new();
    let keep = engine.add_container("stg", "base:1.0");

    let remaining = orchestrator(&engine).halt(&["ghost".to_string()], false);
    assert_eq!(remaining, vec![keep]);
    assert_eq!(engine.calls_with("stop")[0], vec!["stop", "ghost"]);
}

#[test]
fn test_halt_sends_each_id_once() {
    let engine = FakeEngine::new();
    let stg = engine.add_container("stg", "base:1.0");
    let other = engine.add_container("other", "base:1.0");

    let remaining = orchestrator(&engine).halt(
        &["stg".to_string(), "other".to_string(), stg.clone()],
        false,
    );
    assert!(remaining.is_empty());
    assert_eq!(
        engine.calls_with("stop")[0],
        vec!["stop".to_string(), stg.clone(), other.clone()]
    );
    assert_eq!(engine.calls_with("rm")[0], vec!["rm".to_string(), stg, other]);
}
