mod common;

use common::FakeEngine;
use docker_image_builder::{CopyDirection, ExecutionContext, FactCategory, PreconditionError};

#[test]
fn test_unknown_container_is_precondition_error() {
    let engine = FakeEngine::new();
    engine.add_container("other", "base:1.0");
    let gw = common::gateway(&engine);

    match ExecutionContext::new(&gw, "stg") {
        Err(PreconditionError::ContainerNotFound { name }) => assert_eq!(name, "stg"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(engine.mutations().is_empty());
}

#[test]
fn test_run_command_tokenizes_without_shell() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    engine.exec_output("echo hello world | wc", "hello world | wc\n\n");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    let out = ctx.run_command(r#"echo "hello world" | wc"#);
    assert_eq!(out, "hello world | wc");
    assert_eq!(
        engine.calls_with("exec")[0],
        vec!["exec", "stg", "echo", "hello world", "|", "wc"]
    );

    assert_eq!(ctx.run_command("   "), "");
    assert_eq!(engine.calls_with("exec").len(), 1);
}

#[test]
fn test_run_shell_wraps_line() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    ctx.run_shell("ls /etc/*release* | head -1");
    assert_eq!(
        engine.calls_with("exec")[0],
        vec!["exec", "stg", "/bin/sh", "-c", "ls /etc/*release* | head -1"]
    );
}

#[test]
fn test_exec_failure_after_removal_is_empty() {
    let engine = FakeEngine::new();
    let id = engine.add_container("stg", "base:1.0");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    assert!(gw.remove(&[id]));
    assert_eq!(ctx.run_shell("true"), "");
    assert_eq!(ctx.inspect("{{.State.Status}}"), "");
}

#[test]
fn test_copy_direction_prefixes_container_side() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    assert!(ctx.copy_in("./app.tar", "/opt/app.tar"));
    assert!(ctx.copy_out("/etc/os-release", "./os-release"));
    assert!(ctx.copy("a", "b", CopyDirection::In));
    assert_eq!(
        engine.calls_with("cp"),
        vec![
            vec!["cp", "./app.tar", "stg:/opt/app.tar"],
            vec!["cp", "stg:/etc/os-release", "./os-release"],
            vec!["cp", "a", "stg:b"],
        ]
    );
}

#[test]
fn test_inspect_format_is_optional() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    assert_eq!(ctx.inspect("{{.State.Status}}"), "running");
    assert!(ctx.inspect("").starts_with('['));
    assert_eq!(
        engine.calls_with("inspect"),
        vec![
            vec!["inspect", "--format={{.State.Status}}", "stg"],
            vec!["inspect", "stg"],
        ]
    );
}

#[test]
fn test_gather_facts_from_container() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    engine.exec_output(
        "cat /proc/cpuinfo",
        "processor\t: 0\nmodel name\t: Test CPU\nflags\t\t: fpu sse\nprocessor\t: 1\n",
    );
    engine.exec_output("cat /proc/meminfo", "MemTotal:        2048000 kB\nMemFree:  1536 kB\n");
    engine.exec_output("uname -m", "x86_64\n");
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    let facts = ctx.gather_facts(&[FactCategory::Hw, FactCategory::Uname]);
    let cpu = facts.cpu.clone().unwrap();
    assert_eq!(cpu.num_cpus, 2);
    assert_eq!(cpu.cpu_model, "Test CPU");
    assert_eq!(cpu.cpu_flags, vec!["fpu", "sse"]);
    let mem = facts.memory.clone().unwrap();
    assert_eq!(mem.mem_total, Some(2000));
    assert_eq!(mem.mem_free, Some(1));
    assert_eq!(facts.uname.as_ref().unwrap()["machine"], "x86_64");
    assert!(facts.env.is_none());
    assert!(facts.interfaces.is_none());

    // Same engine answers, same facts.
    assert_eq!(ctx.gather_facts(&[FactCategory::Hw, FactCategory::Uname]), facts);
}

#[test]
fn test_release_facts_go_through_the_shell() {
    let engine = FakeEngine::new();
    engine.add_container("stg", "base:1.0");
    engine.exec_output(
        "/bin/sh -c cat /etc/*release*",
        "NAME=\"Alpine Linux\"\nID=alpine\nVERSION_ID=3.19.1\n",
    );
    let gw = common::gateway(&engine);
    let ctx = ExecutionContext::new(&gw, "stg").unwrap();

    let facts = ctx.gather_facts(&[FactCategory::Release]);
    let release = facts.release.unwrap();
    assert_eq!(release["ID"], "alpine");
    assert_eq!(release["NAME"], "\"Alpine Linux\"");
}
