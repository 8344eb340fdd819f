use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use docker_image_builder::{
    color_enabled_stderr, exit_code_for_build_error, exit_code_for_io_error, set_color_mode,
    BuildError, BuildOutcome, BuildPlan, DataLoader, DockerGateway, ExecutionContext, FactCategory,
    Logger, RoutineLoader, RoutineRegistry, Settings, StagingOrchestrator,
};

mod cli;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        set_color_mode(mode);
    }
    let log = docker_image_builder::logging::init(
        &cli.log_level,
        cli.log_format,
        color_enabled_stderr(),
    );

    if let Command::Halt { containers, all } = &cli.command {
        if containers.is_empty() && !all {
            log.in_scope(|| error!("halt needs at least one --container or --all"));
            return ExitCode::from(1);
        }
    }

    let routine_paths = match &cli.command {
        Command::Build { routine_paths, .. } => routine_paths.clone(),
        _ => Vec::new(),
    };
    let settings = Settings::from_env(&routine_paths);

    let engine = match settings.engine() {
        Ok(engine) => engine,
        Err(e) => {
            log.in_scope(|| error!(error = %e, "container engine unavailable"));
            return ExitCode::from(exit_code_for_io_error(&e));
        }
    };
    let gateway = DockerGateway::new(Arc::new(engine), &log);

    let code = match cli.command {
        Command::Run {
            image,
            container,
            rerun,
            volumes,
        } => run_container(&gateway, &settings, &log, &image, &container, rerun, &volumes),
        Command::Build {
            source,
            container,
            target,
            routine,
            rerun,
            remove_staging,
            extra_vars,
            volumes,
            ..
        } => {
            let plan = BuildPlan {
                source_image: source,
                container_name: container,
                target_image: target,
                routine,
                rerun,
                remove_staging,
                volumes,
            };
            build(gateway, &settings, &log, &plan, &extra_vars)
        }
        Command::Halt { containers, all } => {
            orchestrator(gateway, &settings, &log).halt(&containers, all);
            0
        }
        Command::Facts {
            container,
            categories,
        } => print_facts(&gateway, &log, &container, &categories),
    };
    ExitCode::from(code)
}

fn orchestrator(gateway: DockerGateway, settings: &Settings, log: &Logger) -> StagingOrchestrator {
    let loader = RoutineLoader::new(
        settings.routine_paths.clone(),
        RoutineRegistry::with_builtins(),
        log,
    );
    StagingOrchestrator::new(gateway, loader, log)
}

fn run_container(
    gateway: &DockerGateway,
    settings: &Settings,
    log: &Logger,
    image: &str,
    container: &str,
    rerun: bool,
    volumes: &[String],
) -> u8 {
    let orch = orchestrator(gateway.clone(), settings, log);
    match orch.run_container(image, container, rerun, volumes) {
        Ok(_) => 0,
        Err(e) => {
            let e = BuildError::from(e);
            log.in_scope(|| error!(error = %e, "run aborted"));
            exit_code_for_build_error(&e)
        }
    }
}

fn build(
    gateway: DockerGateway,
    settings: &Settings,
    log: &Logger,
    plan: &BuildPlan,
    extra_vars: &[String],
) -> u8 {
    let vars = match DataLoader::new(log).load_all(extra_vars) {
        Ok(v) => v,
        Err(e) => {
            let e = BuildError::from(e);
            log.in_scope(|| error!(error = %e, "cannot load variables"));
            return exit_code_for_build_error(&e);
        }
    };
    let orch = orchestrator(gateway, settings, log);
    match orch.build(plan, &vars) {
        Ok(outcome) => {
            if let BuildOutcome::Committed { image_id, .. } = &outcome {
                println!("{image_id}");
            }
            outcome.exit_code()
        }
        Err(e) => {
            log.in_scope(|| error!(error = %e, "build aborted"));
            exit_code_for_build_error(&e)
        }
    }
}

fn print_facts(
    gateway: &DockerGateway,
    log: &Logger,
    container: &str,
    categories: &[FactCategory],
) -> u8 {
    let ctx = match ExecutionContext::new(gateway, container) {
        Ok(ctx) => ctx,
        Err(e) => {
            log.in_scope(|| error!(error = %e, "cannot gather facts"));
            return 1;
        }
    };
    let categories = if categories.is_empty() {
        vec![FactCategory::All]
    } else {
        categories.to_vec()
    };
    let facts = ctx.gather_facts(&categories);
    match serde_json::to_string_pretty(&facts) {
        Ok(s) => {
            println!("{s}");
            log.in_scope(|| info!(container, "facts printed"));
            0
        }
        Err(e) => {
            log.in_scope(|| error!(error = %e, "cannot serialize facts"));
            1
        }
    }
}
