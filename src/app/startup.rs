//! Application startup
//!
//! Parses arguments, loads configuration, starts logging and then hands the
//! registry to the supervisor until a teardown completes.

use crate::app::cli::Args;
use crate::app::config::RuntimeConfig;
use crate::app::supervisor::Supervisor;
use crate::core::logging::init_logging;
use crate::core::signals::SignalTrigger;
use crate::core::version;
use crate::module::api::{BuiltinModuleSource, ModuleSource};
use crate::registry::api::ServiceRegistry;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

/// Run the application to completion
pub fn startup() -> ExitCode {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: could not start the async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::log_enabled!(log::Level::Error) {
                log::error!("{}", e);
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = RuntimeConfig::resolve(&args).await?;

    init_logging(
        &config.log.level,
        config.log.format,
        config.log.file.as_deref(),
        config.color_enabled(),
    )?;
    log::info!(
        "hotmod {} starting (module API {}, built {} from {})",
        env!("CARGO_PKG_VERSION"),
        version::get_api_version(),
        version::build_time(),
        version::git_hash()
    );
    log::debug!("Effective configuration: {:?}", config);

    let source = BuiltinModuleSource::with_excludes(&config.exclude_modules);

    if args.list_modules {
        list_modules(&source);
        return Ok(());
    }

    let registry = ServiceRegistry::with_config(Arc::new(source), config.registry_config());
    let supervisor = Supervisor::new(registry).with_config_reload(args);
    let trigger = SignalTrigger::install(supervisor.handle());

    let summary = supervisor.run().await?;
    log::info!(
        "Shutdown complete after {} transitions{}",
        summary.epoch,
        if trigger.shutdown_requested() {
            " (signal)"
        } else {
            ""
        }
    );
    Ok(())
}

fn list_modules(source: &dyn ModuleSource) {
    let mut modules = source.available_modules();
    modules.sort_by(|a, b| a.name().cmp(b.name()));
    for module in modules {
        println!("{:<16} {}", module.name(), module.api_version());
    }
}
