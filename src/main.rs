use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use function_host::function::{ConverterChain, FunctionRegistry, builtin, global};
use function_host::host::Host;
use function_host::model::config::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging to file (never stdout, which carries results)
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log dir {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, &config.general.log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!("function-host starting");

    let mut registry = FunctionRegistry::new();
    builtin::register_all(&mut registry, &config.function.disabled)?;
    let registry = global::install(registry)?;

    // The default definition may name a disabled function.
    if let Err(err) = registry.resolve(&config.function.definition) {
        tracing::warn!(
            "default definition {} unavailable: {err}",
            config.function.definition
        );
    }

    let host = Host::new(
        registry,
        ConverterChain::with_defaults(),
        config.function.definition.clone(),
    );

    let stdin = io::stdin();
    let result = host.run(stdin.lock(), io::stdout().lock());

    drop(host);
    global::shutdown();

    if let Err(e) = &result {
        tracing::error!("host error: {e:?}");
    }

    result.map(|_| ())
}
