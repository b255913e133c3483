use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    let matches = ir_testdata::cli::command().get_matches();
    let config = ir_testdata::cli::config_from_matches(&matches);

    tracing::info!(
        "Scanning {} for {} and {}",
        config.ir_cache_dir.display(),
        config.test_conf.display(),
        config.refs_conf.display()
    );

    let report = ir_testdata::run(&config).with_context(|| {
        format!(
            "failed to generate test data from {}",
            config.ir_cache_dir.display()
        )
    })?;

    tracing::info!(
        "Added {} models to {} and {} references to {}",
        report.model_records,
        config.test_conf.display(),
        report.reference_records,
        config.refs_conf.display()
    );
    Ok(())
}
