use clap::Parser;
use hall_directory::utils::error::{ErrorSeverity, HallError};
use hall_directory::utils::logger::{self, LogFormat};
use hall_directory::utils::validation::Validate;
use hall_directory::{CliArgs, EtlEngine, HallPipeline, LocalStorage, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_logger(LogFormat::from_flag(args.json_logs), args.verbose);

    tracing::info!("Starting hall-directory");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.load_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("DRY RUN MODE - configuration is valid, nothing was fetched");
        return Ok(());
    }

    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = match HallPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            tracing::info!("Hall directory completed successfully");
            println!(
                "{} halls, {} games, {} warnings",
                report.halls, report.games, report.warnings
            );
            println!("Output saved to: {}", report.output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("Configuration summary:");
    for line in config.summary() {
        tracing::info!("  {}", line);
    }
}

fn exit_with(e: &HallError) -> ! {
    tracing::error!(
        "Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
