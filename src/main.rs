use clap::Parser;
use defense_scheduler::config::Command;
use defense_scheduler::domain::model::PresentationId;
use defense_scheduler::utils::error::{DefenseError, ErrorSeverity};
use defense_scheduler::utils::{logger, validation::Validate};
use defense_scheduler::{CliConfig, DefenseEngine, JsonFileStore, ScheduleConfig};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<(), DefenseError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(error: &DefenseError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(error: DefenseError) -> ! {
    tracing::error!(
        "❌ Operation failed: {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());

    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(exit_code(&error));
}

async fn execute(cli: &CliConfig, config: &ScheduleConfig) -> Result<(), DefenseError> {
    let store = JsonFileStore::open(config.store_path()).await?;
    let mut engine = DefenseEngine::new(store);
    if let Some(seed) = config.seed() {
        engine = engine.with_seed(seed);
    }

    match &cli.command {
        Command::Assign => {
            let report = engine.assign_committees().await?;
            print_json(&report)?;
        }
        Command::Schedule => {
            let outcome = engine.schedule(config).await?;
            print_json(&outcome)?;
        }
        Command::Run => {
            let report = engine.assign_committees().await?;
            let outcome = engine.schedule(config).await?;
            print_json(&serde_json::json!({ "assignment": report, "schedule": outcome }))?;
        }
        Command::CheckSwap { first, second } => {
            let clashes = engine
                .check_swap(PresentationId(*first), PresentationId(*second))
                .await?;
            print_json(&clashes)?;
        }
        Command::Swap {
            first,
            second,
            force,
        } => {
            let (first, second) = (PresentationId(*first), PresentationId(*second));
            let clashes = engine.check_swap(first, second).await?;
            if !clashes.is_empty() && !force {
                print_json(&clashes)?;
                eprintln!(
                    "⚠️ Swapping would create {} professor clashes; rerun with --force to swap anyway",
                    clashes.len()
                );
                std::process::exit(4);
            }
            engine.swap(first, second).await?;
            println!("✅ Swapped presentations {} and {}", first, second);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting defense-scheduler");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match ScheduleConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    if let Some(store) = &cli.store {
        config.store.path = store.clone();
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(e);
    }

    if let Err(e) = execute(&cli, &config).await {
        fail(e);
    }

    Ok(())
}
