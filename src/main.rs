use clap::Parser;
use invoices_etl::core::ConfigProvider;
use invoices_etl::utils::logger;
use invoices_etl::{
    CliConfig, Command, EtlEngine, EtlError, Job, JobOutcome, LocalStorage, SqliteStore,
};

fn job_for(command: &Command) -> Job {
    match command {
        Command::ImportClients { file } => Job::ImportClients { file: file.clone() },
        Command::ImportInvoices { file } => Job::ImportInvoices { file: file.clone() },
        Command::ImportProducts { file } => Job::ImportProducts { file: file.clone() },
        Command::ExportClients { after, out } => Job::ExportClients {
            after: after.and_time(chrono::NaiveTime::MIN),
            out: out.clone(),
        },
        Command::ExportProducts {
            min_name_length,
            out,
        } => Job::ExportProducts {
            min_name_length: *min_name_length,
            out: out.clone(),
        },
    }
}

async fn build_engine<C: ConfigProvider>(
    settings: &C,
) -> invoices_etl::Result<EtlEngine<SqliteStore, LocalStorage>> {
    let store = match settings.database_path() {
        Some(path) => SqliteStore::open(path).await?,
        None => {
            tracing::warn!("No database configured, imported data is discarded on exit");
            SqliteStore::in_memory().await?
        }
    };

    let input = LocalStorage::new(settings.input_dir().to_string());
    let output = LocalStorage::new(settings.output_dir().to_string());
    Ok(EtlEngine::new(store, input, output, settings.date_style()))
}

async fn run<C: ConfigProvider>(command: &Command, settings: &C) -> invoices_etl::Result<JobOutcome> {
    let engine = build_engine(settings).await?;
    let outcome = engine.run(&job_for(command)).await;
    engine.store().close().await;
    outcome
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };
    if config.verbose {
        tracing::debug!("Effective settings: {:?}", settings);
    }

    match run(&config.command, &settings).await {
        Ok(JobOutcome::Imported { report }) => {
            println!("{}", report);
        }
        Ok(JobOutcome::Exported { path, bytes }) => {
            tracing::info!("📁 Wrote {} bytes to {}", bytes, path);
            println!("✅ Export saved to {}/{}", settings.output_dir, path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
