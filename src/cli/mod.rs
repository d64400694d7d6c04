pub mod report;
pub mod session;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;

use crate::{
    config::AppConfig,
    ledger::Ledger,
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

use report::{process_report_command, ReportCommand};
use session::{detect_shutdown, SessionShell};

#[derive(Parser, Debug)]
#[command(name = "Worktally", version, long_about = None)]
#[command(about = "Work timer that attributes elapsed time to orders", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Path to the config file. Defaults to config.toml in the application directory"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run an interactive timer session in this terminal")]
    Session {},
    #[command(about = "Print or export the day-by-order report")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "List every order name recorded so far")]
    Orders {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_dir = create_application_default_path()?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&application_dir, logging_level, args.log)?;

    // A config file passed explicitly must exist, the default location is
    // allowed to be empty.
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(&application_dir.join("config.toml"))?,
    };

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ledger = Ledger::open(
        config.mind.database_path(&application_dir),
        config.mind.collection.clone(),
        clock.clone(),
    )
    .await?;

    match args.commands {
        Commands::Session {} => {
            let shutdown = CancellationToken::new();
            tokio::spawn(detect_shutdown(shutdown.clone()));
            SessionShell::new(&config, ledger, clock).run(shutdown).await
        }
        Commands::Report { command } => process_report_command(command, &ledger, clock).await,
        Commands::Orders {} => {
            for name in ledger.known_activity_names().await? {
                println!("{name}");
            }
            Ok(())
        }
    }
}
