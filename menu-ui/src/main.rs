use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use menu_ui::app::{self, RestaurantApp};
use menu_ui::cli::{self, Cli, Command};
use menu_ui::config::AppConfig;
use menu_ui::logging::LogSettings;
use menu_ui::{logging, shell};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_overrides(cli.overrides());

    logging::init_logging(&LogSettings {
        level: config.log_level.as_deref(),
        console: config.log_console,
        file: config.log_file.as_deref(),
    })?;

    let db_config = config.db_config();
    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry
        .create(&db_config)
        .await
        .with_context(|| format!("failed to open database '{}'", db_config.connection_string))?;

    let mut app = RestaurantApp::load(repo)
        .await
        .context("failed to load restaurant data")?;

    match cli.command {
        Some(Command::Action(action)) => {
            if let Err(e) = cli::run_action(&mut app, action).await {
                warn!(error = %e, "action failed");
                return Err(e.into());
            }
        }
        Some(Command::Shell) | None => {
            info!(database = %db_config.connection_string, "interactive session started");
            let summary = shell::run_script(&mut app, BufReader::new(tokio::io::stdin()))
                .await
                .context("failed to read input")?;
            info!(
                executed = summary.executed,
                failed = summary.failed,
                "interactive session ended"
            );
        }
    }

    Ok(())
}
