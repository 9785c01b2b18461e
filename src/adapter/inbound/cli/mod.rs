//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod dependencies;
pub mod diagnostic;
pub mod output;
pub mod route;
pub mod run;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::ExecutionMode;

use command::{Cli, Commands, ConfigCommand};
use output::Output;

/// Run the selected command.
pub async fn execute(cli: Cli) -> Result<()> {
    let out = Output::new(cli.json, cli.quiet);

    match &cli.command {
        Commands::Config(ConfigCommand::Check) => config::check(&cli.config, &out),
        Commands::Run(args) => run::execute(&settings(&cli)?, args, ExecutionMode::Run, &out).await,
        Commands::Test(args) => run::execute(&settings(&cli)?, args, ExecutionMode::Test, &out).await,
        Commands::Route(args) => route::execute(&settings(&cli)?, args, &out).await,
        Commands::Dependencies(args) => dependencies::execute(&settings(&cli)?, args, &out).await,
    }
}

/// Load configuration with the global flag overrides and initialize logging.
fn settings(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.json_logs {
        config.logging.format = "json".into();
    }
    config.init_logging();
    Ok(config)
}
