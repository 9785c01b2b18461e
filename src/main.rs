use clap::Parser;

use cellmesh::adapter::inbound::cli::command::Cli;
use cellmesh::adapter::inbound::cli::diagnostic::CommandError;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    cellmesh::adapter::inbound::cli::execute(cli)
        .await
        .map_err(|e| CommandError::from(e).into())
}
