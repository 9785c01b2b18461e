//! Command-line interface definitions.
//!
//! Defines the CLI structure for the cellmesh binary using `clap`: starting
//! instances with their dependencies, migrating traffic between versions and
//! inspecting dependency ownership.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cell runtime: dependency-aware instance launches and traffic migration
#[derive(Parser, Debug)]
#[command(name = "cellmesh")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "cellmesh.toml")]
    pub config: PathBuf,

    /// Log level, overriding the configuration (RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the cellmesh CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an instance of an image, resolving its dependencies
    Run(LaunchArgs),

    /// Run the tests of an image against resolved dependencies
    Test(LaunchArgs),

    /// Shift traffic from the current target of a source to a new target
    Route(RouteArgs),

    /// Show the dependency ownership recorded on an instance
    Dependencies(DependenciesArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `cellmesh config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file and print the effective settings.
    Check,
}

/// Arguments shared by `run` and `test`.
#[derive(Parser, Debug, Clone)]
pub struct LaunchArgs {
    /// Image reference, `[registry[:port]/]org/name:version`
    pub image: String,

    /// Name of the root instance
    #[arg(short = 'n', long = "name")]
    pub name: String,

    /// Start dependencies that are not linked to running instances
    #[arg(short = 'd', long = "start-dependencies")]
    pub start_dependencies: bool,

    /// Share running instances of the same image instead of starting new ones
    #[arg(short = 's', long = "share-instances")]
    pub share_instances: bool,

    /// Dependency link, `[<parent-instance>.]<alias>:<dependency-instance>`
    #[arg(short = 'l', long = "link")]
    pub links: Vec<String>,

    /// Environment variable, `[<instance>:]<key>=<value>`
    #[arg(short = 'e', long = "env")]
    pub env: Vec<String>,
}

/// Arguments for `cellmesh route`.
#[derive(Parser, Debug, Clone)]
pub struct RouteArgs {
    /// Instance whose outgoing traffic is shifted
    pub source: String,

    /// Instance currently receiving the traffic
    pub current: String,

    /// Instance to shift traffic to
    pub new: String,

    /// Share of traffic for the new target, 0 to 100
    #[arg(
        short,
        long,
        default_value_t = 100,
        allow_negative_numbers = true
    )]
    pub percentage: i64,

    /// Pin sessions to a version through the x-instance-id header
    #[arg(long)]
    pub session_aware: bool,

    /// Manifest to append to (default: routing.manifest from the configuration)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Apply the manifest to the cluster after writing it
    #[arg(long)]
    pub apply: bool,
}

/// Arguments for `cellmesh dependencies`.
#[derive(Parser, Debug, Clone)]
pub struct DependenciesArgs {
    /// Instance to inspect
    pub instance: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_links_and_env() {
        let cli = Cli::try_parse_from([
            "cellmesh", "run", "org/hr:1.0.0", "-n", "hr-inst", "-d", "-l", "employee:employee-inst",
            "-e", "PORT=80", "-e", "employee-inst:DB=x",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.name, "hr-inst");
        assert!(args.start_dependencies);
        assert!(!args.share_instances);
        assert_eq!(args.links, ["employee:employee-inst"]);
        assert_eq!(args.env.len(), 2);
    }

    #[test]
    fn route_defaults_to_full_shift() {
        let cli = Cli::try_parse_from(["cellmesh", "route", "portal", "v1", "v2"]).unwrap();
        let Commands::Route(args) = cli.command else {
            panic!("expected route");
        };
        assert_eq!(args.percentage, 100);
        assert!(!args.apply);
    }

    #[test]
    fn route_accepts_out_of_range_percentage_for_later_validation() {
        let cli = Cli::try_parse_from(["cellmesh", "route", "portal", "v1", "v2", "-p", "-5"]).unwrap();
        let Commands::Route(args) = cli.command else {
            panic!("expected route");
        };
        assert_eq!(args.percentage, -5);
    }
}
