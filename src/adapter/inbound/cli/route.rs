//! Handler for the `route` command.

use crate::adapter::inbound::cli::command::RouteArgs;
use crate::adapter::inbound::cli::output::Output;
use crate::application::routing::RouteRequest;
use crate::domain::id::InstanceName;
use crate::domain::route::RoutingArtifacts;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Compute the migration step, append it to the manifest and optionally apply it.
pub async fn execute(config: &Config, args: &RouteArgs, out: &Output) -> Result<()> {
    let cluster = bootstrap::cluster_client(config);
    let engine = bootstrap::migration_engine(cluster.clone());
    let writer = bootstrap::manifest_writer(config, args.output.as_deref());

    let artifacts = engine.migrate(&build_request(args), &writer).await?;
    print_artifacts(&artifacts, *out);
    out.success(&format!("Manifest written to {}", writer.path().display()));

    if args.apply {
        cluster.apply_manifest(writer.path()).await?;
        out.success("Manifest applied");
    }
    Ok(())
}

fn build_request(args: &RouteArgs) -> RouteRequest {
    RouteRequest {
        source: InstanceName::new(&args.source),
        current: InstanceName::new(&args.current),
        new: InstanceName::new(&args.new),
        percentage: args.percentage,
        session_aware: args.session_aware,
    }
}

fn print_artifacts(artifacts: &RoutingArtifacts, out: Output) {
    out.section("Routing");
    out.field("Rule", &artifacts.rule.metadata.name);
    for route in artifacts.rule.spec.http.iter().filter(|r| r.route.len() > 1) {
        let split = route
            .route
            .iter()
            .map(|d| format!("{} {}%", d.destination.host, d.weight))
            .collect::<Vec<_>>()
            .join(", ");
        out.field("Split", split);
    }
    if let (Some(source), Some(target)) = (&artifacts.source, &artifacts.target) {
        out.field(
            "Ownership",
            format!(
                "{} now depends on {}",
                source.metadata.name,
                out.highlight(&target.metadata.name)
            ),
        );
    }
}
