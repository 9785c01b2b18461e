//! Handler for the `run` and `test` commands.

use crate::adapter::inbound::cli::command::LaunchArgs;
use crate::adapter::inbound::cli::output::Output;
use crate::application::launch::LaunchRequest;
use crate::application::topology::ResolvedTopology;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::ExecutionMode;

/// Resolve the topology of `args` and hand it to the runtime.
pub async fn execute(
    config: &Config,
    args: &LaunchArgs,
    mode: ExecutionMode,
    out: &Output,
) -> Result<()> {
    let cluster = bootstrap::cluster_client(config);
    let launcher = bootstrap::launcher(config, cluster);

    let resolved = launcher.launch(&build_request(args, mode)).await?;
    print_topology(&resolved, mode, *out);
    Ok(())
}

fn build_request(args: &LaunchArgs, mode: ExecutionMode) -> LaunchRequest {
    LaunchRequest {
        mode,
        image: args.image.clone(),
        instance: args.name.clone(),
        links: args.links.clone(),
        env: args.env.clone(),
        start_dependencies: args.start_dependencies,
        share_all_instances: args.share_instances,
    }
}

fn print_topology(resolved: &ResolvedTopology, mode: ExecutionMode, out: Output) {
    let root = resolved.topology.root();
    out.section("Instance");
    out.field("Instance", out.highlight(&root.instance));
    out.field("Image", root.identity());
    out.field("Mode", mode);

    out.section("Dependencies");
    out.block("topology", &resolved.topology.to_string());
    for alias in &resolved.unresolved {
        out.warning(&format!("alias '{alias}' is not linked; the runtime fails if it is required"));
    }

    let started = resolved.topology.instances_to_start().len();
    out.success(&format!("{started} instance(s) handed to the runtime"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_flags() {
        let args = LaunchArgs {
            image: "org/hr:1.0.0".into(),
            name: "hr-inst".into(),
            start_dependencies: true,
            share_instances: true,
            links: vec!["employee:employee-inst".into()],
            env: vec![],
        };
        let request = build_request(&args, ExecutionMode::Test);

        assert_eq!(request.mode, ExecutionMode::Test);
        assert!(request.start_dependencies);
        assert!(request.share_all_instances);
        assert_eq!(request.links.len(), 1);
    }
}
