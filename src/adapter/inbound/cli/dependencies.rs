//! Handler for the `dependencies` command.

use crate::adapter::inbound::cli::command::DependenciesArgs;
use crate::adapter::inbound::cli::output::Output;
use crate::domain::error::DomainError;
use crate::domain::id::InstanceName;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Print the dependency ownership annotation of an instance.
pub async fn execute(config: &Config, args: &DependenciesArgs, out: &Output) -> Result<()> {
    let name = InstanceName::new(&args.instance);
    let cluster = bootstrap::cluster_client(config);
    let instance = cluster
        .find_instance(&name)
        .await?
        .ok_or_else(|| Error::TargetNotFound {
            instance: name.clone(),
        })?;

    let dependencies = instance
        .dependencies()
        .map_err(|e| DomainError::InvalidAnnotation {
            instance: name.clone(),
            reason: e.to_string(),
        })?;

    out.section(&format!("{} ({})", instance.metadata.name, instance.kind));
    if dependencies.is_empty() {
        out.field("Dependencies", out.muted("none"));
    }
    for dep in &dependencies {
        out.field(
            dep.alias.as_str(),
            format!("{} {} ({})", out.highlight(&dep.instance), dep.identity(), dep.kind),
        );
    }
    Ok(())
}
