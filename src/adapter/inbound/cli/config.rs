//! Handler for `config check`.

use std::path::Path;

use crate::adapter::inbound::cli::output::Output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load and validate the configuration file, then print the effective settings.
pub fn check(path: &Path, out: &Output) -> Result<()> {
    let config = Config::load(path)?;

    out.section("Configuration");
    out.field("File", path.display());
    out.field("Log level", &config.logging.level);
    out.field("Log format", &config.logging.format);
    out.field("Repository", config.repository.path.display());
    out.field("Kubectl", &config.cluster.kubectl);
    out.field(
        "Namespace",
        config.cluster.namespace.as_deref().unwrap_or("(current context)"),
    );
    out.field("Runtime", &config.executor.program);
    out.field("Concurrency", config.resolver.max_concurrency);
    out.field("Manifest", config.routing.manifest.display());
    out.success("Configuration is valid");
    Ok(())
}
