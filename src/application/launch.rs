//! Run and test use case: parse, resolve, scope, execute.
//!
//! Every argument is parsed and the whole topology is resolved before the
//! executor is invoked, so malformed input and topology errors never start
//! anything. Once the executor runs, dependencies it has already started
//! are left running if a later one fails; nothing is rolled back.

use std::sync::Arc;

use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::id::{is_identifier, InstanceName};
use crate::domain::image::ImageReference;
use crate::domain::link::{parse_env_vars, parse_links, EnvironmentVariable};
use crate::error::Result;
use crate::port::{ExecutionMode, ExecutionRequest, InstanceExecutor};

use super::environment::scope_environment;
use super::topology::{ResolveRequest, ResolvedTopology, TopologyResolver};

const INSTANCE_FORMAT: &str = "lowercase alphanumerics separated by single dashes";

/// Raw arguments of a run or test invocation.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub mode: ExecutionMode,
    pub image: String,
    pub instance: String,
    pub links: Vec<String>,
    pub env: Vec<String>,
    pub start_dependencies: bool,
    pub share_all_instances: bool,
}

pub struct Launcher {
    resolver: TopologyResolver,
    executor: Arc<dyn InstanceExecutor>,
}

impl Launcher {
    pub fn new(resolver: TopologyResolver, executor: Arc<dyn InstanceExecutor>) -> Self {
        Self { resolver, executor }
    }

    /// Parse `request`, resolve its topology and start the root instance.
    ///
    /// # Errors
    ///
    /// `MalformedArgument` for any bad image, instance name, link or
    /// variable; resolver errors; executor failures.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<ResolvedTopology> {
        let (resolve, env) = parse(request)?;
        let root = resolve.instance.clone();

        let resolved = self.resolver.resolve(resolve).await?;
        let env = scope_environment(&env, &root, &resolved.root_image.image_dir);

        let execution = ExecutionRequest {
            mode: request.mode,
            root: resolved.root_info(),
            image_dir: resolved.root_image.image_dir.clone(),
            env: env.into_iter().map(|v| v.into_pair()).collect(),
            dependencies: resolved.dependency_info.clone(),
            unresolved: resolved.unresolved.clone(),
            instances: resolved
                .topology
                .instances_to_start()
                .into_iter()
                .cloned()
                .collect(),
            tree: resolved.topology.plan(),
            start_dependencies: request.start_dependencies,
            share_dependencies: request.share_all_instances,
        };

        info!(
            mode = %request.mode,
            instance = %root,
            starting = execution.instances.len(),
            "Executing instance"
        );
        self.executor.execute(&execution).await?;
        Ok(resolved)
    }
}

fn parse(request: &LaunchRequest) -> Result<(ResolveRequest, Vec<EnvironmentVariable>)> {
    let image = ImageReference::parse(&request.image)?;
    if !is_identifier(&request.instance) {
        return Err(DomainError::MalformedArgument {
            argument: request.instance.clone(),
            expected: INSTANCE_FORMAT,
        }
        .into());
    }
    let instance = InstanceName::new(&request.instance);
    let links = parse_links(&request.links, &instance)?;
    let env = parse_env_vars(&request.env, &instance)?;

    Ok((
        ResolveRequest {
            image,
            instance,
            links,
            start_dependencies: request.start_dependencies,
            share_all_instances: request.share_all_instances,
        },
        env,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::environment::IMAGE_DIR_VARIABLE;
    use crate::error::Error;
    use crate::testkit::cluster::InMemoryCluster;
    use crate::testkit::domain::{image, image_with};
    use crate::testkit::executor::RecordingExecutor;
    use crate::testkit::metadata::StaticMetadataReader;

    fn launcher(executor: Arc<RecordingExecutor>) -> Launcher {
        let hr = image_with("hr", "1.0.0", &[("employee", image("employee", "1.0.0"))]);
        let resolver = TopologyResolver::new(
            Arc::new(StaticMetadataReader::new().with_image(hr)),
            Arc::new(InMemoryCluster::new()),
        );
        Launcher::new(resolver, executor)
    }

    fn request() -> LaunchRequest {
        LaunchRequest {
            mode: ExecutionMode::Run,
            image: "org/hr:1.0.0".into(),
            instance: "hr-inst".into(),
            links: vec![],
            env: vec!["PORT=80".into(), "hr-inst-employee:DB=x".into()],
            start_dependencies: true,
            share_all_instances: false,
        }
    }

    #[tokio::test]
    async fn hands_resolved_topology_to_executor() {
        let executor = Arc::new(RecordingExecutor::new());
        launcher(executor.clone()).launch(&request()).await.unwrap();

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        let execution = &requests[0];
        assert!(execution.root.is_root);
        assert_eq!(execution.root.instance_name.as_str(), "hr-inst");
        assert_eq!(execution.env[0].0, IMAGE_DIR_VARIABLE);
        assert_eq!(execution.env[1], ("PORT".to_string(), "80".to_string()));
        assert_eq!(execution.env[2].0, "cellmesh_env_hr-inst-employee.DB");
        assert_eq!(
            execution.dependencies["employee"].instance_name.as_str(),
            "hr-inst-employee"
        );
        let instances: Vec<_> = execution.instances.iter().map(InstanceName::as_str).collect();
        assert_eq!(instances, ["hr-inst", "hr-inst-employee"]);
        assert_eq!(execution.tree.len(), 2);
        assert_eq!(
            execution.tree[0].dependencies["employee"].as_str(),
            "hr-inst-employee"
        );
    }

    #[tokio::test]
    async fn malformed_link_starts_nothing() {
        let executor = Arc::new(RecordingExecutor::new());
        let mut request = request();
        request.links = vec!["employee:ok-inst".into(), "Bad Link".into()];

        let err = launcher(executor.clone()).launch(&request).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Domain(DomainError::MalformedArgument { ref argument, .. }) if argument == "Bad Link"
        ));
        assert!(executor.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_instance_name_is_rejected() {
        let executor = Arc::new(RecordingExecutor::new());
        let mut request = request();
        request.instance = "HR_inst".into();

        let err = launcher(executor.clone()).launch(&request).await.unwrap_err();
        assert!(matches!(err, Error::Domain(DomainError::MalformedArgument { .. })));
    }

    #[tokio::test]
    async fn executor_failure_propagates() {
        let executor = Arc::new(RecordingExecutor::failing("runtime crashed"));
        let err = launcher(executor.clone()).launch(&request()).await.unwrap_err();

        assert!(matches!(err, Error::Collaborator(_)));
        assert_eq!(executor.requests().len(), 1);
    }
}
