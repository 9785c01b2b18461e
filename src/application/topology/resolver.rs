//! Instance dependency-topology resolver.
//!
//! Turns a root image, alias links and the start/share flags into a
//! [`Topology`]: which dependency instances are attached, started or shared.
//!
//! # Architecture
//!
//! ```text
//!            frontier (nodes to expand)
//!                     |
//!        +------------+------------+
//!        |            |            |
//!     lookup       lookup       lookup      JoinSet, bounded by a semaphore
//!   (cluster /   (metadata)   (cluster)     each task returns an Outcome
//!    metadata)        |            |
//!        +------------+------------+
//!                     |
//!          aggregator (sole writer)         sorts outcomes by (parent, alias),
//!                     |                     attaches nodes, builds next frontier
//!                     v
//!                 Topology
//! ```
//!
//! Collaborator calls of one tree level run concurrently. Their results are
//! applied by a single loop in `(parent, alias)` order, so the tree and the
//! dependency-info map do not depend on task completion order.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::domain::error::DomainError;
use crate::domain::id::{Alias, InstanceName};
use crate::domain::image::{ImageMetadata, ImageReference};
use crate::domain::link::DependencyLink;
use crate::domain::topology::{DependencyInfo, InstanceNode, NodeId, NodeOrigin, Topology};
use crate::error::{Error, Result};
use crate::port::{ClusterClient, ImageMetadataReader, ResolvedImage};

/// Default number of collaborator calls in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Input of one resolution.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub image: ImageReference,
    pub instance: InstanceName,
    /// Parsed links; root-owned links carry no owner.
    pub links: Vec<DependencyLink>,
    pub start_dependencies: bool,
    pub share_all_instances: bool,
}

/// Result of a resolution, ready for the environment scoper and executor.
#[derive(Debug, Clone)]
pub struct ResolvedTopology {
    pub topology: Topology,
    pub root_image: ResolvedImage,
    /// Root alias to the instance bound to it.
    pub dependency_info: BTreeMap<Alias, DependencyInfo>,
    /// Root aliases left unbound.
    pub unresolved: Vec<Alias>,
}

impl ResolvedTopology {
    /// Dependency information describing the root instance itself.
    #[must_use]
    pub fn root_info(&self) -> DependencyInfo {
        let root = self.topology.root();
        DependencyInfo::new(&root.identity(), &root.instance, true)
    }
}

/// A collaborator lookup for one declared alias.
struct Lookup {
    parent: NodeId,
    alias: Alias,
    declared: ImageMetadata,
    target: Option<InstanceName>,
}

/// What a lookup found.
enum Found {
    /// A linked instance that is already running.
    LinkedRunning,
    /// A linked instance that is not running, with metadata when it will be started.
    LinkedIdle(Option<ImageMetadata>),
    /// A running instance of the same image found in the cluster.
    SharedRunning(InstanceName),
    /// No equivalent running instance; metadata for a new one.
    Fresh(ImageMetadata),
}

struct Outcome {
    parent: NodeId,
    alias: Alias,
    declared: ImageMetadata,
    target: Option<InstanceName>,
    found: Found,
}

/// Resolves instance dependency trees against the cluster and image metadata.
///
/// Instances are not started here. The executor starts everything marked
/// `starts` in the returned tree; if it fails midway, dependencies it already
/// started are left running rather than torn down.
pub struct TopologyResolver {
    reader: Arc<dyn ImageMetadataReader>,
    cluster: Arc<dyn ClusterClient>,
    max_concurrency: usize,
}

impl TopologyResolver {
    pub fn new(reader: Arc<dyn ImageMetadataReader>, cluster: Arc<dyn ClusterClient>) -> Self {
        Self {
            reader,
            cluster,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Limit concurrent collaborator calls; values below one are raised to one.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Resolve the dependency tree for `request`.
    ///
    /// # Errors
    ///
    /// [`DomainError::UnknownAlias`], [`DomainError::DanglingLink`],
    /// [`DomainError::CycleDetected`], or collaborator failures such as
    /// [`Error::ImageMetadataUnavailable`]. The first fatal error aborts.
    pub async fn resolve(&self, request: ResolveRequest) -> Result<ResolvedTopology> {
        let root_image = self.reader.read(&request.image).await?;
        let mut topology = Topology::new(request.instance.clone(), root_image.metadata.clone());

        let mut links = index_links(&request.links, &request.instance);
        let mut frontier = vec![topology.root_id()];

        while !frontier.is_empty() {
            let mut lookups = Vec::new();
            for &id in &frontier {
                lookups.extend(self.plan(&mut topology, id, &mut links, &request)?);
            }

            let mut outcomes = self.run_lookups(lookups, &request).await?;
            outcomes.sort_by(|a, b| (a.parent, &a.alias).cmp(&(b.parent, &b.alias)));

            frontier = Vec::new();
            for outcome in outcomes {
                if let Some(id) = apply(&mut topology, outcome, request.share_all_instances)? {
                    frontier.push(id);
                }
            }
        }

        let dangling = links
            .into_iter()
            .find_map(|(owner, aliases)| aliases.into_keys().next().map(|alias| (owner, alias)));
        if let Some((owner, alias)) = dangling {
            return Err(DomainError::DanglingLink { owner, alias }.into());
        }

        let root = topology.root_id();
        let resolved = ResolvedTopology {
            dependency_info: topology.dependency_info(root),
            unresolved: topology.root().unresolved.clone(),
            topology,
            root_image,
        };

        info!(
            instance = %request.instance,
            image = %request.image,
            nodes = resolved.topology.len(),
            resolved = resolved.dependency_info.len(),
            unresolved = resolved.unresolved.len(),
            "Resolved dependency topology"
        );
        Ok(resolved)
    }

    /// Validate the links owned by node `id` and plan one lookup per declared alias.
    ///
    /// Aliases that stay unbound are recorded on the node directly.
    fn plan(
        &self,
        topology: &mut Topology,
        id: NodeId,
        links: &mut BTreeMap<InstanceName, BTreeMap<Alias, InstanceName>>,
        request: &ResolveRequest,
    ) -> Result<Vec<Lookup>> {
        let node = topology.node(id);
        let owned = links.remove(&node.instance).unwrap_or_default();

        if let Some(alias) = owned.keys().find(|a| !node.metadata.declares(a)) {
            return Err(DomainError::UnknownAlias {
                owner: node.instance.clone(),
                image: node.identity().to_string(),
                alias: alias.clone(),
            }
            .into());
        }

        let mut lookups = Vec::new();
        let mut unresolved = Vec::new();
        for (alias, declared) in &node.metadata.dependencies {
            let target = owned.get(alias).cloned();
            if target.is_none() && !request.start_dependencies {
                debug!(instance = %node.instance, %alias, "Leaving alias unresolved");
                unresolved.push(alias.clone());
                continue;
            }
            lookups.push(Lookup {
                parent: id,
                alias: alias.clone(),
                declared: declared.clone(),
                target,
            });
        }

        topology.node_mut(id).unresolved = unresolved;
        Ok(lookups)
    }

    /// Run the lookups of one level concurrently.
    ///
    /// After the first failure the remaining tasks still finish, but their
    /// results are dropped and the first error is returned.
    async fn run_lookups(&self, lookups: Vec<Lookup>, request: &ResolveRequest) -> Result<Vec<Outcome>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for lookup in lookups {
            let reader = Arc::clone(&self.reader);
            let cluster = Arc::clone(&self.cluster);
            let semaphore = Arc::clone(&semaphore);
            let start = request.start_dependencies;
            let share = request.share_all_instances;
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Task(e.to_string()))?;
                lookup_alias(lookup, reader.as_ref(), cluster.as_ref(), start, share).await
            });
        }

        let mut outcomes = Vec::new();
        let mut first_error: Option<Error> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(Error::from).and_then(|r| r) {
                Ok(outcome) if first_error.is_none() => outcomes.push(outcome),
                Ok(_) => {}
                Err(err) => {
                    debug!(error = %err, "Dependency lookup failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(outcomes),
        }
    }
}

async fn lookup_alias(
    lookup: Lookup,
    reader: &dyn ImageMetadataReader,
    cluster: &dyn ClusterClient,
    start_dependencies: bool,
    share_all_instances: bool,
) -> Result<Outcome> {
    let reference = ImageReference::from_identity(&lookup.declared.identity());

    let found = match &lookup.target {
        Some(target) => {
            if cluster.find_instance(target).await?.is_some() {
                Found::LinkedRunning
            } else if start_dependencies {
                Found::LinkedIdle(Some(reader.read(&reference).await?.metadata))
            } else {
                Found::LinkedIdle(None)
            }
        }
        None => {
            let shared = if share_all_instances {
                cluster.find_running(&lookup.declared.identity()).await?
            } else {
                None
            };
            match shared {
                Some(instance) => Found::SharedRunning(instance.name()),
                None => Found::Fresh(reader.read(&reference).await?.metadata),
            }
        }
    };

    Ok(Outcome {
        parent: lookup.parent,
        alias: lookup.alias,
        declared: lookup.declared,
        target: lookup.target,
        found,
    })
}

/// Attach the node an outcome describes; returns its id when it must be expanded.
fn apply(topology: &mut Topology, outcome: Outcome, share_all_instances: bool) -> Result<Option<NodeId>> {
    let Outcome {
        parent,
        alias,
        declared,
        target,
        found,
    } = outcome;
    let parent_instance = topology.node(parent).instance.clone();

    let (instance, metadata, origin, running, shared, starts) = match found {
        Found::LinkedRunning => (target, declared, NodeOrigin::Linked, true, false, false),
        Found::LinkedIdle(None) => (target, declared, NodeOrigin::Linked, false, false, false),
        Found::LinkedIdle(Some(metadata)) => {
            check_cycle(topology, parent, &metadata)?;
            (target, metadata, NodeOrigin::Linked, false, false, true)
        }
        Found::SharedRunning(instance) => {
            (Some(instance), declared, NodeOrigin::Shared, true, true, false)
        }
        Found::Fresh(metadata) => {
            // An ancestor is still being resolved, so sharing it would hide the cycle.
            check_cycle(topology, parent, &metadata)?;
            let planned = share_all_instances
                .then(|| topology.find_started(&metadata.identity(), parent))
                .flatten();
            match planned {
                Some(existing) => {
                    let instance = topology.node(existing).instance.clone();
                    (Some(instance), metadata, NodeOrigin::Shared, false, true, false)
                }
                None => {
                    let instance = parent_instance.dependency(&alias);
                    (Some(instance), metadata, NodeOrigin::Started, false, false, true)
                }
            }
        }
    };
    let instance = instance.unwrap_or_else(|| parent_instance.dependency(&alias));

    debug!(
        parent = %parent_instance,
        %alias,
        %instance,
        ?origin,
        running,
        shared,
        starts,
        "Bound dependency alias"
    );

    let id = topology.attach(
        parent,
        alias,
        InstanceNode {
            instance,
            metadata,
            origin,
            parent: None,
            alias: None,
            children: BTreeMap::new(),
            unresolved: Vec::new(),
            running,
            shared,
            starts,
        },
    );
    Ok(starts.then_some(id))
}

/// Reject a node whose image is already being resolved further up the tree.
fn check_cycle(topology: &Topology, parent: NodeId, metadata: &ImageMetadata) -> Result<()> {
    let identity = metadata.identity();
    let mut chain: Vec<NodeId> = std::iter::once(parent).chain(topology.ancestors(parent)).collect();
    chain.reverse();

    if let Some(pos) = chain
        .iter()
        .position(|id| topology.node(*id).identity() == identity)
    {
        let path = chain[pos..]
            .iter()
            .map(|id| topology.node(*id).identity().to_string())
            .chain(std::iter::once(identity.to_string()))
            .collect();
        return Err(DomainError::CycleDetected { path }.into());
    }
    Ok(())
}

/// Group links by owner, resolving root-owned links to `root`.
fn index_links(
    links: &[DependencyLink],
    root: &InstanceName,
) -> BTreeMap<InstanceName, BTreeMap<Alias, InstanceName>> {
    let mut indexed: BTreeMap<InstanceName, BTreeMap<Alias, InstanceName>> = BTreeMap::new();
    for link in links {
        indexed
            .entry(link.owner_or(root).clone())
            .or_default()
            .insert(link.alias.clone(), link.target.clone());
    }
    indexed
}
