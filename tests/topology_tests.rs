//! Topology resolution through the public API with in-memory collaborators.

use std::sync::Arc;

use cellmesh::application::topology::{ResolveRequest, TopologyResolver};
use cellmesh::domain::error::DomainError;
use cellmesh::domain::link::parse_links;
use cellmesh::domain::{Alias, ImageMetadata, ImageReference, InstanceName, NodeOrigin};
use cellmesh::error::Error;
use cellmesh::testkit::cluster::InMemoryCluster;
use cellmesh::testkit::domain::{cell, image, image_with};
use cellmesh::testkit::metadata::StaticMetadataReader;

fn hr() -> ImageMetadata {
    image_with(
        "hr",
        "1.0.0",
        &[
            ("employee", image("employee", "1.0.0")),
            ("stock", image("stock", "1.0.0")),
        ],
    )
}

fn request(links: &[&str], start: bool, share: bool) -> ResolveRequest {
    let instance = InstanceName::new("hr-inst");
    ResolveRequest {
        image: ImageReference::parse("org/hr:1.0.0").unwrap(),
        links: parse_links(links, &instance).unwrap(),
        instance,
        start_dependencies: start,
        share_all_instances: share,
    }
}

#[tokio::test]
async fn linked_alias_scenario_starts_nothing_but_the_root() {
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        Arc::new(InMemoryCluster::new()),
    );

    let resolved = resolver
        .resolve(request(&["employee:employee-inst"], false, false))
        .await
        .unwrap();

    let map: Vec<_> = resolved
        .dependency_info
        .iter()
        .map(|(alias, info)| (alias.as_str(), info.instance_name.as_str()))
        .collect();
    assert_eq!(map, [("employee", "employee-inst")]);
    assert_eq!(resolved.unresolved, [Alias::new("stock")]);

    let started: Vec<_> = resolved
        .topology
        .iter()
        .filter(|(id, node)| *id != resolved.topology.root_id() && node.starts)
        .collect();
    assert!(started.is_empty());
}

#[tokio::test]
async fn without_links_every_alias_is_unresolved() {
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        Arc::new(InMemoryCluster::new()),
    );

    let resolved = resolver.resolve(request(&[], false, false)).await.unwrap();

    assert!(resolved.topology.root().children.is_empty());
    assert_eq!(resolved.unresolved.len(), 2);
    assert_eq!(resolved.topology.len(), 1);
}

#[tokio::test]
async fn direct_link_wins_over_share_detection() {
    let cluster = Arc::new(
        InMemoryCluster::new()
            .with_instance(cell("employee-inst", "employee", "1.0.0"))
            .with_instance(cell("employee-other", "employee", "1.0.0")),
    );
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        cluster.clone(),
    );

    let resolved = resolver
        .resolve(request(&["employee:employee-inst"], false, true))
        .await
        .unwrap();

    let root = resolved.topology.root();
    let employee = resolved.topology.node(root.children["employee"]);
    assert_eq!(employee.instance.as_str(), "employee-inst");
    assert_eq!(employee.origin, NodeOrigin::Linked);
    assert!(employee.running);
    assert!(!employee.starts);
    assert_eq!(cluster.lists(), 0);
}

#[tokio::test]
async fn shared_and_started_dependencies_are_reported_to_the_runtime() {
    let cluster = InMemoryCluster::new().with_instance(cell("stock-main", "stock", "1.0.0"));
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        Arc::new(cluster),
    );

    let resolved = resolver.resolve(request(&[], true, true)).await.unwrap();

    assert_eq!(resolved.dependency_info["stock"].instance_name.as_str(), "stock-main");
    assert_eq!(
        resolved.dependency_info["employee"].instance_name.as_str(),
        "hr-inst-employee"
    );
    let starting: Vec<_> = resolved
        .topology
        .instances_to_start()
        .into_iter()
        .map(InstanceName::as_str)
        .collect();
    assert_eq!(starting, ["hr-inst", "hr-inst-employee"]);
    assert!(resolved.root_info().is_root);
}

#[tokio::test]
async fn cluster_failure_aborts_resolution() {
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        Arc::new(InMemoryCluster::failing("connection refused")),
    );

    let err = resolver
        .resolve(request(&["employee:employee-inst"], false, false))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Collaborator(_)));
}

#[tokio::test]
async fn unknown_alias_of_nested_owner_is_rejected() {
    let root = image_with(
        "hr",
        "1.0.0",
        &[("employee", image_with("employee", "1.0.0", &[("salary", image("salary", "1.0.0"))]))],
    );
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(root)),
        Arc::new(InMemoryCluster::new()),
    );

    let err = resolver
        .resolve(request(&["hr-inst-employee.bonus:bonus-inst"], true, false))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Domain(DomainError::UnknownAlias { ref owner, .. }) if owner.as_str() == "hr-inst-employee"
    ));
}

#[test]
fn resolution_can_be_driven_from_synchronous_code() {
    let resolver = TopologyResolver::new(
        Arc::new(StaticMetadataReader::new().with_image(hr())),
        Arc::new(InMemoryCluster::new()),
    );

    let resolved = tokio_test::block_on(resolver.resolve(request(&[], true, false))).unwrap();
    assert_eq!(resolved.topology.len(), 3);
}
