//! Architecture contract tests.

mod support;

use support::architecture::{find_lines_containing, path_exists};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "async_trait",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::infrastructure", "crate::application"],
    );

    assert!(hits.is_empty(), "found outer-layer imports in ports: {hits:#?}");
}

#[test]
fn application_has_no_adapter_or_infrastructure_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter", "crate::infrastructure", "std::process", "kubectl"],
    );

    assert!(
        hits.is_empty(),
        "application layer should only talk to ports: {hits:#?}"
    );
}

#[test]
fn outbound_adapters_do_not_reach_into_use_cases() {
    let hits = find_lines_containing(
        "src/adapter/outbound",
        &["crate::application", "crate::adapter::inbound"],
    );

    assert!(
        hits.is_empty(),
        "outbound adapters should implement ports only: {hits:#?}"
    );
}

#[test]
fn composition_root_lives_in_infrastructure() {
    assert!(
        path_exists("src/infrastructure/bootstrap.rs"),
        "adapter wiring should live in the infrastructure bootstrap"
    );
}
