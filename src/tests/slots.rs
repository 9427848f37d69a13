use super::helpers::*;
use crate::{diff, Annotation, DiffOptions, Document, GroupedRevisions, TextRange, TypeAdapter};

fn run(a: Document, b: Document) -> (GroupedRevisions, crate::DiffResult) {
    init_tracing();
    let revisions = GroupedRevisions::new()
        .with_document("user1", a)
        .with_document("user2", b);
    let result = diff(["LinkHost"], [host_adapter()], &revisions, &DiffOptions::default()).unwrap();
    (revisions, result)
}

fn counts(result: &crate::DiffResult) -> (usize, usize, usize) {
    (
        result.len(),
        result.differing_configuration_sets().len(),
        result.incomplete_configuration_sets().len(),
    )
}

#[test]
fn same_role_same_target() {
    let a = LinkDoc::new()
        .host(0, 0, &[("slot1", 0, 0)])
        .host(10, 10, &[("slot1", 10, 10)])
        .build();
    let b = LinkDoc::new()
        .host(0, 0, &[("slot1", 0, 0)])
        .host(10, 10, &[("slot1", 10, 10)])
        .build();
    let (_, result) = run(a, b);
    assert_eq!(counts(&result), (4, 0, 0));
    assert_eq!(result.positions().filter(|p| p.is_sub_position()).count(), 2);
}

#[test]
fn different_role_is_incomplete() {
    let a = LinkDoc::new().host(0, 0, &[("slot1", 0, 0)]).build();
    let b = LinkDoc::new().host(0, 0, &[("slot2", 0, 0)]).build();
    let (_, result) = run(a, b);
    assert_eq!(counts(&result), (3, 0, 2));
}

#[test]
fn same_role_different_target() {
    let a = LinkDoc::new().host(0, 0, &[("slot1", 0, 0)]).build();
    let b = LinkDoc::new().host(0, 0, &[("slot1", 10, 10)]).build();
    let (revisions, result) = run(a, b);
    assert_eq!(counts(&result), (2, 1, 0));

    let set = result.differing_configuration_sets()[0];
    let slot = set.position().slot().unwrap();
    assert_eq!(slot.feature, "links");
    assert_eq!(slot.role.as_deref(), Some("slot1"));

    let decl = host_adapter().slot("links").cloned().unwrap();
    let targets: Vec<Option<TextRange>> = set
        .configurations()
        .iter()
        .map(|cfg| {
            let group = cfg.representative_group().unwrap();
            cfg.resolve_link(group, &decl, &revisions)
                .and_then(|link| link.target)
                .and_then(|target| target.range())
        })
        .collect();
    assert_eq!(
        targets,
        vec![Some(TextRange::new(0, 0)), Some(TextRange::new(10, 10))]
    );
}

#[test]
fn multiple_targets_one_shared() {
    let a = LinkDoc::new()
        .host(0, 0, &[("slot1", 0, 0), ("slot1", 10, 10)])
        .build();
    let b = LinkDoc::new().host(0, 0, &[("slot1", 10, 10)]).build();
    let (_, result) = run(a, b);
    assert_eq!(counts(&result), (2, 1, 0));

    let set = result.differing_configuration_sets()[0];
    assert_eq!(set.configurations_for("user1").len(), 2);
    let shared = set.configurations_for("user2")[0];
    assert_eq!(shared.len(), 2);
    let address = shared.address("user1").unwrap();
    assert_eq!(address.slot.as_ref().map(|slot| slot.index), Some(1));
}

#[test]
fn multiple_targets_different_roles() {
    let a = LinkDoc::new()
        .host(0, 0, &[("slot1", 0, 0), ("slot1", 10, 10)])
        .build();
    let b = LinkDoc::new().host(0, 0, &[("slot2", 10, 10)]).build();
    let (_, result) = run(a, b);
    assert_eq!(counts(&result), (3, 1, 2));
}

#[test]
fn role_only_slot_compares_roles() {
    init_tracing();
    let adapter =
        TypeAdapter::span("LinkHost", Vec::<String>::new()).with_role_slot("links", "role");
    let a = LinkDoc::new().host(0, 0, &[("slot1", 0, 0)]).build();
    let b = LinkDoc::new().host(0, 0, &[("slot1", 10, 10)]).build();
    let revisions = GroupedRevisions::new()
        .with_document("user1", a)
        .with_document("user2", b);
    let result = diff(["LinkHost"], [adapter], &revisions, &DiffOptions::default()).unwrap();
    assert_eq!(counts(&result), (2, 0, 0));
}

#[test]
fn unset_targets_match() {
    init_tracing();
    let build = || {
        let mut builder = Document::builder(LINK_TEXT);
        let link = builder.add(Annotation::record("LinkType").with("role", "slot1"));
        builder.add(Annotation::span("LinkHost", 0, 4).with("links", vec![link]));
        builder.build()
    };
    let (_, result) = run(build(), build());
    assert_eq!(counts(&result), (2, 0, 0));
}
