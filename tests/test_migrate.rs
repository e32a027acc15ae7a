//! CLI tests for `data migrate`.

#[path = "support/mod.rs"]
mod support;

use assistant_data::domain::{Domain, SlotMappingType};
use support::fixtures;
use support::harness::{stderr, TestHarness};

#[test]
fn test_migrate_in_place_keeps_original() {
    let harness = TestHarness::new();
    harness.write("domain.yml", fixtures::LEGACY_DOMAIN);

    let output = harness.run(&["data", "migrate"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(harness.read("original_domain.yml"), fixtures::LEGACY_DOMAIN);

    let domain = Domain::load(&harness.path().join("domain.yml")).unwrap();
    assert_eq!(domain.version.as_deref(), Some("3.1"));
    assert_eq!(
        domain.form("restaurant_form").unwrap().required_slots,
        vec!["cuisine", "outdoor"]
    );

    let cuisine = domain.slot("cuisine").unwrap();
    assert_eq!(cuisine.mappings[0].mapping_type, SlotMappingType::FromEntity);
    assert!(cuisine.mappings[1].applies_during("restaurant_form"));

    let outdoor = domain.slot("outdoor").unwrap();
    assert_eq!(outdoor.mappings.len(), 1);
    assert_eq!(outdoor.mappings[0].mapping_type, SlotMappingType::FromIntent);
}

#[test]
fn test_migrate_to_separate_file() {
    let harness = TestHarness::new();
    harness.write("old/domain.yml", fixtures::LEGACY_DOMAIN);

    let output = harness.run(&["data", "migrate", "-d", "old/domain.yml", "--out", "new_domain.yml"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(harness.read("old/domain.yml"), fixtures::LEGACY_DOMAIN);
    assert!(!harness.exists("old/original_domain.yml"));
    assert!(Domain::load(&harness.path().join("new_domain.yml")).is_ok());
}

#[test]
fn test_migrating_twice_fails() {
    let harness = TestHarness::new();
    harness.write("domain.yml", fixtures::LEGACY_DOMAIN);
    assert_eq!(harness.run(&["data", "migrate"]).status.code(), Some(0));

    let output = harness.run(&["data", "migrate", "--out", "again.yml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("already in the 3.x format"));
    assert!(!harness.exists("again.yml"));
}

#[test]
fn test_migrated_project_validates() {
    let harness = TestHarness::new();
    harness.write("domain.yml", fixtures::LEGACY_DOMAIN);
    harness.write("config.yml", fixtures::CONFIG_UNIQUE_ASSISTANT_ID);
    assert_eq!(harness.run(&["data", "migrate"]).status.code(), Some(0));

    let output = harness.run(&["data", "validate"]);

    assert_eq!(output.status.code(), Some(0));
}
