// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use camino_tempfile_ext::prelude::*;
use indoc::{formatdoc, indoc};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use testsieve_metadata::MismatchReason;
use testsieve_runner::{
    config::{DefaultConfigWarnings, FilterConfig},
    selector::TestSelector,
    test_list::read_test_list,
};

const TEST_LIST: &str = "../fixtures/test-list.json";

#[test]
fn select_with_config() {
    let temp_dir = Utf8TempDir::new().unwrap();
    temp_dir
        .child("quarantine.txt")
        .write_str("com.example.login.LoginTest#rejectsBadPassword\n")
        .unwrap();
    let config_path = temp_dir.child("filters.toml");
    config_path
        .write_str(indoc! {r#"
            [[allowlist]]
            type = "package"
            regex = 'com\.example(\..*)?'

            [[blocklist]]
            type = "fully-qualified-test-name"
            file = "quarantine.txt"

            [[blocklist]]
            type = "annotation-data"
            name-regex = "Severity"
            value-regex = "low"
        "#})
        .unwrap();

    let config = FilterConfig::from_path(config_path.to_path_buf(), &mut DefaultConfigWarnings)
        .expect("config is valid");
    let selector = TestSelector::from_config(&config).expect("rules compile");
    let tests = read_test_list(Utf8Path::new(TEST_LIST)).expect("fixture is valid");
    let selected = selector.select(&tests);

    let names: Vec<_> = selected.selected().map(|test| test.to_string()).collect();
    assert_eq!(
        names,
        [
            "com.example.FooTest#testA",
            "com.example.BarTest#testA",
            "com.example.login.LoginTest#logsIn",
        ]
    );

    let skipped: Vec<_> = selected
        .skipped()
        .map(|(test, reason)| (test.to_string(), reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (
                "com.example.FooTest#testB".to_owned(),
                MismatchReason::Blocklisted,
            ),
            (
                "com.example.login.LoginTest#rejectsBadPassword".to_owned(),
                MismatchReason::Blocklisted,
            ),
            (
                "com.other.FooTest#testA".to_owned(),
                MismatchReason::NotAllowlisted,
            ),
            ("BazTest#itWorks".to_owned(), MismatchReason::NotAllowlisted),
        ]
    );
}

#[test]
fn shards_partition_selection() {
    let temp_dir = Utf8TempDir::new().unwrap();
    let tests = read_test_list(Utf8Path::new(TEST_LIST)).expect("fixture is valid");

    let mut seen = BTreeSet::new();
    for index in 0..4 {
        let config_path = temp_dir.child(format!("shard-{index}.toml"));
        config_path
            .write_str(&formatdoc! {r#"
                [[allowlist]]
                type = "fragmentation"
                index = {index}
                count = 4
            "#})
            .unwrap();
        let config =
            FilterConfig::from_path(config_path.to_path_buf(), &mut DefaultConfigWarnings)
                .expect("config is valid");
        let selector = TestSelector::from_config(&config).expect("rules compile");
        for test in selector.select(&tests).selected() {
            assert!(
                seen.insert(test.fully_qualified_test_name()),
                "{test} is in more than one shard"
            );
        }
    }
    assert_eq!(seen.len(), tests.len(), "every test is in some shard");
}

#[test]
fn missing_value_file_fails_compile() {
    let temp_dir = Utf8TempDir::new().unwrap();
    let config_path = temp_dir.child("filters.json");
    config_path
        .write_str(r#"{"blocklist": [{"type": "method", "file": "gone.txt"}]}"#)
        .unwrap();

    // Loading only validates the rule: the file is read when the selector is built.
    let config = FilterConfig::from_path(config_path.to_path_buf(), &mut DefaultConfigWarnings)
        .expect("config is valid");
    let err = TestSelector::from_config(&config).expect_err("file is missing");
    assert_eq!(err.to_string(), "failed to compile blocklist[0]");
}
