// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino_tempfile::Utf8TempDir;
use camino_tempfile_ext::prelude::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use test_case::test_case;
use testsieve_filtering::{
    CompiledFilter, FilterContext, FilterRule, errors::FilterCompileError,
    errors::ConfigurationError,
};
use testsieve_metadata::{TestCase, TestListSummary};

#[track_caller]
fn load_tests() -> Vec<TestCase> {
    let json = std::fs::read_to_string("../fixtures/test-list.json").unwrap();
    TestListSummary::parse_json(json).unwrap().tests
}

#[track_caller]
fn compile_json(json: &str) -> CompiledFilter {
    let rule: FilterRule = serde_json::from_str(json).unwrap();
    rule.compile(&FilterContext::new()).unwrap()
}

fn names(tests: &[&TestCase]) -> Vec<String> {
    tests.iter().map(|test| test.to_string()).collect()
}

#[test_case(r#"{"type": "simple-class-name", "regex": "Foo.*"}"#, &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
    "com.other.FooTest#testA",
]; "class name regex")]
#[test_case(r#"{"type": "package", "values": ["com.example"]}"#, &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
    "com.example.BarTest#testA",
]; "package values are exact")]
#[test_case(r#"{"type": "package", "regex": "com\\.example(\\..*)?"}"#, &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
    "com.example.BarTest#testA",
    "com.example.login.LoginTest#logsIn",
    "com.example.login.LoginTest#rejectsBadPassword",
]; "package and subpackages")]
#[test_case(r#"{"type": "package", "values": [""]}"#, &["BazTest#itWorks"]; "default package")]
#[test_case(r#"{"type": "fully-qualified-class-name", "values": ["com.example.login.LoginTest", "BazTest"]}"#, &[
    "com.example.login.LoginTest#logsIn",
    "com.example.login.LoginTest#rejectsBadPassword",
    "BazTest#itWorks",
]; "fully qualified class name")]
#[test_case(r#"{"type": "fully-qualified-test-name", "values": ["com.other.FooTest#testA"]}"#, &[
    "com.other.FooTest#testA",
]; "fully qualified test name")]
#[test_case(r#"{"type": "method", "regex": "test.*"}"#, &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
    "com.example.BarTest#testA",
    "com.other.FooTest#testA",
]; "method regex")]
#[test_case(r#"{"type": "annotation", "values": ["Flaky"]}"#, &[
    "com.example.FooTest#testB",
    "com.example.login.LoginTest#rejectsBadPassword",
]; "annotation name")]
#[test_case(r#"{"type": "annotation-data", "name-regex": "Severity", "value-regex": "high"}"#, &[
    "com.example.FooTest#testA",
    "com.example.login.LoginTest#rejectsBadPassword",
]; "annotation data")]
#[test_case(r#"{"type": "method", "values": []}"#, &[]; "empty values match nothing")]
fn simple_rules(json: &str, expected: &[&str]) {
    let tests = load_tests();
    let refs: Vec<_> = tests.iter().collect();
    let filter = compile_json(json);
    assert_eq!(names(&filter.filter(&refs)), expected);
}

#[test_case("union", &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
    "com.example.BarTest#testA",
    "com.other.FooTest#testA",
]; "union")]
#[test_case("INTERSECTION", &[
    "com.example.FooTest#testA",
    "com.example.FooTest#testB",
]; "intersection with uppercase op")]
#[test_case("subtract", &[
    "com.example.login.LoginTest#logsIn",
    "com.example.login.LoginTest#rejectsBadPassword",
    "BazTest#itWorks",
]; "subtract")]
fn composition(op: &str, expected: &[&str]) {
    let tests = load_tests();
    let refs: Vec<_> = tests.iter().collect();
    let json = format!(
        r#"{{
            "type": "composition",
            "op": "{op}",
            "filters": [
                {{"type": "simple-class-name", "values": ["FooTest"]}},
                {{"type": "package", "values": ["com.example"]}}
            ]
        }}"#
    );
    let filter = compile_json(&json);
    assert_eq!(names(&filter.filter(&refs)), expected);

    // The complement is taken against the input, whatever the operator.
    let matched: HashSet<_> = expected.iter().copied().collect();
    let complement: Vec<_> = refs
        .iter()
        .map(|test| test.to_string())
        .filter(|name| !matched.contains(name.as_str()))
        .collect();
    assert_eq!(names(&filter.filter_not(&refs)), complement);
}

#[test]
fn nested_composition() {
    let tests = load_tests();
    let refs: Vec<_> = tests.iter().collect();
    let filter = compile_json(
        r#"{
            "type": "composition",
            "op": "intersection",
            "filters": [
                {"type": "package", "regex": "com\\.example.*"},
                {
                    "type": "composition",
                    "op": "subtract",
                    "filters": [{"type": "annotation", "values": ["Flaky"]}]
                }
            ]
        }"#,
    );
    assert_eq!(
        names(&filter.filter(&refs)),
        [
            "com.example.FooTest#testA",
            "com.example.BarTest#testA",
            "com.example.login.LoginTest#logsIn",
        ]
    );
}

#[test]
fn fragments_partition_the_list() {
    let tests = load_tests();
    let refs: Vec<_> = tests.iter().collect();

    let mut seen = HashSet::new();
    for index in 0..3 {
        let filter = compile_json(&format!(
            r#"{{"type": "fragmentation", "index": {index}, "count": 3}}"#
        ));
        for test in filter.filter(&refs) {
            assert!(
                seen.insert(test),
                "{test} appears in more than one fragment"
            );
        }
    }
    assert_eq!(
        seen.len(),
        tests.len(),
        "every test appears in some fragment"
    );

    // The union of every fragment selects everything.
    let union = compile_json(
        r#"{
            "type": "composition",
            "op": "union",
            "filters": [
                {"type": "fragmentation", "index": 0, "count": 3},
                {"type": "fragmentation", "index": 1, "count": 3},
                {"type": "fragmentation", "index": 2, "count": 3}
            ]
        }"#,
    );
    assert_eq!(union.filter(&refs), refs);
}

#[test]
fn values_from_file() {
    let tests = load_tests();
    let refs: Vec<_> = tests.iter().collect();

    let temp_dir = Utf8TempDir::new().unwrap();
    temp_dir
        .child("quarantine.txt")
        .write_str("com.example.FooTest#testB\n\ncom.other.FooTest#testA\n")
        .unwrap();
    let rule: FilterRule = serde_json::from_str(
        r#"{"type": "fully-qualified-test-name", "file": "quarantine.txt"}"#,
    )
    .unwrap();
    let filter = rule
        .compile(&FilterContext::with_base_dir(temp_dir.path()))
        .unwrap();

    assert_eq!(
        names(&filter.filter(&refs)),
        ["com.example.FooTest#testB", "com.other.FooTest#testA"]
    );
}

#[test]
fn invalid_rules_do_not_compile() {
    let rule: FilterRule =
        serde_json::from_str(r#"{"type": "fragmentation", "index": 3, "count": 3}"#).unwrap();
    let err = rule.compile(&FilterContext::new()).unwrap_err();
    assert!(matches!(
        err,
        FilterCompileError::Configuration(ConfigurationError::FragmentIndexOutOfRange {
            index: 3,
            count: 3
        })
    ));
    assert_eq!(
        err.to_string(),
        "fragment index [3] must be less than count [3]"
    );

    let rule: FilterRule = serde_json::from_str(r#"{"type": "annotation"}"#).unwrap();
    let err = rule.compile(&FilterContext::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "at least one of [regex, values, file] must be specified for annotation filter"
    );
}
