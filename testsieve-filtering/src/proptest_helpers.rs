// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strategies for generating valid filter rules.
//!
//! Generated values are drawn from the same pools as the `Arbitrary` impls in
//! `testsieve-metadata`, so rules match a reasonable share of generated tests.

use crate::rule::{
    AnnotationDataRule, CompositionOp, CompositionRule, FilterRegex, FilterRule,
    FragmentationRule, MatchSource,
};
use proptest::{collection::vec, prelude::*};

const PACKAGES: &[&str] = &["com.example", "com.example.login", "org.sample", ""];
const CLASS_NAMES: &[&str] = &["FooTest", "BarTest", "BazTest", "LoginTest"];
const METHODS: &[&str] = &["testA", "testB", "itWorks", "logsIn"];
const ANNOTATION_NAMES: &[&str] = &["Severity", "Priority", "Flaky", "LargeTest"];
const ANNOTATION_VALUES: &[&str] = &["high", "medium", "low"];

/// Generates a valid rule, possibly with nested compositions.
pub(crate) fn filter_rule() -> impl Strategy<Value = FilterRule> {
    leaf_rule().prop_recursive(3, 16, 4, |inner| {
        (vec(inner, 0..4), composition_op()).prop_map(|(filters, op)| {
            FilterRule::Composition(CompositionRule::new(filters, op))
        })
    })
}

fn composition_op() -> impl Strategy<Value = CompositionOp> {
    prop_oneof![
        Just(CompositionOp::Union),
        Just(CompositionOp::Intersection),
        Just(CompositionOp::Subtract),
    ]
}

fn leaf_rule() -> impl Strategy<Value = FilterRule> {
    prop_oneof![
        source_strategy(CLASS_NAMES).prop_map(FilterRule::SimpleClassName),
        source_strategy(PACKAGES).prop_map(FilterRule::TestPackage),
        source_strategy(METHODS).prop_map(FilterRule::TestMethod),
        source_strategy(ANNOTATION_NAMES).prop_map(FilterRule::Annotation),
        (
            prop::sample::select(ANNOTATION_NAMES),
            prop::sample::select(ANNOTATION_VALUES),
        )
            .prop_map(|(name, value)| {
                FilterRule::AnnotationData(AnnotationDataRule::new(
                    literal_regex(name),
                    literal_regex(value),
                ))
            }),
        (0..4i32, 1..5i32)
            .prop_filter("index < count", |(index, count)| index < count)
            .prop_map(|(index, count)| {
                FilterRule::Fragmentation(FragmentationRule::new(index, count))
            }),
    ]
}

/// Either a prefix regex built from one of the values, or a subset of the values.
fn source_strategy(pool: &'static [&'static str]) -> impl Strategy<Value = MatchSource> {
    prop_oneof![
        prop::sample::select(pool).prop_map(|value| {
            let pattern = format!("{}.*", regex::escape(value));
            MatchSource::from_regex(FilterRegex::new(pattern).expect("escaped regex is valid"))
        }),
        prop::sample::subsequence(pool, 0..=pool.len())
            .prop_map(MatchSource::from_values),
    ]
}

fn literal_regex(value: &str) -> FilterRegex {
    FilterRegex::new(regex::escape(value)).expect("escaped regex is valid")
}
