// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    fragment::Fragment,
    rule::{CompositionOp, FilterRegex},
};
use std::collections::HashSet;
use testsieve_metadata::TestCase;

/// Matcher for a single string attribute of a test.
#[derive(Clone, Debug)]
pub enum ValueMatcher {
    /// The whole attribute must match the regex.
    Regex(FilterRegex),
    /// The attribute must be one of these values. Values read from a file end up here too.
    Values(HashSet<String>),
}

impl ValueMatcher {
    /// Returns true if the input matches.
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(input),
            Self::Values(values) => values.contains(input),
        }
    }
}

/// The attribute of a test that a simple rule matches against.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestAttribute {
    /// The class name, e.g. `LoginTest`.
    SimpleClassName,
    /// The package-qualified class name, e.g. `com.example.LoginTest`.
    FullyQualifiedClassName,
    /// The package, e.g. `com.example`.
    Package,
    /// The fully qualified test name, e.g. `com.example.LoginTest#logsIn`.
    FullyQualifiedTestName,
    /// The method name.
    Method,
    /// The name of any annotation on the test.
    AnnotationName,
}

impl TestAttribute {
    fn matches(self, test: &TestCase, matcher: &ValueMatcher) -> bool {
        match self {
            Self::SimpleClassName => matcher.is_match(&test.class_name),
            Self::FullyQualifiedClassName => matcher.is_match(&test.fully_qualified_class_name()),
            Self::Package => matcher.is_match(&test.package),
            Self::FullyQualifiedTestName => matcher.is_match(&test.fully_qualified_test_name()),
            Self::Method => matcher.is_match(&test.method),
            Self::AnnotationName => test
                .annotations
                .iter()
                .any(|annotation| matcher.is_match(&annotation.name)),
        }
    }
}

/// A validated filter rule with its match sources resolved.
///
/// Created by [`FilterRule::compile`](crate::FilterRule::compile).
#[derive(Clone, Debug)]
pub enum CompiledFilter {
    /// Matches one attribute of a test.
    Attribute {
        /// The attribute to match.
        attribute: TestAttribute,
        /// The matcher for the attribute.
        matcher: ValueMatcher,
    },

    /// Matches tests with at least one annotation whose name and value both match.
    AnnotationData {
        /// The regex for the annotation name.
        name_regex: FilterRegex,
        /// The regex for the annotation value.
        value_regex: FilterRegex,
    },

    /// Matches one shard of the tests.
    Fragment(Fragment),

    /// Combines the matches of several filters.
    Composition {
        /// The filters to combine.
        filters: Vec<CompiledFilter>,
        /// How to combine them.
        op: CompositionOp,
    },
}

impl CompiledFilter {
    /// Returns true if this filter matches the given test.
    ///
    /// For every filter, `matches(test)` agrees with whether `test` is in `filter(tests)` for any
    /// `tests` containing it.
    pub fn matches(&self, test: &TestCase) -> bool {
        match self {
            Self::Attribute { attribute, matcher } => attribute.matches(test, matcher),
            Self::AnnotationData {
                name_regex,
                value_regex,
            } => test.annotations.iter().any(|annotation| {
                // Both regexes must match the same annotation.
                name_regex.is_match(&annotation.name)
                    && annotation
                        .value
                        .as_deref()
                        .is_some_and(|value| value_regex.is_match(value))
            }),
            Self::Fragment(fragment) => fragment.matches(test),
            Self::Composition { filters, op } => match op {
                CompositionOp::Union => filters.iter().any(|filter| filter.matches(test)),
                CompositionOp::Intersection => filters.iter().all(|filter| filter.matches(test)),
                CompositionOp::Subtract => !filters.iter().any(|filter| filter.matches(test)),
            },
        }
    }

    /// Returns the tests matched by this filter, in input order.
    ///
    /// For a composition, every sub-filter is evaluated against the full `tests` input, and the
    /// results are combined with the composition's operator.
    pub fn filter<'a>(&self, tests: &[&'a TestCase]) -> Vec<&'a TestCase> {
        match self {
            Self::Composition { filters, op } => {
                let matched = compose(filters, *op, tests);
                tests
                    .iter()
                    .copied()
                    .filter(|test| matched.contains(test))
                    .collect()
            }
            _ => tests
                .iter()
                .copied()
                .filter(|test| self.matches(test))
                .collect(),
        }
    }

    /// Returns the tests not matched by this filter, in input order.
    ///
    /// This is always `tests - filter(tests)`, whatever the kind of filter or composition
    /// operator.
    pub fn filter_not<'a>(&self, tests: &[&'a TestCase]) -> Vec<&'a TestCase> {
        let matched: HashSet<&TestCase> = self.filter(tests).into_iter().collect();
        tests
            .iter()
            .copied()
            .filter(|test| !matched.contains(test))
            .collect()
    }
}

fn compose<'a>(
    filters: &[CompiledFilter],
    op: CompositionOp,
    tests: &[&'a TestCase],
) -> HashSet<&'a TestCase> {
    match op {
        CompositionOp::Union => filters.iter().fold(HashSet::new(), |mut acc, filter| {
            acc.extend(filter.filter(tests));
            acc
        }),
        CompositionOp::Intersection => {
            let all: HashSet<_> = tests.iter().copied().collect();
            filters.iter().fold(all, |acc, filter| {
                let matched: HashSet<_> = filter.filter(tests).into_iter().collect();
                acc.intersection(&matched).copied().collect()
            })
        }
        CompositionOp::Subtract => {
            let all: HashSet<_> = tests.iter().copied().collect();
            filters.iter().fold(all, |mut acc, filter| {
                for test in filter.filter(tests) {
                    acc.remove(test);
                }
                acc
            })
        }
    }
}
