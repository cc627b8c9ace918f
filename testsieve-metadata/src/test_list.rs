// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{fmt, io};

/// A single test discovered by an external tool.
///
/// Tests are identified by their package, class name and method name. Annotations are carried
/// along for annotation-based filtering but do not take part in the identity used for
/// fragmentation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCase {
    /// The package the test class lives in, e.g. `com.example.login`. May be empty.
    #[serde(default)]
    pub package: SmolStr,

    /// The simple name of the test class, e.g. `LoginTest`.
    pub class_name: SmolStr,

    /// The name of the test method.
    pub method: SmolStr,

    /// Annotations present on the test.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<TestAnnotation>,
}

impl TestCase {
    /// Creates a new test case with no annotations.
    pub fn new(
        package: impl Into<SmolStr>,
        class_name: impl Into<SmolStr>,
        method: impl Into<SmolStr>,
    ) -> Self {
        Self {
            package: package.into(),
            class_name: class_name.into(),
            method: method.into(),
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation to this test case.
    pub fn with_annotation(mut self, annotation: TestAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the class name qualified by its package, e.g. `com.example.LoginTest`.
    ///
    /// If the package is empty, this is just the class name.
    pub fn fully_qualified_class_name(&self) -> String {
        if self.package.is_empty() {
            self.class_name.to_string()
        } else {
            format!("{}.{}", self.package, self.class_name)
        }
    }

    /// Returns the fully qualified name of this test, e.g. `com.example.LoginTest#logsIn`.
    ///
    /// This is the identity used for fragmentation.
    pub fn fully_qualified_test_name(&self) -> String {
        format!("{}#{}", self.fully_qualified_class_name(), self.method)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}.", self.package)?;
        }
        write!(f, "{}#{}", self.class_name, self.method)
    }
}

/// An annotation on a test, with an optional value.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct TestAnnotation {
    /// The annotation's name, e.g. `Severity` or `org.junit.Ignore`.
    pub name: SmolStr,

    /// The annotation's value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SmolStr>,
}

impl TestAnnotation {
    /// Creates an annotation without a value.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Creates an annotation with a value.
    pub fn with_value(name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for TestAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "@{}({})", self.name, value),
            None => write!(f, "@{}", self.name),
        }
    }
}

/// A list of discovered tests, as read from disk.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestListSummary {
    /// The tests, in discovery order.
    #[serde(default)]
    pub tests: Vec<TestCase>,
}

impl TestListSummary {
    /// Parses JSON output corresponding to this structure.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json.as_ref())
    }

    /// Reads JSON corresponding to this structure from a reader.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

/// Whether a test was selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum FilterMatch {
    /// This test was selected.
    Matches,

    /// This test was not selected.
    ///
    /// The `MismatchReason` inside describes why.
    Mismatch {
        /// The reason the test was not selected.
        reason: MismatchReason,
    },
}

impl FilterMatch {
    /// Returns true if the test was selected.
    pub fn is_match(&self) -> bool {
        matches!(self, FilterMatch::Matches)
    }
}

/// The reason a test was not selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum MismatchReason {
    /// An allowlist was specified and none of its rules matched this test.
    NotAllowlisted,

    /// A blocklist rule matched this test.
    Blocklisted,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MismatchReason::NotAllowlisted => write!(f, "does not match the allowlist"),
            MismatchReason::Blocklisted => write!(f, "matches the blocklist"),
        }
    }
}

/// A test that was not selected, along with the reason.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SkippedTestSummary {
    /// The test.
    #[serde(flatten)]
    pub test: TestCase,

    /// Why the test was not selected.
    pub reason: MismatchReason,
}

/// Machine-readable output for a selection.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectionSummary {
    /// The number of selected tests.
    pub selected_count: usize,

    /// The number of tests that were not selected.
    pub skipped_count: usize,

    /// The selected tests, in input order.
    pub selected: Vec<TestCase>,

    /// The tests that were not selected, in input order.
    pub skipped: Vec<SkippedTestSummary>,
}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::*;
    use proptest::{collection::vec, prelude::*};

    impl Arbitrary for TestAnnotation {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (
                prop::sample::select(vec!["Severity", "Priority", "Flaky", "LargeTest"]),
                prop::option::of(prop::sample::select(vec!["high", "medium", "low"])),
            )
                .prop_map(|(name, value)| TestAnnotation {
                    name: name.into(),
                    value: value.map(Into::into),
                })
                .boxed()
        }
    }

    impl Arbitrary for TestCase {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (
                prop::sample::select(vec!["com.example", "com.example.login", "org.sample", ""]),
                prop::sample::select(vec!["FooTest", "BarTest", "BazTest", "LoginTest"]),
                prop::sample::select(vec!["testA", "testB", "itWorks", "logsIn"]),
                vec(any::<TestAnnotation>(), 0..3),
            )
                .prop_map(|(package, class_name, method, annotations)| TestCase {
                    package: package.into(),
                    class_name: class_name.into(),
                    method: method.into(),
                    annotations,
                })
                .boxed()
        }
    }
}
