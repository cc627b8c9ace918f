// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::FilterRegexError;
use camino::Utf8PathBuf;
use regex::Regex;
use regex_syntax::hir::{Hir, Look};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

/// The allowlist and blocklist of filter rules for a run.
///
/// The two lists are independent. How they combine into a final decision is up to the caller.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterSpecification {
    /// Rules selecting the tests that may run.
    #[serde(default)]
    pub allowlist: Vec<FilterRule>,

    /// Rules selecting the tests that must not run.
    #[serde(default)]
    pub blocklist: Vec<FilterRule>,
}

impl FilterSpecification {
    /// Returns true if neither list has any rules.
    pub fn is_empty(&self) -> bool {
        self.allowlist.is_empty() && self.blocklist.is_empty()
    }

    /// Iterates over all top-level rules along with the list they belong to and their position.
    pub fn rules(&self) -> impl Iterator<Item = (FilterListKind, usize, &FilterRule)> + '_ {
        let allowlist = self
            .allowlist
            .iter()
            .enumerate()
            .map(|(index, rule)| (FilterListKind::Allowlist, index, rule));
        let blocklist = self
            .blocklist
            .iter()
            .enumerate()
            .map(|(index, rule)| (FilterListKind::Blocklist, index, rule));
        allowlist.chain(blocklist)
    }
}

/// Which list of a [`FilterSpecification`] a rule belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilterListKind {
    /// The allowlist.
    Allowlist,
    /// The blocklist.
    Blocklist,
}

impl fmt::Display for FilterListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowlist => write!(f, "allowlist"),
            Self::Blocklist => write!(f, "blocklist"),
        }
    }
}

/// A single declarative rule for matching tests.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FilterRule {
    /// Matches the simple class name of a test, e.g. `LoginTest`.
    SimpleClassName(MatchSource),

    /// Matches the package-qualified class name of a test, e.g. `com.example.LoginTest`.
    FullyQualifiedClassName(MatchSource),

    /// Matches the package of a test, e.g. `com.example`.
    #[serde(rename = "package")]
    TestPackage(MatchSource),

    /// Matches the fully qualified test name, e.g. `com.example.LoginTest#logsIn`.
    FullyQualifiedTestName(MatchSource),

    /// Matches the method name of a test.
    #[serde(rename = "method")]
    TestMethod(MatchSource),

    /// Matches tests carrying an annotation with a matching name.
    Annotation(MatchSource),

    /// Matches tests carrying an annotation whose name and value both match.
    AnnotationData(AnnotationDataRule),

    /// Matches one of several stable, disjoint shards of the tests.
    Fragmentation(FragmentationRule),

    /// Combines several rules with an operator.
    Composition(CompositionRule),
}

impl FilterRule {
    /// Returns the kind of this rule.
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::SimpleClassName(_) => FilterKind::SimpleClassName,
            Self::FullyQualifiedClassName(_) => FilterKind::FullyQualifiedClassName,
            Self::TestPackage(_) => FilterKind::TestPackage,
            Self::FullyQualifiedTestName(_) => FilterKind::FullyQualifiedTestName,
            Self::TestMethod(_) => FilterKind::TestMethod,
            Self::Annotation(_) => FilterKind::Annotation,
            Self::AnnotationData(_) => FilterKind::AnnotationData,
            Self::Fragmentation(_) => FilterKind::Fragmentation,
            Self::Composition(_) => FilterKind::Composition,
        }
    }
}

/// The kind of a [`FilterRule`].
///
/// Displayed as the `type` tag used in configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FilterKind {
    /// [`FilterRule::SimpleClassName`].
    SimpleClassName,
    /// [`FilterRule::FullyQualifiedClassName`].
    FullyQualifiedClassName,
    /// [`FilterRule::TestPackage`].
    TestPackage,
    /// [`FilterRule::FullyQualifiedTestName`].
    FullyQualifiedTestName,
    /// [`FilterRule::TestMethod`].
    TestMethod,
    /// [`FilterRule::Annotation`].
    Annotation,
    /// [`FilterRule::AnnotationData`].
    AnnotationData,
    /// [`FilterRule::Fragmentation`].
    Fragmentation,
    /// [`FilterRule::Composition`].
    Composition,
}

impl FilterKind {
    /// Returns the configuration tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimpleClassName => "simple-class-name",
            Self::FullyQualifiedClassName => "fully-qualified-class-name",
            Self::TestPackage => "package",
            Self::FullyQualifiedTestName => "fully-qualified-test-name",
            Self::TestMethod => "method",
            Self::Annotation => "annotation",
            Self::AnnotationData => "annotation-data",
            Self::Fragmentation => "fragmentation",
            Self::Composition => "composition",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a simple rule gets the values it matches against.
///
/// Exactly one of the three sources must be present for the rule to be valid. An empty `values`
/// list counts as present.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchSource {
    /// A regular expression that must match the whole attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<FilterRegex>,

    /// A list of exact values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    /// A file with one value per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,
}

impl MatchSource {
    /// Creates a match source from a regex.
    pub fn from_regex(regex: FilterRegex) -> Self {
        Self {
            regex: Some(regex),
            ..Default::default()
        }
    }

    /// Creates a match source from a list of exact values.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: Some(values.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Creates a match source from a file listing one value per line.
    pub fn from_file(file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Default::default()
        }
    }

    /// Returns the sources that are present, in a fixed order.
    pub fn present(&self) -> Vec<MatchSourceKind> {
        let mut present = Vec::with_capacity(1);
        if self.regex.is_some() {
            present.push(MatchSourceKind::Regex);
        }
        if self.values.is_some() {
            present.push(MatchSourceKind::Values);
        }
        if self.file.is_some() {
            present.push(MatchSourceKind::File);
        }
        present
    }
}

/// One of the three ways a simple rule can match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MatchSourceKind {
    /// `regex`
    Regex,
    /// `values`
    Values,
    /// `file`
    File,
}

impl fmt::Display for MatchSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex => write!(f, "regex"),
            Self::Values => write!(f, "values"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Matches tests with an annotation whose name matches `name_regex` and whose value matches
/// `value_regex`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnnotationDataRule {
    /// The regex for the annotation name.
    pub name_regex: FilterRegex,

    /// The regex for the annotation value.
    pub value_regex: FilterRegex,
}

impl AnnotationDataRule {
    /// Creates a new annotation data rule.
    pub fn new(name_regex: FilterRegex, value_regex: FilterRegex) -> Self {
        Self {
            name_regex,
            value_regex,
        }
    }
}

/// Selects shard `index` out of `count` shards.
///
/// The fields are signed so that invalid configuration can be represented and reported by
/// validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentationRule {
    /// The shard to select, counting up from 0.
    pub index: i32,

    /// The total number of shards.
    pub count: i32,
}

impl FragmentationRule {
    /// Creates a new fragmentation rule.
    pub fn new(index: i32, count: i32) -> Self {
        Self { index, count }
    }
}

/// The operator used to combine the rules of a [`CompositionRule`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionOp {
    /// Tests matched by at least one rule.
    #[serde(alias = "UNION")]
    Union,

    /// Tests matched by every rule.
    #[serde(alias = "INTERSECTION")]
    Intersection,

    /// Tests matched by none of the rules.
    #[serde(alias = "SUBTRACT")]
    Subtract,
}

impl fmt::Display for CompositionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Union => write!(f, "union"),
            Self::Intersection => write!(f, "intersection"),
            Self::Subtract => write!(f, "subtract"),
        }
    }
}

/// Several rules combined with an operator.
///
/// Two compositions are equal if they have the same operator and the same rules, counted with
/// multiplicity, in any order.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionRule {
    /// The rules to combine.
    pub filters: Vec<FilterRule>,

    /// The operator.
    pub op: CompositionOp,
}

impl CompositionRule {
    /// Creates a new composition.
    pub fn new(filters: Vec<FilterRule>, op: CompositionOp) -> Self {
        Self { filters, op }
    }
}

impl PartialEq for CompositionRule {
    fn eq(&self, other: &Self) -> bool {
        if self.op != other.op || self.filters.len() != other.filters.len() {
            return false;
        }
        // With equal lengths, matching multiplicities for every rule on one side means the
        // multisets are equal.
        self.filters.iter().all(|filter| {
            let ours = self.filters.iter().filter(|f| *f == filter).count();
            let theirs = other.filters.iter().filter(|f| *f == filter).count();
            ours == theirs
        })
    }
}

impl Eq for CompositionRule {}

impl Hash for CompositionRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.op.hash(state);
        // Must be commutative to agree with the order-independent equality above.
        let combined = self.filters.iter().fold(0u64, |acc, filter| {
            let mut hasher = DefaultHasher::new();
            filter.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        combined.hash(state);
    }
}

/// A regular expression used by a filter rule.
///
/// The regex must match the whole input. Two regexes are equal if their source text is equal.
#[derive(Clone)]
pub struct FilterRegex {
    source: String,
    regex: Regex,
}

impl FilterRegex {
    /// Compiles a new regex.
    pub fn new(pattern: impl Into<String>) -> Result<Self, FilterRegexError> {
        let source = pattern.into();
        let hir = match regex_syntax::Parser::new().parse(&source) {
            Ok(hir) => hir,
            Err(err) => return Err(FilterRegexError::from_syntax(source, &err)),
        };
        // Anchor the parsed pattern rather than its text, so flags like (?x) can't leak into the
        // anchors.
        let anchored = Hir::concat(vec![Hir::look(Look::Start), hir, Hir::look(Look::End)]);
        let regex = Regex::new(&anchored.to_string()).map_err(|err| {
            let message = match err {
                regex::Error::CompiledTooBig(limit) => {
                    format!("compiled regex exceeds size limit of {limit} bytes")
                }
                other => other.to_string(),
            };
            FilterRegexError::new(source.clone(), message)
        })?;
        Ok(Self { source, regex })
    }

    /// Returns the source text of this regex.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the regex matches the whole input.
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}

impl fmt::Debug for FilterRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterRegex").field(&self.source).finish()
    }
}

impl fmt::Display for FilterRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for FilterRegex {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for FilterRegex {}

impl Hash for FilterRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl<'de> Deserialize<'de> for FilterRegex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        Self::new(pattern).map_err(serde::de::Error::custom)
    }
}

impl Serialize for FilterRegex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}
