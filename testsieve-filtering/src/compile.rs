// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::FilterCompileError,
    filter::{CompiledFilter, TestAttribute, ValueMatcher},
    fragment::Fragment,
    rule::{FilterKind, FilterRule, MatchSource},
    validate::ResolvedSource,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use tracing::debug;

/// Context for compiling filter rules.
#[derive(Clone, Debug, Default)]
pub struct FilterContext {
    base_dir: Option<Utf8PathBuf>,
}

impl FilterContext {
    /// Creates a new context. Relative `file` paths are resolved against the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new context that resolves relative `file` paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Returns the directory relative `file` paths are resolved against, if any.
    pub fn base_dir(&self) -> Option<&Utf8Path> {
        self.base_dir.as_deref()
    }

    fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        match &self.base_dir {
            Some(base_dir) if path.is_relative() => base_dir.join(path),
            _ => path.to_owned(),
        }
    }
}

impl FilterRule {
    /// Validates this rule, then compiles it into a filter.
    ///
    /// Files referenced by `file` sources are read here, exactly once.
    pub fn compile(&self, cx: &FilterContext) -> Result<CompiledFilter, FilterCompileError> {
        self.validate()?;
        compile_rule(self, cx)
    }
}

fn compile_rule(
    rule: &FilterRule,
    cx: &FilterContext,
) -> Result<CompiledFilter, FilterCompileError> {
    let kind = rule.kind();
    let compiled = match rule {
        FilterRule::SimpleClassName(source) => {
            compile_attribute(TestAttribute::SimpleClassName, kind, source, cx)?
        }
        FilterRule::FullyQualifiedClassName(source) => {
            compile_attribute(TestAttribute::FullyQualifiedClassName, kind, source, cx)?
        }
        FilterRule::TestPackage(source) => {
            compile_attribute(TestAttribute::Package, kind, source, cx)?
        }
        FilterRule::FullyQualifiedTestName(source) => {
            compile_attribute(TestAttribute::FullyQualifiedTestName, kind, source, cx)?
        }
        FilterRule::TestMethod(source) => {
            compile_attribute(TestAttribute::Method, kind, source, cx)?
        }
        FilterRule::Annotation(source) => {
            compile_attribute(TestAttribute::AnnotationName, kind, source, cx)?
        }
        FilterRule::AnnotationData(rule) => CompiledFilter::AnnotationData {
            name_regex: rule.name_regex.clone(),
            value_regex: rule.value_regex.clone(),
        },
        FilterRule::Fragmentation(rule) => {
            // Validation guarantees both are non-negative.
            CompiledFilter::Fragment(Fragment::new(
                u64::from(rule.index.unsigned_abs()),
                u64::from(rule.count.unsigned_abs()),
            ))
        }
        FilterRule::Composition(rule) => CompiledFilter::Composition {
            filters: rule
                .filters
                .iter()
                .map(|filter| compile_rule(filter, cx))
                .collect::<Result<_, _>>()?,
            op: rule.op,
        },
    };
    Ok(compiled)
}

fn compile_attribute(
    attribute: TestAttribute,
    kind: FilterKind,
    source: &MatchSource,
    cx: &FilterContext,
) -> Result<CompiledFilter, FilterCompileError> {
    let matcher = match source.resolve(kind)? {
        ResolvedSource::Regex(regex) => ValueMatcher::Regex(regex.clone()),
        ResolvedSource::Values(values) => ValueMatcher::Values(values.iter().cloned().collect()),
        ResolvedSource::File(path) => {
            ValueMatcher::Values(read_values_file(kind, &cx.resolve_path(path))?)
        }
    };
    Ok(CompiledFilter::Attribute { attribute, matcher })
}

/// Reads one value per line. Surrounding whitespace is trimmed and blank lines are skipped.
fn read_values_file(
    kind: FilterKind,
    path: &Utf8Path,
) -> Result<HashSet<String>, FilterCompileError> {
    let contents = std::fs::read_to_string(path).map_err(|error| FilterCompileError::ReadFile {
        kind,
        path: path.to_owned(),
        error,
    })?;
    let values: HashSet<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    debug!(
        "read {} values for {kind} filter from `{path}`",
        values.len()
    );
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ConfigurationError,
        rule::{CompositionOp, CompositionRule, FilterRegex, FragmentationRule},
    };
    use camino_tempfile::Utf8TempDir;
    use camino_tempfile_ext::prelude::*;
    use testsieve_metadata::TestCase;

    fn method_from_file(path: &str) -> FilterRule {
        FilterRule::TestMethod(MatchSource::from_file(path))
    }

    #[test]
    fn file_source_relative_to_base_dir() {
        let temp_dir = Utf8TempDir::new().expect("temp dir created");
        temp_dir
            .child("methods.txt")
            .write_str("testA\n\n   testB  \n")
            .expect("file written");

        let cx = FilterContext::with_base_dir(temp_dir.path());
        let filter = method_from_file("methods.txt")
            .compile(&cx)
            .expect("file is readable");

        let test = |method: &str| TestCase::new("com.example", "FooTest", method);
        assert!(filter.matches(&test("testA")));
        assert!(filter.matches(&test("testB")));
        assert!(!filter.matches(&test("testC")));
        assert!(!filter.matches(&test("")));
    }

    #[test]
    fn file_source_absolute_path_ignores_base_dir() {
        let temp_dir = Utf8TempDir::new().expect("temp dir created");
        let file = temp_dir.child("classes.txt");
        file.write_str("FooTest\n").expect("file written");

        let cx = FilterContext::with_base_dir("/nonexistent");
        let filter = FilterRule::SimpleClassName(MatchSource::from_file(file.to_path_buf()))
            .compile(&cx)
            .expect("absolute path is used as is");
        assert!(filter.matches(&TestCase::new("", "FooTest", "testA")));
    }

    #[test]
    fn missing_file_names_path() {
        let temp_dir = Utf8TempDir::new().expect("temp dir created");
        let cx = FilterContext::with_base_dir(temp_dir.path());
        let err = method_from_file("missing.txt")
            .compile(&cx)
            .expect_err("file does not exist");
        match err {
            FilterCompileError::ReadFile { kind, path, .. } => {
                assert_eq!(kind, FilterKind::TestMethod);
                assert_eq!(path, temp_dir.path().join("missing.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nested_missing_file_fails_compile() {
        let temp_dir = Utf8TempDir::new().expect("temp dir created");
        let cx = FilterContext::with_base_dir(temp_dir.path());
        let rule = FilterRule::Composition(CompositionRule::new(
            vec![
                FilterRule::TestPackage(MatchSource::from_values(["com.example"])),
                method_from_file("missing.txt"),
            ],
            CompositionOp::Union,
        ));
        assert!(matches!(
            rule.compile(&cx),
            Err(FilterCompileError::ReadFile { .. })
        ));
    }

    #[test]
    fn compile_validates_first() {
        // The file doesn't exist, but validation fails before it is read.
        let rule = FilterRule::Annotation(MatchSource {
            regex: Some(FilterRegex::new("Flaky").expect("valid regex")),
            values: None,
            file: Some("missing.txt".into()),
        });
        assert!(matches!(
            rule.compile(&FilterContext::new()),
            Err(FilterCompileError::Configuration(
                ConfigurationError::MultipleMatchSources { .. }
            ))
        ));

        let rule = FilterRule::Fragmentation(FragmentationRule::new(1, 1));
        assert!(matches!(
            rule.compile(&FilterContext::new()),
            Err(FilterCompileError::Configuration(
                ConfigurationError::FragmentIndexOutOfRange { index: 1, count: 1 }
            ))
        ));
    }
}
