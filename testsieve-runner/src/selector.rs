// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applying a filter specification's allowlist and blocklist to a list of tests.

use crate::{
    config::FilterConfig,
    errors::{SelectorBuildError, WriteSelectionError},
    test_list::{OutputFormat, Styles},
};
use owo_colors::OwoColorize;
use std::{
    collections::HashSet,
    io::{self, Write},
};
use testsieve_filtering::{
    CompiledFilter, CompositionOp, FilterContext, FilterListKind, FilterRule, FilterSpecification,
};
use testsieve_metadata::{
    FilterMatch, MismatchReason, SelectionSummary, SkippedTestSummary, TestCase,
};
use tracing::debug;

/// Selects tests using the allowlist and blocklist of a [`FilterSpecification`].
///
/// If the allowlist has any rules, only tests matched by at least one of them are selected. Tests
/// matched by any blocklist rule are then removed.
#[derive(Clone, Debug)]
pub struct TestSelector {
    allowlist: Option<CompiledFilter>,
    blocklist: CompiledFilter,
}

impl TestSelector {
    /// Compiles every rule in `spec`, reading any files they reference.
    pub fn new(spec: &FilterSpecification, cx: &FilterContext) -> Result<Self, SelectorBuildError> {
        let allowlist = compile_list(FilterListKind::Allowlist, &spec.allowlist, cx)?;
        let blocklist = compile_list(FilterListKind::Blocklist, &spec.blocklist, cx)?;
        Ok(Self {
            allowlist: (!spec.allowlist.is_empty()).then_some(allowlist),
            blocklist,
        })
    }

    /// Compiles the rules in `config`, resolving relative file paths against its directory.
    pub fn from_config(config: &FilterConfig) -> Result<Self, SelectorBuildError> {
        Self::new(config.specification(), &config.filter_context())
    }

    /// Returns whether a single test is selected.
    pub fn filter_match(&self, test: &TestCase) -> FilterMatch {
        if let Some(allowlist) = &self.allowlist
            && !allowlist.matches(test)
        {
            return FilterMatch::Mismatch {
                reason: MismatchReason::NotAllowlisted,
            };
        }
        if self.blocklist.matches(test) {
            return FilterMatch::Mismatch {
                reason: MismatchReason::Blocklisted,
            };
        }
        FilterMatch::Matches
    }

    /// Splits `tests` into selected and skipped tests, keeping their order.
    pub fn select<'a>(&self, tests: &'a [TestCase]) -> SelectedTests<'a> {
        let refs: Vec<&TestCase> = tests.iter().collect();
        let allowed: Option<HashSet<&TestCase>> = self
            .allowlist
            .as_ref()
            .map(|allowlist| allowlist.filter(&refs).into_iter().collect());
        let blocked: HashSet<&TestCase> = self.blocklist.filter(&refs).into_iter().collect();

        let tests: Vec<_> = refs
            .into_iter()
            .map(|test| {
                let not_allowed = allowed
                    .as_ref()
                    .is_some_and(|allowed| !allowed.contains(test));
                let filter_match = if not_allowed {
                    FilterMatch::Mismatch {
                        reason: MismatchReason::NotAllowlisted,
                    }
                } else if blocked.contains(test) {
                    FilterMatch::Mismatch {
                        reason: MismatchReason::Blocklisted,
                    }
                } else {
                    FilterMatch::Matches
                };
                (test, filter_match)
            })
            .collect();

        let selected = SelectedTests { tests };
        debug!(
            "selected {} of {} tests ({} skipped)",
            selected.selected_count(),
            selected.tests.len(),
            selected.skipped_count(),
        );
        selected
    }
}

fn compile_list(
    list: FilterListKind,
    rules: &[FilterRule],
    cx: &FilterContext,
) -> Result<CompiledFilter, SelectorBuildError> {
    let filters = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            rule.compile(cx)
                .map_err(|error| SelectorBuildError { list, index, error })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!("compiled {} {list} rules", filters.len());
    Ok(CompiledFilter::Composition {
        filters,
        op: CompositionOp::Union,
    })
}

/// The result of [`TestSelector::select`].
#[derive(Clone, Debug)]
pub struct SelectedTests<'a> {
    tests: Vec<(&'a TestCase, FilterMatch)>,
}

impl<'a> SelectedTests<'a> {
    /// Iterates over every test in input order, along with whether it was selected.
    pub fn iter(&self) -> impl Iterator<Item = (&'a TestCase, FilterMatch)> + '_ {
        self.tests.iter().copied()
    }

    /// Iterates over the selected tests in input order.
    pub fn selected(&self) -> impl Iterator<Item = &'a TestCase> + '_ {
        self.iter()
            .filter(|(_, filter_match)| filter_match.is_match())
            .map(|(test, _)| test)
    }

    /// Iterates over the skipped tests in input order, along with the reason each was skipped.
    pub fn skipped(&self) -> impl Iterator<Item = (&'a TestCase, MismatchReason)> + '_ {
        self.iter().filter_map(|(test, filter_match)| match filter_match {
            FilterMatch::Matches => None,
            FilterMatch::Mismatch { reason } => Some((test, reason)),
        })
    }

    /// Returns the number of selected tests.
    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    /// Returns the number of skipped tests.
    pub fn skipped_count(&self) -> usize {
        self.tests.len() - self.selected_count()
    }

    /// Returns a serializable summary of this selection.
    pub fn to_summary(&self) -> SelectionSummary {
        let selected: Vec<_> = self.selected().cloned().collect();
        let skipped: Vec<_> = self
            .skipped()
            .map(|(test, reason)| SkippedTestSummary {
                test: test.clone(),
                reason,
            })
            .collect();
        SelectionSummary {
            selected_count: selected.len(),
            skipped_count: skipped.len(),
            selected,
            skipped,
        }
    }

    /// Outputs this selection to the given writer.
    pub fn write(
        &self,
        output_format: OutputFormat,
        writer: impl Write,
        colorize: bool,
    ) -> Result<(), WriteSelectionError> {
        match output_format {
            OutputFormat::Human { verbose } => self
                .write_human(writer, verbose, colorize)
                .map_err(WriteSelectionError::Io),
            OutputFormat::Serializable(format) => format
                .to_writer(&self.to_summary(), writer)
                .map_err(WriteSelectionError::Json),
        }
    }

    fn write_human(&self, mut writer: impl Write, verbose: bool, colorize: bool) -> io::Result<()> {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        for (test, filter_match) in self.iter() {
            match (verbose, filter_match) {
                (_, FilterMatch::Matches) => {
                    write_test_name(test, &styles, &mut writer)?;
                    if verbose {
                        write_annotations(test, &styles, &mut writer)?;
                    }
                    writeln!(writer)?;
                }
                (true, FilterMatch::Mismatch { reason }) => {
                    write_test_name(test, &styles, &mut writer)?;
                    write_annotations(test, &styles, &mut writer)?;
                    writeln!(
                        writer,
                        " {}",
                        format!("(skipped: {reason})").style(styles.skipped)
                    )?;
                }
                (false, FilterMatch::Mismatch { .. }) => {
                    // Skip printing this test entirely if it isn't a match.
                }
            }
        }

        if verbose {
            writeln!(
                writer,
                "{} of {} tests selected",
                self.selected_count().style(styles.count),
                self.tests.len().style(styles.count),
            )?;
        }
        Ok(())
    }
}

fn write_test_name(test: &TestCase, styles: &Styles, mut writer: impl Write) -> io::Result<()> {
    if !test.package.is_empty() {
        write!(writer, "{}.", test.package.style(styles.package))?;
    }
    write!(
        writer,
        "{}#{}",
        test.class_name.style(styles.class_name),
        test.method.style(styles.method),
    )
}

fn write_annotations(test: &TestCase, styles: &Styles, mut writer: impl Write) -> io::Result<()> {
    for annotation in &test.annotations {
        write!(writer, " {}", annotation.style(styles.annotation))?;
    }
    Ok(())
}
