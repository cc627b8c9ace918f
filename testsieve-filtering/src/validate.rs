// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ConfigurationError, InvalidFilterError},
    rule::{
        FilterKind, FilterRegex, FilterRule, FilterSpecification, FragmentationRule, MatchSource,
    },
};
use camino::Utf8Path;

/// The single source of a valid [`MatchSource`].
#[derive(Copy, Clone, Debug)]
pub(crate) enum ResolvedSource<'a> {
    Regex(&'a FilterRegex),
    Values(&'a [String]),
    File(&'a Utf8Path),
}

impl MatchSource {
    /// Checks that exactly one of `regex`, `values` or `file` is present.
    ///
    /// `kind` is only used for error messages. The file, if any, is not accessed.
    pub fn validate(&self, kind: FilterKind) -> Result<(), ConfigurationError> {
        self.resolve(kind).map(|_| ())
    }

    pub(crate) fn resolve(
        &self,
        kind: FilterKind,
    ) -> Result<ResolvedSource<'_>, ConfigurationError> {
        match (&self.regex, &self.values, &self.file) {
            (Some(regex), None, None) => Ok(ResolvedSource::Regex(regex)),
            (None, Some(values), None) => Ok(ResolvedSource::Values(values)),
            (None, None, Some(file)) => Ok(ResolvedSource::File(file)),
            (None, None, None) => Err(ConfigurationError::NoMatchSource { kind }),
            _ => Err(ConfigurationError::MultipleMatchSources {
                kind,
                found: self.present(),
            }),
        }
    }
}

impl FragmentationRule {
    /// Checks that `0 <= index < count`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let Self { index, count } = *self;
        if index < 0 {
            return Err(ConfigurationError::NegativeFragmentIndex { index });
        }
        if count < 0 {
            return Err(ConfigurationError::NegativeFragmentCount { count });
        }
        if index >= count {
            return Err(ConfigurationError::FragmentIndexOutOfRange { index, count });
        }
        Ok(())
    }
}

impl FilterRule {
    /// Checks this rule's invariants, recursing into compositions.
    ///
    /// This is a pure check: it never touches the filesystem, even for `file` sources. The first
    /// violation found is returned.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::SimpleClassName(source)
            | Self::FullyQualifiedClassName(source)
            | Self::TestPackage(source)
            | Self::FullyQualifiedTestName(source)
            | Self::TestMethod(source)
            | Self::Annotation(source) => source.validate(self.kind()),
            // Both regexes are required by construction.
            Self::AnnotationData(_) => Ok(()),
            Self::Fragmentation(rule) => rule.validate(),
            Self::Composition(rule) => rule.filters.iter().try_for_each(FilterRule::validate),
        }
    }
}

impl FilterSpecification {
    /// Validates every rule in the allowlist, then every rule in the blocklist.
    ///
    /// Stops at the first invalid rule.
    pub fn validate(&self) -> Result<(), InvalidFilterError> {
        for (list, index, rule) in self.rules() {
            rule.validate()
                .map_err(|error| InvalidFilterError { list, index, error })?;
        }
        Ok(())
    }
}
