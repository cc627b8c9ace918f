// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Declarative filter rules for selecting tests, and the algebra used to combine them.
//!
//! The flow of operations is:
//!
//! 1. A [`FilterRule`] is constructed, usually by deserializing configuration.
//! 2. [`FilterRule::validate`] checks the rule's invariants without touching the filesystem.
//! 3. [`FilterRule::compile`] resolves the rule's match source (reading any referenced files)
//!    into a [`CompiledFilter`].
//! 4. [`CompiledFilter::filter`] and [`CompiledFilter::filter_not`] split a list of tests.

mod compile;
pub mod errors;
mod filter;
mod fragment;
#[cfg(test)]
mod proptest_helpers;
mod rule;
mod validate;

pub use compile::FilterContext;
pub use filter::{CompiledFilter, TestAttribute, ValueMatcher};
pub use fragment::{Fragment, fragment_bucket};
pub use rule::{
    AnnotationDataRule, CompositionOp, CompositionRule, FilterKind, FilterListKind, FilterRegex,
    FilterRule, FilterSpecification, FragmentationRule, MatchSource, MatchSourceKind,
};
