// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hash-based sharding of tests.
//!
//! A test's shard depends only on its fully qualified name, so a test always lands in the same
//! shard no matter which other tests are present or what order they are listed in.

use testsieve_metadata::TestCase;
use xxhash_rust::xxh64::xxh64;

/// Returns the shard, in `0..count`, that `test` falls into when tests are split `count` ways.
///
/// # Panics
///
/// Panics if `count` is 0.
pub fn fragment_bucket(test: &TestCase, count: u64) -> u64 {
    // NOTE: the hash function and seed are fixed. Changing either reshuffles every shard.
    xxh64(test.fully_qualified_test_name().as_bytes(), 0) % count
}

/// A compiled fragmentation filter, selecting shard `index` out of `count`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Fragment {
    index: u64,
    count: u64,
}

impl Fragment {
    /// Only called after validation, so `index < count` always holds.
    pub(crate) fn new(index: u64, count: u64) -> Self {
        debug_assert!(
            index < count,
            "fragment index {index} must be less than count {count}"
        );
        Self { index, count }
    }

    /// The shard selected by this fragment, counting up from 0.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The total number of shards.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns true if the test falls into this fragment's shard.
    pub fn matches(&self, test: &TestCase) -> bool {
        fragment_bucket(test, self.count) == self.index
    }
}
