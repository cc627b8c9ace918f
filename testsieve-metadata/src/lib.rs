// Copyright (c) The testsieve Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Test identities and machine-readable formats shared by the testsieve crates.
//!
//! Tests are discovered by some external tool and handed to testsieve as a
//! [`TestListSummary`]. Selections are written back out as a [`SelectionSummary`].

mod exit_codes;
mod test_list;

pub use exit_codes::*;
pub use test_list::*;
