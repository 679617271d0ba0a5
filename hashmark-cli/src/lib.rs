// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Hashmark CLI support library.
//!
//! Hosts the roster of hash and checksum adapters registered by the
//! `hashmark` binary. Kept as a library so criterion benches can exercise
//! the same roster the CLI runs.

pub mod algorithms;
