// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

//! Lossless (VP8L) bitstream reading

pub mod bit_reader;
pub mod header;

pub use bit_reader::LsbBitReader;
pub use header::Vp8lHeader;
