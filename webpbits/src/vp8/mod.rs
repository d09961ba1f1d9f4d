// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

//! Lossy (VP8) bitstream reading

pub mod bool_decoder;
pub mod partitions;

pub use bool_decoder::BooleanDecoder;
pub use partitions::Vp8Partitions;
