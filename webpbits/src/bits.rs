// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Widest value the VP8L reader hands out in a single read.
pub const VP8L_MAX_NUM_BIT_READ: u32 = 24;

/// `VP8L_BIT_MASK[n] == (1 << n) - 1` for every supported read width.
pub const VP8L_BIT_MASK: [u32; VP8L_MAX_NUM_BIT_READ as usize + 1] = build_bit_mask();

const fn build_bit_mask() -> [u32; VP8L_MAX_NUM_BIT_READ as usize + 1] {
  let mut table = [0; VP8L_MAX_NUM_BIT_READ as usize + 1];
  let mut n = 1;
  while n < table.len() {
    table[n] = (1 << n) - 1;
    n += 1;
  }
  table
}

/// Position of the highest set bit. `val` must not be zero.
#[inline(always)]
pub fn log2_floor(val: u32) -> u32 {
  debug_assert!(val != 0);
  31 ^ val.leading_zeros()
}

#[allow(non_snake_case)]
#[inline]
pub fn BEu64(buf: &[u8], pos: usize) -> u64 {
  BigEndian::read_u64(&buf[pos..pos + 8])
}

#[allow(non_snake_case)]
#[inline]
pub fn LEu24(buf: &[u8], pos: usize) -> u32 {
  LittleEndian::read_u24(&buf[pos..pos + 3])
}
