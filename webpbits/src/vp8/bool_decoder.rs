// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use log::{trace, warn};

use crate::bits::{BEu64, log2_floor};

/// Number of bits pulled in by one bulk refill. Must be a multiple of 8, at most 56.
const BITS: i32 = 56;

/// Decode the bulk refill word at `pos`: eight bytes are loaded in stream
/// order and only the first `BITS / 8` of them are kept.
#[inline(always)]
fn load_bulk(buf: &[u8], pos: usize) -> u64 {
  BEu64(buf, pos) >> (64 - BITS)
}

/// VP8 boolean (binary arithmetic) decoder over one partition.
///
/// Truncated partitions are tolerated: once the partition is exhausted the
/// decoder shifts in zero bits and never reads past `buffer_end`.
#[derive(Debug, Clone)]
pub struct BooleanDecoder<'a> {
  buffer: &'a [u8],
  /// Unconsumed input, bit-packed with the next bit at position `bits`
  value: u64,
  /// Current range minus 1. 254 after init, in [127, 253] after every get_bit()
  range: u32,
  /// Number of valid bits left in `value`. Negative means a refill is due.
  bits: i32,
  pos: usize,
  start: usize,
  /// End of the partition
  buffer_end: usize,
  /// Last position from where an 8 byte load stays inside the partition
  buffer_max: usize,
  eof: bool,
  partition_length: usize,
  remaining: usize,
}

impl<'a> BooleanDecoder<'a> {
  /// Decoder for the partition of `partition_length` bytes at `start_pos` in `buffer`.
  ///
  /// Offsets are clamped to `buffer`, so a bogus partition length from a frame
  /// header degrades to a truncated partition.
  pub fn new(buffer: &'a [u8], partition_length: usize, start_pos: usize) -> Self {
    let start = if start_pos > buffer.len() {
      warn!("Partition start {} is behind end of data ({} bytes)", start_pos, buffer.len());
      buffer.len()
    } else {
      start_pos
    };
    let size = if partition_length > buffer.len() - start {
      warn!(
        "Partition of {} bytes at {} exceeds data, truncating to {} bytes",
        partition_length,
        start,
        buffer.len() - start
      );
      buffer.len() - start
    } else {
      partition_length
    };
    let buffer_end = start + size;
    let mut dec = Self {
      buffer,
      value: 0,
      range: 255 - 1,
      bits: -8, // to load the very first 8 bits
      pos: start,
      start,
      buffer_end,
      buffer_max: if size > 8 { buffer_end - 8 + 1 } else { start },
      eof: false,
      partition_length: size,
      remaining: buffer.len() - start,
    };
    trace!("VP8 boolean decoder: partition {}..{} of {} bytes", start, buffer_end, buffer.len());
    dec.load_new_bytes();
    dec
  }

  /// Current byte offset into the underlying data
  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Offset of the first partition byte
  pub fn start(&self) -> usize {
    self.start
  }

  pub fn partition_length(&self) -> usize {
    self.partition_length
  }

  /// Length of the whole underlying data, not only this partition
  pub fn image_data_size(&self) -> usize {
    self.buffer.len()
  }

  /// Payload bytes (counted from `start()`) still available to the frame
  pub fn remaining(&self) -> usize {
    self.remaining
  }

  pub fn set_remaining(&mut self, remaining: usize) {
    self.remaining = remaining;
  }

  pub(crate) fn data(&self) -> &'a [u8] {
    self.buffer
  }

  /// True once zero bits have been synthesized past the end of the partition
  pub fn is_eof(&self) -> bool {
    self.eof
  }

  /// Stored range (range minus 1)
  pub fn range(&self) -> u32 {
    self.range
  }

  /// Decode one bit whose probability of being zero is `prob / 256`.
  #[inline(always)]
  pub fn get_bit(&mut self, prob: u8) -> u32 {
    let mut range = self.range;
    if self.bits < 0 {
      self.load_new_bytes();
    }

    let pos = self.bits;
    let split = (range * u32::from(prob)) >> 8;
    let value = (self.value >> pos) as u32;
    let bit = value > split;
    if bit {
      range -= split;
      self.value -= (u64::from(split) + 1) << pos;
    } else {
      range = split + 1;
    }

    let shift = 7 ^ log2_floor(range);
    range <<= shift;
    self.bits -= shift as i32;
    self.range = range - 1;

    bit as u32
  }

  /// Decode a sign bit with probability one half and apply it to `v`.
  ///
  /// Same result as `get_bit(0x80)` followed by a conditional negation, but
  /// without branches.
  #[inline(always)]
  pub fn get_signed(&mut self, v: i32) -> i32 {
    if self.bits < 0 {
      self.load_new_bytes();
    }

    let pos = self.bits;
    let split = self.range >> 1;
    let value = (self.value >> pos) as u32;
    // -1 if value > split, else 0
    let mask = (split.wrapping_sub(value) as i32) >> 31;

    self.bits -= 1;
    self.range = self.range.wrapping_add(mask as u32) | 1;
    self.value -= (u64::from(split + 1) & u64::from(mask as u32)) << pos;

    (v ^ mask).wrapping_sub(mask)
  }

  /// Read `n_bits` (at most 32) fair bits, most significant first.
  #[inline]
  pub fn read_value(&mut self, n_bits: u32) -> u32 {
    debug_assert!(n_bits <= 32);
    let mut v = 0;
    for i in (0..n_bits).rev() {
      v |= self.get_bit(0x80) << i;
    }
    v
  }

  /// Read a magnitude of `n_bits` followed by a sign flag.
  #[inline]
  pub fn read_signed_value(&mut self, n_bits: u32) -> i32 {
    let value = self.read_value(n_bits) as i32;
    if self.read_value(1) != 0 { value.wrapping_neg() } else { value }
  }

  #[inline]
  pub fn read_bool(&mut self) -> bool {
    self.read_value(1) == 1
  }

  #[inline(always)]
  fn load_new_bytes(&mut self) {
    if self.pos < self.buffer_max {
      let bits = load_bulk(self.buffer, self.pos);
      self.pos += (BITS >> 3) as usize;
      self.value = bits | (self.value << BITS);
      self.bits += BITS;
    } else {
      self.load_final_bytes();
    }
  }

  #[cold]
  fn load_final_bytes(&mut self) {
    // Only read 8 bits at a time
    if self.pos < self.buffer_end {
      self.bits += 8;
      self.value = u64::from(self.buffer[self.pos]) | (self.value << 8);
      self.pos += 1;
    } else if !self.eof {
      trace!("VP8 partition exhausted at {}, zero-filling", self.pos);
      self.value <<= 8;
      self.bits += 8;
      self.eof = true;
    } else {
      self.bits = 0; // Keeps shift amounts in range
    }
  }
}
