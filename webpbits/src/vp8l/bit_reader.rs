// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use crate::bits::{VP8L_BIT_MASK, VP8L_MAX_NUM_BIT_READ};
use crate::buffer::BufferOwner;

/// Size of the lookahead window in bits
const LBITS: u32 = 64;
/// Minimum number of bits guaranteed after fill_bit_window()
const WBITS: u32 = 32;

/// LSB-first bit reader for VP8L streams.
///
/// Bits are served from a 64 bit window (`value`) which is refilled byte by
/// byte from the top. Reading past the end of the data sets the end-of-stream
/// flag, which callers check to reject truncated images.
#[derive(Debug, Clone)]
pub struct LsbBitReader<'a> {
  buffer: &'a [u8],
  value: u64,
  pos: usize,
  /// Cursor into `value`
  bit_pos: u32,
  /// Bits of `value` backed by input, 64 unless the data is shorter than the window
  window_bits: u32,
  eos: bool,
}

impl<'a> LsbBitReader<'a> {
  pub fn new(buffer: &'a [u8]) -> Self {
    let length = buffer.len().min(8);
    let value = if length > 0 { LittleEndian::read_uint(&buffer[..length], length) } else { 0 };
    trace!("VP8L bit reader over {} bytes", buffer.len());
    Self {
      buffer,
      value,
      pos: length,
      bit_pos: 0,
      window_bits: 8 * length as u32,
      eos: false,
    }
  }

  pub fn from_owner(owner: &'a BufferOwner) -> Self {
    Self::new(owner.buf())
  }

  /// Read `n_bits` (at most 24) least significant bit first.
  ///
  /// Returns 0 without consuming anything if end-of-stream was already
  /// reached or the width is not supported. The read that runs past the
  /// end of the data returns 0 as well.
  #[inline]
  pub fn read_value(&mut self, n_bits: u32) -> u32 {
    if self.eos {
      return 0;
    }
    if n_bits > VP8L_MAX_NUM_BIT_READ {
      debug!("VP8L read of {} bits rejected, maximum is {}", n_bits, VP8L_MAX_NUM_BIT_READ);
      return 0;
    }
    let val = self.prefetch_bits() as u32 & VP8L_BIT_MASK[n_bits as usize];
    self.bit_pos += n_bits;
    self.shift_bytes();
    if self.eos {
      // Window bits behind the data are stale
      return 0;
    }
    val
  }

  #[inline]
  pub fn read_bit(&mut self) -> bool {
    self.read_value(1) != 0
  }

  /// Window contents at the current bit cursor, nothing is consumed.
  #[inline(always)]
  pub fn prefetch_bits(&self) -> u64 {
    self.value >> (self.bit_pos & (LBITS - 1))
  }

  /// Commit `n` bits that were inspected through prefetch_bits().
  #[inline(always)]
  pub fn advance_bit_position(&mut self, n: u32) {
    self.bit_pos += n;
  }

  /// Make sure at least 32 bits are available to prefetch_bits().
  #[inline(always)]
  pub fn fill_bit_window(&mut self) {
    if self.bit_pos >= WBITS {
      self.shift_bytes();
    }
  }

  /// True once bits were consumed that are not backed by input.
  #[inline]
  pub fn is_end_of_stream(&self) -> bool {
    self.eos || (self.pos == self.buffer.len() && self.bit_pos > self.window_bits)
  }

  pub fn set_end_of_stream(&mut self) {
    self.eos = true;
    self.bit_pos = 0; // Keeps shift amounts in range
  }

  pub fn eos(&self) -> bool {
    self.eos
  }

  pub fn bit_pos(&self) -> u32 {
    self.bit_pos
  }

  /// Number of bytes pulled into the window so far
  pub fn pos(&self) -> usize {
    self.pos
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  #[inline(always)]
  fn shift_bytes(&mut self) {
    while self.bit_pos >= 8 && self.pos < self.buffer.len() {
      self.value >>= 8;
      self.value |= u64::from(self.buffer[self.pos]) << (LBITS - 8);
      self.pos += 1;
      self.bit_pos -= 8;
    }
    if self.is_end_of_stream() && !self.eos {
      debug!("VP8L stream exhausted after {} bytes", self.pos);
      self.set_end_of_stream();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use bitstream_io::{BitRead, BitReader, LittleEndian};

  use super::*;

  fn reference_value<R: BitRead>(reader: &mut R, n_bits: u32) -> std::io::Result<u32> {
    let mut v = 0;
    for i in 0..n_bits {
      v |= (reader.read_bit()? as u32) << i;
    }
    Ok(v)
  }

  #[test]
  fn width_boundary_and_eos() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf = [0xff_u8, 0xff, 0xff];
    let mut reader = LsbBitReader::new(&buf);
    assert_eq!(reader.read_value(24), 0xffffff);
    assert!(!reader.eos());
    assert_eq!(reader.read_value(1), 0);
    assert!(reader.eos());
    assert!(reader.is_end_of_stream());
    assert_eq!(reader.read_value(8), 0);
    Ok(())
  }

  #[test]
  fn lsb_first_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    // 10011100 01000001 11100001
    let buf = [0x9c_u8, 0x41, 0xe1];
    let mut reader = LsbBitReader::new(&buf);
    assert_eq!(reader.read_value(3), 0b100);
    assert!(reader.read_bit());
    assert!(reader.read_bit());
    assert_eq!(reader.read_value(6), 0b001100);
    assert_eq!(reader.read_value(13), 0b1110000101000);
    assert!(!reader.eos());
    Ok(())
  }

  #[test]
  fn matches_reference_reader() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut seed = 0x1234_5678_u32;
    let buf: Vec<u8> = (0..300)
      .map(|_| {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
        (seed >> 16) as u8
      })
      .collect();
    let mut reader = LsbBitReader::new(&buf);
    let mut reference = BitReader::endian(Cursor::new(&buf), LittleEndian);
    let mut consumed = 0;
    let mut width = 1;
    while consumed + width <= buf.len() as u32 * 8 {
      assert_eq!(reader.read_value(width), reference_value(&mut reference, width)?, "at bit {}", consumed);
      consumed += width;
      width = width % VP8L_MAX_NUM_BIT_READ + 1;
    }
    assert!(!reader.is_end_of_stream());
    Ok(())
  }

  #[test]
  fn prefetch_and_advance() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf: Vec<u8> = (0..32).collect();
    let mut reader = LsbBitReader::new(&buf);
    let mut reference = LsbBitReader::new(&buf);
    for step in [7_u32, 13, 3, 20, 11, 1, 24, 9, 15] {
      reader.fill_bit_window();
      let peek = reader.prefetch_bits() as u32 & VP8L_BIT_MASK[step as usize];
      reader.advance_bit_position(step);
      assert_eq!(peek, reference.read_value(step));
    }
    // Peeking does not consume
    let first = reader.prefetch_bits();
    assert_eq!(reader.prefetch_bits(), first);
    Ok(())
  }

  #[test]
  fn fill_bit_window_keeps_32_bits() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf = vec![0xa5_u8; 64];
    let mut reader = LsbBitReader::new(&buf);
    reader.advance_bit_position(31);
    reader.fill_bit_window();
    // Below the threshold nothing is shifted
    assert_eq!(reader.bit_pos(), 31);
    reader.advance_bit_position(9);
    reader.fill_bit_window();
    assert_eq!(reader.bit_pos(), 0);
    assert_eq!(reader.pos(), 13);
    assert!(LBITS - reader.bit_pos() >= WBITS);
    Ok(())
  }

  #[test]
  fn oversized_width_is_rejected() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf = [0xff_u8; 16];
    let mut reader = LsbBitReader::new(&buf);
    assert_eq!(reader.read_value(25), 0);
    assert_eq!(reader.bit_pos(), 0);
    assert!(!reader.eos());
    assert_eq!(reader.read_value(4), 0xf);
    Ok(())
  }

  #[test]
  fn long_stream_end() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf = vec![0x55_u8; 20];
    let mut reader = LsbBitReader::new(&buf);
    for _ in 0..20 {
      assert_eq!(reader.read_value(8), 0x55);
    }
    // All 160 bits are backed by input
    assert!(!reader.eos());
    assert_eq!(reader.read_value(1), 0);
    assert!(reader.eos());
    assert_eq!(reader.read_value(8), 0);
    Ok(())
  }

  #[test]
  fn read_past_end_returns_zero() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    for len in 0..12 {
      let buf = vec![0xff_u8; len];
      let mut reader = LsbBitReader::new(&buf);
      for bit in 0..len * 8 {
        assert!(reader.read_bit(), "len {} bit {}", len, bit);
      }
      assert!(!reader.eos(), "len {}", len);
      assert!(!reader.read_bit(), "len {}", len);
      assert!(reader.eos(), "len {}", len);
      assert_eq!(reader.read_value(24), 0);
    }
    Ok(())
  }

  #[test]
  fn straddling_read_at_end_returns_zero() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf = [0xff_u8; 10];
    let mut reader = LsbBitReader::new(&buf);
    assert_eq!(reader.read_value(24), 0xffffff);
    assert_eq!(reader.read_value(24), 0xffffff);
    assert_eq!(reader.read_value(24), 0xffffff);
    assert!(!reader.eos());
    // 8 bits left, 12 requested
    assert_eq!(reader.read_value(12), 0);
    assert!(reader.eos());
    Ok(())
  }

  #[test]
  fn empty_input() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut reader = LsbBitReader::new(&[]);
    assert!(!reader.is_end_of_stream());
    assert!(!reader.read_bit());
    assert!(reader.eos());
    assert_eq!(reader.read_value(24), 0);
    Ok(())
  }

  #[test]
  fn determinism() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let buf: Vec<u8> = (0..=255).rev().collect();
    let run = || {
      let mut reader = LsbBitReader::new(&buf);
      (1..200).map(|i| reader.read_value(i % 24 + 1)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
    Ok(())
  }
}
