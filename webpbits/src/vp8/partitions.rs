// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use log::debug;

use super::BooleanDecoder;
use crate::bits::LEu24;
use crate::{Result, WebpBitsError};

/// Token partitions of a VP8 frame, one boolean decoder each.
///
/// The partition count and the partition size table follow the first
/// (mode) partition in the frame data.
#[derive(Debug, Clone)]
pub struct Vp8Partitions<'a> {
  readers: Vec<BooleanDecoder<'a>>,
}

impl<'a> Vp8Partitions<'a> {
  /// Read the partition count from `first` and split the data behind the first partition.
  pub fn parse(first: &mut BooleanDecoder<'a>) -> Result<Self> {
    let data = first.data();
    let data_end = (first.start() + first.remaining()).min(data.len());
    let table_start = first.start() + first.partition_length();
    let num_parts = 1_usize << first.read_value(2);
    let last_part = num_parts - 1;

    let table_len = last_part * 3;
    if table_start + table_len > data_end {
      return Err(WebpBitsError::BadPartition(format!(
        "Partition size table of {} bytes at {} exceeds data of {} bytes",
        table_len, table_start, data_end
      )));
    }

    let mut part_start = table_start + table_len;
    let mut size_left = data_end - part_start;
    let mut readers = Vec::with_capacity(num_parts);
    for p in 0..last_part {
      let psize = (LEu24(data, table_start + p * 3) as usize).min(size_left);
      readers.push(BooleanDecoder::new(&data[..data_end], psize, part_start));
      part_start += psize;
      size_left -= psize;
    }
    readers.push(BooleanDecoder::new(&data[..data_end], size_left, part_start));
    debug!("VP8 frame has {} token partition(s), last one with {} bytes", num_parts, size_left);
    Ok(Self { readers })
  }

  pub fn len(&self) -> usize {
    self.readers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.readers.is_empty()
  }

  /// Decoder for macroblock row `mb_row`. Rows are assigned round-robin.
  pub fn for_row(&mut self, mb_row: usize) -> &mut BooleanDecoder<'a> {
    let idx = mb_row & (self.readers.len() - 1);
    &mut self.readers[idx]
  }

  pub fn get_mut(&mut self, idx: usize) -> Option<&mut BooleanDecoder<'a>> {
    self.readers.get_mut(idx)
  }

  pub fn iter(&self) -> impl Iterator<Item = &BooleanDecoder<'a>> {
    self.readers.iter()
  }
}
