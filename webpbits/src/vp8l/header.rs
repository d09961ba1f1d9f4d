// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use log::debug;

use super::LsbBitReader;
use crate::{Result, WebpBitsError};

const VP8L_MAGIC_BYTE: u32 = 0x2f;
const VP8L_IMAGE_SIZE_BITS: u32 = 14;
const VP8L_VERSION_BITS: u32 = 3;

/// The five byte header in front of every VP8L bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vp8lHeader {
  pub width: u32,
  pub height: u32,
  /// Hint only, the pixel data decides about alpha
  pub alpha_is_used: bool,
  pub version: u32,
}

impl Vp8lHeader {
  pub fn read(reader: &mut LsbBitReader<'_>) -> Result<Self> {
    let signature = reader.read_value(8);
    if signature != VP8L_MAGIC_BYTE {
      return Err(WebpBitsError::FormatMismatch(format!("Invalid VP8L signature: 0x{:02x}", signature)));
    }
    let width = reader.read_value(VP8L_IMAGE_SIZE_BITS) + 1;
    let height = reader.read_value(VP8L_IMAGE_SIZE_BITS) + 1;
    let alpha_is_used = reader.read_bit();
    let version = reader.read_value(VP8L_VERSION_BITS);
    if reader.is_end_of_stream() {
      return Err(WebpBitsError::FormatMismatch("VP8L header is truncated".into()));
    }
    if version != 0 {
      return Err(WebpBitsError::FormatMismatch(format!("Unexpected VP8L version number {}", version)));
    }
    debug!("VP8L header: {}x{}, alpha: {}", width, height, alpha_is_used);
    Ok(Self {
      width,
      height,
      alpha_is_used,
      version,
    })
  }
}
