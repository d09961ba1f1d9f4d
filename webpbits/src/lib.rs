//! Bitstream readers for the two WebP sub-formats.
//!
//! A WebP payload is decoded by exactly one of two readers:
//!
//! * [`BooleanDecoder`] for lossy VP8 partitions. It is a binary arithmetic
//!   decoder that silently zero-fills once a (truncated) partition runs out.
//! * [`LsbBitReader`] for lossless VP8L streams. It reads least-significant-bit
//!   first from a 64 bit lookahead window and flags end-of-stream so callers can
//!   reject truncated images.
//!
//! Both readers borrow the compressed bytes from a [`BufferOwner`], which
//! acquires its memory from a [`MemoryAllocator`] and returns it on drop.
//!
//! # Example
//! ```rust,no_run
//! use std::fs::File;
//! use webpbits::{BufferOwner, LsbBitReader, Vp8lHeader};
//!
//! fn main() -> webpbits::Result<()> {
//!   let mut file = File::open("image.vp8l")?;
//!   let len = file.metadata()?.len() as usize;
//!   let buf = BufferOwner::from_stream(&mut file, len, webpbits::default_allocator())?;
//!   let mut reader = LsbBitReader::new(&buf);
//!   let header = Vp8lHeader::read(&mut reader)?;
//!   println!("{}x{}", header.width, header.height);
//!   Ok(())
//! }
//! ```

#![deny(
    //missing_docs,
    //missing_debug_implementations,
    //missing_copy_implementations,
    //unsafe_code,
    unstable_features,
    //unused_import_braces,
    //unused_qualifications
  )]

use std::sync::Arc;

use lazy_static::lazy_static;
use thiserror::Error;

pub mod alloc;
pub mod bits;
pub mod buffer;
pub(crate) mod envparams;
pub mod vp8;
pub mod vp8l;

pub use alloc::{HeapAllocator, MemoryAllocator, PooledAllocator};
pub use buffer::BufferOwner;
pub use vp8::{BooleanDecoder, Vp8Partitions};
pub use vp8l::{LsbBitReader, Vp8lHeader};

lazy_static! {
  static ref DEFAULT_ALLOCATOR: Arc<dyn MemoryAllocator> = Arc::new(HeapAllocator::default());
}

#[derive(Error, Debug)]
pub enum WebpBitsError {
  #[error("I/O error: {:?}", _0)]
  Io(#[from] std::io::Error),

  /// Input stream ended before the requested payload was read
  #[error("Unexpected end of stream: expected {expected} bytes, got {got}")]
  UnexpectedEof { expected: usize, got: usize },

  #[error("Allocation of {requested} bytes exceeds limit of {limit} bytes")]
  AllocationLimit { requested: usize, limit: usize },

  #[error("Bad partition: {}", _0)]
  BadPartition(String),

  #[error("Format mismatch: {}", _0)]
  FormatMismatch(String),

  #[error("{}", _0)]
  General(String),
}

pub type Result<T> = std::result::Result<T, WebpBitsError>;

impl From<&String> for WebpBitsError {
  fn from(str: &String) -> Self {
    Self::General(str.clone())
  }
}

impl From<String> for WebpBitsError {
  fn from(str: String) -> Self {
    Self::General(str)
  }
}

/// Process-wide allocator used when the caller does not supply one.
pub fn default_allocator() -> Arc<dyn MemoryAllocator> {
  DEFAULT_ALLOCATOR.clone()
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}
