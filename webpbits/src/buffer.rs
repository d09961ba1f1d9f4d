// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use std::fmt::Debug;
use std::io::{ErrorKind, Read};
use std::ops::Deref;
use std::sync::Arc;

use log::debug;

use crate::alloc::MemoryAllocator;
use crate::{Result, WebpBitsError};

/// Buffer to hold the compressed payload of one bitstream decode.
///
/// The length is fixed once constructed. Memory that came from an allocator
/// goes back to it exactly once, either by an explicit `release()` or on drop.
pub struct BufferOwner {
  inner: BufferOwnerImpl,
  len: usize,
}

enum BufferOwnerImpl {
  Allocated(Vec<u8>, Arc<dyn MemoryAllocator>),
  Owned(Vec<u8>),
  Released,
}

impl BufferOwner {
  /// Read exactly `byte_count` bytes from `reader` into memory taken from `allocator`.
  pub fn from_stream<R: Read + ?Sized>(reader: &mut R, byte_count: usize, allocator: Arc<dyn MemoryAllocator>) -> Result<Self> {
    let mut buf = allocator.allocate(byte_count)?;
    let mut got = 0;
    while got < byte_count {
      match reader.read(&mut buf[got..]) {
        Ok(0) => break,
        Ok(n) => got += n,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => {
          allocator.release(buf);
          return Err(e.into());
        }
      }
    }
    if got < byte_count {
      allocator.release(buf);
      return Err(WebpBitsError::UnexpectedEof { expected: byte_count, got });
    }
    debug!("Buffered {} bytes from stream", byte_count);
    Ok(Self {
      inner: BufferOwnerImpl::Allocated(buf, allocator),
      len: byte_count,
    })
  }

  /// Take ownership of already materialized bytes, no copy involved.
  pub fn from_owned(buf: Vec<u8>) -> Self {
    let len = buf.len();
    Self {
      inner: BufferOwnerImpl::Owned(buf),
      len,
    }
  }

  /// Copy `buf` into memory from the default allocator.
  pub fn from_slice(buf: &[u8]) -> Result<Self> {
    let allocator = crate::default_allocator();
    let mut mem = allocator.allocate(buf.len())?;
    mem.copy_from_slice(buf);
    Ok(Self {
      len: buf.len(),
      inner: BufferOwnerImpl::Allocated(mem, allocator),
    })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn is_released(&self) -> bool {
    matches!(self.inner, BufferOwnerImpl::Released)
  }

  pub fn buf(&self) -> &[u8] {
    self.deref()
  }

  /// Give the memory back. Calling this more than once is a no-op.
  pub fn release(&mut self) {
    match std::mem::replace(&mut self.inner, BufferOwnerImpl::Released) {
      BufferOwnerImpl::Allocated(buf, allocator) => allocator.release(buf),
      BufferOwnerImpl::Owned(buf) => drop(buf),
      BufferOwnerImpl::Released => {}
    }
  }
}

impl Drop for BufferOwner {
  fn drop(&mut self) {
    self.release();
  }
}

impl Deref for BufferOwner {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    match &self.inner {
      BufferOwnerImpl::Allocated(buf, _) => buf,
      BufferOwnerImpl::Owned(buf) => buf,
      BufferOwnerImpl::Released => &[],
    }
  }
}

impl AsRef<[u8]> for BufferOwner {
  fn as_ref(&self) -> &[u8] {
    self
  }
}

impl Debug for BufferOwner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BufferOwner")
      .field("len", &self.len)
      .field("released", &self.is_released())
      .finish()
  }
}
