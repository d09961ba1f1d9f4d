// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

//! Memory sources for [`crate::BufferOwner`].
//!
//! An allocator hands out zero-filled byte vectors of an exact length and
//! gets them back once the owning buffer is released.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};

use crate::envparams::{webpbits_max_alloc, webpbits_pool_size};
use crate::{Result, WebpBitsError};

const DEFAULT_POOL_SIZE: usize = 8;

pub trait MemoryAllocator: Send + Sync {
  /// Allocate a zero-filled buffer of exactly `len` bytes.
  fn allocate(&self, len: usize) -> Result<Vec<u8>>;

  /// Take back a buffer previously handed out by `allocate()`.
  fn release(&self, buf: Vec<u8>) {
    drop(buf);
  }
}

fn check_limit(len: usize, limit: Option<usize>) -> Result<()> {
  match limit {
    Some(limit) if len > limit => Err(WebpBitsError::AllocationLimit { requested: len, limit }),
    _ => Ok(()),
  }
}

/// Plain heap allocation with an optional size limit
#[derive(Debug, Clone, Copy)]
pub struct HeapAllocator {
  limit: Option<usize>,
}

impl HeapAllocator {
  pub fn new(limit: Option<usize>) -> Self {
    Self { limit }
  }

  pub fn limit(&self) -> Option<usize> {
    self.limit
  }
}

impl Default for HeapAllocator {
  fn default() -> Self {
    Self::new(webpbits_max_alloc())
  }
}

impl MemoryAllocator for HeapAllocator {
  fn allocate(&self, len: usize) -> Result<Vec<u8>> {
    check_limit(len, self.limit)?;
    Ok(vec![0; len])
  }
}

/// Allocator that keeps released buffers around for reuse.
///
/// Useful when many small images are decoded one after another, e.g. the
/// frames of an animation.
#[derive(Debug)]
pub struct PooledAllocator {
  free: Mutex<Vec<Vec<u8>>>,
  capacity: usize,
  limit: Option<usize>,
  handed_out: AtomicUsize,
  returned: AtomicUsize,
}

impl PooledAllocator {
  pub fn new(capacity: usize, limit: Option<usize>) -> Self {
    Self {
      free: Mutex::new(Vec::with_capacity(capacity)),
      capacity,
      limit,
      handed_out: AtomicUsize::new(0),
      returned: AtomicUsize::new(0),
    }
  }

  /// Number of buffers handed out so far
  pub fn handed_out(&self) -> usize {
    self.handed_out.load(Ordering::Relaxed)
  }

  /// Number of buffers given back so far
  pub fn returned(&self) -> usize {
    self.returned.load(Ordering::Relaxed)
  }

  /// Number of buffers currently waiting for reuse
  pub fn pooled(&self) -> usize {
    self.free_list().len()
  }

  fn free_list(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
    // A panic while holding the lock cannot leave the free list inconsistent
    match self.free.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    }
  }
}

impl Default for PooledAllocator {
  fn default() -> Self {
    Self::new(webpbits_pool_size().unwrap_or(DEFAULT_POOL_SIZE), webpbits_max_alloc())
  }
}

impl MemoryAllocator for PooledAllocator {
  fn allocate(&self, len: usize) -> Result<Vec<u8>> {
    check_limit(len, self.limit)?;
    self.handed_out.fetch_add(1, Ordering::Relaxed);
    let reused = {
      let mut free = self.free_list();
      free.iter().position(|buf| buf.capacity() >= len).map(|idx| free.swap_remove(idx))
    };
    match reused {
      Some(mut buf) => {
        trace!("Reusing pooled buffer with capacity {} for {} bytes", buf.capacity(), len);
        buf.clear();
        buf.resize(len, 0);
        Ok(buf)
      }
      None => Ok(vec![0; len]),
    }
  }

  fn release(&self, buf: Vec<u8>) {
    self.returned.fetch_add(1, Ordering::Relaxed);
    let mut free = self.free_list();
    if free.len() < self.capacity {
      free.push(buf);
    } else {
      debug!("Buffer pool full ({} entries), dropping buffer of {} bytes", self.capacity, buf.capacity());
    }
  }
}
