// SPDX-License-Identifier: LGPL-2.1
// Copyright 2026 Daniel Vogelbacher <daniel@chaospixel.com>

use log::warn;

/// Upper bound in bytes for a single buffer handed out by the default heap allocator.
pub(crate) fn webpbits_max_alloc() -> Option<usize> {
  match std::env::var("WEBPBITS_MAX_ALLOC").map(|val| val.parse::<usize>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(_)) => {
      warn!("Invalid value for WEBPBITS_MAX_ALLOC");
      None
    }
    Err(_) => None,
  }
}

pub(crate) fn webpbits_pool_size() -> Option<usize> {
  match std::env::var("WEBPBITS_POOL_SIZE").map(|val| val.parse::<usize>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(_)) => {
      warn!("Invalid value for WEBPBITS_POOL_SIZE");
      None
    }
    Err(_) => None,
  }
}
