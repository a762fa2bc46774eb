// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

use crate::aarch64::{dmb_ishst, flush_dcache_range, wfe};
use core::sync::atomic::{AtomicU64, Ordering};

/// Value of the holding pen when no core is being released.
pub const INVALID_HWID: u64 = u64::MAX;

/// Smallest data cache line size of any core which may read the pen.
const CACHE_LINE_SIZE: usize = 64;

/// The word through which the boot core releases one secondary at a time.
///
/// Secondaries may read it with their caches still off, so every write is cleaned to the point of
/// coherency. It has a cache line to itself so that no other data is written back with it.
#[derive(Debug)]
#[repr(C, align(64))]
pub struct HoldingPen {
    release: AtomicU64,
}

impl HoldingPen {
    /// Creates a pen which isn't releasing any core.
    pub const fn new() -> Self {
        Self {
            release: AtomicU64::new(INVALID_HWID),
        }
    }

    /// Returns the MPIDR of the core currently being released, or [`INVALID_HWID`].
    pub fn release(&self) -> u64 {
        self.release.load(Ordering::Acquire)
    }

    /// Writes `value` to the pen and makes it visible to cores with their caches off.
    pub fn publish(&self, value: u64) {
        self.release.store(value, Ordering::Release);
        dmb_ishst();
        flush_dcache_range(
            self.release.as_ptr() as usize,
            size_of::<AtomicU64>(),
            CACHE_LINE_SIZE,
        );
    }

    /// Waits until the pen releases the core with the given MPIDR.
    pub fn wait_for(&self, mpidr: u64) {
        while self.release() != mpidr {
            wfe();
        }
    }
}

impl Default for HoldingPen {
    fn default() -> Self {
        Self::new()
    }
}
