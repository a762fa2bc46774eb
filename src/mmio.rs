// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Access to memory-mapped 32-bit register blocks.

use crate::aarch64::dsb_sy;
use core::ptr::NonNull;

/// A physical register region, as described by a `reg` property.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegisterRegion {
    /// Physical base address.
    pub base: usize,
    /// Size of the region in bytes.
    pub size: usize,
}

impl RegisterRegion {
    /// Creates a new region.
    pub const fn new(base: usize, size: usize) -> Self {
        Self { base, size }
    }

    /// Returns whether a 32-bit register at `offset` lies within the region.
    pub const fn contains_offset(&self, offset: usize) -> bool {
        offset % 4 == 0 && offset + 4 <= self.size
    }
}

/// A block of 32-bit registers.
///
/// The relaxed accessors give no ordering guarantees with respect to other memory accesses; callers
/// use [`RegisterBlock::mb`] wherever the hardware needs the preceding writes to have landed.
pub trait RegisterBlock {
    /// Reads the register at the given byte offset.
    fn read_relaxed(&self, offset: usize) -> u32;

    /// Writes the register at the given byte offset.
    fn write_relaxed(&mut self, offset: usize, value: u32);

    /// Full memory barrier, completing all outstanding register writes.
    fn mb(&mut self) {
        dsb_sy();
    }
}

/// A register block accessed through volatile loads and stores.
#[derive(Debug)]
pub struct Mmio {
    base: NonNull<u32>,
    region: RegisterRegion,
}

impl Mmio {
    /// Creates a register block for `region`, accessed at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be a valid mapping of the whole of `region` as device memory, and nothing else
    /// may access those registers for the lifetime of the returned value.
    pub unsafe fn new(base: NonNull<u32>, region: RegisterRegion) -> Self {
        Self { base, region }
    }

    /// Creates a register block for a region which is identity mapped.
    ///
    /// Returns `None` if the region's base address is null or misaligned.
    ///
    /// # Safety
    ///
    /// `region` must be identity mapped as device memory, and nothing else may access those
    /// registers for the lifetime of the returned value.
    pub unsafe fn identity_mapped(region: RegisterRegion) -> Option<Self> {
        if region.base % 4 != 0 {
            return None;
        }
        let base = NonNull::new(region.base as *mut u32)?;
        // SAFETY: Our caller guarantees that the region is mapped and exclusively ours.
        Some(unsafe { Self::new(base, region) })
    }

    fn register(&self, offset: usize) -> *mut u32 {
        assert!(
            self.region.contains_offset(offset),
            "Register offset {offset:#x} outside region {:#x?}",
            self.region
        );
        // SAFETY: The offset was checked to be within the region, which our constructor's caller
        // guaranteed to be mapped.
        unsafe { self.base.as_ptr().byte_add(offset) }
    }
}

impl RegisterBlock for Mmio {
    fn read_relaxed(&self, offset: usize) -> u32 {
        // SAFETY: `register` returns an aligned pointer to a mapped register.
        unsafe { self.register(offset).read_volatile() }
    }

    fn write_relaxed(&mut self, offset: usize, value: u32) {
        // SAFETY: `register` returns an aligned pointer to a mapped register, which we have
        // exclusive access to.
        unsafe { self.register(offset).write_volatile(value) }
    }
}
