// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Barrier, event and cache maintenance instructions.
//!
//! On anything other than AArch64 these compile to nothing, so host builds can run the boot
//! protocol against fakes.

#[cfg(target_arch = "aarch64")]
use core::arch::asm;

/// Issues a full system data synchronization barrier (`dsb sy`).
pub fn dsb_sy() {
    // SAFETY: `dsb` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("dsb sy", options(nostack));
    }
}

/// Issues a data memory barrier ordering stores in the inner shareable domain (`dmb ishst`).
///
/// This is the barrier between publishing a value and making it visible to other cores.
pub fn dmb_ishst() {
    // SAFETY: `dmb` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("dmb ishst", options(nostack));
    }
}

/// Sends an event to all cores (`sev`), waking any that are parked in `wfe`.
pub fn sev() {
    // SAFETY: `sev` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("sev", options(nomem, nostack));
    }
}

/// Waits for an event (`wfe`).
///
/// On the host this is a spin loop hint instead, so simulated secondaries keep polling.
pub fn wfe() {
    // SAFETY: `wfe` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("wfe", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "aarch64"))]
    core::hint::spin_loop();
}

/// Cleans and invalidates the data cache lines covering `size` bytes starting at `start`, to the
/// point of coherency, then waits for completion.
///
/// `line_size` must be a power of two no larger than the smallest data cache line in the system.
pub fn flush_dcache_range(start: usize, size: usize, line_size: usize) {
    debug_assert!(line_size.is_power_of_two());

    #[cfg(target_arch = "aarch64")]
    {
        let end = start + size;
        let mut line = start & !(line_size - 1);
        while line < end {
            // SAFETY: Cleaning and invalidating a cache line writes any dirty data back to memory
            // first, so it can't lose data or violate safe Rust guarantees.
            unsafe {
                asm!("dc civac, {line}", line = in(reg) line, options(nostack));
            }
            line += line_size;
        }
        dsb_sy();
    }

    #[cfg(not(target_arch = "aarch64"))]
    let _ = (start, size);
}

/// Returns the current value of the physical counter, `CNTPCT_EL0`.
#[cfg(target_arch = "aarch64")]
pub fn read_cntpct_el0() -> u64 {
    let value;
    // SAFETY: Reading the physical counter has no side effects.
    unsafe {
        asm!("isb", "mrs {value}, cntpct_el0", value = out(reg) value, options(nostack));
    }
    value
}

/// Returns the frequency of the system counter in Hz, `CNTFRQ_EL0`.
#[cfg(target_arch = "aarch64")]
pub fn read_cntfrq_el0() -> u64 {
    let value;
    // SAFETY: Reading the counter frequency has no side effects.
    unsafe {
        asm!("mrs {value}, cntfrq_el0", value = out(reg) value, options(nomem, nostack));
    }
    value
}
