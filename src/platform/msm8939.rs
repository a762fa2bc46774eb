// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! MSM8939: two clusters of four Cortex-A53 cores, each cluster with its own L2.
//!
//! The boot cluster is cluster 1, so logical cores 0-3 have Aff1 = 1 and cores 4-7 have Aff1 = 0.

use crate::{
    mmio::RegisterRegion,
    topology::{CacheDescriptor, CpuDescriptor, StaticTopology},
};
use arm_sysregs::MpidrEl1;

const BLOCK_SIZE: usize = 0x1000;

/// Index in [`CACHES`] of the L2 of cluster 0.
const L2_0: usize = 0;
/// Index in [`CACHES`] of the L2 of cluster 1.
const L2_1: usize = 1;

const fn cpu(mpidr: u64, acc_base: usize, l2: usize) -> CpuDescriptor {
    CpuDescriptor {
        mpidr: MpidrEl1::from_bits_retain(mpidr),
        acc: Some(RegisterRegion::new(acc_base, BLOCK_SIZE)),
        next_level_cache: Some(l2),
    }
}

/// The cores of the MSM8939, by logical index.
pub const CPUS: [CpuDescriptor; 8] = [
    cpu(0x100, 0x0b18_8000, L2_1),
    cpu(0x101, 0x0b19_8000, L2_1),
    cpu(0x102, 0x0b1a_8000, L2_1),
    cpu(0x103, 0x0b1b_8000, L2_1),
    cpu(0x0, 0x0b08_8000, L2_0),
    cpu(0x1, 0x0b09_8000, L2_0),
    cpu(0x2, 0x0b0a_8000, L2_0),
    cpu(0x3, 0x0b0b_8000, L2_0),
];

/// The L2 caches of the MSM8939.
pub const CACHES: [CacheDescriptor; 2] = [
    CacheDescriptor {
        power_domain: Some(RegisterRegion::new(0x0b01_1000, BLOCK_SIZE)),
    },
    CacheDescriptor {
        power_domain: Some(RegisterRegion::new(0x0b11_1000, BLOCK_SIZE)),
    },
];

/// The topology of the MSM8939.
pub static TOPOLOGY: StaticTopology = StaticTopology::new(&CPUS, &CACHES);
