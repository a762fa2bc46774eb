// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! MSM8916: one cluster of four Cortex-A53 cores sharing an L2.

use crate::{
    mmio::RegisterRegion,
    topology::{CacheDescriptor, CpuDescriptor, StaticTopology},
};
use arm_sysregs::MpidrEl1;

const BLOCK_SIZE: usize = 0x1000;

const L2CCC_0: RegisterRegion = RegisterRegion::new(0x0b01_1000, BLOCK_SIZE);

const fn cpu(mpidr: u64, acc_base: usize) -> CpuDescriptor {
    CpuDescriptor {
        mpidr: MpidrEl1::from_bits_retain(mpidr),
        acc: Some(RegisterRegion::new(acc_base, BLOCK_SIZE)),
        next_level_cache: Some(0),
    }
}

/// The cores of the MSM8916, by logical index.
pub const CPUS: [CpuDescriptor; 4] = [
    cpu(0x0, 0x0b08_8000),
    cpu(0x1, 0x0b09_8000),
    cpu(0x2, 0x0b0a_8000),
    cpu(0x3, 0x0b0b_8000),
];

/// The L2 caches of the MSM8916.
pub const CACHES: [CacheDescriptor; 1] = [CacheDescriptor {
    power_domain: Some(L2CCC_0),
}];

/// The topology of the MSM8916.
pub static TOPOLOGY: StaticTopology = StaticTopology::new(&CPUS, &CACHES);
