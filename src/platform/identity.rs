// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

use super::Platform;
use crate::{
    mmio::{Mmio, RegisterRegion},
    scm::SmcScm,
    smccc::Smc,
    timer::GenericTimer,
    topology::StaticTopology,
};

/// A platform whose ACC and L2 blocks are identity mapped, using the generic timer and SMCs.
pub struct IdentityMappedPlatform {
    topology: StaticTopology,
    firmware: SmcScm<Smc>,
    timer: GenericTimer,
}

impl IdentityMappedPlatform {
    /// Creates a platform for the given topology.
    ///
    /// Returns `None` if the generic timer frequency hasn't been set by firmware.
    ///
    /// # Safety
    ///
    /// Every register region in `topology` must be identity mapped as device memory and must not be
    /// accessed by anything other than the returned platform's register blocks. Power sequences
    /// must only be run through coordinators sharing a single `CoordinatorState`. The stack of the
    /// boot core must be identity mapped and readable by firmware.
    pub unsafe fn new(topology: StaticTopology) -> Option<Self> {
        Some(Self {
            topology,
            // SAFETY: Our caller guarantees that the boot core's stack is identity mapped.
            firmware: unsafe { SmcScm::new(Smc) },
            timer: GenericTimer::new()?,
        })
    }
}

impl Platform for IdentityMappedPlatform {
    type Topology = StaticTopology;
    type Firmware = SmcScm<Smc>;
    type Registers = Mmio;
    type Timer = GenericTimer;

    fn topology(&self) -> &Self::Topology {
        &self.topology
    }

    fn firmware(&self) -> &Self::Firmware {
        &self.firmware
    }

    fn timer(&self) -> &Self::Timer {
        &self.timer
    }

    fn map_registers(&self, region: RegisterRegion) -> Option<Self::Registers> {
        // SAFETY: Our constructor's caller guaranteed that every region in the topology is
        // identity mapped and only accessed through us. The coordinator state runs one power
        // sequence at a time.
        unsafe { Mmio::identity_mapped(region) }
    }
}
