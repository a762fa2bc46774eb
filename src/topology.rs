// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Which register blocks control each core.
//!
//! The links mirror the device tree: a CPU node points at its ACC block (`qcom,acc`) and at its
//! L2 cache (`next-level-cache`), and the cache node points at the L2 power domain
//! (`power-domain`). Any of these links may be missing on a badly described board.

use crate::mmio::RegisterRegion;
use arm_sysregs::MpidrEl1;
use core::fmt::{self, Display, Formatter};

/// The MPIDR bits which identify a core: Aff3 in bits 32-39 and Aff2 to Aff0 in bits 0-23.
pub const MPIDR_HWID_BITMASK: u64 = 0xff_00ff_ffff;

/// A link in the topology which may fail to resolve.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TopologyLink {
    /// The CPU node itself.
    CpuNode,
    /// The CPU's access control container, `qcom,acc`.
    Acc,
    /// The CPU's L2 cache, `next-level-cache`.
    NextLevelCache,
    /// The L2 cache's power domain, `power-domain`.
    PowerDomain,
}

impl Display for TopologyLink {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::CpuNode => "cpu node",
            Self::Acc => "qcom,acc",
            Self::NextLevelCache => "next-level-cache",
            Self::PowerDomain => "power-domain",
        })
    }
}

/// Everything needed to power on one core.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CoreTopology {
    /// The core's hardware id.
    pub mpidr: MpidrEl1,
    /// The core's ACC register block.
    pub acc: RegisterRegion,
    /// The register block of the power domain of the core's L2 cache.
    pub l2_power_domain: RegisterRegion,
}

/// Provides the hardware topology of the cores.
pub trait Topology {
    /// Returns the number of cores, including the boot core.
    fn core_count(&self) -> usize;

    /// Returns the hardware id of the core with the given logical index.
    fn hardware_id(&self, cpu: usize) -> Option<MpidrEl1>;

    /// Follows the links from the given core to its register blocks.
    ///
    /// Returns the first link which couldn't be followed on failure.
    fn resolve(&self, cpu: usize) -> Result<CoreTopology, TopologyLink>;
}

/// A CPU node.
#[derive(Clone, Copy, Debug)]
pub struct CpuDescriptor {
    /// Hardware id.
    pub mpidr: MpidrEl1,
    /// The ACC register block, if described.
    pub acc: Option<RegisterRegion>,
    /// Index into [`StaticTopology`]'s caches of the core's L2, if described.
    pub next_level_cache: Option<usize>,
}

/// An L2 cache node.
#[derive(Clone, Copy, Debug)]
pub struct CacheDescriptor {
    /// The power domain register block, if described.
    pub power_domain: Option<RegisterRegion>,
}

/// A topology described by constant tables.
#[derive(Clone, Copy, Debug)]
pub struct StaticTopology {
    cpus: &'static [CpuDescriptor],
    caches: &'static [CacheDescriptor],
}

impl StaticTopology {
    /// Creates a topology from tables of CPUs, indexed by logical core index, and their caches.
    pub const fn new(cpus: &'static [CpuDescriptor], caches: &'static [CacheDescriptor]) -> Self {
        Self { cpus, caches }
    }
}

impl Topology for StaticTopology {
    fn core_count(&self) -> usize {
        self.cpus.len()
    }

    fn hardware_id(&self, cpu: usize) -> Option<MpidrEl1> {
        self.cpus.get(cpu).map(|descriptor| descriptor.mpidr)
    }

    fn resolve(&self, cpu: usize) -> Result<CoreTopology, TopologyLink> {
        let descriptor = self.cpus.get(cpu).ok_or(TopologyLink::CpuNode)?;
        let acc = descriptor.acc.ok_or(TopologyLink::Acc)?;
        let cache = descriptor
            .next_level_cache
            .and_then(|index| self.caches.get(index))
            .ok_or(TopologyLink::NextLevelCache)?;
        let l2_power_domain = cache.power_domain.ok_or(TopologyLink::PowerDomain)?;

        Ok(CoreTopology {
            mpidr: descriptor.mpidr,
            acc,
            l2_power_domain,
        })
    }
}
