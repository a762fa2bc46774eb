// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The CPU operations used to bring secondary cores online.

mod holding_pen;
mod kpss_acc_v2;

use crate::{scm::ScmError, topology::TopologyLink};
pub use holding_pen::{HoldingPen, INVALID_HWID};
pub use kpss_acc_v2::{BootCoordinator, CoordinatorState, CorePhase};
use thiserror::Error;

const EINVAL: i32 = 22;
const ENODEV: i32 = 19;
const ENOMEM: i32 = 12;
const ENOSYS: i32 = 38;
const EBUSY: i32 = 16;

/// The callbacks a CPU enable method provides to the code bringing cores up.
///
/// `cpu_init` and `cpu_prepare` run on the boot core before any secondary is started, `cpu_boot`
/// runs on the boot core for each secondary, and `cpu_postboot` runs on the secondary itself once
/// it has left the holding pen.
pub trait CpuOperations {
    /// The enable method name, as it appears in the `enable-method` property of CPU nodes.
    const NAME: &'static str;

    /// Checks that firmware supports everything the enable method needs.
    fn cpu_init(&self, cpu: usize) -> Result<(), CpuOpsError>;

    /// Tells firmware where the given core should start executing.
    fn cpu_prepare(&self, cpu: usize) -> Result<(), CpuOpsError>;

    /// Starts the given core, powering it on first if needed, and waits for it to come up.
    fn cpu_boot(&self, cpu: usize) -> Result<(), CpuOpsError>;

    /// Called on a secondary core once it is running, to let the boot core know.
    fn cpu_postboot(&self);
}

/// An error bringing up a secondary core.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum CpuOpsError {
    /// The core index is beyond the cores the coordinator tracks.
    #[error("CPU{0}: no such core")]
    InvalidCore(usize),
    /// A link needed to find the core's register blocks is missing.
    #[error("CPU{cpu}: unable to find {link}")]
    TopologyResolutionFailure {
        /// The core being brought up.
        cpu: usize,
        /// The link which couldn't be followed.
        link: TopologyLink,
    },
    /// A register block couldn't be mapped.
    #[error("CPU{cpu}: unable to map registers at {base:#x}")]
    AddressMappingFailure {
        /// The core being brought up.
        cpu: usize,
        /// Physical base address of the block.
        base: usize,
    },
    /// Firmware doesn't implement the multi-cluster boot address call.
    #[error("multi-cluster boot address call not available")]
    MultiClusterBootUnavailable,
    /// The core's hardware id can't be expressed as affinity masks.
    #[error("CPU{cpu}: invalid hardware id {mpidr:#x}")]
    InvalidHardwareId {
        /// The core being brought up.
        cpu: usize,
        /// The offending MPIDR value.
        mpidr: u64,
    },
    /// Firmware refused to set the boot address.
    #[error("CPU{cpu}: failed to set boot address: {error}")]
    FirmwareRejected {
        /// The core being brought up.
        cpu: usize,
        /// What firmware returned.
        error: ScmError,
    },
    /// The core has already been through its power-on sequence.
    #[error("CPU{0}: already powered on")]
    AlreadyPoweredOn(usize),
    /// The core hasn't been through its power-on sequence yet.
    #[error("CPU{0}: not powered on")]
    NotPoweredOn(usize),
    /// The core didn't leave the holding pen in time.
    #[error("CPU{cpu}: failed to come online")]
    SecondaryBootTimeout {
        /// The core being brought up.
        cpu: usize,
    },
}

impl CpuOpsError {
    /// Returns the negative errno value reported for this error.
    pub fn errno(&self) -> i32 {
        let errno = match self {
            Self::InvalidCore(_) | Self::NotPoweredOn(_) => EINVAL,
            Self::TopologyResolutionFailure { .. } => ENODEV,
            Self::AddressMappingFailure { .. } => ENOMEM,
            Self::MultiClusterBootUnavailable
            | Self::InvalidHardwareId { .. }
            | Self::FirmwareRejected { .. }
            | Self::SecondaryBootTimeout { .. } => ENOSYS,
            Self::AlreadyPoweredOn(_) => EBUSY,
        };
        -errno
    }
}
