// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The hooks a board provides to the boot coordinator.

#[cfg(target_arch = "aarch64")]
mod identity;
pub mod msm8916;
pub mod msm8939;

use crate::{
    mmio::{RegisterBlock, RegisterRegion},
    scm::ScmInterface,
    timer::Timer,
    topology::Topology,
};
use core::time::Duration;
#[cfg(target_arch = "aarch64")]
pub use identity::IdentityMappedPlatform;

/// The hooks implemented by all platforms.
pub trait Platform {
    /// How long the primary waits for a secondary to leave the holding pen.
    const BOOT_TIMEOUT: Duration = Duration::from_secs(1);

    /// How often the primary checks the holding pen while waiting.
    const POLL_INTERVAL: Duration = Duration::from_micros(10);

    /// Platform dependent topology type.
    type Topology: Topology;

    /// Platform dependent secure monitor interface.
    type Firmware: ScmInterface;

    /// Register block type returned by `map_registers`.
    type Registers: RegisterBlock;

    /// Platform dependent timer.
    type Timer: Timer;

    /// Returns the core topology.
    fn topology(&self) -> &Self::Topology;

    /// Returns the secure monitor interface.
    fn firmware(&self) -> &Self::Firmware;

    /// Returns the timer used for delays and the boot timeout.
    fn timer(&self) -> &Self::Timer;

    /// Maps the given register region, returning `None` if it can't be mapped.
    ///
    /// The mapping is dropped as soon as the power sequence using it is done.
    fn map_registers(&self, region: RegisterRegion) -> Option<Self::Registers>;
}
