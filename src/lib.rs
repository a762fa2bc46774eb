// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Secondary CPU bring-up for Qualcomm MSM8916/MSM8939 cores behind a KPSS ACC v2 block.
//!
//! The primary core powers each secondary on through its L2 and ACC register blocks, publishes the
//! secondary's MPIDR in the holding pen and waits, bounded, for the secondary to clear it again.
//! All hardware access goes through the [`platform::Platform`] trait so the same code runs against
//! real registers or against the fakes used by the unit tests.

#![cfg_attr(not(test), no_std)]

pub mod aarch64;
pub mod cpu_ops;
mod debug;
pub mod logger;
pub mod mmio;
pub mod platform;
pub mod power_sequence;
pub mod scm;
pub mod smccc;
pub mod timer;
pub mod topology;

pub use cpu_ops::{
    BootCoordinator, CoordinatorState, CorePhase, CpuOperations, CpuOpsError, INVALID_HWID,
};
