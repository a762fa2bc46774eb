// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Qualcomm Secure Channel Manager calls used for CPU bring-up.

use crate::{
    aarch64::flush_dcache_range,
    smccc::{ARG_COUNT, FunctionId, OwningEntityNumber, SmcConduit, SmcccCallType},
};
use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use thiserror::Error;

const SVC_BOOT: u8 = 0x01;
const BOOT_SET_ADDR_MC: u8 = 0x11;
const SVC_INFO: u8 = 0x06;
const INFO_IS_CALL_AVAIL: u8 = 0x01;

/// Number of arguments passed in registers, `x2` to `x5`.
const REGISTER_ARGS: usize = 4;
/// Most arguments any SCM call takes.
const MAX_ARGS: usize = 10;
/// Index of the first argument moved to the extended argument buffer when there are too many to
/// fit in registers. The buffer's address takes its place in the last argument register.
const FIRST_EXTENDED_ARG: usize = REGISTER_ARGS - 1;

/// Arguments which don't fit in registers, read by firmware from memory.
#[repr(C, align(64))]
struct ExtendedArgs([u64; MAX_ARGS - FIRST_EXTENDED_ARG]);

/// Affinity mask meaning "all instances", used for the unsupported fourth affinity level.
const ALL_AFFINITIES: u64 = !0;

bitflags! {
    /// Flags for the multi-cluster boot address call.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct BootAddrFlags: u64 {
        /// The entry point is AArch64 code.
        const AARCH64 = 1 << 0;
        /// Use the address for cold boot.
        const COLDBOOT = 1 << 1;
        /// Use the address for warm boot.
        const WARMBOOT = 1 << 2;
    }
}

/// Status codes returned by the secure monitor in `x0`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, TryFromPrimitive)]
#[repr(i64)]
pub enum ScmStatus {
    /// The call succeeded.
    Success = 0,
    /// The call was interrupted and must be resumed.
    Interrupted = 1,
    /// Generic failure.
    Error = -1,
    /// An argument was invalid.
    InvalidArgument = -2,
    /// An address argument was invalid.
    InvalidAddress = -3,
    /// The call isn't supported by this firmware.
    NotSupported = -4,
    /// Firmware ran out of memory.
    OutOfMemory = -5,
    /// Firmware is busy.
    Busy = -12,
}

/// A failed SCM call.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ScmError {
    /// Firmware returned a known failure status.
    #[error("secure monitor returned {0:?}")]
    Status(ScmStatus),
    /// Firmware returned a status code we don't know about.
    #[error("secure monitor returned unknown status {0}")]
    UnknownStatus(i64),
}

impl ScmError {
    /// Converts the raw `x0` of an SCM call into a result.
    pub fn check(x0: u64) -> Result<(), Self> {
        let raw = x0 as i64;
        match ScmStatus::try_from(raw) {
            Ok(ScmStatus::Success) => Ok(()),
            Ok(status) => Err(Self::Status(status)),
            Err(_) => Err(Self::UnknownStatus(raw)),
        }
    }
}

/// The secure monitor services needed to boot secondary cores.
pub trait ScmInterface {
    /// Returns whether firmware implements the multi-cluster boot address call.
    fn mc_boot_available(&self) -> Result<bool, ScmError>;

    /// Sets the cold boot entry point for every core matching the given affinity masks.
    ///
    /// Bit `n` of `aff0` selects cores with affinity level 0 equal to `n`, and likewise for the
    /// other levels.
    fn set_cold_boot_addr_mc(
        &self,
        entry: usize,
        aff0: u64,
        aff1: u64,
        aff2: u64,
    ) -> Result<(), ScmError>;
}

/// The SCM, reached through SMCCC calls on the given conduit.
///
/// Calls with more than four arguments pass the rest in a buffer on the caller's stack, whose
/// address firmware reads as a physical address.
#[derive(Debug)]
pub struct SmcScm<C: SmcConduit> {
    conduit: C,
}

impl<C: SmcConduit> SmcScm<C> {
    /// Function ID of the multi-cluster boot address call.
    pub const BOOT_SET_ADDR_MC: FunctionId = Self::function_id(SVC_BOOT, BOOT_SET_ADDR_MC);
    /// Function ID of the call availability query.
    pub const INFO_IS_CALL_AVAIL: FunctionId = Self::function_id(SVC_INFO, INFO_IS_CALL_AVAIL);

    /// Creates a new SCM client using the given conduit.
    ///
    /// # Safety
    ///
    /// The stack of every core making calls through the client must be identity mapped, and
    /// firmware must be allowed to read it.
    pub const unsafe fn new(conduit: C) -> Self {
        Self { conduit }
    }

    const fn function_id(service: u8, command: u8) -> FunctionId {
        FunctionId::new(
            SmcccCallType::Yielding64,
            OwningEntityNumber::SIP,
            ((service as u16) << 8) | command as u16,
        )
    }

    /// Makes an SCM call with the given value arguments, returning `x1` to `x3` on success.
    fn call(&self, function: FunctionId, args: &[u64]) -> Result<[u64; 3], ScmError> {
        assert!(args.len() <= MAX_ARGS, "Too many SCM arguments: {}", args.len());
        let mut registers = [0; ARG_COUNT];
        // The argument info word only needs the count, as all our arguments are values.
        registers[0] = args.len() as u64;

        let mut extended = ExtendedArgs([0; MAX_ARGS - FIRST_EXTENDED_ARG]);
        if args.len() > REGISTER_ARGS {
            let rest = &args[FIRST_EXTENDED_ARG..];
            extended.0[..rest.len()].copy_from_slice(rest);
            let address = extended.0.as_ptr() as usize;
            flush_dcache_range(address, size_of_val(&extended.0), 64);
            registers[1..=FIRST_EXTENDED_ARG].copy_from_slice(&args[..FIRST_EXTENDED_ARG]);
            registers[REGISTER_ARGS] = address as u64;
        } else {
            registers[1..=args.len()].copy_from_slice(args);
        }

        let result = self.conduit.call(function, registers);
        ScmError::check(result[0])?;
        Ok([result[1], result[2], result[3]])
    }
}

impl<C: SmcConduit> ScmInterface for SmcScm<C> {
    fn mc_boot_available(&self) -> Result<bool, ScmError> {
        // The query takes the SiP-owned function ID without the call type bits.
        let query = Self::function_id(SVC_BOOT, BOOT_SET_ADDR_MC).0 & !0xc000_0000;
        let [available, ..] = self.call(Self::INFO_IS_CALL_AVAIL, &[query.into()])?;
        Ok(available != 0)
    }

    fn set_cold_boot_addr_mc(
        &self,
        entry: usize,
        aff0: u64,
        aff1: u64,
        aff2: u64,
    ) -> Result<(), ScmError> {
        let flags = BootAddrFlags::AARCH64 | BootAddrFlags::COLDBOOT;
        self.call(
            Self::BOOT_SET_ADDR_MC,
            &[
                entry as u64,
                aff0,
                aff1,
                aff2,
                ALL_AFFINITIES,
                flags.bits(),
            ],
        )?;
        Ok(())
    }
}
