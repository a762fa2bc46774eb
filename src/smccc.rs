// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Types and helpers for making calls under the SMC Calling Convention.

use core::fmt::{self, Debug, Display, Formatter};

const FAST_CALL: u32 = 0x8000_0000;
const SMC64: u32 = 0x4000_0000;
const OEN_MASK: u32 = 0x3f00_0000;
const OEN_SHIFT: u8 = 24;

/// The number of argument registers available to an SMC64 call, `x1` to `x17`.
pub const ARG_COUNT: usize = 17;

/// The number of result registers of an SMC64 call, `x0` to `x17`.
pub const RESULT_COUNT: usize = 18;

/// The type of an SMCCC call: whether it is a fast call or yielding call, and which calling
/// convention it uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SmcccCallType {
    /// An SMC32/HVC32 fast call.
    Fast32,
    /// An SMC64/HVC64 fast call.
    Fast64,
    /// An SMC32/HVC32 yielding call.
    Yielding32,
    /// An SMC64/HVC64 yielding call.
    Yielding64,
}

/// Owning Entity Number (OEN)
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OwningEntityNumber(pub u8);

impl OwningEntityNumber {
    /// Arm Architecture calls.
    pub const ARM_ARCHITECTURE: Self = Self(0);
    /// Silicon Partner service calls, which is where the Qualcomm SCM lives.
    pub const SIP: Self = Self(2);
}

impl Display for OwningEntityNumber {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An SMCCC function ID.
#[derive(Copy, Clone, Eq, PartialEq)]
#[repr(transparent)]
pub struct FunctionId(pub u32);

impl FunctionId {
    /// Creates a new `FunctionId` from its components.
    pub const fn new(call_type: SmcccCallType, oen: OwningEntityNumber, number: u16) -> Self {
        let type_bits = match call_type {
            SmcccCallType::Fast32 => FAST_CALL,
            SmcccCallType::Fast64 => FAST_CALL | SMC64,
            SmcccCallType::Yielding32 => 0,
            SmcccCallType::Yielding64 => SMC64,
        };
        Self(type_bits | (((oen.0 as u32) << OEN_SHIFT) & OEN_MASK) | (number as u32))
    }

    /// Returns the Owning Entity Number of the function ID.
    pub fn oen(self) -> OwningEntityNumber {
        OwningEntityNumber(((self.0 & OEN_MASK) >> OEN_SHIFT) as u8)
    }

    /// Returns the lower 16 bits of the function ID.
    pub fn number(self) -> u16 {
        self.0 as u16
    }

    /// Returns what type of call this is.
    pub fn call_type(self) -> SmcccCallType {
        match (self.0 & FAST_CALL != 0, self.0 & SMC64 != 0) {
            (true, true) => SmcccCallType::Fast64,
            (true, false) => SmcccCallType::Fast32,
            (false, true) => SmcccCallType::Yielding64,
            (false, false) => SmcccCallType::Yielding32,
        }
    }
}

impl Display for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Debug for FunctionId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:#010x} ({:?} OEN {} number {:#x})",
            self.0,
            self.call_type(),
            self.oen(),
            self.number()
        )
    }
}

/// A way of calling into a more privileged exception level.
pub trait SmcConduit {
    /// Makes the call `function` with the given arguments in `x1` to `x17`, and returns `x0` to
    /// `x17`.
    fn call(&self, function: FunctionId, args: [u64; ARG_COUNT]) -> [u64; RESULT_COUNT];
}

/// Calls EL3 firmware with an `smc` instruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct Smc;

impl SmcConduit for Smc {
    #[cfg(target_arch = "aarch64")]
    fn call(&self, function: FunctionId, args: [u64; ARG_COUNT]) -> [u64; RESULT_COUNT] {
        smccc::smc64(function.0, args)
    }

    #[cfg(not(target_arch = "aarch64"))]
    fn call(&self, function: FunctionId, _args: [u64; ARG_COUNT]) -> [u64; RESULT_COUNT] {
        unimplemented!("SMC {function} is only available on aarch64")
    }
}
