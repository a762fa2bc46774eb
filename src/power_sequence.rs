// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Register sequences which power up an L2 cache and a core.
//!
//! Each step depends on the electrical state left by the one before, so the order, barriers and
//! delays must be kept exactly.

use crate::{mmio::RegisterBlock, timer::Timer};
use core::time::Duration;
use log::{debug, trace};

/// L2 power control override register.
pub const L2_PWR_CTL_OVERRIDE: usize = 0xc;
/// L2 power control register.
pub const L2_PWR_CTL: usize = 0x14;
/// L2 power status register.
pub const L2_PWR_STATUS: usize = 0x18;
/// L2 core clock branch control register.
pub const L2_CORE_CBCR: usize = 0x58;

/// Set in [`L2_PWR_STATUS`] once the L2 cache is powered up.
pub const L2_PWR_STATUS_ON: u32 = 1 << 9;

/// CPU power control register, in the ACC block.
pub const CPU_PWR_CTL: usize = 0x4;
/// CPU power gate control register, in the ACC block.
pub const CPU_PWR_GATE_CTL: usize = 0x14;

/// One step of a power sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowerStep {
    /// Writes `value` to the register at `offset`.
    Write {
        /// Byte offset of the register in its block.
        offset: usize,
        /// Value to write.
        value: u32,
        /// What the write does.
        tag: &'static str,
    },
    /// Waits for all previous writes to complete.
    Barrier,
    /// Busy-waits.
    Delay(Duration),
}

const fn write(offset: usize, value: u32, tag: &'static str) -> PowerStep {
    PowerStep::Write { offset, value, tag }
}

const DELAY_2US: PowerStep = PowerStep::Delay(Duration::from_micros(2));

/// Powers up the L2 cache and SCU of a cluster, in its L2 power domain block.
pub const L2_POWER_ON: &[PowerStep] = &[
    write(L2_PWR_CTL, 0x0010_d700, "close L2/SCU logic GDHS and power up the cache"),
    write(L2_PWR_CTL_OVERRIDE, 0x0040_0000, "assert PRESETDBGn"),
    PowerStep::Barrier,
    DELAY_2US,
    write(L2_PWR_CTL, 0x0010_1700, "de-assert L2/SCU memory clamp"),
    write(L2_PWR_CTL, 0x0010_1703, "wake up L2/SCU RAMs"),
    PowerStep::Barrier,
    DELAY_2US,
    write(L2_CORE_CBCR, 0x01, "enable clocks via SW_CLK_EN"),
    write(L2_PWR_CTL, 0x0010_1603, "de-assert L2/SCU logic clamp"),
    PowerStep::Barrier,
    DELAY_2US,
    write(L2_PWR_CTL_OVERRIDE, 0x0, "de-assert PRESETDBGn"),
    write(L2_PWR_CTL, 0x0010_0203, "de-assert L2/SCU logic reset"),
    PowerStep::Barrier,
    PowerStep::Delay(Duration::from_micros(54)),
    write(L2_PWR_CTL, 0x1010_0203, "turn on the PMIC_APC"),
    write(L2_CORE_CBCR, 0x03, "set hardware clock control for the CPU CBC block"),
    PowerStep::Barrier,
];

/// Brings a core out of reset with its power rail up, in its ACC block.
pub const CORE_POWER_ON: &[PowerStep] = &[
    write(CPU_PWR_CTL, 0x0000_0033, "assert reset"),
    PowerStep::Barrier,
    write(CPU_PWR_GATE_CTL, 0x1000_0001, "program skew to 16 X0 clock cycles"),
    PowerStep::Barrier,
    DELAY_2US,
    write(CPU_PWR_CTL, 0x0000_0031, "de-assert coremem clamp"),
    PowerStep::Barrier,
    write(CPU_PWR_CTL, 0x0000_0039, "close coremem array GDHS"),
    PowerStep::Barrier,
    DELAY_2US,
    write(CPU_PWR_CTL, 0x0002_0038, "de-assert core clamp"),
    PowerStep::Barrier,
    DELAY_2US,
    write(CPU_PWR_CTL, 0x0002_0008, "de-assert core reset"),
    PowerStep::Barrier,
    write(CPU_PWR_CTL, 0x0002_0088, "assert PWRDUP"),
    PowerStep::Barrier,
];

/// Replays `steps` against `registers`.
pub fn run(steps: &[PowerStep], registers: &mut impl RegisterBlock, timer: &impl Timer) {
    for step in steps {
        match *step {
            PowerStep::Write { offset, value, tag } => {
                trace!("{offset:#x} <- {value:#010x}: {tag}");
                registers.write_relaxed(offset, value);
            }
            PowerStep::Barrier => registers.mb(),
            PowerStep::Delay(duration) => timer.delay(duration),
        }
    }
}

/// Powers up the L2 cache whose power domain block is `registers`, unless it is already on.
///
/// Returns whether the power-up sequence was run.
pub fn power_on_l2_cache(registers: &mut impl RegisterBlock, timer: &impl Timer) -> bool {
    if registers.read_relaxed(L2_PWR_STATUS) & L2_PWR_STATUS_ON != 0 {
        debug!("L2 cache already powered up");
        return false;
    }

    run(L2_POWER_ON, registers, timer);
    true
}

/// Releases the clamps and reset of the core whose ACC block is `registers`.
pub fn power_on_core(registers: &mut impl RegisterBlock, timer: &impl Timer) {
    run(CORE_POWER_ON, registers, timer);
}
