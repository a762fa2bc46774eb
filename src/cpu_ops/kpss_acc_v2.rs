// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The `qcom,kpss-acc-v2` enable method used by MSM8916 and MSM8939.
//!
//! The boot core powers a secondary up through its L2 and ACC blocks once, then releases it from
//! the holding pen on every boot. Release is a handshake under the boot lock: the boot core
//! publishes the secondary's MPIDR and polls until the secondary clears the pen again, and the
//! secondary takes the lock after clearing so that it can't run ahead of the boot core.

use super::{CpuOperations, CpuOpsError, HoldingPen, INVALID_HWID};
use crate::{
    aarch64::sev,
    mmio::RegisterRegion,
    platform::Platform,
    power_sequence,
    scm::ScmInterface,
    timer::BoundedPoll,
    topology::{MPIDR_HWID_BITMASK, Topology, TopologyLink},
};
use arm_sysregs::MpidrEl1;
use core::sync::atomic::{AtomicBool, Ordering};
use log::{debug, error, info, warn};
use spin::mutex::SpinMutex;

/// Where a core is in its bring-up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CorePhase {
    /// Never powered on.
    Cold,
    /// Power sequences done, not yet released from the holding pen.
    Powered,
    /// Published in the holding pen, waiting for it to arrive.
    WakePending,
    /// Arrived in time.
    Online,
    /// Didn't arrive in time on its last boot.
    BootFailed,
}

impl CorePhase {
    /// Returns whether the core has been through its one-time power-on sequence.
    pub fn cold_boot_done(self) -> bool {
        self != Self::Cold
    }
}

/// State shared by the boot core and the secondaries it brings up.
#[derive(Debug)]
pub struct CoordinatorState<const CORE_COUNT: usize> {
    pen: HoldingPen,
    boot_lock: SpinMutex<()>,
    power_lock: SpinMutex<()>,
    phases: [SpinMutex<CorePhase>; CORE_COUNT],
    initialised: AtomicBool,
}

impl<const CORE_COUNT: usize> CoordinatorState<CORE_COUNT> {
    /// Creates the state for a system in which no secondary has been powered on.
    pub const fn new() -> Self {
        Self {
            pen: HoldingPen::new(),
            boot_lock: SpinMutex::new(()),
            power_lock: SpinMutex::new(()),
            phases: [const { SpinMutex::new(CorePhase::Cold) }; CORE_COUNT],
            initialised: AtomicBool::new(false),
        }
    }

    /// Returns the holding pen.
    pub fn pen(&self) -> &HoldingPen {
        &self.pen
    }

    /// Returns the phase of the given core, or `None` if there is no such core.
    pub fn phase(&self, cpu: usize) -> Option<CorePhase> {
        self.phases.get(cpu).map(|phase| *phase.lock())
    }

    /// Returns whether the given core has been through its power-on sequence.
    pub fn cold_boot_done(&self, cpu: usize) -> bool {
        self.phase(cpu).is_some_and(CorePhase::cold_boot_done)
    }

    /// Parks the calling secondary until the boot core releases the given MPIDR.
    pub fn holding_pen(&self, mpidr: MpidrEl1) {
        self.pen.wait_for(mpidr.bits());
    }

    /// Tells the boot core that the calling secondary has left the holding pen.
    ///
    /// Returns once the boot core has finished waiting for it.
    pub fn secondary_arrived(&self) {
        self.pen.publish(INVALID_HWID);
        drop(self.boot_lock.lock());
    }

    fn core_phase(&self, cpu: usize) -> Result<&SpinMutex<CorePhase>, CpuOpsError> {
        self.phases.get(cpu).ok_or(CpuOpsError::InvalidCore(cpu))
    }
}

impl<const CORE_COUNT: usize> Default for CoordinatorState<CORE_COUNT> {
    fn default() -> Self {
        Self::new()
    }
}

/// Brings secondary cores up on behalf of the boot core.
#[derive(Debug)]
pub struct BootCoordinator<'a, P: Platform, const CORE_COUNT: usize> {
    platform: P,
    state: &'a CoordinatorState<CORE_COUNT>,
    secondary_entry: usize,
}

impl<'a, P: Platform, const CORE_COUNT: usize> BootCoordinator<'a, P, CORE_COUNT> {
    /// Creates a coordinator which starts secondaries at the physical address `secondary_entry`.
    ///
    /// The code at `secondary_entry` is expected to call [`CoordinatorState::holding_pen`] and
    /// then [`CpuOperations::cpu_postboot`].
    ///
    /// `CORE_COUNT` must be at least the number of cores in the platform's topology.
    pub fn new(
        platform: P,
        state: &'a CoordinatorState<CORE_COUNT>,
        secondary_entry: usize,
    ) -> Self {
        debug_assert!(
            platform.topology().core_count() <= CORE_COUNT,
            "Topology has {} cores but only {CORE_COUNT} are tracked",
            platform.topology().core_count()
        );
        Self {
            platform,
            state,
            secondary_entry,
        }
    }

    /// Returns the platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns the shared state.
    pub fn state(&self) -> &'a CoordinatorState<CORE_COUNT> {
        self.state
    }

    fn hardware_id(&self, cpu: usize) -> Result<MpidrEl1, CpuOpsError> {
        if cpu >= CORE_COUNT {
            return Err(CpuOpsError::InvalidCore(cpu));
        }
        self.platform
            .topology()
            .hardware_id(cpu)
            .ok_or(CpuOpsError::TopologyResolutionFailure {
                cpu,
                link: TopologyLink::CpuNode,
            })
    }

    fn map(&self, cpu: usize, region: RegisterRegion) -> Result<P::Registers, CpuOpsError> {
        self.platform.map_registers(region).ok_or_else(|| {
            error!("CPU{cpu}: unable to map registers at {:#x}", region.base);
            CpuOpsError::AddressMappingFailure {
                cpu,
                base: region.base,
            }
        })
    }

    /// Runs the one-time power-on sequence of the given core: its L2 cache if that is still off,
    /// then the core itself.
    ///
    /// Fails with [`CpuOpsError::AlreadyPoweredOn`] rather than running the sequence twice. Writes
    /// already issued are not undone if a later step fails. Only one core is powered on at a time,
    /// as cores in a cluster share the L2 power domain.
    pub fn power_on_core(&self, cpu: usize) -> Result<(), CpuOpsError> {
        let mut phase = self.state.core_phase(cpu)?.lock();
        if phase.cold_boot_done() {
            return Err(CpuOpsError::AlreadyPoweredOn(cpu));
        }

        let core = self.platform.topology().resolve(cpu).map_err(|link| {
            error!("CPU{cpu}: unable to find {link}");
            CpuOpsError::TopologyResolutionFailure { cpu, link }
        })?;
        let timer = self.platform.timer();
        let _power = self.state.power_lock.lock();

        let mut l2 = self.map(cpu, core.l2_power_domain)?;
        if power_sequence::power_on_l2_cache(&mut l2, timer) {
            debug!("CPU{cpu}: powered up L2 cache at {:#x}", core.l2_power_domain.base);
        }
        drop(l2);

        let mut acc = self.map(cpu, core.acc)?;
        power_sequence::power_on_core(&mut acc, timer);
        drop(acc);

        *phase = CorePhase::Powered;
        info!("CPU{cpu}: powered on");
        Ok(())
    }

    /// Releases the given core from the holding pen and waits for it to arrive.
    ///
    /// The core must already be powered on. Waiting is bounded by [`Platform::BOOT_TIMEOUT`]; a
    /// core which misses it is left [`CorePhase::BootFailed`] and is not retried.
    pub fn request_wake(&self, cpu: usize) -> Result<(), CpuOpsError> {
        let mpidr = self.hardware_id(cpu)?;
        let phase = self.state.core_phase(cpu)?;
        {
            let mut phase = phase.lock();
            if !phase.cold_boot_done() {
                return Err(CpuOpsError::NotPoweredOn(cpu));
            }
            *phase = CorePhase::WakePending;
        }

        let arrived = {
            let _guard = self.state.boot_lock.lock();
            self.state.pen.publish(mpidr.bits());
            sev();

            let poll = BoundedPoll::new(P::POLL_INTERVAL, P::BOOT_TIMEOUT);
            // The secondary may clear the pen between the last check and the deadline.
            poll.poll(self.platform.timer(), || self.state.pen.release() == INVALID_HWID)
                || self.state.pen.release() == INVALID_HWID
        };

        if arrived {
            *phase.lock() = CorePhase::Online;
            info!("CPU{cpu}: online");
            Ok(())
        } else {
            *phase.lock() = CorePhase::BootFailed;
            error!("CPU{cpu}: failed to come online");
            Err(CpuOpsError::SecondaryBootTimeout { cpu })
        }
    }

    /// Returns the affinity masks selecting exactly the core with the given MPIDR.
    fn affinity_masks(cpu: usize, mpidr: MpidrEl1) -> Result<[u64; 3], CpuOpsError> {
        let invalid = CpuOpsError::InvalidHardwareId {
            cpu,
            mpidr: mpidr.bits(),
        };
        if mpidr.bits() & !MPIDR_HWID_BITMASK != 0 {
            return Err(invalid);
        }
        let mask = |affinity: u8| 1u64.checked_shl(affinity.into()).ok_or(invalid);
        Ok([mask(mpidr.aff0())?, mask(mpidr.aff1())?, mask(mpidr.aff2())?])
    }
}

impl<P: Platform, const CORE_COUNT: usize> CpuOperations for BootCoordinator<'_, P, CORE_COUNT> {
    const NAME: &'static str = "qcom,kpss-acc-v2";

    fn cpu_init(&self, _cpu: usize) -> Result<(), CpuOpsError> {
        if self.state.initialised.load(Ordering::Acquire) {
            return Ok(());
        }

        match self.platform.firmware().mc_boot_available() {
            Ok(true) => {
                self.state.initialised.store(true, Ordering::Release);
                Ok(())
            }
            Ok(false) => {
                error!("Multi-cluster boot address call not available");
                Err(CpuOpsError::MultiClusterBootUnavailable)
            }
            Err(e) => {
                error!("Failed to query multi-cluster boot address call: {e}");
                Err(CpuOpsError::MultiClusterBootUnavailable)
            }
        }
    }

    fn cpu_prepare(&self, cpu: usize) -> Result<(), CpuOpsError> {
        let mpidr = self.hardware_id(cpu)?;
        let [aff0, aff1, aff2] = Self::affinity_masks(cpu, mpidr).inspect_err(|_| {
            error!("CPU{cpu}: invalid hardware id {:#x}", mpidr.bits());
        })?;

        self.platform
            .firmware()
            .set_cold_boot_addr_mc(self.secondary_entry, aff0, aff1, aff2)
            .map_err(|error| {
                warn!("CPU{cpu}: failed to set boot address: {error}");
                CpuOpsError::FirmwareRejected { cpu, error }
            })?;

        // The boot core is already running, so it never goes through the power-on sequence.
        if let Some(boot_core) = self.state.phases.first() {
            let mut phase = boot_core.lock();
            if *phase == CorePhase::Cold {
                *phase = CorePhase::Online;
            }
        }
        Ok(())
    }

    fn cpu_boot(&self, cpu: usize) -> Result<(), CpuOpsError> {
        if !self.state.core_phase(cpu)?.lock().cold_boot_done() {
            self.power_on_core(cpu)?;
        }
        self.request_wake(cpu)
    }

    fn cpu_postboot(&self) {
        self.state.secondary_arrived();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        platform::{
            msm8916, msm8939,
            test::{Access, BootAddrCall, TestPlatform, init_logger},
        },
        power_sequence::{
            CPU_PWR_CTL, CPU_PWR_GATE_CTL, L2_POWER_ON, L2_PWR_STATUS, L2_PWR_STATUS_ON, PowerStep,
        },
        scm::{ScmError, ScmStatus},
        timer::Timer,
        topology::{CpuDescriptor, StaticTopology},
    };
    use core::time::Duration;
    use std::{
        hint::spin_loop,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        thread,
    };

    const ENTRY: usize = 0x8008_0000;
    const L2_BASE: usize = 0x0b01_1000;
    const ACC1_BASE: usize = 0x0b09_8000;

    type State = CoordinatorState<4>;
    type Coordinator = BootCoordinator<'static, TestPlatform, 4>;

    fn coordinator(platform: TestPlatform) -> Coordinator {
        init_logger();
        let state: &'static State = Box::leak(Box::new(State::new()));
        BootCoordinator::new(platform, state, ENTRY)
    }

    fn mpidr(cpu: usize) -> MpidrEl1 {
        msm8916::TOPOLOGY.hardware_id(cpu).unwrap()
    }

    /// Makes the simulated secondary `cpu` leave the holding pen once `delay` has passed on the
    /// boot core's clock since the last check, and waits for the pen to read clear before the
    /// boot core looks at it again.
    fn arrive_after(coordinator: &Coordinator, cpu: usize, delay: Duration) -> Arc<AtomicBool> {
        let go = Arc::new(AtomicBool::new(false));
        let state = coordinator.state();
        let target = mpidr(cpu).bits();
        let start = coordinator.platform().timer().now();
        let go_hook = go.clone();
        coordinator.platform().timer().set_hook(move |now| {
            if now >= start + delay
                && state.pen().release() == target
                && !go_hook.swap(true, Ordering::SeqCst)
            {
                while state.pen().release() != INVALID_HWID {
                    spin_loop();
                }
            }
        });
        go
    }

    /// Runs the secondary side of a boot: wait in the pen, wait for `go`, then report arrival.
    fn secondary(coordinator: &Coordinator, cpu: usize, go: &AtomicBool) {
        coordinator.state().holding_pen(mpidr(cpu));
        while !go.load(Ordering::SeqCst) {
            spin_loop();
        }
        coordinator.cpu_postboot();
    }

    /// Keeps the boot core's clock from moving on while the pen holds a released core.
    fn wait_for_arrivals(coordinator: &Coordinator) {
        let state = coordinator.state();
        coordinator.platform().timer().set_hook(move |_| {
            while state.pen().release() != INVALID_HWID {
                spin_loop();
            }
        });
    }

    /// Asserts that the L2 writes are `count` whole, back to back runs of the power-up sequence.
    fn assert_whole_l2_sequences(platform: &TestPlatform, count: usize) {
        let sequence: Vec<_> = L2_POWER_ON
            .iter()
            .filter_map(|step| match *step {
                PowerStep::Write { offset, value, .. } => Some((offset, value)),
                _ => None,
            })
            .collect();
        let writes = platform.log().writes(L2_BASE);
        assert_eq!(writes.len(), count * sequence.len());
        for run in writes.chunks(sequence.len()) {
            assert_eq!(run, sequence);
        }
    }

    fn power_writes(platform: &TestPlatform) -> usize {
        platform
            .log()
            .accesses()
            .iter()
            .filter(|access| matches!(access, Access::Write(..)))
            .count()
    }

    #[test]
    fn name() {
        assert_eq!(Coordinator::NAME, "qcom,kpss-acc-v2");
    }

    #[test]
    fn init_is_latched_once_available() {
        let coordinator = coordinator(TestPlatform::new());
        let scm = coordinator.platform().scm();

        scm.set_mc_boot(Ok(false));
        assert_eq!(
            coordinator.cpu_init(0),
            Err(CpuOpsError::MultiClusterBootUnavailable)
        );
        scm.set_mc_boot(Err(ScmError::Status(ScmStatus::NotSupported)));
        assert_eq!(
            coordinator.cpu_init(0),
            Err(CpuOpsError::MultiClusterBootUnavailable)
        );
        assert_eq!(scm.queries(), 2);

        scm.set_mc_boot(Ok(true));
        assert_eq!(coordinator.cpu_init(0), Ok(()));
        assert_eq!(coordinator.cpu_init(1), Ok(()));
        assert_eq!(scm.queries(), 3);
    }

    #[test]
    fn prepare_sets_boot_address_for_core() {
        init_logger();
        let state = CoordinatorState::<8>::new();
        let coordinator =
            BootCoordinator::new(TestPlatform::with_topology(msm8939::TOPOLOGY), &state, ENTRY);

        assert_eq!(coordinator.cpu_prepare(1), Ok(()));
        assert_eq!(coordinator.cpu_prepare(6), Ok(()));

        assert_eq!(
            coordinator.platform().scm().boot_addr_calls(),
            [
                BootAddrCall {
                    entry: ENTRY,
                    aff0: 1 << 1,
                    aff1: 1 << 1,
                    aff2: 1 << 0,
                },
                BootAddrCall {
                    entry: ENTRY,
                    aff0: 1 << 2,
                    aff1: 1 << 0,
                    aff2: 1 << 0,
                },
            ]
        );
        assert_eq!(state.phase(0), Some(CorePhase::Online));
        assert!(state.cold_boot_done(0));
        assert_eq!(state.phase(1), Some(CorePhase::Cold));
        assert_eq!(power_writes(coordinator.platform()), 0);
    }

    #[test]
    fn prepare_rejected_by_firmware() {
        let coordinator = coordinator(TestPlatform::new());
        let error = ScmError::Status(ScmStatus::InvalidAddress);
        coordinator.platform().scm().set_boot_addr_result(Err(error));

        assert_eq!(
            coordinator.cpu_prepare(2),
            Err(CpuOpsError::FirmwareRejected { cpu: 2, error })
        );
        assert_eq!(coordinator.state().phase(0), Some(CorePhase::Cold));
    }

    #[test]
    fn prepare_rejects_unrepresentable_hardware_ids() {
        static CPUS: [CpuDescriptor; 2] = [
            CpuDescriptor {
                mpidr: MpidrEl1::from_bits_retain(0x4000_0000),
                acc: None,
                next_level_cache: None,
            },
            CpuDescriptor {
                mpidr: MpidrEl1::from_bits_retain(0x40),
                acc: None,
                next_level_cache: None,
            },
        ];
        let coordinator =
            coordinator(TestPlatform::with_topology(StaticTopology::new(&CPUS, &[])));

        assert_eq!(
            coordinator.cpu_prepare(0),
            Err(CpuOpsError::InvalidHardwareId {
                cpu: 0,
                mpidr: 0x4000_0000
            })
        );
        assert_eq!(
            coordinator.cpu_prepare(1),
            Err(CpuOpsError::InvalidHardwareId { cpu: 1, mpidr: 0x40 })
        );
        assert!(coordinator.platform().scm().boot_addr_calls().is_empty());
    }

    #[test]
    fn boot_core_from_cold() {
        let coordinator = coordinator(TestPlatform::new());
        let platform = coordinator.platform();

        assert_eq!(coordinator.power_on_core(1), Ok(()));
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::Powered));
        assert_eq!(
            platform.log().writes(ACC1_BASE),
            [
                (CPU_PWR_CTL, 0x33),
                (CPU_PWR_GATE_CTL, 0x1000_0001),
                (CPU_PWR_CTL, 0x31),
                (CPU_PWR_CTL, 0x39),
                (CPU_PWR_CTL, 0x0002_0038),
                (CPU_PWR_CTL, 0x0002_0008),
                (CPU_PWR_CTL, 0x0002_0088),
            ]
        );
        assert_eq!(platform.log().writes(L2_BASE).len(), 10);

        let start = platform.timer().now();
        let go = arrive_after(&coordinator, 1, Duration::from_micros(30));
        thread::scope(|s| {
            s.spawn(|| secondary(&coordinator, 1, &go));
            assert_eq!(coordinator.request_wake(1), Ok(()));
        });

        assert_eq!(coordinator.state().phase(1), Some(CorePhase::Online));
        assert_eq!(platform.timer().now() - start, Duration::from_micros(30));
        assert_eq!(coordinator.state().pen().release(), INVALID_HWID);
    }

    #[test]
    fn boot_times_out_without_arrival() {
        let coordinator = coordinator(TestPlatform::new());
        let platform = coordinator.platform();
        coordinator.power_on_core(1).unwrap();

        let start = platform.timer().now();
        assert_eq!(
            coordinator.request_wake(1),
            Err(CpuOpsError::SecondaryBootTimeout { cpu: 1 })
        );
        assert_eq!(platform.timer().now() - start, Duration::from_secs(1));
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::BootFailed));
        assert_eq!(coordinator.state().pen().release(), mpidr(1).bits());

        // A late arrival clears the pen with nobody watching.
        coordinator.cpu_postboot();
        assert_eq!(coordinator.state().pen().release(), INVALID_HWID);
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::BootFailed));
    }

    #[test]
    fn arrival_just_before_deadline() {
        let coordinator = coordinator(TestPlatform::new());
        coordinator.power_on_core(2).unwrap();

        let go = arrive_after(&coordinator, 2, Duration::from_millis(990));
        thread::scope(|s| {
            s.spawn(|| secondary(&coordinator, 2, &go));
            assert_eq!(coordinator.request_wake(2), Ok(()));
        });
        assert_eq!(coordinator.state().phase(2), Some(CorePhase::Online));
    }

    #[test]
    fn powered_l2_is_not_touched() {
        let platform = TestPlatform::new();
        platform
            .log()
            .set_register(L2_BASE + L2_PWR_STATUS, L2_PWR_STATUS_ON);
        let coordinator = coordinator(platform);

        coordinator.power_on_core(3).unwrap();

        let log = coordinator.platform().log();
        assert!(log.writes(L2_BASE).is_empty());
        assert_eq!(log.writes(0x0b0b_8000).len(), 7);
    }

    #[test]
    fn second_boot_skips_power_on() {
        let coordinator = coordinator(TestPlatform::new());
        let platform = coordinator.platform();

        let go = arrive_after(&coordinator, 1, Duration::from_micros(10));
        thread::scope(|s| {
            s.spawn(|| secondary(&coordinator, 1, &go));
            assert_eq!(coordinator.cpu_boot(1), Ok(()));
        });
        assert_eq!(power_writes(platform), 17);

        platform.log().clear();
        assert_eq!(
            coordinator.power_on_core(1),
            Err(CpuOpsError::AlreadyPoweredOn(1))
        );

        let go = arrive_after(&coordinator, 1, Duration::from_micros(10));
        thread::scope(|s| {
            s.spawn(|| secondary(&coordinator, 1, &go));
            assert_eq!(coordinator.cpu_boot(1), Ok(()));
        });
        assert_eq!(power_writes(platform), 0);
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::Online));
    }

    #[test]
    fn failed_core_can_be_booted_again() {
        let coordinator = coordinator(TestPlatform::new());

        assert_eq!(
            coordinator.cpu_boot(2),
            Err(CpuOpsError::SecondaryBootTimeout { cpu: 2 })
        );
        coordinator.cpu_postboot();

        let go = arrive_after(&coordinator, 2, Duration::from_micros(20));
        thread::scope(|s| {
            s.spawn(|| secondary(&coordinator, 2, &go));
            assert_eq!(coordinator.cpu_boot(2), Ok(()));
        });
        assert_eq!(coordinator.state().phase(2), Some(CorePhase::Online));
    }

    #[test]
    fn concurrent_boots_release_one_core_at_a_time() {
        let coordinator = coordinator(TestPlatform::new());
        let state = coordinator.state();
        wait_for_arrivals(&coordinator);

        thread::scope(|s| {
            for cpu in 1..4 {
                s.spawn(move || {
                    let own = mpidr(cpu);
                    state.holding_pen(own);
                    for _ in 0..10 {
                        assert_eq!(state.pen().release(), own.bits());
                        thread::yield_now();
                    }
                    state.secondary_arrived();
                });
            }
            let coordinator = &coordinator;
            for cpu in 1..4 {
                s.spawn(move || assert_eq!(coordinator.cpu_boot(cpu), Ok(())));
            }
        });

        for cpu in 1..4 {
            assert_eq!(state.phase(cpu), Some(CorePhase::Online));
        }
        assert_eq!(state.pen().release(), INVALID_HWID);
        assert_whole_l2_sequences(coordinator.platform(), 3);
    }

    #[test]
    fn concurrent_power_on_does_not_interleave_l2_sequences() {
        let coordinator = coordinator(TestPlatform::new());

        thread::scope(|s| {
            for cpu in 1..4 {
                let coordinator = &coordinator;
                s.spawn(move || assert_eq!(coordinator.power_on_core(cpu), Ok(())));
            }
        });

        assert_whole_l2_sequences(coordinator.platform(), 3);
        for cpu in 1..4 {
            assert_eq!(coordinator.state().phase(cpu), Some(CorePhase::Powered));
        }
    }

    #[test]
    fn cluster_shares_powered_l2() {
        let coordinator = coordinator(TestPlatform::new());
        let log = coordinator.platform().log();

        coordinator.power_on_core(1).unwrap();
        // The first power-up leaves the status bit set, as the hardware does.
        log.set_register(L2_BASE + L2_PWR_STATUS, L2_PWR_STATUS_ON);
        coordinator.power_on_core(2).unwrap();
        coordinator.power_on_core(3).unwrap();

        assert_whole_l2_sequences(coordinator.platform(), 1);
        assert_eq!(power_writes(coordinator.platform()), 10 + 3 * 7);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "Topology has 8 cores but only 4 are tracked")]
    fn state_must_track_every_core() {
        let state = State::new();
        BootCoordinator::new(TestPlatform::with_topology(msm8939::TOPOLOGY), &state, ENTRY);
    }

    #[test]
    fn missing_topology_link() {
        static CPUS: [CpuDescriptor; 2] = [
            msm8916::CPUS[0],
            CpuDescriptor {
                acc: None,
                ..msm8916::CPUS[1]
            },
        ];
        let coordinator = coordinator(TestPlatform::with_topology(StaticTopology::new(
            &CPUS,
            &msm8916::CACHES,
        )));

        assert_eq!(
            coordinator.cpu_boot(1),
            Err(CpuOpsError::TopologyResolutionFailure {
                cpu: 1,
                link: TopologyLink::Acc
            })
        );
        assert_eq!(
            coordinator.cpu_boot(3),
            Err(CpuOpsError::TopologyResolutionFailure {
                cpu: 3,
                link: TopologyLink::CpuNode
            })
        );
        assert!(coordinator.platform().log().accesses().is_empty());
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::Cold));
    }

    #[test]
    fn unmappable_acc_leaves_core_cold() {
        let coordinator = coordinator(TestPlatform::new().unmappable(ACC1_BASE));

        assert_eq!(
            coordinator.cpu_boot(1),
            Err(CpuOpsError::AddressMappingFailure {
                cpu: 1,
                base: ACC1_BASE
            })
        );
        // The L2 writes already issued stay issued.
        assert_eq!(coordinator.platform().log().writes(L2_BASE).len(), 10);
        assert_eq!(coordinator.state().phase(1), Some(CorePhase::Cold));
        assert_eq!(coordinator.state().pen().release(), INVALID_HWID);
    }

    #[test]
    fn unmappable_l2_issues_no_writes() {
        let coordinator = coordinator(TestPlatform::new().unmappable(L2_BASE));

        assert_eq!(
            coordinator.power_on_core(2),
            Err(CpuOpsError::AddressMappingFailure {
                cpu: 2,
                base: L2_BASE
            })
        );
        assert!(coordinator.platform().log().accesses().is_empty());
    }

    #[test]
    fn wake_requires_power_on() {
        let coordinator = coordinator(TestPlatform::new());

        assert_eq!(
            coordinator.request_wake(2),
            Err(CpuOpsError::NotPoweredOn(2))
        );
        assert_eq!(coordinator.state().phase(2), Some(CorePhase::Cold));
        assert_eq!(coordinator.state().pen().release(), INVALID_HWID);
    }

    #[test]
    fn out_of_range_core() {
        let coordinator = coordinator(TestPlatform::new());

        assert_eq!(coordinator.cpu_boot(4), Err(CpuOpsError::InvalidCore(4)));
        assert_eq!(coordinator.power_on_core(7), Err(CpuOpsError::InvalidCore(7)));
        assert_eq!(coordinator.request_wake(4), Err(CpuOpsError::InvalidCore(4)));
        assert_eq!(coordinator.cpu_prepare(4), Err(CpuOpsError::InvalidCore(4)));
        assert_eq!(coordinator.state().phase(4), None);
        assert!(!coordinator.state().cold_boot_done(4));
    }

    #[test]
    fn pen_cleared_by_another_core_counts_as_arrival() {
        // A core which timed out earlier can turn up during a later wake and clear the pen. The
        // boot core can't tell that apart from the core it is waiting for.
        let coordinator = coordinator(TestPlatform::new());
        coordinator.power_on_core(2).unwrap();

        let state = coordinator.state();
        coordinator.platform().timer().set_hook(move |_| {
            if state.pen().release() != INVALID_HWID {
                state.pen().publish(INVALID_HWID);
            }
        });

        assert_eq!(coordinator.request_wake(2), Ok(()));
        assert_eq!(state.phase(2), Some(CorePhase::Online));
    }
}
