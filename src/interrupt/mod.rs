//! Interrupt dispatch core.
//!
//! [`IrqCore`] is the single object behind the kernel's interrupt
//! exception vector. On every exception it acknowledges the controller,
//! classifies the interrupt number and runs the class handler in
//! interrupt context, without blocking or yielding. It also carries the
//! setup-time configuration surface and the deferred-deactivation entry
//! point used by the virtualization layer for pass-through lines.
//!
//! Construction is the one-time initialization: `IrqCore::new` builds
//! the SPI line table (one wake primitive per line) and detects the
//! controller generation, so an `IrqCore` that exists is ready to
//! dispatch. The kernel must construct it before unmasking any line.

pub mod table;

use spin::Mutex;

use crate::config::{HTIMER_PPI, SMMU_SPI, VTIMER_PPI};
use crate::event::Event;
use crate::gic::{
    CpuId, CpuInterface, Distributor, GicVersion, IntClass, Redistributor, Sgi, INTID_MASK,
    PPI_BASE, PPI_NUM, SGI_BASE, SGI_NUM, SPI_BASE, SPI_NUM,
};
use crate::kernel::{Kernel, Wakeup};

pub use table::{LineState, LineTable};

/// Configuration path for banked (per-core) interrupts, selected once at
/// construction from the detected controller generation.
///
/// Earlier generations configure SGIs and PPIs through the distributor
/// and send SGIs through it; with affinity routing both move to per-core
/// interfaces. SPI configuration stays on the distributor either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BankedRoute {
    /// Pre-affinity-routing: distributor-wide configuration and send.
    Distributor,
    /// Affinity routing: redistributor configuration, CPU interface send.
    Redistributor,
}

impl BankedRoute {
    fn from_version(version: GicVersion) -> Self {
        if version.uses_redistributor() {
            Self::Redistributor
        } else {
            Self::Distributor
        }
    }
}

/// Per-class interrupt counters, plus spurious acknowledges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IrqStats {
    /// Software-generated interrupts handled
    pub sgi: u64,
    /// Private peripheral interrupts handled
    pub ppi: u64,
    /// Shared peripheral interrupts handled
    pub spi: u64,
    /// Acknowledge values in the reserved range (incl. 1023 spurious)
    pub spurious: u64,
}

/// The interrupt dispatch core.
///
/// Owns the SPI line table and drives the external controller drivers
/// and kernel callbacks through their capability traits. One instance
/// exists per system; `handle` is invoked per-core from trap entry and
/// is reentrant across cores.
pub struct IrqCore<C, D, R, K>
where
    C: CpuInterface,
    D: Distributor,
    R: Redistributor,
    K: Kernel,
{
    gicc: C,
    gicd: D,
    gicr: R,
    kernel: K,
    route: BankedRoute,
    table: LineTable<K::Wakeup>,
    stats: Mutex<IrqStats>,
}

impl<C, D, R, K> IrqCore<C, D, R, K>
where
    C: CpuInterface,
    D: Distributor,
    R: Redistributor,
    K: Kernel,
{
    /// Build the dispatch core: detect the controller generation, pick
    /// the banked configuration route, and create the line table with
    /// one wake primitive per SPI line.
    ///
    /// Must run once, at boot, before any interrupt line is unmasked.
    pub fn new(gicc: C, gicd: D, gicr: R, kernel: K) -> Self {
        let version = gicd.version();
        let route = BankedRoute::from_version(version);
        let table = LineTable::new(|spi| kernel.wakeup_for(spi));

        log::debug!(
            "irq core up: {:?}, banked route {:?}, {} spi lines",
            version,
            route,
            SPI_NUM
        );

        Self {
            gicc,
            gicd,
            gicr,
            kernel,
            route,
            table,
            stats: Mutex::new(IrqStats::default()),
        }
    }

    /// Handle one interrupt exception.
    ///
    /// Acknowledges the controller, dispatches on the interrupt class
    /// and returns what, if anything, the virtualization layer must
    /// additionally be told. `vcpu` indicates whether the interrupted
    /// context is a virtual CPU.
    ///
    /// A non-[`Event::None`] return means end-of-interrupt has been
    /// signaled but direct deactivation has not; the caller chain owns
    /// completing the line as part of guest injection.
    pub fn handle(&self, vcpu: bool) -> Event {
        let raw = self.gicc.ack();
        let intid = raw & INTID_MASK;

        match IntClass::from_intid(intid) {
            IntClass::Sgi => self.handle_sgi(raw, intid),
            IntClass::Ppi => self.handle_ppi(raw, intid, vcpu),
            IntClass::Spi => self.handle_spi(raw, intid),
            // No line ownership is known for the reserved range; the
            // 1023 spurious value lands here. No controller action.
            IntClass::Reserved => {
                self.stats.lock().spurious += 1;
                Event::None
            }
        }
    }

    fn handle_sgi(&self, raw: u32, intid: u32) -> Event {
        let sgi = intid - SGI_BASE;
        assert!(sgi < SGI_NUM, "sgi {sgi} out of range");

        match Sgi::from_index(sgi) {
            Some(Sgi::Rrq) => self.kernel.rrq_handler(),
            // A remote kick's entire effect is taking the exception;
            // unassigned indices likewise need no action.
            Some(Sgi::Rke) | None => {}
        }

        // SGIs are never guest-owned: retire immediately.
        self.gicc.eoi(raw);
        self.gicc.deactivate(intid);

        self.stats.lock().sgi += 1;
        Event::None
    }

    fn handle_ppi(&self, raw: u32, intid: u32, vcpu: bool) -> Event {
        let ppi = intid - PPI_BASE;
        assert!(ppi < PPI_NUM, "ppi {ppi} out of range");

        if ppi == HTIMER_PPI {
            self.kernel.timer_interrupt();
        }

        let event = if ppi == VTIMER_PPI && vcpu {
            Event::VTimer
        } else {
            Event::None
        };

        self.gicc.eoi(raw);
        // A virtual-timer event hands the line to the virtualization
        // layer, which deactivates it when injecting into the guest.
        if !event.owes_deactivation() {
            self.gicc.deactivate(intid);
        }

        self.stats.lock().ppi += 1;
        event
    }

    fn handle_spi(&self, raw: u32, intid: u32) -> Event {
        let spi = intid - SPI_BASE;
        assert!(spi < SPI_NUM, "spi {spi} out of range");

        self.stats.lock().spi += 1;

        // The SMMU event line is always kernel-owned and bypasses the
        // line table.
        if spi == SMMU_SPI {
            self.kernel.smmu_interrupt();
            self.gicc.eoi(raw);
            self.gicc.deactivate(intid);
            return Event::None;
        }

        let line = self.table.line(spi);
        self.gicc.eoi(raw);

        if line.guest_owned() {
            // Priority has dropped, but the line stays inactive at the
            // controller until the guest finishes (deactivate_spi).
            line.set_pending();
        } else {
            self.gicc.deactivate(intid);
        }

        // Kernel-side accounting tracks every occurrence, guest-owned
        // or not.
        line.wakeup().up();

        Event::None
    }

    /// Configure an SGI line's mask state on this core.
    ///
    /// Setup-time only, not interrupt context.
    pub fn configure_sgi(&self, sgi: u32, masked: bool) {
        assert!(sgi < SGI_NUM, "sgi {sgi} out of range");
        log::trace!("conf sgi {sgi} masked={masked}");

        let intid = SGI_BASE + sgi;
        match self.route {
            BankedRoute::Distributor => {
                self.gicd.configure(intid, false, None);
                self.gicd.mask(intid, masked);
            }
            BankedRoute::Redistributor => {
                self.gicr.configure(intid, false);
                self.gicr.mask(intid, masked);
            }
        }
    }

    /// Configure a PPI line's trigger mode and mask state on this core.
    ///
    /// Setup-time only, not interrupt context.
    pub fn configure_ppi(&self, ppi: u32, masked: bool, edge_triggered: bool) {
        assert!(ppi < PPI_NUM, "ppi {ppi} out of range");
        log::trace!("conf ppi {ppi} masked={masked} edge={edge_triggered}");

        let intid = PPI_BASE + ppi;
        match self.route {
            BankedRoute::Distributor => {
                self.gicd.configure(intid, edge_triggered, None);
                self.gicd.mask(intid, masked);
            }
            BankedRoute::Redistributor => {
                self.gicr.configure(intid, edge_triggered);
                self.gicr.mask(intid, masked);
            }
        }
    }

    /// Configure an SPI line: routing and ownership in the line table,
    /// then trigger mode, affinity and mask state at the distributor.
    ///
    /// This is the only path that changes `guest_owned` or the affinity
    /// core. Callers must reconfigure only while the line is masked; a
    /// reconfiguration with an acknowledge in flight on the old core is
    /// a race this core does not guard against.
    pub fn configure_spi(
        &self,
        spi: u32,
        cpu: CpuId,
        masked: bool,
        edge_triggered: bool,
        guest_owned: bool,
    ) {
        assert!(spi < SPI_NUM, "spi {spi} out of range");
        log::trace!(
            "conf spi {spi} cpu={cpu} masked={masked} edge={edge_triggered} guest={guest_owned}"
        );

        self.table.line(spi).set_route(cpu, guest_owned);

        // SPI configuration is distributor business on every generation.
        let intid = SPI_BASE + spi;
        self.gicd.configure(intid, edge_triggered, Some(cpu));
        self.gicd.mask(intid, masked);
    }

    /// Send an SGI of the given purpose to a core. Fire-and-forget; the
    /// only delivery confirmation is the target core's handler running.
    pub fn send_sgi(&self, sgi: Sgi, cpu: CpuId) {
        match self.route {
            BankedRoute::Distributor => self.gicd.send_sgi(sgi, cpu),
            BankedRoute::Redistributor => self.gicc.send_sgi(sgi, cpu),
        }
    }

    /// Complete the two-phase protocol for a guest-owned SPI line, on
    /// the guest's completion signal: consume the pending latch and
    /// deactivate the line at the controller.
    ///
    /// A call with no pending deactivation is a no-op, so a stray second
    /// call after a single cycle deactivates only once.
    pub fn deactivate_spi(&self, spi: u32) {
        if self.table.line(spi).take_pending() {
            self.gicc.deactivate(SPI_BASE + spi);
        }
    }

    /// Snapshot one SPI line's routing and completion state.
    pub fn spi_state(&self, spi: u32) -> LineState {
        self.table.line(spi).state()
    }

    /// Snapshot the interrupt counters.
    pub fn stats(&self) -> IrqStats {
        *self.stats.lock()
    }

    /// The CPU interface driver.
    pub fn cpu_interface(&self) -> &C {
        &self.gicc
    }

    /// The distributor driver.
    pub fn distributor(&self) -> &D {
        &self.gicd
    }

    /// The redistributor driver.
    pub fn redistributor(&self) -> &R {
        &self.gicr
    }

    /// The kernel collaborator.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(GicVersion::V1, BankedRoute::Distributor; "v1 distributor")]
    #[test_case(GicVersion::V2, BankedRoute::Distributor; "v2 distributor")]
    #[test_case(GicVersion::V3, BankedRoute::Redistributor; "v3 redistributor")]
    #[test_case(GicVersion::V4, BankedRoute::Redistributor; "v4 redistributor")]
    fn test_banked_route_selection(version: GicVersion, expected: BankedRoute) {
        assert_eq!(BankedRoute::from_version(version), expected);
    }

    #[test]
    fn test_stats_start_zeroed() {
        let zero = IrqStats { sgi: 0, ppi: 0, spi: 0, spurious: 0 };
        assert_eq!(IrqStats::default(), zero);
    }
}
