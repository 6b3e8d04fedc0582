//! Per-SPI line state table.
//!
//! One record per shared peripheral interrupt line, holding the line's
//! routing state and the one-bit deactivation latch for the two-phase
//! completion protocol. The table is fixed-size, indexed by SPI number,
//! and built exactly once when the dispatch core is constructed.
//!
//! No table-wide lock exists. Controller hardware delivers a given line
//! to at most one core at a time, so each record sees at most one handler
//! invocation in flight; the individual fields are atomics so that the
//! deactivation caller and a reconfiguring core see consistent values.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::gic::{CpuId, SPI_NUM};

/// Snapshot of one line's routing and completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    /// Core the line is currently routed to.
    pub affinity_cpu: CpuId,
    /// True if the line is passed through to a virtual machine.
    pub guest_owned: bool,
    /// True between a guest-owned line's priority drop and its
    /// deactivation by the guest's completion signal.
    pub deactivation_pending: bool,
}

/// State record for one SPI line.
pub struct Line<W> {
    /// Wake primitive for the kernel thread servicing this line.
    /// Created at table construction, owned for the table's lifetime.
    wakeup: W,
    /// Core this line is routed to. Written only by configuration.
    cpu: AtomicU16,
    /// Pass-through ownership flag. Written only by configuration.
    guest: AtomicBool,
    /// One-bit deactivation latch: set by the handler when priority is
    /// dropped for a guest-owned line, cleared by the deactivation call.
    pending: AtomicBool,
}

impl<W> Line<W> {
    fn new(wakeup: W) -> Self {
        Self {
            wakeup,
            cpu: AtomicU16::new(0),
            guest: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        }
    }

    /// The line's wake primitive.
    pub fn wakeup(&self) -> &W {
        &self.wakeup
    }

    /// Update routing. Only valid while the line is masked; reconfiguring
    /// a line with an acknowledge in flight races the old core's handler.
    pub fn set_route(&self, cpu: CpuId, guest_owned: bool) {
        self.cpu.store(cpu, Ordering::Relaxed);
        self.guest.store(guest_owned, Ordering::Release);
    }

    /// Current pass-through ownership.
    pub fn guest_owned(&self) -> bool {
        self.guest.load(Ordering::Acquire)
    }

    /// Latch a pending deactivation after a guest-owned priority drop.
    pub fn set_pending(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Atomically consume the pending latch. Returns true exactly once
    /// per latched cycle; a second call is a detectable no-op.
    pub fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Snapshot the record for diagnostics and setup code.
    pub fn state(&self) -> LineState {
        LineState {
            affinity_cpu: self.cpu.load(Ordering::Relaxed),
            guest_owned: self.guest.load(Ordering::Acquire),
            deactivation_pending: self.pending.load(Ordering::Acquire),
        }
    }
}

/// Fixed-size table of SPI line records, indexed by SPI number.
pub struct LineTable<W> {
    lines: [Line<W>; SPI_NUM as usize],
}

impl<W> LineTable<W> {
    /// Build the table, creating one wake primitive per line.
    pub fn new(mut wakeup_for: impl FnMut(u32) -> W) -> Self {
        Self {
            lines: core::array::from_fn(|i| Line::new(wakeup_for(i as u32))),
        }
    }

    /// The record for one SPI line. Out-of-range indices indicate a
    /// controller or configuration inconsistency and are fatal.
    pub fn line(&self, spi: u32) -> &Line<W> {
        assert!(spi < SPI_NUM, "spi {spi} out of range");
        &self.lines[spi as usize]
    }
}
