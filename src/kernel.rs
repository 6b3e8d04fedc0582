//! Kernel-side external collaborators.
//!
//! The dispatch core runs in interrupt context and must not block, so
//! everything it asks of the surrounding kernel is a non-suspending
//! callback or a non-blocking signal.

/// A schedulable wake primitive bound to one SPI line.
///
/// Semantically a counting semaphore: [`Wakeup::up`] makes one waiting
/// kernel thread runnable (or banks the count if none waits). It is
/// called from interrupt context and must never block or suspend.
pub trait Wakeup {
    /// Signal one occurrence of the line.
    fn up(&self);
}

/// Scheduler, timer and SMMU callbacks consumed by the dispatch core.
///
/// All callbacks run in interrupt context on the core that took the
/// exception; they must complete without yielding.
pub trait Kernel {
    /// Wake primitive type owned by each SPI line record.
    type Wakeup: Wakeup;

    /// Create the wake primitive for one SPI line. Called exactly once
    /// per line, at core construction, before any SPI can be serviced.
    fn wakeup_for(&self, spi: u32) -> Self::Wakeup;

    /// Process this core's cross-core request queue (RRQ SGI).
    fn rrq_handler(&self);

    /// Host timer interrupt callback.
    fn timer_interrupt(&self);

    /// SMMU event interrupt callback.
    fn smmu_interrupt(&self);
}
