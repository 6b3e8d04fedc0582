//! irqvisor - Interrupt dispatch core for a Type-1 hypervisor
//!
//! This crate multiplexes physical GIC interrupts among the hypervisor
//! itself, its schedulable threads, and the virtual machines it hosts.
//! On every interrupt exception the trap path calls [`IrqCore::handle`],
//! which acknowledges the pending interrupt, classifies it (SGI, PPI or
//! SPI), runs the minimal safe action for that class, and returns an
//! [`Event`] telling the caller whether the virtualization layer must be
//! notified.
//!
//! Guest-owned SPIs use a two-phase completion protocol: the handler drops
//! priority (EOI) immediately but defers direct deactivation until the
//! guest signals completion via [`IrqCore::deactivate_spi`], so a
//! passed-through device cannot re-assert while the guest has not yet
//! serviced it.
//!
//! The GIC distributor/redistributor/CPU-interface drivers, the scheduler,
//! the timer, and the SMMU are external collaborators consumed through the
//! capability traits in [`gic`] and [`kernel`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod event;
pub mod gic;
pub mod interrupt;
pub mod kernel;

// Re-export key types for convenience
pub use event::Event;
pub use gic::{CpuId, CpuInterface, Distributor, GicVersion, IntClass, Redistributor, Sgi};
pub use interrupt::table::LineState;
pub use interrupt::{IrqCore, IrqStats};
pub use kernel::{Kernel, Wakeup};

/// irqvisor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
