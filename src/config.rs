//! Platform interrupt assignments.

/// PPI index of the EL2 physical timer (host timer, intid 26).
pub const HTIMER_PPI: u32 = 10;

/// PPI index of the EL1 virtual timer (intid 27).
pub const VTIMER_PPI: u32 = 11;

/// SPI index reserved for the SMMU event queue. Always kernel-owned and
/// never entered in the line table.
pub const SMMU_SPI: u32 = 74;
