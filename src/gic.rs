//! Controller-facing surface of the dispatch core.
//!
//! Defines the GIC interrupt identifier space, the interrupt class
//! partition, and the capability traits through which the dispatch core
//! drives the external GIC drivers. Register layout and version-specific
//! access mechanics live entirely behind these traits.
//!
//! Reference: ARM IHI 0048B (GIC architecture specification)

/// GIC version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GicVersion {
    /// GICv1
    V1,
    /// GICv2
    V2,
    /// GICv3
    V3,
    /// GICv4
    V4,
}

impl GicVersion {
    /// True for generations that configure banked (per-core) interrupts
    /// through the redistributor instead of the distributor.
    pub fn uses_redistributor(self) -> bool {
        matches!(self, Self::V3 | Self::V4)
    }
}

/// Identifier of a physical processing core.
pub type CpuId = u16;

/// Low 10 bits of an acknowledge value carry the interrupt number.
pub const INTID_MASK: u32 = 0x3ff;

/// First SGI interrupt number
pub const SGI_BASE: u32 = 0;
/// Number of SGI lines (0-15)
pub const SGI_NUM: u32 = 16;
/// First PPI interrupt number
pub const PPI_BASE: u32 = 16;
/// Number of PPI lines (16-31)
pub const PPI_NUM: u32 = 16;
/// First SPI interrupt number
pub const SPI_BASE: u32 = 32;
/// Number of SPI lines (32-1019)
pub const SPI_NUM: u32 = 988;
/// First reserved interrupt number; acknowledge values at or above this
/// (including the 1023 spurious indication) carry no serviceable line.
pub const RSV_BASE: u32 = 1020;

/// Interrupt class of a physical interrupt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntClass {
    /// Software Generated Interrupt (0-15)
    Sgi,
    /// Private Peripheral Interrupt (16-31)
    Ppi,
    /// Shared Peripheral Interrupt (32-1019)
    Spi,
    /// Reserved range (1020+), including the spurious indication
    Reserved,
}

impl IntClass {
    /// Classify an interrupt number by its numeric range.
    pub fn from_intid(intid: u32) -> Self {
        if intid < PPI_BASE {
            Self::Sgi
        } else if intid < SPI_BASE {
            Self::Ppi
        } else if intid < RSV_BASE {
            Self::Spi
        } else {
            Self::Reserved
        }
    }
}

/// Software-generated interrupt purposes.
///
/// Purely a dispatch key: one core raises an SGI of a given purpose at
/// another core, whose handler acts on the purpose and retires the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sgi {
    /// Remote request queue needs processing
    Rrq = 0,
    /// Remote kick: wake the target core out of any wait state
    Rke = 1,
}

impl Sgi {
    /// Map an SGI index to its purpose, if one is assigned.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Rrq),
            1 => Some(Self::Rke),
            _ => None,
        }
    }
}

/// GIC CPU interface capability.
///
/// The acknowledge/EOI/deactivate triple implements the two-phase
/// completion protocol: `ack` raises the running priority, `eoi` drops it
/// again without letting the same line re-assert, and `deactivate` fully
/// retires the line.
pub trait CpuInterface {
    /// Read the acknowledge register: returns the raw value whose low 10
    /// bits are the interrupt number of the highest-priority pending
    /// interrupt, and raises the running priority.
    fn ack(&self) -> u32;

    /// Signal end-of-interrupt (priority drop) for a raw acknowledge value.
    fn eoi(&self, raw: u32);

    /// Directly deactivate an interrupt line, permitting it to re-assert.
    fn deactivate(&self, intid: u32);

    /// Send an SGI to a core via the CPU interface (GICv3+ only).
    fn send_sgi(&self, sgi: Sgi, cpu: CpuId);
}

/// GIC distributor capability.
pub trait Distributor {
    /// Detected controller generation. Read once at core construction.
    fn version(&self) -> GicVersion;

    /// Configure trigger mode and, for SPIs, target core affinity.
    fn configure(&self, intid: u32, edge_triggered: bool, target: Option<CpuId>);

    /// Mask or unmask an interrupt line.
    fn mask(&self, intid: u32, masked: bool);

    /// Send an SGI to a core via the distributor (pre-GICv3 only).
    fn send_sgi(&self, sgi: Sgi, cpu: CpuId);
}

/// GICv3+ redistributor capability: banked (per-core) SGI/PPI
/// configuration and masking.
pub trait Redistributor {
    /// Configure trigger mode of a banked interrupt on this core.
    fn configure(&self, intid: u32, edge_triggered: bool);

    /// Mask or unmask a banked interrupt on this core.
    fn mask(&self, intid: u32, masked: bool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, IntClass::Sgi; "sgi first")]
    #[test_case(15, IntClass::Sgi; "sgi last")]
    #[test_case(16, IntClass::Ppi; "ppi first")]
    #[test_case(31, IntClass::Ppi; "ppi last")]
    #[test_case(32, IntClass::Spi; "spi first")]
    #[test_case(1019, IntClass::Spi; "spi last")]
    #[test_case(1020, IntClass::Reserved; "reserved first")]
    #[test_case(1023, IntClass::Reserved; "spurious")]
    fn test_intclass_ranges(intid: u32, expected: IntClass) {
        assert_eq!(IntClass::from_intid(intid), expected);
    }

    #[test]
    fn test_ranges_partition_identifier_space() {
        assert_eq!(SGI_BASE + SGI_NUM, PPI_BASE);
        assert_eq!(PPI_BASE + PPI_NUM, SPI_BASE);
        assert_eq!(SPI_BASE + SPI_NUM, RSV_BASE);
    }

    #[test]
    fn test_sgi_purposes() {
        assert_eq!(Sgi::from_index(0), Some(Sgi::Rrq));
        assert_eq!(Sgi::from_index(1), Some(Sgi::Rke));
        assert_eq!(Sgi::from_index(2), None);
        assert_eq!(Sgi::from_index(15), None);
    }

    #[test]
    fn test_gic_version_routing() {
        assert!(!GicVersion::V1.uses_redistributor());
        assert!(!GicVersion::V2.uses_redistributor());
        assert!(GicVersion::V3.uses_redistributor());
        assert!(GicVersion::V4.uses_redistributor());
    }
}
