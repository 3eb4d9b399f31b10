//! SPI registers and bitfields

use super::Reg;

/// SPI register block
#[repr(C)]
pub struct RegisterBlock {
    /// 0x00 - Control register 0
    pub ctl0: Reg,
    /// 0x04 - Control register 1
    pub ctl1: Reg,
    /// 0x08 - Status register
    pub stat: Reg,
    /// 0x0C - Data register
    pub data: Reg,
    /// 0x10 - CRC polynomial register
    pub crcpoly: Reg,
    /// 0x14 - Receive CRC register
    pub rcrc: Reg,
    /// 0x18 - Transmit CRC register
    pub tcrc: Reg,
    /// 0x1C - I2S control register
    pub i2sctl: Reg,
    /// 0x20 - I2S clock prescaler register
    pub i2spsc: Reg,
}

// CTL0
/// Bidirectional enable
pub const CTL0_BDEN: u32 = 1 << 15;
/// Bidirectional transmit output enable
pub const CTL0_BDOEN: u32 = 1 << 14;
/// CRC calculation enable
pub const CTL0_CRCEN: u32 = 1 << 13;
/// CRC next transfer
pub const CTL0_CRCNT: u32 = 1 << 12;
/// Data frame format (set: 16 bit)
pub const CTL0_FF16: u32 = 1 << 11;
/// Receive only
pub const CTL0_RO: u32 = 1 << 10;
/// NSS software mode
pub const CTL0_SWNSSEN: u32 = 1 << 9;
/// NSS pin level in software mode
pub const CTL0_SWNSS: u32 = 1 << 8;
/// LSB first
pub const CTL0_LF: u32 = 1 << 7;
/// SPI enable
pub const CTL0_SPIEN: u32 = 1 << 6;
pub const CTL0_PSC_SHIFT: u32 = 3;
/// Master clock prescaler
pub const CTL0_PSC: u32 = 0x07 << CTL0_PSC_SHIFT;
/// Master mode
pub const CTL0_MSTMOD: u32 = 1 << 2;
/// Clock polarity
pub const CTL0_CKPL: u32 = 1 << 1;
/// Clock phase
pub const CTL0_CKPH: u32 = 1 << 0;

// CTL1
/// Transmit buffer empty interrupt enable
pub const CTL1_TBEIE: u32 = 1 << 7;
/// Receive buffer not empty interrupt enable
pub const CTL1_RBNEIE: u32 = 1 << 6;
/// Error interrupt enable
pub const CTL1_ERRIE: u32 = 1 << 5;
/// SPI TI mode enable
pub const CTL1_TMOD: u32 = 1 << 4;
/// SPI NSS pulse mode enable
pub const CTL1_NSSP: u32 = 1 << 3;
/// NSS output drive enable
pub const CTL1_NSSDRV: u32 = 1 << 2;
/// Transmit buffer DMA enable
pub const CTL1_DMATEN: u32 = 1 << 1;
/// Receive buffer DMA enable
pub const CTL1_DMAREN: u32 = 1 << 0;

// STAT
/// Format error
pub const STAT_FERR: u32 = 1 << 8;
/// Transmitting ongoing
pub const STAT_TRANS: u32 = 1 << 7;
/// Reception overrun error
pub const STAT_RXORERR: u32 = 1 << 6;
/// Configuration (mode fault) error
pub const STAT_CONFERR: u32 = 1 << 5;
/// CRC error
pub const STAT_CRCERR: u32 = 1 << 4;
/// Transmission underrun error (I2S)
pub const STAT_TXURERR: u32 = 1 << 3;
/// I2S channel side
pub const STAT_I2SCH: u32 = 1 << 2;
/// Transmit buffer empty
pub const STAT_TBE: u32 = 1 << 1;
/// Receive buffer not empty
pub const STAT_RBNE: u32 = 1 << 0;

pub const DATA_MASK: u32 = 0xFFFF;
pub const CRCPOLY_MASK: u32 = 0xFFFF;

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn offsets_match_the_reference_manual() {
        let rb: RegisterBlock = unsafe { core::mem::zeroed() };
        let base = &rb as *const _ as usize;
        let offset = |reg: &Reg| reg as *const _ as usize - base;

        assert_eq!(offset(&rb.stat), 0x08);
        assert_eq!(offset(&rb.data), 0x0C);
        assert_eq!(offset(&rb.tcrc), 0x18);
        assert_eq!(size_of::<RegisterBlock>(), 0x24);
    }
}
