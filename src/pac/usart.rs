//! USART registers and bitfields

use super::Reg;

/// USART register block
#[repr(C)]
pub struct RegisterBlock {
    /// 0x00 - Control register 0
    pub ctl0: Reg,
    /// 0x04 - Control register 1
    pub ctl1: Reg,
    /// 0x08 - Control register 2
    pub ctl2: Reg,
    /// 0x0C - Baud rate generator register
    pub baud: Reg,
    /// 0x10 - Guard time and prescaler register
    pub gp: Reg,
    /// 0x14 - Receiver timeout register
    pub rt: Reg,
    /// 0x18 - Command register
    pub cmd: Reg,
    /// 0x1C - Status register
    pub stat: Reg,
    /// 0x20 - Interrupt status clear register
    pub intc: Reg,
    /// 0x24 - Receive data register
    pub rdata: Reg,
    /// 0x28 - Transmit data register
    pub tdata: Reg,
}

// CTL0
/// Oversample mode (set: by 8)
pub const CTL0_OVSMOD: u32 = 1 << 15;
/// Word length (set: 9 bits)
pub const CTL0_WL: u32 = 1 << 12;
/// Parity check function enable
pub const CTL0_PCEN: u32 = 1 << 10;
/// Parity mode (set: odd)
pub const CTL0_PM: u32 = 1 << 9;
/// Parity error interrupt enable
pub const CTL0_PERRIE: u32 = 1 << 8;
/// Transmitter buffer empty interrupt enable
pub const CTL0_TBEIE: u32 = 1 << 7;
/// Transmission complete interrupt enable
pub const CTL0_TCIE: u32 = 1 << 6;
/// Read data buffer not empty interrupt enable
pub const CTL0_RBNEIE: u32 = 1 << 5;
/// Idle line detected interrupt enable
pub const CTL0_IDLEIE: u32 = 1 << 4;
/// Transmitter enable
pub const CTL0_TEN: u32 = 1 << 3;
/// Receiver enable
pub const CTL0_REN: u32 = 1 << 2;
/// Enable USART in deep-sleep mode
pub const CTL0_UESM: u32 = 1 << 1;
/// USART enable
pub const CTL0_UEN: u32 = 1 << 0;

// CTL1
/// Most significant bit first
pub const CTL1_MSBF: u32 = 1 << 19;
pub const CTL1_STB_SHIFT: u32 = 12;
/// Stop bits length
pub const CTL1_STB: u32 = 0x03 << CTL1_STB_SHIFT;

// CTL2
/// Overrun disable
pub const CTL2_OVRD: u32 = 1 << 12;
/// CTS enable
pub const CTL2_CTSEN: u32 = 1 << 9;
/// RTS enable
pub const CTL2_RTSEN: u32 = 1 << 8;
/// DMA request enable for transmission
pub const CTL2_DENT: u32 = 1 << 7;
/// DMA request enable for reception
pub const CTL2_DENR: u32 = 1 << 6;
/// Error interrupt enable
pub const CTL2_ERRIE: u32 = 1 << 0;

pub const BAUD_MASK: u32 = 0xFFFF;

// CMD
/// Transmit data flush request
pub const CMD_TXFCMD: u32 = 1 << 4;
/// Receive data flush command
pub const CMD_RXFCMD: u32 = 1 << 3;
/// Send break command
pub const CMD_SBKCMD: u32 = 1 << 1;

// STAT
/// Receive enable acknowledge flag
pub const STAT_REA: u32 = 1 << 22;
/// Transmit enable acknowledge flag
pub const STAT_TEA: u32 = 1 << 21;
/// Busy flag
pub const STAT_BSY: u32 = 1 << 16;
/// Transmit data buffer empty
pub const STAT_TBE: u32 = 1 << 7;
/// Transmission complete
pub const STAT_TC: u32 = 1 << 6;
/// Read data buffer not empty
pub const STAT_RBNE: u32 = 1 << 5;
/// Idle line detected flag
pub const STAT_IDLEF: u32 = 1 << 4;
/// Overrun error
pub const STAT_ORERR: u32 = 1 << 3;
/// Noise error flag
pub const STAT_NERR: u32 = 1 << 2;
/// Frame error flag
pub const STAT_FERR: u32 = 1 << 1;
/// Parity error flag
pub const STAT_PERR: u32 = 1 << 0;

// INTC
/// Transmission complete clear
pub const INTC_TCC: u32 = 1 << 6;
/// Idle line detected clear
pub const INTC_IDLEC: u32 = 1 << 4;
/// Overrun error clear
pub const INTC_OREC: u32 = 1 << 3;
/// Noise detected clear
pub const INTC_NEC: u32 = 1 << 2;
/// Frame error flag clear
pub const INTC_FEC: u32 = 1 << 1;
/// Parity error clear
pub const INTC_PEC: u32 = 1 << 0;

pub const DATA_MASK: u32 = 0x01FF;

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn offsets_match_the_reference_manual() {
        let rb: RegisterBlock = unsafe { core::mem::zeroed() };
        let base = &rb as *const _ as usize;
        let offset = |reg: &Reg| reg as *const _ as usize - base;

        assert_eq!(offset(&rb.baud), 0x0C);
        assert_eq!(offset(&rb.stat), 0x1C);
        assert_eq!(offset(&rb.intc), 0x20);
        assert_eq!(offset(&rb.tdata), 0x28);
        assert_eq!(size_of::<RegisterBlock>(), 0x2C);
    }
}
