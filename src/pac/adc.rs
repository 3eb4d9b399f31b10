//! ADC registers and bitfields

use super::Reg;

/// ADC register block
#[repr(C)]
pub struct RegisterBlock {
    /// 0x00 - Status register
    pub stat: Reg,
    /// 0x04 - Control register 0
    pub ctl0: Reg,
    /// 0x08 - Control register 1
    pub ctl1: Reg,
    /// 0x0C - Sampling time register 0 (channels 10..=18)
    pub sampt0: Reg,
    /// 0x10 - Sampling time register 1 (channels 0..=9)
    pub sampt1: Reg,
    /// 0x14 - Inserted channel data offset register 0
    pub ioff0: Reg,
    /// 0x18 - Inserted channel data offset register 1
    pub ioff1: Reg,
    /// 0x1C - Inserted channel data offset register 2
    pub ioff2: Reg,
    /// 0x20 - Inserted channel data offset register 3
    pub ioff3: Reg,
    /// 0x24 - Watchdog high threshold register
    pub wdht: Reg,
    /// 0x28 - Watchdog low threshold register
    pub wdlt: Reg,
    /// 0x2C - Regular sequence register 0
    pub rsq0: Reg,
    /// 0x30 - Regular sequence register 1
    pub rsq1: Reg,
    /// 0x34 - Regular sequence register 2
    pub rsq2: Reg,
    /// 0x38 - Inserted sequence register
    pub isq: Reg,
    /// 0x3C - Inserted data register 0
    pub idata0: Reg,
    /// 0x40 - Inserted data register 1
    pub idata1: Reg,
    /// 0x44 - Inserted data register 2
    pub idata2: Reg,
    /// 0x48 - Inserted data register 3
    pub idata3: Reg,
    /// 0x4C - Regular data register
    pub rdata: Reg,
    _reserved0: [Reg; 12],
    /// 0x80 - Oversampling control register (GD32F170/GD32F190 only)
    pub ovsampctl: Reg,
}

// STAT
/// Start flag of regular channel group
pub const STAT_STRC: u32 = 1 << 4;
/// Start flag of inserted channel group
pub const STAT_STIC: u32 = 1 << 3;
/// End of inserted group conversion flag
pub const STAT_EOIC: u32 = 1 << 2;
/// End of group conversion flag
pub const STAT_EOC: u32 = 1 << 1;
/// Analog watchdog event flag
pub const STAT_WDE: u32 = 1 << 0;
/// Every flag in STAT
pub const STAT_MASK: u32 = 0x1F;

// CTL0
/// Regular channel analog watchdog enable
pub const CTL0_RWDEN: u32 = 1 << 23;
/// Inserted channel analog watchdog enable
pub const CTL0_IWDEN: u32 = 1 << 22;
pub const CTL0_DISNUM_SHIFT: u32 = 13;
/// Number of conversions in discontinuous mode, minus one
pub const CTL0_DISNUM: u32 = 0x07 << CTL0_DISNUM_SHIFT;
/// Discontinuous mode on inserted channels
pub const CTL0_DISIC: u32 = 1 << 12;
/// Discontinuous mode on regular channels
pub const CTL0_DISRC: u32 = 1 << 11;
/// Inserted channel group convert automatically
pub const CTL0_ICA: u32 = 1 << 10;
/// Analog watchdog on a single channel when in scan mode
pub const CTL0_WDSC: u32 = 1 << 9;
/// Scan mode
pub const CTL0_SM: u32 = 1 << 8;
/// Interrupt enable for EOIC
pub const CTL0_EOICIE: u32 = 1 << 7;
/// Interrupt enable for WDE
pub const CTL0_WDEIE: u32 = 1 << 6;
/// Interrupt enable for EOC
pub const CTL0_EOCIE: u32 = 1 << 5;
pub const CTL0_WDCHSEL_SHIFT: u32 = 0;
/// Analog watchdog channel select
pub const CTL0_WDCHSEL: u32 = 0x3F << CTL0_WDCHSEL_SHIFT;

// CTL1
/// Enable the VBAT channel
pub const CTL1_VBATEN: u32 = 1 << 24;
/// Enable the temperature sensor and Vrefint channels (16 and 17)
pub const CTL1_TSVREN: u32 = 1 << 23;
/// Software start on regular channels
pub const CTL1_SWRCST: u32 = 1 << 22;
/// Software start on inserted channels
pub const CTL1_SWICST: u32 = 1 << 21;
/// External trigger enable for regular channels
pub const CTL1_ETERC: u32 = 1 << 20;
pub const CTL1_ETSRC_SHIFT: u32 = 17;
/// External trigger select for regular channels
pub const CTL1_ETSRC: u32 = 0x07 << CTL1_ETSRC_SHIFT;
/// External trigger enable for inserted channels
pub const CTL1_ETEIC: u32 = 1 << 15;
pub const CTL1_ETSIC_SHIFT: u32 = 12;
/// External trigger select for inserted channels
pub const CTL1_ETSIC: u32 = 0x07 << CTL1_ETSIC_SHIFT;
/// Data alignment (set: left)
pub const CTL1_DAL: u32 = 1 << 11;
/// DMA request enable
pub const CTL1_DMA: u32 = 1 << 8;
/// Reset calibration
pub const CTL1_RSTCLB: u32 = 1 << 3;
/// Calibration
pub const CTL1_CLB: u32 = 1 << 2;
/// Continuous mode
pub const CTL1_CTN: u32 = 1 << 1;
/// ADC on. Zero to one wakes the ADC, one to one starts a conversion.
pub const CTL1_ADCON: u32 = 1 << 0;

// SAMPT0 / SAMPT1
/// Width of one sample time field
pub const SAMPT_WIDTH: u32 = 3;
pub const SAMPT_MASK: u32 = 0x07;
/// First channel held in SAMPT0
pub const SAMPT0_FIRST_CHANNEL: u8 = 10;

// IOFF / WDHT / WDLT
pub const IOFF_MASK: u32 = 0x0FFF;
pub const WDHT_MASK: u32 = 0x0FFF;
pub const WDLT_MASK: u32 = 0x0FFF;

// RSQ0..RSQ2
pub const RSQ0_RL_SHIFT: u32 = 20;
/// Regular channel group length, minus one
pub const RSQ0_RL: u32 = 0x0F << RSQ0_RL_SHIFT;
/// Width of one sequence slot
pub const SQ_WIDTH: u32 = 5;
pub const SQ_MASK: u32 = 0x1F;
/// Number of regular sequence slots held in one register
pub const RSQ_SLOTS_PER_REGISTER: usize = 6;
/// Every slot bit of RSQ0 (ranks 12..=15)
pub const RSQ0_SLOTS: u32 = 0x000F_FFFF;
/// Every slot bit of RSQ1 and RSQ2
pub const RSQ_SLOTS: u32 = 0x3FFF_FFFF;

// ISQ
pub const ISQ_IL_SHIFT: u32 = 20;
/// Inserted channel group length, minus one
pub const ISQ_IL: u32 = 0x03 << ISQ_IL_SHIFT;
/// Every slot bit of ISQ
pub const ISQ_SLOTS: u32 = 0x000F_FFFF;

// IDATA / RDATA
pub const DATA_MASK: u32 = 0xFFFF;

// OVSAMPCTL
/// Triggered oversampling
pub const OVSAMPCTL_TOVS: u32 = 1 << 9;
pub const OVSAMPCTL_OVSS_SHIFT: u32 = 5;
/// Oversampling shift
pub const OVSAMPCTL_OVSS: u32 = 0x0F << OVSAMPCTL_OVSS_SHIFT;
pub const OVSAMPCTL_OVSR_SHIFT: u32 = 2;
/// Oversampling ratio
pub const OVSAMPCTL_OVSR: u32 = 0x07 << OVSAMPCTL_OVSR_SHIFT;
/// Oversampling enable
pub const OVSAMPCTL_OVSEN: u32 = 1 << 0;

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn offsets_match_the_reference_manual() {
        let rb: RegisterBlock = unsafe { core::mem::zeroed() };
        let base = &rb as *const _ as usize;
        let offset = |reg: &Reg| reg as *const _ as usize - base;

        assert_eq!(offset(&rb.sampt0), 0x0C);
        assert_eq!(offset(&rb.wdht), 0x24);
        assert_eq!(offset(&rb.rsq0), 0x2C);
        assert_eq!(offset(&rb.isq), 0x38);
        assert_eq!(offset(&rb.idata0), 0x3C);
        assert_eq!(offset(&rb.rdata), 0x4C);
        assert_eq!(offset(&rb.ovsampctl), 0x80);
        assert_eq!(size_of::<RegisterBlock>(), 0x84);
    }
}
