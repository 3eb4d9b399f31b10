//! RCU registers used for peripheral clock gating and reset

use super::Reg;

/// RCU register block, up to the APB1 enable register
#[repr(C)]
pub struct RegisterBlock {
    /// 0x00 - Control register 0
    pub ctl0: Reg,
    /// 0x04 - Clock configuration register 0
    pub cfg0: Reg,
    /// 0x08 - Clock interrupt register
    pub int: Reg,
    /// 0x0C - APB2 reset register
    pub apb2rst: Reg,
    /// 0x10 - APB1 reset register
    pub apb1rst: Reg,
    /// 0x14 - AHB enable register
    pub ahben: Reg,
    /// 0x18 - APB2 enable register
    pub apb2en: Reg,
    /// 0x1C - APB1 enable register
    pub apb1en: Reg,
}

// APB2EN / APB2RST
pub const APB2_USART0: u32 = 1 << 14;
pub const APB2_SPI0: u32 = 1 << 12;
pub const APB2_ADC: u32 = 1 << 9;

// APB1EN / APB1RST
pub const APB1_USART1: u32 = 1 << 17;
pub const APB1_SPI2: u32 = 1 << 15;
pub const APB1_SPI1: u32 = 1 << 14;
