//! Reset and clock unit
//!
//! Only peripheral clock gating and reset are handled here. The clock tree itself is
//! left as configured by the application; [`Clocks`] records the frequencies it runs at.

use crate::pac::{rcu, Reg, RCU};
use crate::time::Hertz;

/// Extension trait that constrains the `RCU` peripheral
pub trait RcuExt {
    /// Constrains the `RCU` peripheral so it plays nicely with the other abstractions,
    /// assuming the clock tree is still in its reset state
    fn constrain(self) -> Rcu;

    /// Constrains the `RCU` peripheral for a clock tree that runs at `clocks`
    fn constrain_with(self, clocks: Clocks) -> Rcu;
}

impl RcuExt for RCU {
    fn constrain(self) -> Rcu {
        self.constrain_with(Clocks::default())
    }

    fn constrain_with(self, clocks: Clocks) -> Rcu {
        Rcu {
            apb1: APB1 { _0: () },
            apb2: APB2 { _0: () },
            clocks,
            _regs: self,
        }
    }
}

/// Constrained RCU peripheral
pub struct Rcu {
    /// Advanced Peripheral Bus 1 (APB1) registers
    pub apb1: APB1,
    /// Advanced Peripheral Bus 2 (APB2) registers
    pub apb2: APB2,
    /// Frozen clock frequencies
    pub clocks: Clocks,
    _regs: RCU,
}

/// Advanced Peripheral Bus 1 (APB1) registers
pub struct APB1 {
    _0: (),
}

impl APB1 {
    pub(crate) fn en(&mut self) -> &Reg {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCU::ptr()).apb1en }
    }

    pub(crate) fn rstr(&mut self) -> &Reg {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCU::ptr()).apb1rst }
    }
}

/// Advanced Peripheral Bus 2 (APB2) registers
pub struct APB2 {
    _0: (),
}

impl APB2 {
    pub(crate) fn en(&mut self) -> &Reg {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCU::ptr()).apb2en }
    }

    pub(crate) fn rstr(&mut self) -> &Reg {
        // NOTE(unsafe) this proxy grants exclusive access to this register
        unsafe { &(*RCU::ptr()).apb2rst }
    }
}

/// Frozen clock frequencies
///
/// The existence of this value indicates that the clock configuration can no longer be changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    sysclk: Hertz,
    pclk1: Hertz,
    pclk2: Hertz,
    adcclk: Hertz,
}

impl Default for Clocks {
    /// The reset state: IRC8M on every bus, ADC clock at PCLK2 / 2
    fn default() -> Self {
        Clocks {
            sysclk: Hertz(8_000_000),
            pclk1: Hertz(8_000_000),
            pclk2: Hertz(8_000_000),
            adcclk: Hertz(4_000_000),
        }
    }
}

impl Clocks {
    /// Describes a clock tree configured by the application
    pub const fn new(sysclk: Hertz, pclk1: Hertz, pclk2: Hertz, adcclk: Hertz) -> Self {
        Clocks {
            sysclk,
            pclk1,
            pclk2,
            adcclk,
        }
    }

    /// Returns the system (core) frequency
    pub fn sysclk(&self) -> Hertz {
        self.sysclk
    }

    /// Returns the frequency of the APB1 bus
    pub fn pclk1(&self) -> Hertz {
        self.pclk1
    }

    /// Returns the frequency of the APB2 bus
    pub fn pclk2(&self) -> Hertz {
        self.pclk2
    }

    /// Returns the frequency of the ADC clock
    pub fn adcclk(&self) -> Hertz {
        self.adcclk
    }
}

/// Bus associated to peripheral
pub trait RcuBus {
    /// Bus type;
    type Bus;
}

/// Enable/disable peripheral
pub(crate) trait Enable: RcuBus {
    fn enable(rcu: &mut Rcu);
    fn disable(rcu: &mut Rcu);
}

/// Reset peripheral
pub(crate) trait Reset: RcuBus {
    fn reset(rcu: &mut Rcu);
}

/// Frequency of the clock feeding a peripheral
pub(crate) trait BaseFrequency {
    fn base_frequency(rcu: &Rcu) -> Hertz;
}

macro_rules! bus {
    ($($(#[$meta:meta])* $PER:ident => ($apbX:ident, $bus:ident, $pclk:ident, $bit:path),)+) => {
        $(
            $(#[$meta])*
            impl RcuBus for crate::pac::$PER {
                type Bus = $apbX;
            }
            $(#[$meta])*
            impl Enable for crate::pac::$PER {
                #[inline(always)]
                fn enable(rcu: &mut Rcu) {
                    rcu.$bus.en().set_bits($bit);
                }
                #[inline(always)]
                fn disable(rcu: &mut Rcu) {
                    rcu.$bus.en().clear_bits($bit);
                }
            }
            $(#[$meta])*
            impl Reset for crate::pac::$PER {
                #[inline(always)]
                fn reset(rcu: &mut Rcu) {
                    rcu.$bus.rstr().set_bits($bit);
                    rcu.$bus.rstr().clear_bits($bit);
                }
            }
            $(#[$meta])*
            impl BaseFrequency for crate::pac::$PER {
                #[inline(always)]
                fn base_frequency(rcu: &Rcu) -> Hertz {
                    rcu.clocks.$pclk()
                }
            }
        )+
    }
}

bus! {
    ADC => (APB2, apb2, adcclk, rcu::APB2_ADC),
    SPI0 => (APB2, apb2, pclk2, rcu::APB2_SPI0),
    SPI1 => (APB1, apb1, pclk1, rcu::APB1_SPI1),
    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    SPI2 => (APB1, apb1, pclk1, rcu::APB1_SPI2),
    USART0 => (APB2, apb2, pclk2, rcu::APB2_USART0),
    USART1 => (APB1, apb1, pclk1, rcu::APB1_USART1),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::U32Ext;

    #[test]
    fn reset_clocks_run_from_irc8m() {
        let clocks = Clocks::default();
        assert_eq!(clocks.sysclk(), 8_000_000.hz());
        assert_eq!(clocks.pclk1(), 8_000_000.hz());
        assert_eq!(clocks.pclk2(), 8_000_000.hz());
        assert_eq!(clocks.adcclk(), 4_000_000.hz());
    }

    #[test]
    fn custom_clock_tree() {
        let clocks = Clocks::new(72_000_000.hz(), 36_000_000.hz(), 72_000_000.hz(), 12_000_000.hz());
        assert_eq!(clocks.pclk1(), 36_000_000.hz());
        assert_eq!(clocks.adcclk(), 12_000_000.hz());
    }
}
