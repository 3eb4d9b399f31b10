//! Peripheral access for the GD32F1x0 ADC, SPI, USART and RCU blocks
//!
//! Register blocks are laid out with the same offsets as the hardware, so a
//! reference to one can be made from the base address in the memory map.
//! Drivers in this crate take any `Deref<Target = RegisterBlock>`, which is
//! what the zero-sized peripheral handles below provide.

use core::marker::PhantomData;
use core::ops::Deref;

use vcell::VolatileCell;

pub mod adc;
pub mod rcu;
pub mod spi;
pub mod usart;

/// Base addresses of the GD32F1x0 buses and peripherals
pub mod memory_map {
    /// Main flash
    pub const FLASH_BASE: u32 = 0x0800_0000;
    /// Start of the peripheral address space
    pub const PERIPH_BASE: u32 = 0x4000_0000;
    /// Information block (bootloader, option bytes, signature)
    pub const INFO_BASE: u32 = 0x1FFF_F000;

    pub const PERIPH_BASE_APB1: u32 = PERIPH_BASE;
    pub const PERIPH_BASE_APB2: u32 = PERIPH_BASE + 0x0001_0000;
    pub const PERIPH_BASE_AHB1: u32 = PERIPH_BASE + 0x0002_0000;
    pub const PERIPH_BASE_AHB2: u32 = PERIPH_BASE + 0x0800_0000;

    // APB1
    pub const TIMER1_BASE: u32 = PERIPH_BASE_APB1;
    pub const TIMER2_BASE: u32 = PERIPH_BASE_APB1 + 0x0400;
    pub const TIMER5_BASE: u32 = PERIPH_BASE_APB1 + 0x1000;
    pub const TIMER13_BASE: u32 = PERIPH_BASE_APB1 + 0x2000;
    /// GD32F170/GD32F190 only
    pub const SLCD_BASE: u32 = PERIPH_BASE_APB1 + 0x2400;
    pub const RTC_BASE: u32 = PERIPH_BASE_APB1 + 0x2800;
    pub const BACKUP_REGS_BASE: u32 = RTC_BASE + 0x50;
    pub const WWDGT_BASE: u32 = PERIPH_BASE_APB1 + 0x2C00;
    pub const FWDGT_BASE: u32 = PERIPH_BASE_APB1 + 0x3000;
    pub const SPI1_BASE: u32 = PERIPH_BASE_APB1 + 0x3800;
    /// GD32F170/GD32F190 only
    pub const SPI2_BASE: u32 = PERIPH_BASE_APB1 + 0x3C00;
    pub const USART1_BASE: u32 = PERIPH_BASE_APB1 + 0x4400;
    pub const I2C0_BASE: u32 = PERIPH_BASE_APB1 + 0x5400;
    pub const I2C1_BASE: u32 = PERIPH_BASE_APB1 + 0x5800;
    pub const USB_DEV_FS_BASE: u32 = PERIPH_BASE_APB1 + 0x5C00;
    pub const USB_SRAM_BASE: u32 = PERIPH_BASE_APB1 + 0x6000;
    pub const PMU_BASE: u32 = PERIPH_BASE_APB1 + 0x7000;
    pub const DAC_BASE: u32 = PERIPH_BASE_APB1 + 0x7400;
    pub const CEC_BASE: u32 = PERIPH_BASE_APB1 + 0x7800;
    /// GD32F170/GD32F190 only
    pub const I2C2_BASE: u32 = PERIPH_BASE_APB1 + 0xC000;

    // APB2
    pub const SYSCFG_COMP_BASE: u32 = PERIPH_BASE_APB2;
    pub const EXTI_BASE: u32 = PERIPH_BASE_APB2 + 0x0400;
    pub const ADC_BASE: u32 = PERIPH_BASE_APB2 + 0x2400;
    pub const TIMER0_BASE: u32 = PERIPH_BASE_APB2 + 0x2C00;
    pub const SPI0_BASE: u32 = PERIPH_BASE_APB2 + 0x3000;
    pub const USART0_BASE: u32 = PERIPH_BASE_APB2 + 0x3800;
    pub const TIMER14_BASE: u32 = PERIPH_BASE_APB2 + 0x4000;
    pub const TIMER15_BASE: u32 = PERIPH_BASE_APB2 + 0x4400;
    pub const TIMER16_BASE: u32 = PERIPH_BASE_APB2 + 0x4800;

    // AHB1
    pub const DMA_BASE: u32 = PERIPH_BASE_AHB1;
    pub const RCU_BASE: u32 = PERIPH_BASE_AHB1 + 0x1000;
    pub const FMC_BASE: u32 = PERIPH_BASE_AHB1 + 0x2000;
    pub const CRC_BASE: u32 = PERIPH_BASE_AHB1 + 0x3000;
    pub const TSI_BASE: u32 = PERIPH_BASE_AHB1 + 0x4000;

    // AHB2
    pub const GPIOA_BASE: u32 = PERIPH_BASE_AHB2;
    pub const GPIOB_BASE: u32 = PERIPH_BASE_AHB2 + 0x0400;
    pub const GPIOC_BASE: u32 = PERIPH_BASE_AHB2 + 0x0800;
    pub const GPIOD_BASE: u32 = PERIPH_BASE_AHB2 + 0x0C00;
    pub const GPIOF_BASE: u32 = PERIPH_BASE_AHB2 + 0x1400;

    // Device electronic signature
    pub const DESIG_FLASH_SIZE_BASE: u32 = INFO_BASE + 0x7E0;
    pub const DESIG_UNIQUE_ID_BASE: u32 = INFO_BASE + 0x7AC;
}

/// A 32-bit memory-mapped register
#[repr(transparent)]
pub struct Reg {
    register: VolatileCell<u32>,
}

impl Reg {
    /// Reads the whole register
    #[inline(always)]
    pub fn read(&self) -> u32 {
        self.register.get()
    }

    /// Writes the whole register
    #[inline(always)]
    pub fn write(&self, bits: u32) {
        self.register.set(bits)
    }

    /// Read-modify-write
    #[inline(always)]
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let bits = self.register.get();
        self.register.set(f(bits));
    }

    /// Sets every bit of `mask`
    #[inline(always)]
    pub fn set_bits(&self, mask: u32) {
        self.modify(|r| r | mask);
    }

    /// Clears every bit of `mask`
    #[inline(always)]
    pub fn clear_bits(&self, mask: u32) {
        self.modify(|r| r & !mask);
    }

    /// Returns `true` if any bit of `mask` is set
    #[inline(always)]
    pub fn is_set(&self, mask: u32) -> bool {
        self.read() & mask != 0
    }

    /// Replaces the field selected by `mask` (already shifted) with `value << shift`
    #[inline(always)]
    pub fn write_field(&self, mask: u32, shift: u32, value: u32) {
        self.modify(|r| (r & !mask) | ((value << shift) & mask));
    }
}

macro_rules! peripherals {
    ($(
        $(#[$meta:meta])*
        $PER:ident: ($module:ident, $base:ident, $cfg:meta),
    )+) => {
        $(
            $(#[$meta])*
            #[cfg($cfg)]
            pub struct $PER {
                _marker: PhantomData<*const ()>,
            }

            #[cfg($cfg)]
            unsafe impl Send for $PER {}

            #[cfg($cfg)]
            impl $PER {
                /// Pointer to the register block
                pub const PTR: *const $module::RegisterBlock =
                    memory_map::$base as *const $module::RegisterBlock;

                /// Returns a pointer to the register block
                #[inline(always)]
                pub const fn ptr() -> *const $module::RegisterBlock {
                    Self::PTR
                }
            }

            #[cfg($cfg)]
            impl Deref for $PER {
                type Target = $module::RegisterBlock;

                #[inline(always)]
                fn deref(&self) -> &Self::Target {
                    // NOTE(unsafe) the register block lives at a fixed address for the
                    // whole program and the handle is a singleton
                    unsafe { &*Self::PTR }
                }
            }
        )+

        /// All the peripherals covered by this crate
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(
                $(#[$meta])*
                #[cfg($cfg)]
                pub $PER: $PER,
            )+
        }

        impl Peripherals {
            /// Unchecked version of [`Peripherals::take`]
            ///
            /// # Safety
            ///
            /// Each of the returned peripherals must be used at most once.
            #[inline]
            pub unsafe fn steal() -> Self {
                DEVICE_PERIPHERALS = true;
                Peripherals {
                    $(
                        #[cfg($cfg)]
                        $PER: $PER { _marker: PhantomData },
                    )+
                }
            }
        }
    };
}

peripherals! {
    /// Analog to digital converter
    ADC: (adc, ADC_BASE, all()),
    /// Serial peripheral interface 0
    SPI0: (spi, SPI0_BASE, all()),
    /// Serial peripheral interface 1
    SPI1: (spi, SPI1_BASE, all()),
    /// Serial peripheral interface 2
    SPI2: (spi, SPI2_BASE, any(feature = "gd32f170", feature = "gd32f190")),
    /// Universal synchronous/asynchronous receiver transmitter 0
    USART0: (usart, USART0_BASE, all()),
    /// Universal synchronous/asynchronous receiver transmitter 1
    USART1: (usart, USART1_BASE, all()),
    /// Reset and clock unit
    RCU: (rcu, RCU_BASE, all()),
}

static mut DEVICE_PERIPHERALS: bool = false;

impl Peripherals {
    /// Returns all the peripherals *once*
    #[inline]
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            // NOTE(unsafe) the flag is only touched inside a critical section
            if unsafe { DEVICE_PERIPHERALS } {
                None
            } else {
                Some(unsafe { Peripherals::steal() })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_blocks_sit_at_the_memory_map_addresses() {
        assert_eq!(ADC::ptr() as u32, 0x4001_2400);
        assert_eq!(SPI0::ptr() as u32, 0x4001_3000);
        assert_eq!(SPI1::ptr() as u32, 0x4000_3800);
        assert_eq!(USART0::ptr() as u32, 0x4001_3800);
        assert_eq!(USART1::ptr() as u32, 0x4000_4400);
        assert_eq!(RCU::ptr() as u32, 0x4002_1000);
    }

    #[test]
    fn peripherals_are_handed_out_once() {
        let first = Peripherals::take();
        assert!(first.is_some());
        assert!(Peripherals::take().is_none());
    }

    #[test]
    fn write_field_only_touches_the_masked_bits() {
        let reg: Reg = unsafe { core::mem::zeroed() };
        reg.write(0xFFFF_FFFF);
        reg.write_field(0x7 << 3, 3, 0b010);
        assert_eq!(reg.read(), 0xFFFF_FFD7);

        reg.write_field(0x7 << 3, 3, 0xFF);
        assert_eq!(reg.read(), 0xFFFF_FFFF);
    }

    #[test]
    fn set_and_clear_bits() {
        let reg: Reg = unsafe { core::mem::zeroed() };
        reg.set_bits(1 << 4 | 1 << 0);
        assert!(reg.is_set(1 << 4));
        reg.clear_bits(1 << 4);
        assert!(!reg.is_set(1 << 4));
        assert_eq!(reg.read(), 1);
    }
}
