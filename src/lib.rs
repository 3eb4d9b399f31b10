//! HAL for the GD32F1x0 family
//!
//! This is an implementation of the [`embedded-hal`] traits for the ADC, SPI and USART
//! peripherals of the GD32F1x0 family, on top of a small register map of those
//! peripherals.
//!
//! Select the device line with one of the `gd32f130`, `gd32f150`, `gd32f170` or
//! `gd32f190` features. SPI2 and ADC oversampling only exist on GD32F170/GD32F190.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![cfg_attr(not(test), no_std)]

use embedded_hal as hal;

pub mod adc;
pub mod pac;
pub mod prelude;
pub mod rcu;
pub mod serial;
pub mod signature;
pub mod spi;
pub mod time;
