//! # Serial Peripheral Interface
//!
//! Register-level control of SPI0, SPI1 and (on GD32F170/GD32F190) SPI2, plus the
//! `embedded-hal` full duplex and blocking traits on top of it.
//!
//! ## Example usage:
//!  ```ignore
//! let mut spi = Spi::spi0(p.SPI0, MODE_0, 1.mhz(), &mut rcu);
//! let received = spi.xfer(0x9F)?;
//!  ```

use core::ops::Deref;

use embedded_hal::blocking::spi as blocking;
use embedded_hal::spi::FullDuplex;
pub use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0, MODE_1, MODE_2, MODE_3};

use crate::pac;
use crate::pac::spi::{self, RegisterBlock};
use crate::rcu::{BaseFrequency, Enable, Rcu, Reset};
use crate::time::Hertz;

/// SPI error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Frame format error (TI mode)
    Framing,
    /// CRC error
    Crc,
    /// Configuration fault (NSS pulled low while in master mode)
    ModeFault,
    /// Receive overrun
    Overrun,
}

/// Clock prescaler: the SPI clock is PCLK divided by this
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Prescaler {
    Div2 = 0,
    Div4 = 1,
    Div8 = 2,
    Div16 = 3,
    Div32 = 4,
    Div64 = 5,
    Div128 = 6,
    Div256 = 7,
}

/// Frame size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    Bits8,
    Bits16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// SPI interrupt events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Transmit buffer empty
    Tbe,
    /// Receive buffer not empty
    Rbne,
    /// Overrun, configuration fault, CRC or frame error
    Error,
}

impl Event {
    fn mask(self) -> u32 {
        match self {
            Event::Tbe => spi::CTL1_TBEIE,
            Event::Rbne => spi::CTL1_RBNEIE,
            Event::Error => spi::CTL1_ERRIE,
        }
    }
}

/// Smallest power of two prescaler that brings `pclk` down to `freq` or below
pub fn prescaler(pclk: Hertz, freq: Hertz) -> Prescaler {
    let div = match freq.0 {
        0 => u32::MAX,
        freq => pclk.0.saturating_add(freq - 1) / freq,
    };

    match div {
        0..=2 => Prescaler::Div2,
        3..=4 => Prescaler::Div4,
        5..=8 => Prescaler::Div8,
        9..=16 => Prescaler::Div16,
        17..=32 => Prescaler::Div32,
        33..=64 => Prescaler::Div64,
        65..=128 => Prescaler::Div128,
        _ => Prescaler::Div256,
    }
}

/// SPI driver
pub struct Spi<SPI> {
    rb: SPI,
}

impl<SPI> Spi<SPI>
where
    SPI: Deref<Target = RegisterBlock>,
{
    /// Wraps an SPI register block without touching the hardware
    pub fn new(rb: SPI) -> Self {
        Spi { rb }
    }

    /// Releases the register block
    pub fn release(self) -> SPI {
        self.rb
    }

    /// Sets up an 8-bit, MSB first master with software NSS held high, then enables it
    pub fn configure(&mut self, mode: Mode, prescaler: Prescaler) {
        self.disable();

        let mut ctl0 = spi::CTL0_MSTMOD
            | spi::CTL0_SWNSSEN
            | spi::CTL0_SWNSS
            | ((prescaler as u32) << spi::CTL0_PSC_SHIFT);
        if mode.polarity == Polarity::IdleHigh {
            ctl0 |= spi::CTL0_CKPL;
        }
        if mode.phase == Phase::CaptureOnSecondTransition {
            ctl0 |= spi::CTL0_CKPH;
        }
        self.rb.ctl0.write(ctl0);
        self.rb.ctl1.write(0);

        self.enable();
    }

    pub fn enable(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_SPIEN);
    }

    pub fn disable(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_SPIEN);
    }

    pub fn set_master_mode(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_MSTMOD);
    }

    pub fn set_slave_mode(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_MSTMOD);
    }

    pub fn set_baudrate_prescaler(&mut self, prescaler: Prescaler) {
        self.rb
            .ctl0
            .write_field(spi::CTL0_PSC, spi::CTL0_PSC_SHIFT, prescaler as u32);
    }

    /// Clock polarity and phase
    pub fn set_mode(&mut self, mode: Mode) {
        self.rb.ctl0.modify(|r| {
            let mut r = r & !(spi::CTL0_CKPL | spi::CTL0_CKPH);
            if mode.polarity == Polarity::IdleHigh {
                r |= spi::CTL0_CKPL;
            }
            if mode.phase == Phase::CaptureOnSecondTransition {
                r |= spi::CTL0_CKPH;
            }
            r
        });
    }

    /// Only change the frame format while the SPI is disabled
    pub fn set_frame_format(&mut self, format: FrameFormat) {
        match format {
            FrameFormat::Bits8 => self.rb.ctl0.clear_bits(spi::CTL0_FF16),
            FrameFormat::Bits16 => self.rb.ctl0.set_bits(spi::CTL0_FF16),
        }
    }

    pub fn set_bit_order(&mut self, order: BitOrder) {
        match order {
            BitOrder::MsbFirst => self.rb.ctl0.clear_bits(spi::CTL0_LF),
            BitOrder::LsbFirst => self.rb.ctl0.set_bits(spi::CTL0_LF),
        }
    }

    /// NSS is driven by the SWNSS bit instead of the pin
    pub fn enable_software_slave_management(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_SWNSSEN);
    }

    pub fn disable_software_slave_management(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_SWNSSEN);
    }

    pub fn set_nss_high(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_SWNSS);
    }

    pub fn set_nss_low(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_SWNSS);
    }

    /// Drive the NSS pin low while the master is enabled
    pub fn enable_ss_output(&mut self) {
        self.rb.ctl1.set_bits(spi::CTL1_NSSDRV);
    }

    pub fn disable_ss_output(&mut self) {
        self.rb.ctl1.clear_bits(spi::CTL1_NSSDRV);
    }

    /// Two data lines
    pub fn set_unidirectional_mode(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_BDEN);
    }

    /// Two data lines, transmit and receive
    pub fn set_full_duplex_mode(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_BDEN | spi::CTL0_RO);
    }

    /// Two data lines, receive only
    pub fn set_receive_only_mode(&mut self) {
        self.rb
            .ctl0
            .modify(|r| (r & !spi::CTL0_BDEN) | spi::CTL0_RO);
    }

    /// One data line, output enabled
    pub fn set_bidirectional_transmit_only_mode(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_BDEN | spi::CTL0_BDOEN);
    }

    /// One data line, output disabled
    pub fn set_bidirectional_receive_only_mode(&mut self) {
        self.rb
            .ctl0
            .modify(|r| (r & !spi::CTL0_BDOEN) | spi::CTL0_BDEN);
    }

    pub fn enable_crc(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_CRCEN);
    }

    pub fn disable_crc(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_CRCEN);
    }

    pub fn set_crc_polynomial(&mut self, polynomial: u16) {
        self.rb
            .crcpoly
            .write(u32::from(polynomial) & spi::CRCPOLY_MASK);
    }

    /// Send the transmit CRC after the frame currently in the data register
    pub fn set_next_tx_from_crc(&mut self) {
        self.rb.ctl0.set_bits(spi::CTL0_CRCNT);
    }

    /// The next transmitted frame comes from the data register
    pub fn set_next_tx_from_buffer(&mut self) {
        self.rb.ctl0.clear_bits(spi::CTL0_CRCNT);
    }

    pub fn read_rx_crc(&self) -> u16 {
        (self.rb.rcrc.read() & spi::DATA_MASK) as u16
    }

    pub fn read_tx_crc(&self) -> u16 {
        (self.rb.tcrc.read() & spi::DATA_MASK) as u16
    }

    pub fn enable_tx_dma(&mut self) {
        self.rb.ctl1.set_bits(spi::CTL1_DMATEN);
    }

    pub fn disable_tx_dma(&mut self) {
        self.rb.ctl1.clear_bits(spi::CTL1_DMATEN);
    }

    pub fn enable_rx_dma(&mut self) {
        self.rb.ctl1.set_bits(spi::CTL1_DMAREN);
    }

    pub fn disable_rx_dma(&mut self) {
        self.rb.ctl1.clear_bits(spi::CTL1_DMAREN);
    }

    /// Starts listening for an interrupt event
    pub fn listen(&mut self, event: Event) {
        self.rb.ctl1.set_bits(event.mask());
    }

    /// Stops listening for an interrupt event
    pub fn unlisten(&mut self, event: Event) {
        self.rb.ctl1.clear_bits(event.mask());
    }

    /// A transfer is in progress
    pub fn is_busy(&self) -> bool {
        self.rb.stat.is_set(spi::STAT_TRANS)
    }

    /// Waits for room in the transmit buffer, then queues `data`
    pub fn write_word(&mut self, data: u16) -> Result<(), Error> {
        nb::block!(self.send_word(data))
    }

    /// Waits for a received frame and returns it
    pub fn read_word(&mut self) -> Result<u16, Error> {
        nb::block!(self.read_data_reg())
    }

    /// Sends `data` and returns the frame received at the same time
    pub fn xfer(&mut self, data: u16) -> Result<u16, Error> {
        self.write_word(data)?;
        self.read_word()
    }

    /// Reports and clears the first pending error
    fn check_errors(&mut self, stat: u32) -> Result<(), Error> {
        if stat & spi::STAT_RXORERR != 0 {
            // Cleared by reading DATA, then STAT
            self.rb.data.read();
            self.rb.stat.read();
            Err(Error::Overrun)
        } else if stat & spi::STAT_CONFERR != 0 {
            // Cleared by a write to CTL0 after the STAT read
            self.rb.ctl0.modify(|r| r);
            Err(Error::ModeFault)
        } else if stat & spi::STAT_CRCERR != 0 {
            self.rb.stat.clear_bits(spi::STAT_CRCERR);
            Err(Error::Crc)
        } else if stat & spi::STAT_FERR != 0 {
            Err(Error::Framing)
        } else {
            Ok(())
        }
    }

    fn read_data_reg(&mut self) -> nb::Result<u16, Error> {
        let stat = self.rb.stat.read();
        self.check_errors(stat)?;

        if stat & spi::STAT_RBNE != 0 {
            Ok((self.rb.data.read() & spi::DATA_MASK) as u16)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn send_word(&mut self, data: u16) -> nb::Result<(), Error> {
        let stat = self.rb.stat.read();
        self.check_errors(stat)?;

        if stat & spi::STAT_TBE != 0 {
            self.rb.data.write(u32::from(data));
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

macro_rules! spi {
    ($($(#[$meta:meta])* $SPIX:ident: $spiX:ident,)+) => {
        $(
            $(#[$meta])*
            impl Spi<pac::$SPIX> {
                /// Enables and resets the peripheral clock, then configures an 8-bit,
                /// MSB first master running at `freq` or the next lower rate
                pub fn $spiX(spi: pac::$SPIX, mode: Mode, freq: impl Into<Hertz>, rcu: &mut Rcu) -> Self {
                    pac::$SPIX::enable(rcu);
                    pac::$SPIX::reset(rcu);

                    let prescaler = prescaler(pac::$SPIX::base_frequency(rcu), freq.into());
                    let mut spi = Spi::new(spi);
                    spi.configure(mode, prescaler);
                    spi
                }

                /// Disables the SPI and its clock, and releases the peripheral
                pub fn free(mut self, rcu: &mut Rcu) -> pac::$SPIX {
                    self.disable();
                    pac::$SPIX::disable(rcu);
                    self.rb
                }
            }
        )+
    }
}

spi! {
    SPI0: spi0,
    SPI1: spi1,
    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    SPI2: spi2,
}

impl<SPI> FullDuplex<u8> for Spi<SPI>
where
    SPI: Deref<Target = RegisterBlock>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        self.read_data_reg().map(|w| w as u8)
    }

    fn send(&mut self, byte: u8) -> nb::Result<(), Error> {
        self.send_word(byte.into())
    }
}

impl<SPI> FullDuplex<u16> for Spi<SPI>
where
    SPI: Deref<Target = RegisterBlock>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u16, Error> {
        self.read_data_reg()
    }

    fn send(&mut self, word: u16) -> nb::Result<(), Error> {
        self.send_word(word)
    }
}

impl<SPI> blocking::transfer::Default<u8> for Spi<SPI> where SPI: Deref<Target = RegisterBlock> {}

impl<SPI> blocking::write::Default<u8> for Spi<SPI> where SPI: Deref<Target = RegisterBlock> {}

impl<SPI> blocking::transfer::Default<u16> for Spi<SPI> where SPI: Deref<Target = RegisterBlock> {}

impl<SPI> blocking::write::Default<u16> for Spi<SPI> where SPI: Deref<Target = RegisterBlock> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::U32Ext;
    use embedded_hal::blocking::spi::{Transfer, Write};

    fn regs() -> RegisterBlock {
        unsafe { core::mem::zeroed() }
    }

    #[test]
    fn prescaler_never_exceeds_the_requested_rate() {
        assert_eq!(prescaler(8.mhz().into(), 8.mhz().into()), Prescaler::Div2);
        assert_eq!(prescaler(8.mhz().into(), 4.mhz().into()), Prescaler::Div2);
        assert_eq!(prescaler(8.mhz().into(), 3.mhz().into()), Prescaler::Div4);
        assert_eq!(prescaler(72.mhz().into(), 1.mhz().into()), Prescaler::Div128);
        assert_eq!(prescaler(72.mhz().into(), 281_250.hz()), Prescaler::Div256);
        assert_eq!(prescaler(72.mhz().into(), 1.khz().into()), Prescaler::Div256);
        assert_eq!(prescaler(72.mhz().into(), 0.hz()), Prescaler::Div256);
    }

    #[test]
    fn configure_sets_up_a_software_nss_master() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        spi.configure(MODE_3, Prescaler::Div16);
        assert_eq!(
            rb.ctl0.read(),
            spi::CTL0_MSTMOD
                | spi::CTL0_SWNSSEN
                | spi::CTL0_SWNSS
                | spi::CTL0_SPIEN
                | spi::CTL0_CKPL
                | spi::CTL0_CKPH
                | 3 << spi::CTL0_PSC_SHIFT
        );

        spi.set_mode(MODE_0);
        spi.set_baudrate_prescaler(Prescaler::Div256);
        assert_eq!(rb.ctl0.read() & (spi::CTL0_CKPL | spi::CTL0_CKPH), 0);
        assert_eq!(rb.ctl0.read() & spi::CTL0_PSC, spi::CTL0_PSC);
    }

    #[test]
    fn line_modes() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        spi.set_bidirectional_transmit_only_mode();
        assert_eq!(rb.ctl0.read(), spi::CTL0_BDEN | spi::CTL0_BDOEN);

        spi.set_bidirectional_receive_only_mode();
        assert_eq!(rb.ctl0.read(), spi::CTL0_BDEN);

        spi.set_receive_only_mode();
        assert_eq!(rb.ctl0.read(), spi::CTL0_RO);

        spi.set_full_duplex_mode();
        assert_eq!(rb.ctl0.read(), 0);
    }

    #[test]
    fn frame_format_bit_order_and_nss() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        spi.set_frame_format(FrameFormat::Bits16);
        spi.set_bit_order(BitOrder::LsbFirst);
        spi.enable_software_slave_management();
        spi.set_nss_high();
        spi.enable_ss_output();
        assert_eq!(
            rb.ctl0.read(),
            spi::CTL0_FF16 | spi::CTL0_LF | spi::CTL0_SWNSSEN | spi::CTL0_SWNSS
        );
        assert_eq!(rb.ctl1.read(), spi::CTL1_NSSDRV);

        spi.set_frame_format(FrameFormat::Bits8);
        spi.set_bit_order(BitOrder::MsbFirst);
        spi.set_nss_low();
        spi.disable_software_slave_management();
        spi.disable_ss_output();
        assert_eq!(rb.ctl0.read(), 0);
        assert_eq!(rb.ctl1.read(), 0);
    }

    #[test]
    fn crc_registers() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        spi.enable_crc();
        spi.set_crc_polynomial(0x1021);
        spi.set_next_tx_from_crc();
        assert_eq!(rb.ctl0.read(), spi::CTL0_CRCEN | spi::CTL0_CRCNT);
        assert_eq!(rb.crcpoly.read(), 0x1021);

        rb.rcrc.write(0xBEEF);
        rb.tcrc.write(0x1_CAFE);
        assert_eq!(spi.read_rx_crc(), 0xBEEF);
        assert_eq!(spi.read_tx_crc(), 0xCAFE);

        spi.set_next_tx_from_buffer();
        spi.disable_crc();
        assert_eq!(rb.ctl0.read(), 0);
    }

    #[test]
    fn dma_and_interrupts() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        spi.enable_tx_dma();
        spi.enable_rx_dma();
        spi.listen(Event::Rbne);
        spi.listen(Event::Error);
        assert_eq!(
            rb.ctl1.read(),
            spi::CTL1_DMATEN | spi::CTL1_DMAREN | spi::CTL1_RBNEIE | spi::CTL1_ERRIE
        );

        spi.unlisten(Event::Error);
        spi.disable_tx_dma();
        spi.disable_rx_dma();
        assert_eq!(rb.ctl1.read(), spi::CTL1_RBNEIE);
    }

    #[test]
    fn full_duplex_waits_for_the_buffers() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        assert_eq!(FullDuplex::<u8>::send(&mut spi, 0x55), Err(nb::Error::WouldBlock));
        assert_eq!(FullDuplex::<u8>::read(&mut spi), Err(nb::Error::WouldBlock));

        rb.stat.write(spi::STAT_TBE | spi::STAT_RBNE);
        assert_eq!(FullDuplex::<u8>::send(&mut spi, 0x55), Ok(()));
        assert_eq!(rb.data.read(), 0x55);
        assert_eq!(FullDuplex::<u8>::read(&mut spi), Ok(0x55));

        assert_eq!(spi.xfer(0xA5A5), Ok(0xA5A5));
    }

    #[test]
    fn blocking_transfer_in_loopback() {
        let rb = regs();
        let mut spi = Spi::new(&rb);
        rb.stat.write(spi::STAT_TBE | spi::STAT_RBNE);

        let mut words = [1u8, 2, 3];
        assert_eq!(spi.transfer(&mut words).unwrap(), &[1, 2, 3]);
        spi.write(&[0x1234u16, 0x5678]).unwrap();
        assert_eq!(rb.data.read(), 0x5678);
    }

    #[test]
    fn errors_are_reported_and_cleared() {
        let rb = regs();
        let mut spi = Spi::new(&rb);

        rb.stat.write(spi::STAT_RBNE | spi::STAT_RXORERR);
        assert_eq!(spi.read_word(), Err(Error::Overrun));

        rb.stat.write(spi::STAT_TBE | spi::STAT_CONFERR);
        assert_eq!(spi.write_word(1), Err(Error::ModeFault));

        rb.stat.write(spi::STAT_RBNE | spi::STAT_CRCERR);
        assert_eq!(FullDuplex::<u16>::read(&mut spi), Err(nb::Error::Other(Error::Crc)));
        assert_eq!(rb.stat.read(), spi::STAT_RBNE);
        assert!(FullDuplex::<u16>::read(&mut spi).is_ok());
    }

    #[test]
    fn busy_flag() {
        let rb = regs();
        let spi = Spi::new(&rb);
        assert!(!spi.is_busy());
        rb.stat.write(spi::STAT_TRANS);
        assert!(spi.is_busy());
    }
}
