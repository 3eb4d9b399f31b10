//! # Serial Communication (USART)
//! This module contains the functions to utilize the USART (Universal
//! synchronous asynchronous receiver transmitter)
//!
//!
//! ## Example usage:
//!  ```ignore
//! // prelude: create handles to the peripherals and registers
//! let p = crate::pac::Peripherals::take().unwrap();
//! let mut rcu = p.RCU.constrain();
//!
//! // Create an interface struct for USART0 with 9600 Baud
//! let serial = Serial::usart0(
//!     p.USART0,
//!     Config::default().baudrate(9_600.bps()),
//!     &mut rcu,
//! )?;
//!
//! // separate into tx and rx channels
//! let (mut tx, mut rx) = serial.split();
//!
//! // Write 'R' to the USART
//! block!(tx.write(b'R')).ok();
//! // Receive a byte from the USART and store it in "received"
//! let received = block!(rx.read()).unwrap();
//!  ```

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use embedded_hal::serial;
use void::Void;

use crate::pac::usart::{self, RegisterBlock};
use crate::pac::{USART0, USART1};
use crate::rcu::{BaseFrequency, Enable, Rcu, Reset};
use crate::time::{Bps, Hertz, U32Ext};

/// Interrupt event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// New data has been received
    Rbne,
    /// New data can be sent
    Tbe,
    /// The last frame has left the shift register
    Tc,
    /// The line went idle after a frame
    Idle,
}

impl Event {
    fn interrupt_mask(self) -> u32 {
        match self {
            Event::Rbne => usart::CTL0_RBNEIE,
            Event::Tbe => usart::CTL0_TBEIE,
            Event::Tc => usart::CTL0_TCIE,
            Event::Idle => usart::CTL0_IDLEIE,
        }
    }

    fn flag_mask(self) -> u32 {
        match self {
            Event::Rbne => usart::STAT_RBNE,
            Event::Tbe => usart::STAT_TBE,
            Event::Tc => usart::STAT_TC,
            Event::Idle => usart::STAT_IDLEF,
        }
    }
}

/// Serial error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// RX buffer overrun
    Overrun,
    /// Parity check error
    Parity,
}

/// Configuration that the hardware cannot provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The divider does not fit in the BAUD register
    BaudrateTooLow,
    /// The divider is below 16
    BaudrateTooHigh,
    /// Nine data bits plus a parity bit do not fit in a frame
    WordLength,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    ParityNone,
    ParityEven,
    ParityOdd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[doc = "1 stop bit"]
    STOP1,
    #[doc = "0.5 stop bits"]
    STOP0P5,
    #[doc = "2 stop bits"]
    STOP2,
    #[doc = "1.5 stop bits"]
    STOP1P5,
}

/// Number of data bits, not counting the parity bit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Bits8,
    Bits9,
}

/// Enabled directions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Rx,
    Tx,
    RxTx,
}

/// Hardware flow control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    Rts,
    Cts,
    RtsCts,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub baudrate: Bps,
    pub databits: DataBits,
    pub parity: Parity,
    pub stopbits: StopBits,
}

impl Config {
    pub fn baudrate(mut self, baudrate: Bps) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub fn databits(mut self, databits: DataBits) -> Self {
        self.databits = databits;
        self
    }

    pub fn parity_none(mut self) -> Self {
        self.parity = Parity::ParityNone;
        self
    }

    pub fn parity_even(mut self) -> Self {
        self.parity = Parity::ParityEven;
        self
    }

    pub fn parity_odd(mut self) -> Self {
        self.parity = Parity::ParityOdd;
        self
    }

    pub fn stopbits(mut self, stopbits: StopBits) -> Self {
        self.stopbits = stopbits;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        let baudrate = 115_200_u32.bps();
        Config {
            baudrate,
            databits: DataBits::Bits8,
            parity: Parity::ParityNone,
            stopbits: StopBits::STOP1,
        }
    }
}

/// BAUD value for 16x oversampling, rounded to the nearest divider
fn baud_divider(baudrate: Bps, pclk: Hertz) -> Result<u32, ConfigError> {
    if baudrate.0 == 0 {
        return Err(ConfigError::BaudrateTooLow);
    }

    let div = pclk.0.saturating_add(baudrate.0 / 2) / baudrate.0;
    if div < 16 {
        Err(ConfigError::BaudrateTooHigh)
    } else if div > usart::BAUD_MASK {
        Err(ConfigError::BaudrateTooLow)
    } else {
        Ok(div)
    }
}

/// Serial abstraction
pub struct Serial<USART> {
    usart: USART,
}

/// Serial receiver
pub struct Rx<USART> {
    _usart: PhantomData<USART>,
}

/// Serial transmitter
pub struct Tx<USART> {
    _usart: PhantomData<USART>,
}

impl<USART> Serial<USART>
where
    USART: Deref<Target = RegisterBlock>,
{
    /// Wraps a USART register block without touching the hardware
    pub fn new(usart: USART) -> Self {
        Serial { usart }
    }

    /// Applies `config` and enables the USART with both directions on
    ///
    /// `pclk` is the frequency of the bus feeding the USART. Nothing is written when
    /// the configuration is rejected.
    pub fn configure(&mut self, config: Config, pclk: Hertz) -> Result<(), ConfigError> {
        let div = baud_divider(config.baudrate, pclk)?;

        // Unlike most uart devices, the "word length" of this usart device refers to
        // the size of the data plus the parity bit. I.e. "word length"=8, parity=even
        // results in 7 bits of data. Therefore, in order to get 8 bits and one parity
        // bit, we need to set the "word" length to 9 when using parity bits.
        let nine_bit_frame = match (config.databits, config.parity) {
            (DataBits::Bits8, Parity::ParityNone) => false,
            (DataBits::Bits9, Parity::ParityNone) | (DataBits::Bits8, _) => true,
            (DataBits::Bits9, _) => return Err(ConfigError::WordLength),
        };

        self.disable();
        self.usart.baud.write(div);
        self.set_word_length(nine_bit_frame);
        self.set_parity(config.parity);
        self.set_stopbits(config.stopbits);
        self.set_mode(Mode::RxTx);
        self.enable();

        Ok(())
    }

    /// Sets the baud rate for 16x oversampling
    pub fn set_baudrate(&mut self, baudrate: Bps, pclk: Hertz) -> Result<(), ConfigError> {
        let div = baud_divider(baudrate, pclk)?;
        self.usart.baud.write(div);
        Ok(())
    }

    /// Frame data length; with parity enabled the parity bit is the last data bit
    pub fn set_databits(&mut self, databits: DataBits) {
        self.set_word_length(databits == DataBits::Bits9);
    }

    fn set_word_length(&mut self, nine_bits: bool) {
        if nine_bits {
            self.usart.ctl0.set_bits(usart::CTL0_WL);
        } else {
            self.usart.ctl0.clear_bits(usart::CTL0_WL);
        }
    }

    pub fn set_stopbits(&mut self, stopbits: StopBits) {
        let stop_bits = match stopbits {
            StopBits::STOP1 => 0b00,
            StopBits::STOP0P5 => 0b01,
            StopBits::STOP2 => 0b10,
            StopBits::STOP1P5 => 0b11,
        };
        self.usart
            .ctl1
            .write_field(usart::CTL1_STB, usart::CTL1_STB_SHIFT, stop_bits);
    }

    pub fn set_parity(&mut self, parity: Parity) {
        let bits = match parity {
            Parity::ParityNone => 0,
            Parity::ParityEven => usart::CTL0_PCEN,
            Parity::ParityOdd => usart::CTL0_PCEN | usart::CTL0_PM,
        };
        self.usart
            .ctl0
            .modify(|r| (r & !(usart::CTL0_PCEN | usart::CTL0_PM)) | bits);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        let bits = match mode {
            Mode::Rx => usart::CTL0_REN,
            Mode::Tx => usart::CTL0_TEN,
            Mode::RxTx => usart::CTL0_REN | usart::CTL0_TEN,
        };
        self.usart
            .ctl0
            .modify(|r| (r & !(usart::CTL0_REN | usart::CTL0_TEN)) | bits);
    }

    pub fn set_flow_control(&mut self, flow_control: FlowControl) {
        let bits = match flow_control {
            FlowControl::None => 0,
            FlowControl::Rts => usart::CTL2_RTSEN,
            FlowControl::Cts => usart::CTL2_CTSEN,
            FlowControl::RtsCts => usart::CTL2_RTSEN | usart::CTL2_CTSEN,
        };
        self.usart
            .ctl2
            .modify(|r| (r & !(usart::CTL2_RTSEN | usart::CTL2_CTSEN)) | bits);
    }

    pub fn enable(&mut self) {
        self.usart.ctl0.set_bits(usart::CTL0_UEN);
    }

    pub fn disable(&mut self) {
        self.usart.ctl0.clear_bits(usart::CTL0_UEN);
    }

    pub fn wait_send_ready(&self) {
        while !self.usart.stat.is_set(usart::STAT_TBE) {}
    }

    pub fn wait_recv_ready(&self) {
        while !self.usart.stat.is_set(usart::STAT_RBNE) {}
    }

    /// Sends a 9-bit frame without looking at the transmit buffer
    pub fn send(&mut self, data: u16) {
        self.usart.tdata.write(u32::from(data) & usart::DATA_MASK);
    }

    /// Returns the 9-bit receive buffer without looking at the flags
    pub fn recv(&mut self) -> u16 {
        (self.usart.rdata.read() & usart::DATA_MASK) as u16
    }

    pub fn send_blocking(&mut self, data: u16) {
        self.wait_send_ready();
        self.send(data);
    }

    pub fn recv_blocking(&mut self) -> u16 {
        self.wait_recv_ready();
        self.recv()
    }

    pub fn enable_rx_dma(&mut self) {
        self.usart.ctl2.set_bits(usart::CTL2_DENR);
    }

    pub fn disable_rx_dma(&mut self) {
        self.usart.ctl2.clear_bits(usart::CTL2_DENR);
    }

    pub fn enable_tx_dma(&mut self) {
        self.usart.ctl2.set_bits(usart::CTL2_DENT);
    }

    pub fn disable_tx_dma(&mut self) {
        self.usart.ctl2.clear_bits(usart::CTL2_DENT);
    }

    /// Starts listening to the USART for `event`
    pub fn listen(&mut self, event: Event) {
        self.usart.ctl0.set_bits(event.interrupt_mask());
    }

    /// Stops listening to the USART for `event`
    pub fn unlisten(&mut self, event: Event) {
        self.usart.ctl0.clear_bits(event.interrupt_mask());
    }

    /// Returns `true` if the flag behind `event` is set
    pub fn is_event(&self, event: Event) -> bool {
        self.usart.stat.is_set(event.flag_mask())
    }

    /// Clears the flag behind `event`
    ///
    /// RBNE is cleared by flushing the receive buffer, which drops the unread frame.
    pub fn clear_event(&mut self, event: Event) {
        match event {
            Event::Idle => self.usart.intc.write(usart::INTC_IDLEC),
            Event::Tc => self.usart.intc.write(usart::INTC_TCC),
            Event::Rbne => self.usart.cmd.write(usart::CMD_RXFCMD),
            // TBE only clears when a frame is written to TDATA
            Event::Tbe => {}
        }
    }

    /// Clears the parity, framing, noise and overrun error flags
    pub fn clear_errors(&mut self) {
        clear_errors(&self.usart);
    }

    /// Returns ownership of the borrowed register handles
    pub fn release(self) -> USART {
        self.usart
    }
}

fn clear_errors(usart: &RegisterBlock) {
    usart
        .intc
        .write(usart::INTC_PEC | usart::INTC_FEC | usart::INTC_NEC | usart::INTC_OREC);
}

fn read(usart: &RegisterBlock) -> nb::Result<u8, Error> {
    let sr = usart.stat.read();

    // Check for any errors
    let err = if sr & usart::STAT_PERR != 0 {
        Some(Error::Parity)
    } else if sr & usart::STAT_FERR != 0 {
        Some(Error::Framing)
    } else if sr & usart::STAT_NERR != 0 {
        Some(Error::Noise)
    } else if sr & usart::STAT_ORERR != 0 {
        Some(Error::Overrun)
    } else {
        None
    };

    if let Some(err) = err {
        clear_errors(usart);
        Err(nb::Error::Other(err))
    } else if sr & usart::STAT_RBNE != 0 {
        Ok(usart.rdata.read() as u8)
    } else {
        Err(nb::Error::WouldBlock)
    }
}

fn write(usart: &RegisterBlock, byte: u8) -> nb::Result<(), Void> {
    if usart.stat.is_set(usart::STAT_TBE) {
        usart.tdata.write(byte.into());
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

fn flush(usart: &RegisterBlock) -> nb::Result<(), Void> {
    if usart.stat.is_set(usart::STAT_TC) {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

fn write_str(usart: &RegisterBlock, s: &str) -> fmt::Result {
    s.as_bytes()
        .iter()
        .try_for_each(|c| nb::block!(write(usart, *c)))
        .map_err(|_| fmt::Error)
}

impl<USART> serial::Read<u8> for Serial<USART>
where
    USART: Deref<Target = RegisterBlock>,
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        read(&self.usart)
    }
}

impl<USART> serial::Write<u8> for Serial<USART>
where
    USART: Deref<Target = RegisterBlock>,
{
    type Error = Void;

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        flush(&self.usart)
    }

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        write(&self.usart, byte)
    }
}

impl<USART> fmt::Write for Serial<USART>
where
    USART: Deref<Target = RegisterBlock>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        write_str(&self.usart, s)
    }
}

macro_rules! hal {
    ($(
        $(#[$meta:meta])*
        $USARTX:ident: $usartX:ident,
    )+) => {
        $(
            $(#[$meta])*
            /// The behaviour of the functions is equal for both USARTs.
            /// Except that they are using the corresponding USART hardware.
            impl Serial<$USARTX> {
                /// Enables and resets the USART clock, then configures the serial
                /// interface and creates the interface struct.
                ///
                /// The baud rate divider is computed from the bus clock recorded in
                /// `rcu`.
                pub fn $usartX(
                    usart: $USARTX,
                    config: Config,
                    rcu: &mut Rcu,
                ) -> Result<Self, ConfigError> {
                    // enable and reset $USARTX
                    $USARTX::enable(rcu);
                    $USARTX::reset(rcu);

                    let mut serial = Serial::new(usart);
                    serial.configure(config, $USARTX::base_frequency(rcu))?;
                    Ok(serial)
                }

                /// Disables the USART and its clock, and releases the peripheral
                pub fn free(mut self, rcu: &mut Rcu) -> $USARTX {
                    self.disable();
                    $USARTX::disable(rcu);
                    self.usart
                }

                /// Separates the serial struct into separate channel objects for sending (Tx) and
                /// receiving (Rx)
                pub fn split(self) -> (Tx<$USARTX>, Rx<$USARTX>) {
                    (
                        Tx {
                            _usart: PhantomData,
                        },
                        Rx {
                            _usart: PhantomData,
                        },
                    )
                }
            }

            impl Tx<$USARTX> {
                fn usart(&self) -> &RegisterBlock {
                    // NOTE(unsafe) Tx only touches the transmit side of the registers
                    unsafe { &*$USARTX::ptr() }
                }

                pub fn listen(&mut self) {
                    self.usart().ctl0.set_bits(usart::CTL0_TBEIE);
                }

                pub fn unlisten(&mut self) {
                    self.usart().ctl0.clear_bits(usart::CTL0_TBEIE);
                }
            }

            impl Rx<$USARTX> {
                fn usart(&self) -> &RegisterBlock {
                    // NOTE(unsafe) Rx only touches the receive side of the registers
                    unsafe { &*$USARTX::ptr() }
                }

                pub fn listen(&mut self) {
                    self.usart().ctl0.set_bits(usart::CTL0_RBNEIE);
                }

                pub fn unlisten(&mut self) {
                    self.usart().ctl0.clear_bits(usart::CTL0_RBNEIE);
                }
            }

            impl serial::Read<u8> for Rx<$USARTX> {
                type Error = Error;

                fn read(&mut self) -> nb::Result<u8, Error> {
                    read(self.usart())
                }
            }

            impl serial::Write<u8> for Tx<$USARTX> {
                type Error = Void;

                fn flush(&mut self) -> nb::Result<(), Self::Error> {
                    flush(self.usart())
                }

                fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
                    write(self.usart(), byte)
                }
            }

            impl fmt::Write for Tx<$USARTX> {
                fn write_str(&mut self, s: &str) -> fmt::Result {
                    write_str(self.usart(), s)
                }
            }
        )+
    }
}

hal! {
    /// # USART0 functions
    USART0: usart0,
    /// # USART1 functions
    USART1: usart1,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write as _;
    use embedded_hal::serial::{Read as _, Write as _};

    fn regs() -> RegisterBlock {
        unsafe { core::mem::zeroed() }
    }

    #[test]
    fn default_config_is_115200_8n1() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        serial.configure(Config::default(), 8_000_000.hz()).unwrap();

        assert_eq!(rb.baud.read(), 69);
        assert_eq!(
            rb.ctl0.read(),
            usart::CTL0_UEN | usart::CTL0_TEN | usart::CTL0_REN
        );
        assert_eq!(rb.ctl1.read(), 0);
    }

    #[test]
    fn parity_widens_the_frame() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        serial
            .configure(Config::default().parity_odd(), 72_000_000.hz())
            .unwrap();
        assert_eq!(rb.baud.read(), 625);
        assert!(rb.ctl0.is_set(usart::CTL0_WL));
        assert!(rb.ctl0.is_set(usart::CTL0_PCEN));
        assert!(rb.ctl0.is_set(usart::CTL0_PM));

        serial
            .configure(Config::default().parity_even(), 72_000_000.hz())
            .unwrap();
        assert!(rb.ctl0.is_set(usart::CTL0_WL | usart::CTL0_PCEN));
        assert!(!rb.ctl0.is_set(usart::CTL0_PM));

        assert_eq!(
            serial.configure(
                Config::default().databits(DataBits::Bits9).parity_even(),
                72_000_000.hz()
            ),
            Err(ConfigError::WordLength)
        );
    }

    #[test]
    fn rejected_baud_rates_leave_the_registers_alone() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        assert_eq!(
            serial.configure(Config::default().baudrate(1_000_000.bps()), 8_000_000.hz()),
            Err(ConfigError::BaudrateTooHigh)
        );
        assert_eq!(
            serial.set_baudrate(100.bps(), 8_000_000.hz()),
            Err(ConfigError::BaudrateTooLow)
        );
        assert_eq!(
            serial.set_baudrate(0.bps(), 8_000_000.hz()),
            Err(ConfigError::BaudrateTooLow)
        );
        assert_eq!(rb.baud.read(), 0);
        assert_eq!(rb.ctl0.read(), 0);

        serial.set_baudrate(500_000.bps(), 8_000_000.hz()).unwrap();
        assert_eq!(rb.baud.read(), 16);
    }

    #[test]
    fn frame_and_direction_settings() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        serial.set_stopbits(StopBits::STOP2);
        assert_eq!(rb.ctl1.read(), 0b10 << usart::CTL1_STB_SHIFT);
        serial.set_stopbits(StopBits::STOP0P5);
        assert_eq!(rb.ctl1.read(), 0b01 << usart::CTL1_STB_SHIFT);

        serial.set_databits(DataBits::Bits9);
        serial.set_mode(Mode::Tx);
        assert_eq!(rb.ctl0.read(), usart::CTL0_WL | usart::CTL0_TEN);

        serial.set_mode(Mode::Rx);
        serial.set_databits(DataBits::Bits8);
        assert_eq!(rb.ctl0.read(), usart::CTL0_REN);

        serial.set_flow_control(FlowControl::RtsCts);
        assert_eq!(rb.ctl2.read(), usart::CTL2_RTSEN | usart::CTL2_CTSEN);
        serial.set_flow_control(FlowControl::Cts);
        assert_eq!(rb.ctl2.read(), usart::CTL2_CTSEN);

        serial.enable_rx_dma();
        serial.enable_tx_dma();
        serial.set_flow_control(FlowControl::None);
        assert_eq!(rb.ctl2.read(), usart::CTL2_DENR | usart::CTL2_DENT);
        serial.disable_rx_dma();
        serial.disable_tx_dma();
        assert_eq!(rb.ctl2.read(), 0);
    }

    #[test]
    fn events() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        serial.listen(Event::Rbne);
        serial.listen(Event::Idle);
        assert_eq!(rb.ctl0.read(), usart::CTL0_RBNEIE | usart::CTL0_IDLEIE);
        serial.unlisten(Event::Rbne);
        assert_eq!(rb.ctl0.read(), usart::CTL0_IDLEIE);

        rb.stat.write(usart::STAT_TBE | usart::STAT_IDLEF);
        assert!(serial.is_event(Event::Tbe));
        assert!(serial.is_event(Event::Idle));
        assert!(!serial.is_event(Event::Tc));

        serial.clear_event(Event::Idle);
        assert_eq!(rb.intc.read(), usart::INTC_IDLEC);

        serial.clear_event(Event::Tc);
        assert_eq!(rb.intc.read(), usart::INTC_TCC);

        serial.clear_event(Event::Tbe);
        assert_eq!(rb.cmd.read(), 0);
        serial.clear_event(Event::Rbne);
        assert_eq!(rb.cmd.read(), usart::CMD_RXFCMD);
    }

    #[test]
    fn receive_errors_are_reported_and_cleared() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        rb.stat.write(usart::STAT_RBNE | usart::STAT_FERR | usart::STAT_ORERR);
        assert_eq!(serial.read(), Err(nb::Error::Other(Error::Framing)));
        assert_eq!(
            rb.intc.read(),
            usart::INTC_PEC | usart::INTC_FEC | usart::INTC_NEC | usart::INTC_OREC
        );

        rb.stat.write(usart::STAT_NERR);
        assert_eq!(serial.read(), Err(nb::Error::Other(Error::Noise)));

        rb.stat.write(0);
        assert_eq!(serial.read(), Err(nb::Error::WouldBlock));

        rb.stat.write(usart::STAT_RBNE);
        rb.rdata.write(b'x'.into());
        assert_eq!(serial.read(), Ok(b'x'));
    }

    #[test]
    fn writes_wait_for_the_transmit_buffer() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        assert_eq!(serial.write(b'a'), Err(nb::Error::WouldBlock));
        assert_eq!(serial.flush(), Err(nb::Error::WouldBlock));

        rb.stat.write(usart::STAT_TBE | usart::STAT_TC);
        assert_eq!(serial.write(b'a'), Ok(()));
        assert_eq!(rb.tdata.read(), u32::from(b'a'));
        assert_eq!(serial.flush(), Ok(()));

        write!(serial, "ok {}", 7).unwrap();
        assert_eq!(rb.tdata.read(), u32::from(b'7'));
    }

    #[test]
    fn nine_bit_blocking_transfers() {
        let rb = regs();
        let mut serial = Serial::new(&rb);
        rb.stat.write(usart::STAT_TBE | usart::STAT_RBNE);

        serial.send_blocking(0x3FF);
        assert_eq!(rb.tdata.read(), 0x1FF);

        rb.rdata.write(0xFF_FFFF);
        assert_eq!(serial.recv_blocking(), 0x1FF);
    }

    #[test]
    fn enable_and_disable() {
        let rb = regs();
        let mut serial = Serial::new(&rb);

        serial.enable();
        assert_eq!(rb.ctl0.read(), usart::CTL0_UEN);
        serial.disable();
        assert_eq!(rb.ctl0.read(), 0);
        serial.clear_errors();
        assert_eq!(rb.intc.read(), 0x0F);
    }
}
