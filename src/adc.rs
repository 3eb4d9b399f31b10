//! # API for the Analog to Digital converter
//!
//! The driver is a thin layer over the ADC registers: every method sets or clears the
//! bitfields it is named after and leaves the rest of the register alone. It works on
//! anything that dereferences to the ADC [`RegisterBlock`], which is normally the
//! [`pac::ADC`] singleton.
//!
//! ## Example usage:
//!  ```ignore
//! let p = pac::Peripherals::take().unwrap();
//! let mut rcu = p.RCU.constrain();
//!
//! let mut adc = Adc::adc(p.ADC, &mut rcu);
//! adc.setup_oneshot();
//! adc.power_on();
//! adc.calibrate();
//!
//! adc.set_regular_sequence(&[0, 1, 16])?;
//! adc.set_sample_time(16, SampleTime::T_239)?;
//! adc.start_conversion_regular();
//! while !adc.eoc() {}
//! let value = adc.read_regular();
//!  ```

use core::ops::Deref;

use embedded_hal::adc::{Channel, OneShot};

use crate::pac::adc::{self, RegisterBlock};
use crate::pac::{self, Reg};
use crate::rcu::{Enable, Rcu, Reset};

/// Highest channel number (VBAT / 2)
pub const MAX_CHANNEL: u8 = 18;

/// Number of ranks in the regular group
pub const REGULAR_SEQUENCE_LENGTH: usize = 16;

/// Number of ranks in the inserted group
pub const INSERTED_SEQUENCE_LENGTH: usize = 4;

/// Longest burst in regular discontinuous mode
pub const MAX_DISCONTINUOUS_LENGTH: u8 = 8;

/// Typical Vtemp at 25°C, in mV.
const VTEMP_25: i32 = 1430;

/// Typical dV/°C for Vtemp, in tenths of a mV.
const VTEMP_SLOPE: i32 = 43;

/// Internal reference voltage, in mV.
const VREFINT: u32 = 1200;

/// ADC operation result
pub type Result<T> = core::result::Result<T, Error>;

/// ADC configuration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Channel number above [`MAX_CHANNEL`]
    InvalidChannel(u8),
    /// Sequence or burst length out of range for the group
    InvalidLength(usize),
    /// Oversampling shift above 8 bits
    InvalidShift(u8),
    /// Inserted data register index above 3
    InvalidIndex(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(non_camel_case_types)]
/// ADC sampling time
///
/// Options for the sampling time, each is T + 0.5 ADC clock cycles.
pub enum SampleTime {
    /// 1.5 cycles sampling time
    T_1,
    /// 7.5 cycles sampling time
    T_7,
    /// 13.5 cycles sampling time
    T_13,
    /// 28.5 cycles sampling time
    T_28,
    /// 41.5 cycles sampling time
    T_41,
    /// 55.5 cycles sampling time
    T_55,
    /// 71.5 cycles sampling time
    T_71,
    /// 239.5 cycles sampling time
    T_239,
}

impl Default for SampleTime {
    /// Get the default sample time (currently 28.5 cycles)
    fn default() -> Self {
        SampleTime::T_28
    }
}

impl From<SampleTime> for u8 {
    fn from(val: SampleTime) -> Self {
        use SampleTime::*;
        match val {
            T_1 => 0,
            T_7 => 1,
            T_13 => 2,
            T_28 => 3,
            T_41 => 4,
            T_55 => 5,
            T_71 => 6,
            T_239 => 7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// ADC data register alignment
pub enum Align {
    /// Right alignment of output data
    Right,
    /// Left alignment of output data
    Left,
}

impl Default for Align {
    /// Default: right alignment
    fn default() -> Self {
        Align::Right
    }
}

impl From<Align> for bool {
    fn from(val: Align) -> Self {
        match val {
            Align::Right => false,
            Align::Left => true,
        }
    }
}

/// Combination of scan and continuous mode
///
/// Every variant also turns discontinuous mode off for both groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    /// Convert one channel once per trigger
    Single,
    /// Convert one channel over and over
    Continuous,
    /// Convert the whole group once per trigger
    Scan,
    /// Convert the whole group over and over
    ScanContinuous,
}

/// External trigger for the regular group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RegularTrigger {
    /// TIMER0 channel 0
    Timer0Ch0 = 0,
    /// TIMER0 channel 1
    Timer0Ch1 = 1,
    /// TIMER0 channel 2
    Timer0Ch2 = 2,
    /// TIMER1 channel 1
    Timer1Ch1 = 3,
    /// TIMER2 TRGO
    Timer2Trgo = 4,
    /// TIMER14 channel 0
    Timer14Ch0 = 5,
    /// EXTI line 11
    Exti11 = 6,
    /// Software trigger (SWRCST)
    Software = 7,
}

/// External trigger for the inserted group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InsertedTrigger {
    /// TIMER0 TRGO
    Timer0Trgo = 0,
    /// TIMER0 channel 3
    Timer0Ch3 = 1,
    /// TIMER1 TRGO
    Timer1Trgo = 2,
    /// TIMER1 channel 0
    Timer1Ch0 = 3,
    /// TIMER2 channel 3
    Timer2Ch3 = 4,
    /// TIMER14 TRGO
    Timer14Trgo = 5,
    /// EXTI line 15
    Exti15 = 6,
    /// Software trigger (SWICST)
    Software = 7,
}

/// One of the four inserted data registers and its matching offset register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InsertedData {
    /// IDATA0 / IOFF0
    Data0,
    /// IDATA1 / IOFF1
    Data1,
    /// IDATA2 / IOFF2
    Data2,
    /// IDATA3 / IOFF3
    Data3,
}

impl TryFrom<u8> for InsertedData {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(InsertedData::Data0),
            1 => Ok(InsertedData::Data1),
            2 => Ok(InsertedData::Data2),
            3 => Ok(InsertedData::Data3),
            _ => Err(Error::InvalidIndex(index)),
        }
    }
}

impl InsertedData {
    fn data(self, rb: &RegisterBlock) -> &Reg {
        match self {
            InsertedData::Data0 => &rb.idata0,
            InsertedData::Data1 => &rb.idata1,
            InsertedData::Data2 => &rb.idata2,
            InsertedData::Data3 => &rb.idata3,
        }
    }

    fn offset(self, rb: &RegisterBlock) -> &Reg {
        match self {
            InsertedData::Data0 => &rb.ioff0,
            InsertedData::Data1 => &rb.ioff1,
            InsertedData::Data2 => &rb.ioff2,
            InsertedData::Data3 => &rb.ioff3,
        }
    }
}

bitflags::bitflags! {
    /// ADC status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Events: u32 {
        /// Analog watchdog event
        const WDE = adc::STAT_WDE;
        /// End of group conversion
        const EOC = adc::STAT_EOC;
        /// End of inserted group conversion
        const EOIC = adc::STAT_EOIC;
        /// Inserted group conversion started
        const STIC = adc::STAT_STIC;
        /// Regular group conversion started
        const STRC = adc::STAT_STRC;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Events {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Events({=u32:#x})", self.bits())
    }
}

/// Interrupt sources
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// End of group conversion (EOCIE)
    Eoc,
    /// End of inserted group conversion (EOICIE)
    Eoic,
    /// Analog watchdog event (WDEIE)
    Watchdog,
}

impl Interrupt {
    fn mask(self) -> u32 {
        match self {
            Interrupt::Eoc => adc::CTL0_EOCIE,
            Interrupt::Eoic => adc::CTL0_EOICIE,
            Interrupt::Watchdog => adc::CTL0_WDEIE,
        }
    }
}

/// Oversampling ratio
#[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OversamplingRatio {
    X2 = 0,
    X4 = 1,
    X8 = 2,
    X16 = 3,
    X32 = 4,
    X64 = 5,
    X128 = 6,
    X256 = 7,
}

/// ADC driver
pub struct Adc<ADC> {
    rb: ADC,
    /// The sample time to use for one-off conversions.
    pub sample_time: SampleTime,
    align: Align,
}

impl Adc<pac::ADC> {
    /// Enables and resets the ADC clock, then wraps the peripheral
    ///
    /// The ADC is left powered down and uncalibrated.
    pub fn adc(adc: pac::ADC, rcu: &mut Rcu) -> Self {
        pac::ADC::enable(rcu);
        pac::ADC::reset(rcu);

        Self::new(adc)
    }

    /// Powers down the ADC, disables the ADC clock and releases the ADC peripheral.
    pub fn free(mut self, rcu: &mut Rcu) -> pac::ADC {
        self.power_off();
        pac::ADC::disable(rcu);
        self.rb
    }
}

impl<ADC> Adc<ADC>
where
    ADC: Deref<Target = RegisterBlock>,
{
    /// Wraps an ADC register block without touching the hardware
    pub fn new(rb: ADC) -> Self {
        Adc {
            rb,
            sample_time: SampleTime::default(),
            align: Align::default(),
        }
    }

    /// Releases the register block
    pub fn release(self) -> ADC {
        self.rb
    }

    /// Turns the ADC on
    ///
    /// The ADC needs 14 ADC clock cycles to stabilise before calibration or the
    /// first conversion.
    pub fn power_on(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_ADCON);
    }

    /// Turns the ADC off to reduce power consumption to a few microamps
    pub fn power_off(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_ADCON);
    }

    pub fn is_power_on(&self) -> bool {
        self.rb.ctl1.is_set(adc::CTL1_ADCON)
    }

    pub fn is_power_off(&self) -> bool {
        !self.is_power_on()
    }

    /// Resets the calibration registers
    ///
    /// The hardware clears RSTCLB once the reset is done.
    pub fn reset_calibration(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_RSTCLB);
    }

    /// Starts a calibration without waiting for it to finish
    pub fn calibrate_async(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_CLB);
    }

    /// Returns `true` while a calibration started with [`Adc::calibrate_async`] runs
    pub fn is_calibrating(&self) -> bool {
        self.rb.ctl1.is_set(adc::CTL1_CLB)
    }

    /// Resets the calibration, then calibrates, blocking until both are done
    ///
    /// The ADC must be powered on and stable.
    pub fn calibrate(&mut self) {
        self.reset_calibration();
        while self.rb.ctl1.is_set(adc::CTL1_RSTCLB) {}

        self.calibrate_async();
        while self.is_calibrating() {}
    }

    /// Sets ADC continuous conversion
    ///
    /// When continuous conversion is enabled conversion does not stop at the last selected group
    /// channel but continues again from the first selected group channel.
    pub fn set_continuous_conversion_mode(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_CTN);
    }

    /// Stops after one conversion of the group
    pub fn set_single_conversion_mode(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_CTN);
    }

    /// Sets the scan and continuous bits together, turning discontinuous mode off
    pub fn set_operation_mode(&mut self, mode: ConversionMode) {
        let (scan, continuous) = match mode {
            ConversionMode::Single => (false, false),
            ConversionMode::Continuous => (false, true),
            ConversionMode::Scan => (true, false),
            ConversionMode::ScanContinuous => (true, true),
        };

        self.rb.ctl0.modify(|r| {
            let r = r & !(adc::CTL0_DISIC | adc::CTL0_DISRC | adc::CTL0_SM);
            if scan {
                r | adc::CTL0_SM
            } else {
                r
            }
        });
        if continuous {
            self.set_continuous_conversion_mode();
        } else {
            self.set_single_conversion_mode();
        }
    }

    /// Enables discontinuous mode on the regular group
    ///
    /// Each trigger converts the next `length` channels of the regular group (1 to 8).
    /// Once the whole group has been converted the next trigger starts over from the
    /// first rank.
    pub fn enable_regular_discontinuous_mode(&mut self, length: u8) -> Result<()> {
        if length == 0 || length > MAX_DISCONTINUOUS_LENGTH {
            return Err(Error::InvalidLength(length.into()));
        }

        self.rb.ctl0.modify(|r| {
            (r & !adc::CTL0_DISNUM)
                | adc::CTL0_DISRC
                | (u32::from(length - 1) << adc::CTL0_DISNUM_SHIFT)
        });
        Ok(())
    }

    pub fn disable_regular_discontinuous_mode(&mut self) {
        self.rb.ctl0.clear_bits(adc::CTL0_DISRC);
    }

    /// Enables discontinuous mode on the inserted group: one channel per trigger
    pub fn enable_inserted_discontinuous_mode(&mut self) {
        self.rb.ctl0.set_bits(adc::CTL0_DISIC);
    }

    pub fn disable_inserted_discontinuous_mode(&mut self) {
        self.rb.ctl0.clear_bits(adc::CTL0_DISIC);
    }

    /// ADC Set a Regular Channel Conversion Sequence
    ///
    /// Define a sequence of 1 to 16 channels to be converted as a regular group. Rank `i`
    /// lands in RSQ2 for ranks 0 to 5, RSQ1 for ranks 6 to 11 and RSQ0 for ranks 12 to 15.
    /// Ranks past the end of the sequence are cleared.
    pub fn set_regular_sequence(&mut self, channels: &[u8]) -> Result<()> {
        let length = sequence_length(channels, REGULAR_SEQUENCE_LENGTH)?;
        check_channels(channels)?;

        self.write_regular_sequence(channels, length);
        Ok(())
    }

    fn write_regular_sequence(&self, channels: &[u8], length: u8) {
        // Indexed by rank / 6, which is RSQ2, RSQ1, RSQ0 in that order
        let mut rsq = [0u32; 3];
        for (rank, &channel) in channels.iter().enumerate() {
            let slot = (rank % adc::RSQ_SLOTS_PER_REGISTER) as u32;
            rsq[rank / adc::RSQ_SLOTS_PER_REGISTER] |= u32::from(channel) << (slot * adc::SQ_WIDTH);
        }

        self.rb.rsq2.modify(|r| (r & !adc::RSQ_SLOTS) | rsq[0]);
        self.rb.rsq1.modify(|r| (r & !adc::RSQ_SLOTS) | rsq[1]);
        self.rb.rsq0.modify(|r| {
            (r & !(adc::RSQ0_SLOTS | adc::RSQ0_RL))
                | rsq[2]
                | (u32::from(length - 1) << adc::RSQ0_RL_SHIFT)
        });
    }

    /// ADC Set an Inserted Channel Conversion Sequence
    ///
    /// Define a sequence of 1 to 4 channels to be converted as the inserted group. The
    /// hardware starts the inserted group from slot `4 - length`, so the channels are
    /// stored right-justified in ISQ.
    pub fn set_inserted_sequence(&mut self, channels: &[u8]) -> Result<()> {
        let length = sequence_length(channels, INSERTED_SEQUENCE_LENGTH)?;
        check_channels(channels)?;

        let first_slot = INSERTED_SEQUENCE_LENGTH - channels.len();
        let bits = channels.iter().enumerate().fold(0u32, |s, (i, &c)| {
            s | (u32::from(c) << ((first_slot + i) as u32 * adc::SQ_WIDTH))
        });

        self.rb.isq.modify(|r| {
            (r & !(adc::ISQ_SLOTS | adc::ISQ_IL))
                | bits
                | (u32::from(length - 1) << adc::ISQ_IL_SHIFT)
        });
        Ok(())
    }

    /// Set ADC sampling time for particular channel
    ///
    /// On GD32F130/GD32F150 channel 18 (VBAT) has no field of its own and shares
    /// channel 0's, so setting either one changes both.
    pub fn set_sample_time(&mut self, channel: u8, sample_time: SampleTime) -> Result<()> {
        let (reg, field) =
            self.sample_time_field(channel).ok_or(Error::InvalidChannel(channel))?;
        write_sample_time(reg, field, sample_time);
        Ok(())
    }

    /// Set the same sampling time on every channel
    pub fn set_sample_time_all_channels(&mut self, sample_time: SampleTime) {
        for channel in 0..=MAX_CHANNEL {
            if let Some((reg, field)) = self.sample_time_field(channel) {
                write_sample_time(reg, field, sample_time);
            }
        }
    }

    /// Register and field index holding the sampling time of `channel`
    fn sample_time_field(&self, channel: u8) -> Option<(&Reg, u32)> {
        match channel {
            0..=9 => Some((&self.rb.sampt1, u32::from(channel))),
            10..=17 => Some((
                &self.rb.sampt0,
                u32::from(channel - adc::SAMPT0_FIRST_CHANNEL),
            )),
            #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
            18 => Some((&self.rb.sampt0, 8)),
            // VBAT is sampled with the channel 0 setting on GD32F130/GD32F150
            #[cfg(not(any(feature = "gd32f170", feature = "gd32f190")))]
            18 => Some((&self.rb.sampt1, 0)),
            _ => None,
        }
    }

    /// Converts the inserted group right after the regular group
    ///
    /// The external trigger of the inserted group is turned off first, as the hardware
    /// requires.
    pub fn enable_automatic_inserted_group_conversion(&mut self) {
        self.disable_external_trigger_inserted();
        self.rb.ctl0.set_bits(adc::CTL0_ICA);
    }

    pub fn disable_automatic_inserted_group_conversion(&mut self) {
        self.rb.ctl0.clear_bits(adc::CTL0_ICA);
    }

    /// Set the inserted offset
    ///
    /// The 12-bit offset is subtracted from the raw inserted result (before alignment),
    /// so inserted results can be negative.
    pub fn set_inserted_offset(&mut self, data: InsertedData, offset: u16) {
        data.offset(&self.rb).write(u32::from(offset) & adc::IOFF_MASK);
    }

    /// Connects the temperature sensor and Vrefint to channels 16 and 17
    pub fn enable_vref_temperature_sensor(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_TSVREN);
    }

    pub fn disable_vref_temperature_sensor(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_TSVREN);
    }

    /// Connects VBAT / 2 to channel 18
    pub fn enable_vbat_sensor(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_VBATEN);
    }

    pub fn disable_vbat_sensor(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_VBATEN);
    }

    pub fn set_left_aligned(&mut self) {
        self.set_align(Align::Left);
    }

    pub fn set_right_aligned(&mut self) {
        self.set_align(Align::Right);
    }

    /// Set the Adc result alignment
    ///
    /// Options can be found in [Align](crate::adc::Align).
    pub fn set_align(&mut self, align: Align) {
        self.align = align;
        if align.into() {
            self.rb.ctl1.set_bits(adc::CTL1_DAL);
        } else {
            self.rb.ctl1.clear_bits(adc::CTL1_DAL);
        }
    }

    /// Requests a DMA transfer after each regular conversion
    pub fn enable_dma(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_DMA);
    }

    pub fn disable_dma(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_DMA);
    }

    /// Starts the regular group on `trigger`
    pub fn enable_external_trigger_regular(&mut self, trigger: RegularTrigger) {
        self.rb.ctl1.modify(|r| {
            (r & !adc::CTL1_ETSRC) | ((trigger as u32) << adc::CTL1_ETSRC_SHIFT) | adc::CTL1_ETERC
        });
    }

    pub fn disable_external_trigger_regular(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_ETERC | adc::CTL1_ETSRC);
    }

    /// Starts the inserted group on `trigger`
    pub fn enable_external_trigger_inserted(&mut self, trigger: InsertedTrigger) {
        self.rb.ctl1.modify(|r| {
            (r & !adc::CTL1_ETSIC) | ((trigger as u32) << adc::CTL1_ETSIC_SHIFT) | adc::CTL1_ETEIC
        });
    }

    pub fn disable_external_trigger_inserted(&mut self) {
        self.rb.ctl1.clear_bits(adc::CTL1_ETEIC | adc::CTL1_ETSIC);
    }

    /// Starts listening for an interrupt event
    pub fn listen(&mut self, interrupt: Interrupt) {
        self.rb.ctl0.set_bits(interrupt.mask());
    }

    /// Stops listening for an interrupt event
    pub fn unlisten(&mut self, interrupt: Interrupt) {
        self.rb.ctl0.clear_bits(interrupt.mask());
    }

    /// Returns the status flags currently raised
    pub fn flags(&self) -> Events {
        Events::from_bits_truncate(self.rb.stat.read())
    }

    /// Clears the given status flags
    ///
    /// STAT bits are cleared by writing 0, so every other flag is written back as 1.
    pub fn clear_flags(&mut self, events: Events) {
        self.rb.stat.write(adc::STAT_MASK & !events.bits());
    }

    /// End of conversion of the regular group
    pub fn eoc(&self) -> bool {
        self.flags().contains(Events::EOC)
    }

    /// End of conversion of the inserted group
    pub fn eoic(&self) -> bool {
        self.flags().contains(Events::EOIC)
    }

    /// A converted value left the analog watchdog window
    pub fn watchdog_event(&self) -> bool {
        self.flags().contains(Events::WDE)
    }

    pub fn get_watchdog_flag(&self) -> bool {
        self.watchdog_event()
    }

    pub fn clear_watchdog_flag(&mut self) {
        self.clear_flags(Events::WDE);
    }

    pub fn get_eoc_flag(&self) -> bool {
        self.eoc()
    }

    pub fn clear_eoc_flag(&mut self) {
        self.clear_flags(Events::EOC);
    }

    pub fn get_eoic_flag(&self) -> bool {
        self.eoic()
    }

    pub fn clear_eoic_flag(&mut self) {
        self.clear_flags(Events::EOIC);
    }

    pub fn get_regular_started_flag(&self) -> bool {
        self.flags().contains(Events::STRC)
    }

    pub fn clear_regular_started_flag(&mut self) {
        self.clear_flags(Events::STRC);
    }

    pub fn get_inserted_started_flag(&self) -> bool {
        self.flags().contains(Events::STIC)
    }

    pub fn clear_inserted_started_flag(&mut self) {
        self.clear_flags(Events::STIC);
    }

    pub fn enable_eoc_interrupt(&mut self) {
        self.listen(Interrupt::Eoc);
    }

    pub fn disable_eoc_interrupt(&mut self) {
        self.unlisten(Interrupt::Eoc);
    }

    pub fn enable_eoic_interrupt(&mut self) {
        self.listen(Interrupt::Eoic);
    }

    pub fn disable_eoic_interrupt(&mut self) {
        self.unlisten(Interrupt::Eoic);
    }

    pub fn enable_watchdog_interrupt(&mut self) {
        self.listen(Interrupt::Watchdog);
    }

    pub fn disable_watchdog_interrupt(&mut self) {
        self.unlisten(Interrupt::Watchdog);
    }

    /// Enables the analog watchdog on one channel of both groups
    pub fn enable_analog_watchdog_on_selected_channel(&mut self, channel: u8) -> Result<()> {
        if channel > MAX_CHANNEL {
            return Err(Error::InvalidChannel(channel));
        }

        self.rb.ctl0.modify(|r| {
            (r & !adc::CTL0_WDCHSEL)
                | (u32::from(channel) << adc::CTL0_WDCHSEL_SHIFT)
                | adc::CTL0_WDSC
                | adc::CTL0_RWDEN
                | adc::CTL0_IWDEN
        });
        Ok(())
    }

    /// Enables the analog watchdog on every channel of both groups
    pub fn enable_analog_watchdog_on_all_channels(&mut self) {
        self.rb.ctl0.modify(|r| (r & !adc::CTL0_WDSC) | adc::CTL0_RWDEN | adc::CTL0_IWDEN);
    }

    pub fn disable_analog_watchdog(&mut self) {
        self.rb.ctl0.clear_bits(adc::CTL0_RWDEN | adc::CTL0_IWDEN);
    }

    /// Upper bound of the watchdog window (12 bits)
    pub fn set_watchdog_high_threshold(&mut self, threshold: u16) {
        self.rb.wdht.write(u32::from(threshold) & adc::WDHT_MASK);
    }

    /// Lower bound of the watchdog window (12 bits)
    pub fn set_watchdog_low_threshold(&mut self, threshold: u16) {
        self.rb.wdlt.write(u32::from(threshold) & adc::WDLT_MASK);
    }

    /// Reads the last regular conversion result
    ///
    /// The result is 12 bits, right or left aligned within the 16 bits. Reading it
    /// clears EOC.
    pub fn read_regular(&self) -> u16 {
        (self.rb.rdata.read() & adc::DATA_MASK) as u16
    }

    /// Reads an inserted conversion result
    ///
    /// The result goes negative when the inserted offset is larger than the raw value.
    pub fn read_inserted(&self, data: InsertedData) -> i16 {
        (data.data(&self.rb).read() & adc::DATA_MASK) as u16 as i16
    }

    /// Software start of the regular group
    ///
    /// The trigger source must be [`RegularTrigger::Software`]. Blocks until the hardware
    /// reports that the conversion started.
    pub fn start_conversion_regular(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_SWRCST);
        while !self.flags().contains(Events::STRC) {}
    }

    /// Software start of the inserted group
    ///
    /// The trigger source must be [`InsertedTrigger::Software`]. Blocks until the hardware
    /// reports that the conversion started.
    pub fn start_conversion_inserted(&mut self) {
        self.rb.ctl1.set_bits(adc::CTL1_SWICST);
        while !self.flags().contains(Events::STIC) {}
    }

    /// Enables oversampling: `ratio` samples are summed, then shifted right by `shift` bits
    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    pub fn enable_oversampling(&mut self, ratio: OversamplingRatio, shift: u8) -> Result<()> {
        if shift > 8 {
            return Err(Error::InvalidShift(shift));
        }

        self.rb.ovsampctl.modify(|r| {
            (r & !(adc::OVSAMPCTL_OVSR | adc::OVSAMPCTL_OVSS))
                | ((ratio as u32) << adc::OVSAMPCTL_OVSR_SHIFT)
                | (u32::from(shift) << adc::OVSAMPCTL_OVSS_SHIFT)
                | adc::OVSAMPCTL_OVSEN
        });
        Ok(())
    }

    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    pub fn disable_oversampling(&mut self) {
        self.rb.ovsampctl.clear_bits(adc::OVSAMPCTL_OVSEN);
    }

    /// Each oversampled conversion needs its own trigger
    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    pub fn enable_triggered_oversampling(&mut self) {
        self.rb.ovsampctl.set_bits(adc::OVSAMPCTL_TOVS);
    }

    #[cfg(any(feature = "gd32f170", feature = "gd32f190"))]
    pub fn disable_triggered_oversampling(&mut self) {
        self.rb.ovsampctl.clear_bits(adc::OVSAMPCTL_TOVS);
    }

    /// Configures single, software-triggered conversions of the regular group
    pub fn setup_oneshot(&mut self) {
        self.set_operation_mode(ConversionMode::Single);
        self.enable_external_trigger_regular(RegularTrigger::Software);
    }

    /// Performs a single conversion of `channel` with [`Adc::sample_time`]
    ///
    /// Expects the ADC to be set up with [`Adc::setup_oneshot`], powered on and calibrated.
    pub fn convert(&mut self, channel: u8) -> Result<u16> {
        if channel > MAX_CHANNEL {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(self.convert_channel(channel))
    }

    fn convert_channel(&mut self, channel: u8) -> u16 {
        // Dummy read in case something accidentally triggered a conversion by
        // writing to CTL1 without changing any of the bits
        self.rb.rdata.read();

        if let Some((reg, field)) = self.sample_time_field(channel) {
            write_sample_time(reg, field, self.sample_time);
        }
        self.write_regular_sequence(&[channel], 1);

        self.set_align(self.align);
        self.rb.ctl1.set_bits(adc::CTL1_SWRCST);
        while !self.eoc() {}

        self.read_regular()
    }

    /// Returns the largest possible sample value for the current settings
    pub fn max_sample(&self) -> u16 {
        match self.align {
            Align::Left => u16::MAX,
            Align::Right => (1 << 12) - 1,
        }
    }

    /// Reads the internal reference voltage which is connected to channel 17 of the ADC.
    ///
    /// This should always be 1.2 V, so is useful for converting other ADC inputs to voltages.
    pub fn read_vref(&mut self) -> u16 {
        self.read_aux(VRef::channel())
    }

    /// Reads the internal temperature sensor.
    ///
    /// It is recommended to set the sampling time to at least 17.1 µs before calling this.
    /// Returns the temperature in °C, assuming typical calibration values.
    pub fn read_temperature(&mut self) -> i16 {
        let vtemp_value = u32::from(self.read_aux(VTemp::channel()));
        let vref_value = u32::from(self.read_vref()).max(1);
        let vtemp = (vtemp_value * VREFINT / vref_value) as i32;

        ((VTEMP_25 - vtemp) * 10 / VTEMP_SLOPE + 25) as i16
    }

    /// Reads the backup battery voltage from channel 18 of the ADC.
    pub fn read_vbat(&mut self) -> u16 {
        let vbat_off = !self.rb.ctl1.is_set(adc::CTL1_VBATEN);
        if vbat_off {
            self.enable_vbat_sensor();
        }

        let value = self.convert_channel(VBat::channel());

        if vbat_off {
            self.disable_vbat_sensor();
        }

        // Vbat/2 is connected to ADC channel 18, so we need to double it again.
        value.saturating_mul(2)
    }

    /// Reads the temperature sensor or Vref on channel 16 or 17.
    fn read_aux(&mut self, channel: u8) -> u16 {
        let tsv_off = !self.rb.ctl1.is_set(adc::CTL1_TSVREN);
        if tsv_off {
            self.enable_vref_temperature_sensor();
        }

        let value = self.convert_channel(channel);

        if tsv_off {
            self.disable_vref_temperature_sensor();
        }

        value
    }
}

fn write_sample_time(reg: &Reg, field: u32, sample_time: SampleTime) {
    let shift = field * adc::SAMPT_WIDTH;
    reg.write_field(
        adc::SAMPT_MASK << shift,
        shift,
        u8::from(sample_time).into(),
    );
}

fn sequence_length(channels: &[u8], max: usize) -> Result<u8> {
    let length = cast::u8(channels.len()).map_err(|_| Error::InvalidLength(channels.len()))?;
    if length == 0 || usize::from(length) > max {
        return Err(Error::InvalidLength(channels.len()));
    }
    Ok(length)
}

fn check_channels(channels: &[u8]) -> Result<()> {
    match channels.iter().find(|&&channel| channel > MAX_CHANNEL) {
        Some(&channel) => Err(Error::InvalidChannel(channel)),
        None => Ok(()),
    }
}

impl<ADC, WORD, PIN> OneShot<pac::ADC, WORD, PIN> for Adc<ADC>
where
    ADC: Deref<Target = RegisterBlock>,
    WORD: From<u16>,
    PIN: Channel<pac::ADC, ID = u8>,
{
    type Error = Error;

    fn read(&mut self, _pin: &mut PIN) -> nb::Result<WORD, Self::Error> {
        let res = self.convert(PIN::channel())?;
        Ok(res.into())
    }
}

macro_rules! adc_channels {
    ($ADC:ident, $($(#[$meta:meta])* $name:ident => $chan:expr),+ $(,)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Default)]
            pub struct $name;

            impl Channel<pac::$ADC> for $name {
                type ID = u8;

                fn channel() -> u8 { $chan }
            }
        )+
    };
}

adc_channels!(ADC,
    /// External input 0 (PA0)
    Ain0 => 0,
    /// External input 1 (PA1)
    Ain1 => 1,
    /// External input 2 (PA2)
    Ain2 => 2,
    /// External input 3 (PA3)
    Ain3 => 3,
    /// External input 4 (PA4)
    Ain4 => 4,
    /// External input 5 (PA5)
    Ain5 => 5,
    /// External input 6 (PA6)
    Ain6 => 6,
    /// External input 7 (PA7)
    Ain7 => 7,
    /// External input 8 (PB0)
    Ain8 => 8,
    /// External input 9 (PB1)
    Ain9 => 9,
    /// External input 10 (PC0)
    Ain10 => 10,
    /// External input 11 (PC1)
    Ain11 => 11,
    /// External input 12 (PC2)
    Ain12 => 12,
    /// External input 13 (PC3)
    Ain13 => 13,
    /// External input 14 (PC4)
    Ain14 => 14,
    /// External input 15 (PC5)
    Ain15 => 15,
    /// Internal temperature sensor (ADC channel 16)
    VTemp => 16,
    /// Internal voltage reference (ADC channel 17)
    VRef => 17,
    /// Backup battery voltage / 2 (ADC channel 18)
    VBat => 18,
);
