//! Driver for the Texas Instruments LM3697 white LED backlight driver with two
//! control banks and three high-voltage LED strings.
//!
//! Datasheet: <https://www.ti.com/lit/ds/symlink/lm3697.pdf>

#![cfg_attr(not(test), no_std)]

mod configuration;
pub mod interface;
pub mod nb;
mod ramp;
mod register;

pub use configuration::{validate_banks, BankConfig, ConfigStep, DEFAULT_CURRENT_LIMIT};
use interface::RegisterAccess;
pub use ramp::{ramp_index, RAMP_TABLE_MS};
use ramp::ramp_code;
use register::{BankRegister, BitFlags, Register};

/// Error enum for the LM3697 driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<IE> {
    /// An interface related error has occured
    Interface(IE),

    /// The bank has no HVLED string assigned and would drive nothing
    NoStringAssigned(Bank),

    /// The HVLED string is claimed by more than one bank
    StringConflict(HvLed),

    /// The bank is configured more than once
    DuplicateBank(Bank),
}

/// Highest brightness value, 11 bits
pub const MAX_BRIGHTNESS: u16 = 2047;

/// Device tree compatible string of the backlight node
pub const COMPATIBLE: &str = "ti,lm3697-backlight";

/// Brightness changes of this chip are watched by the hwmon notifier
pub const HWMON_NOTIFIER_USED: bool = true;

/// Control bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Bank {
    A,
    B,
}

impl Bank {
    /// Number of control banks of the LM3697
    pub const COUNT: usize = 2;

    pub const fn id(&self) -> u8 {
        match self {
            Bank::A => 0,
            Bank::B => 1,
        }
    }

    pub const fn from_id(id: u8) -> Option<Bank> {
        match id {
            0 => Some(Bank::A),
            1 => Some(Bank::B),
            _ => None,
        }
    }

    pub(crate) const fn index(&self) -> usize {
        self.id() as usize
    }

    /// Bit of this bank in the shared enable and PWM registers
    pub(crate) const fn mask(&self) -> u8 {
        1 << self.id()
    }
}

/// High-voltage LED string output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum HvLed {
    Hvled1,
    Hvled2,
    Hvled3,
}

impl HvLed {
    pub const ALL: [HvLed; 3] = [HvLed::Hvled1, HvLed::Hvled2, HvLed::Hvled3];

    pub const fn index(&self) -> u8 {
        match self {
            HvLed::Hvled1 => 0,
            HvLed::Hvled2 => 1,
            HvLed::Hvled3 => 2,
        }
    }

    pub(crate) const fn mask(&self) -> u8 {
        1 << self.index()
    }
}

/// Set of HVLED strings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Strings(u8);

impl Strings {
    pub const NONE: Strings = Strings(0);
    pub const HVLED1: Strings = Strings(HvLed::Hvled1.mask());
    pub const HVLED2: Strings = Strings(HvLed::Hvled2.mask());
    pub const HVLED3: Strings = Strings(HvLed::Hvled3.mask());
    pub const ALL: Strings = Strings(0b111);

    /// Creates a set from a bitmask where bit `n` selects HVLED`n+1`. Unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Strings(bits & Self::ALL.0)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, line: HvLed) -> bool {
        self.0 & line.mask() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = HvLed> {
        let strings = *self;
        HvLed::ALL
            .into_iter()
            .filter(move |&line| strings.contains(line))
    }
}

impl core::ops::BitOr for Strings {
    type Output = Strings;

    fn bitor(self, rhs: Self) -> Self::Output {
        Strings(self.0 | rhs.0)
    }
}

impl From<HvLed> for Strings {
    fn from(line: HvLed) -> Self {
        Strings(line.mask())
    }
}

/// Brightness source of a bank
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum BrightnessMode {
    /// Brightness set through the brightness registers
    #[default]
    Bus,
    /// Brightness taken from the PWM input
    Pwm,
}

/// Splits `value` into the low register part with `lsb_bits` bits and the high byte
/// holding the bits above.
pub const fn split_brightness(value: u16, lsb_bits: u32) -> (u8, u8) {
    let lsb = (value & ((1 << lsb_bits) - 1)) as u8;
    let msb = ((value >> lsb_bits) & 0xff) as u8;
    (lsb, msb)
}

/// LSB and MSB register contents for `brightness`, clamped to [`MAX_BRIGHTNESS`].
pub const fn brightness_registers(brightness: u16) -> (u8, u8) {
    let brightness = if brightness > MAX_BRIGHTNESS {
        MAX_BRIGHTNESS
    } else {
        brightness
    };
    split_brightness(brightness, BitFlags::BRIGHTNESS_LSB_BITS)
}

/// Operations the multi-bank backlight framework drives a chip through.
pub trait BacklightOps {
    type Error;

    /// Highest brightness accepted by [`BacklightOps::update_brightness`].
    const MAX_BRIGHTNESS: u16;

    /// Supported ramp times in milliseconds.
    const RAMP_TABLE_MS: &'static [u32];

    /// Whether brightness changes are monitored by an auxiliary sensor.
    const HWMON_NOTIFIER_USED: bool;

    /// One-time chip setup, before any bank is configured.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Configures a single bank.
    fn configure(&mut self, config: &BankConfig) -> Result<(), Self::Error>;

    fn update_brightness(&mut self, bank: Bank, brightness: u16) -> Result<(), Self::Error>;

    fn bank_enable(&mut self, bank: Bank, enable: bool) -> Result<(), Self::Error>;
}

/// Driver for the LM3697.
///
/// The driver keeps no state besides the interface; everything lives in the chip.
pub struct Lm3697<I> {
    interface: I,
}

impl<IE, I2C> Lm3697<interface::I2cInterface<I2C>>
where
    I2C: embedded_hal::i2c::I2c<Error = IE>,
{
    pub fn new_with_i2c(i2c: I2C, address: u8) -> Lm3697<interface::I2cInterface<I2C>> {
        Lm3697::new(interface::I2cInterface::new(i2c, address))
    }

    /// Destroys the driver and releases the owned `I2c`-interface.
    pub fn release(self) -> I2C {
        self.interface.release()
    }
}

impl<I, IE> Lm3697<I>
where
    I: RegisterAccess<Error = Error<IE>>,
{
    /// Create a new LM3697 driver instance on top of `interface`. No registers are touched.
    pub fn new(interface: I) -> Self {
        Lm3697 { interface }
    }

    /// Checks the wiring of `banks`, initializes the chip and configures every bank.
    ///
    /// Banks are left disabled.
    pub fn setup(&mut self, banks: &[BankConfig]) -> Result<(), Error<IE>> {
        validate_banks::<IE>(banks)?;

        self.init()?;
        for config in banks {
            self.configure(config)?;
        }

        Ok(())
    }

    /// Chip wide setup: every bank uses the ramp times from its own ramp register.
    pub fn init(&mut self) -> Result<(), Error<IE>> {
        self.interface.update_bits(
            Register::RAMP_CONFIG,
            BitFlags::RAMP_CONFIG_MASK,
            BitFlags::RAMP_CONFIG_EACH,
        )
    }

    /// Applies all [`ConfigStep`]s in order. The first failing step aborts the sequence
    /// and nothing is rolled back; a bank that failed to configure should not be enabled.
    pub fn configure(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        for step in ConfigStep::SEQUENCE {
            self.configure_step(step, config)?;
        }

        #[cfg(feature = "log")]
        log::debug!("lm3697: bank {:?} configured", config.bank);

        Ok(())
    }

    /// Applies a single configuration step.
    pub fn configure_step(
        &mut self,
        step: ConfigStep,
        config: &BankConfig,
    ) -> Result<(), Error<IE>> {
        #[cfg(feature = "log")]
        log::trace!("lm3697: bank {:?}: {:?}", config.bank, step);

        match step {
            ConfigStep::ControlMode => self.set_control_mode(config),
            ConfigStep::Strings => self.assign_strings(config),
            ConfigStep::CurrentLimit => self.set_current_limit(config),
            ConfigStep::Ramp => self.set_ramp(config),
        }
    }

    fn set_control_mode(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        // bus control is the reset default
        match config.brightness_mode {
            BrightnessMode::Bus => Ok(()),
            BrightnessMode::Pwm => {
                let bit = config.bank.mask();
                self.interface.update_bits(Register::PWM_CONFIG, bit, bit)
            }
        }
    }

    fn assign_strings(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        if config.strings.is_empty() {
            #[cfg(feature = "log")]
            log::error!("lm3697: no backlight string found for bank {:?}", config.bank);

            return Err(Error::NoStringAssigned(config.bank));
        }

        for line in config.strings.iter() {
            self.interface.update_bits(
                Register::HVLED_OUTPUT_CONFIG,
                line.mask(),
                config.bank.id() << line.index(),
            )?;
        }

        Ok(())
    }

    fn set_current_limit(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        self.interface.write_register(
            BankRegister::FULL_SCALE_CURRENT[config.bank.index()],
            config.current_limit,
        )
    }

    fn set_ramp(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        let register = BankRegister::RAMP[config.bank.index()];

        if let Some(code) = ramp_code(config.ramp_up_ms) {
            self.interface.update_bits(
                register,
                BitFlags::RAMP_UP_MASK,
                code << BitFlags::RAMP_UP_SHIFT,
            )?;
        }

        if let Some(code) = ramp_code(config.ramp_down_ms) {
            self.interface.update_bits(
                register,
                BitFlags::RAMP_DOWN_MASK,
                code << BitFlags::RAMP_DOWN_SHIFT,
            )?;
        }

        Ok(())
    }

    /// Sets the brightness of `bank`. Values above [`MAX_BRIGHTNESS`] are clamped.
    ///
    /// The LSB register is written before the MSB register. The two writes are not atomic;
    /// if the LSB write fails the MSB register keeps its old value.
    pub fn set_brightness(&mut self, bank: Bank, brightness: u16) -> Result<(), Error<IE>> {
        let (lsb, msb) = brightness_registers(brightness);

        self.interface.update_bits(
            BankRegister::BRIGHTNESS_LSB[bank.index()],
            BitFlags::BRIGHTNESS_LSB_MASK,
            lsb,
        )?;
        self.interface
            .write_register(BankRegister::BRIGHTNESS_MSB[bank.index()], msb)
    }

    /// Enables or disables `bank`, leaving the other bank untouched.
    pub fn set_enabled(&mut self, bank: Bank, enable: bool) -> Result<(), Error<IE>> {
        let bit = bank.mask();
        self.interface
            .update_bits(Register::BANK_ENABLE, bit, if enable { bit } else { 0 })
    }

    /// Brightness update as issued by a backlight device: the bank is switched on for any
    /// non-zero brightness and off for zero. The brightness registers are only written for
    /// bus controlled banks, PWM controlled banks follow their PWM input.
    pub fn update_status(
        &mut self,
        config: &BankConfig,
        brightness: u16,
    ) -> Result<(), Error<IE>> {
        let brightness = brightness.min(MAX_BRIGHTNESS);

        self.set_enabled(config.bank, brightness > 0)?;

        match config.brightness_mode {
            BrightnessMode::Bus => self.set_brightness(config.bank, brightness),
            BrightnessMode::Pwm => Ok(()),
        }
    }
}

impl<I, IE> BacklightOps for Lm3697<I>
where
    I: RegisterAccess<Error = Error<IE>>,
{
    type Error = Error<IE>;

    const MAX_BRIGHTNESS: u16 = MAX_BRIGHTNESS;
    const RAMP_TABLE_MS: &'static [u32] = &RAMP_TABLE_MS;
    const HWMON_NOTIFIER_USED: bool = HWMON_NOTIFIER_USED;

    fn init(&mut self) -> Result<(), Self::Error> {
        Lm3697::init(self)
    }

    fn configure(&mut self, config: &BankConfig) -> Result<(), Self::Error> {
        Lm3697::configure(self, config)
    }

    fn update_brightness(&mut self, bank: Bank, brightness: u16) -> Result<(), Self::Error> {
        self.set_brightness(bank, brightness)
    }

    fn bank_enable(&mut self, bank: Bank, enable: bool) -> Result<(), Self::Error> {
        self.set_enabled(bank, enable)
    }
}

#[cfg(test)]
impl<I> Lm3697<I> {
    /// Destroys the driver and returns the owned interface.
    pub(crate) fn into_interface(self) -> I {
        self.interface
    }
}
