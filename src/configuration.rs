use crate::{Bank, BrightnessMode, Error, HvLed, Strings};

/// Full-scale current code the chip comes out of reset with (20.2 mA)
pub const DEFAULT_CURRENT_LIMIT: u8 = 0x13;

/// Configuration of a single control bank, as described by the board wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct BankConfig {
    pub(crate) bank: Bank,
    pub(crate) brightness_mode: BrightnessMode,
    pub(crate) current_limit: u8,
    pub(crate) ramp_up_ms: u32,
    pub(crate) ramp_down_ms: u32,
    pub(crate) strings: Strings,
}

macro_rules! builder_property {
    ($field:ident, $field_type:path, $doc:literal) => {
        #[doc = $doc]
        pub fn $field(mut self, $field: $field_type) -> Self {
            self.$field = $field;
            self
        }
    };
}

impl BankConfig {
    /// Create a new configuration for `bank` with the power-on defaults: bus driven
    /// brightness, default full-scale current, no ramps and no strings assigned.
    pub const fn new(bank: Bank) -> Self {
        Self {
            bank,
            brightness_mode: BrightnessMode::Bus,
            current_limit: DEFAULT_CURRENT_LIMIT,
            ramp_up_ms: 0,
            ramp_down_ms: 0,
            strings: Strings::NONE,
        }
    }

    builder_property!(
        brightness_mode,
        BrightnessMode,
        "Brightness source of this bank"
    );
    builder_property!(
        current_limit,
        u8,
        "Full-scale current code, written to the chip as is"
    );
    builder_property!(
        ramp_up_ms,
        u32,
        "Requested start-up ramp time, rounded down to a supported step"
    );
    builder_property!(
        ramp_down_ms,
        u32,
        "Requested shut-down ramp time, rounded down to a supported step"
    );
    builder_property!(strings, Strings, "HVLED strings driven by this bank");

    pub fn bank(&self) -> Bank {
        self.bank
    }
}

/// A single step of the bank configuration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum ConfigStep {
    /// Select PWM input as brightness source, if requested
    ControlMode,
    /// Route the bank's HVLED strings to it
    Strings,
    /// Program the full-scale current
    CurrentLimit,
    /// Program start-up and shut-down ramp times
    Ramp,
}

impl ConfigStep {
    /// Order in which the steps are applied. A failing step aborts the sequence.
    pub const SEQUENCE: [ConfigStep; 4] = [
        ConfigStep::ControlMode,
        ConfigStep::Strings,
        ConfigStep::CurrentLimit,
        ConfigStep::Ramp,
    ];
}

/// Checks the wiring of all `banks` against each other: every bank drives at least one
/// string, no string is claimed by more than one bank and no bank is listed twice.
pub fn validate_banks<IE>(banks: &[BankConfig]) -> Result<(), Error<IE>> {
    let mut seen_banks = [false; Bank::COUNT];
    let mut claimed = Strings::NONE;

    for config in banks {
        if seen_banks[config.bank.index()] {
            #[cfg(feature = "log")]
            log::error!("lm3697: bank {:?} configured twice", config.bank);

            return Err(Error::DuplicateBank(config.bank));
        }
        seen_banks[config.bank.index()] = true;

        if config.strings.is_empty() {
            #[cfg(feature = "log")]
            log::error!("lm3697: no backlight string found for bank {:?}", config.bank);

            return Err(Error::NoStringAssigned(config.bank));
        }

        if let Some(line) = HvLed::ALL
            .into_iter()
            .find(|&line| config.strings.contains(line) && claimed.contains(line))
        {
            #[cfg(feature = "log")]
            log::error!("lm3697: {:?} claimed by more than one bank", line);

            return Err(Error::StringConflict(line));
        }
        claimed = claimed | config.strings;
    }

    Ok(())
}
