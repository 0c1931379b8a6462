use crate::{
    brightness_registers, interface,
    ramp::ramp_code,
    register::{BankRegister, BitFlags, Register},
    validate_banks, Bank, BankConfig, BrightnessMode, ConfigStep, Error, MAX_BRIGHTNESS,
};

/// Async driver for the LM3697.
pub struct Lm3697<I> {
    interface: I,
}

impl<IE, I2C> Lm3697<interface::nb::I2cInterface<I2C>>
where
    I2C: embedded_hal_async::i2c::I2c<Error = IE>,
{
    pub fn new_with_i2c(i2c: I2C, address: u8) -> Lm3697<interface::nb::I2cInterface<I2C>> {
        Lm3697::new(interface::nb::I2cInterface::new(i2c, address))
    }

    /// Destroys the driver and releases the owned `I2c`-interface.
    pub fn release(self) -> I2C {
        self.interface.release()
    }
}

impl<I, IE> Lm3697<I>
where
    I: interface::nb::RegisterAccess<Error = Error<IE>>,
{
    pub fn new(interface: I) -> Self {
        Self { interface }
    }

    /// Checks the wiring of `banks`, initializes the chip and configures every bank.
    pub async fn setup(&mut self, banks: &[BankConfig]) -> Result<(), Error<IE>> {
        validate_banks::<IE>(banks)?;

        self.init().await?;
        for config in banks {
            self.configure(config).await?;
        }

        Ok(())
    }

    /// Selects independent ramp times for every bank.
    pub async fn init(&mut self) -> Result<(), Error<IE>> {
        self.interface
            .update_bits(
                Register::RAMP_CONFIG,
                BitFlags::RAMP_CONFIG_MASK,
                BitFlags::RAMP_CONFIG_EACH,
            )
            .await
    }

    pub async fn configure(&mut self, config: &BankConfig) -> Result<(), Error<IE>> {
        for step in ConfigStep::SEQUENCE {
            self.configure_step(step, config).await?;
        }

        #[cfg(feature = "log")]
        log::debug!("lm3697: bank {:?} configured", config.bank);

        Ok(())
    }

    pub async fn configure_step(
        &mut self,
        step: ConfigStep,
        config: &BankConfig,
    ) -> Result<(), Error<IE>> {
        let index = config.bank.index();

        match step {
            ConfigStep::ControlMode => {
                if config.brightness_mode == BrightnessMode::Pwm {
                    let bit = config.bank.mask();
                    self.interface
                        .update_bits(Register::PWM_CONFIG, bit, bit)
                        .await?;
                }
            }
            ConfigStep::Strings => {
                if config.strings.is_empty() {
                    #[cfg(feature = "log")]
                    log::error!("lm3697: no backlight string found for bank {:?}", config.bank);

                    return Err(Error::NoStringAssigned(config.bank));
                }

                for line in config.strings.iter() {
                    self.interface
                        .update_bits(
                            Register::HVLED_OUTPUT_CONFIG,
                            line.mask(),
                            config.bank.id() << line.index(),
                        )
                        .await?;
                }
            }
            ConfigStep::CurrentLimit => {
                self.interface
                    .write_register(BankRegister::FULL_SCALE_CURRENT[index], config.current_limit)
                    .await?;
            }
            ConfigStep::Ramp => {
                if let Some(code) = ramp_code(config.ramp_up_ms) {
                    self.interface
                        .update_bits(
                            BankRegister::RAMP[index],
                            BitFlags::RAMP_UP_MASK,
                            code << BitFlags::RAMP_UP_SHIFT,
                        )
                        .await?;
                }
                if let Some(code) = ramp_code(config.ramp_down_ms) {
                    self.interface
                        .update_bits(
                            BankRegister::RAMP[index],
                            BitFlags::RAMP_DOWN_MASK,
                            code << BitFlags::RAMP_DOWN_SHIFT,
                        )
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Sets the brightness of `bank`, LSB first. Values above [`MAX_BRIGHTNESS`] are clamped.
    pub async fn set_brightness(&mut self, bank: Bank, brightness: u16) -> Result<(), Error<IE>> {
        let (lsb, msb) = brightness_registers(brightness);

        self.interface
            .update_bits(
                BankRegister::BRIGHTNESS_LSB[bank.index()],
                BitFlags::BRIGHTNESS_LSB_MASK,
                lsb,
            )
            .await?;
        self.interface
            .write_register(BankRegister::BRIGHTNESS_MSB[bank.index()], msb)
            .await
    }

    pub async fn set_enabled(&mut self, bank: Bank, enable: bool) -> Result<(), Error<IE>> {
        let bit = bank.mask();
        self.interface
            .update_bits(Register::BANK_ENABLE, bit, if enable { bit } else { 0 })
            .await
    }

    /// See [`crate::Lm3697::update_status`].
    pub async fn update_status(
        &mut self,
        config: &BankConfig,
        brightness: u16,
    ) -> Result<(), Error<IE>> {
        let brightness = brightness.min(MAX_BRIGHTNESS);

        self.set_enabled(config.bank, brightness > 0).await?;

        match config.brightness_mode {
            BrightnessMode::Bus => self.set_brightness(config.bank, brightness).await,
            BrightnessMode::Pwm => Ok(()),
        }
    }
}

#[cfg(test)]
impl<I> Lm3697<I> {
    pub(crate) fn into_interface(self) -> I {
        self.interface
    }
}
