use embedded_hal::i2c;

use crate::Error;

/// Default 7-bit I2C address of the LM3697
pub const DEFAULT_ADDRESS: u8 = 0x36;

/// Trait for giving read and write access to registers
///
/// The bank enable, PWM and HVLED output registers are shared between banks and only
/// ever modified through [`RegisterAccess::update_bits`]. The provided implementation
/// is a plain read followed by a write, which is only atomic as long as nobody else
/// touches the chip in between. The driver holds the interface by `&mut`, so this holds
/// for a single driver instance; implementations shared between several owners must
/// serialize `update_bits` themselves.
pub trait RegisterAccess {
    type Error;

    /// Reads a single value from `register`.
    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;

    /// Writes a single value to `register`.
    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Updates the bits selected by `mask` in `register` to `value`, preserving all
    /// other bits.
    fn update_bits(&mut self, register: u8, mask: u8, value: u8) -> Result<(), Self::Error> {
        let current = self.read_register(register)?;
        self.write_register(register, (current & !mask) | (value & mask))
    }
}

pub struct I2cInterface<I2C> {
    pub(crate) i2c: I2C,
    pub(crate) address: u8,
}

impl<I2C> I2cInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, IE> RegisterAccess for I2cInterface<I2C>
where
    I2C: i2c::I2c<Error = IE>,
{
    type Error = Error<IE>;

    fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0u8; 1];

        self.i2c
            .write_read(self.address, &[register], &mut buffer)
            .map_err(Error::Interface)?;

        Ok(buffer[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Error::Interface)?;

        Ok(())
    }
}

/// Async variants of the register access traits and interfaces.
pub mod nb {
    use embedded_hal_async::i2c;

    use crate::Error;

    /// Async counterpart of [`super::RegisterAccess`], with the same serialization
    /// requirements on `update_bits`.
    #[allow(async_fn_in_trait)]
    pub trait RegisterAccess {
        type Error;

        async fn read_register(&mut self, register: u8) -> Result<u8, Self::Error>;

        async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

        async fn update_bits(
            &mut self,
            register: u8,
            mask: u8,
            value: u8,
        ) -> Result<(), Self::Error> {
            let current = self.read_register(register).await?;
            self.write_register(register, (current & !mask) | (value & mask))
                .await
        }
    }

    pub struct I2cInterface<I2C> {
        pub(crate) i2c: I2C,
        pub(crate) address: u8,
    }

    impl<I2C> I2cInterface<I2C> {
        pub fn new(i2c: I2C, address: u8) -> Self {
            Self { i2c, address }
        }

        pub fn release(self) -> I2C {
            self.i2c
        }
    }

    impl<I2C, IE> RegisterAccess for I2cInterface<I2C>
    where
        I2C: i2c::I2c<Error = IE>,
    {
        type Error = Error<IE>;

        async fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
            let mut buffer = [0u8; 1];

            self.i2c
                .write_read(self.address, &[register], &mut buffer)
                .await
                .map_err(Error::Interface)?;

            Ok(buffer[0])
        }

        async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
            self.i2c
                .write(self.address, &[register, value])
                .await
                .map_err(Error::Interface)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDRESS: u8 = DEFAULT_ADDRESS;

    #[test]
    fn test_i2c_read_register() {
        const REGISTER: u8 = 0x24;
        const VALUE: u8 = 0x02;

        let i2c = I2cMock::new(&[I2cTransaction::write_read(
            ADDRESS,
            vec![REGISTER],
            vec![VALUE],
        )]);

        let mut i2c_if = I2cInterface::new(i2c, ADDRESS);

        let value = i2c_if.read_register(REGISTER).unwrap();
        assert_eq!(value, VALUE);

        i2c_if.release().done();
    }

    #[test]
    fn test_i2c_write_register() {
        const REGISTER: u8 = 0x21;
        const VALUE: u8 = 0xAB;

        let i2c = I2cMock::new(&[I2cTransaction::write(ADDRESS, vec![REGISTER, VALUE])]);

        let mut i2c_if = I2cInterface::new(i2c, ADDRESS);

        i2c_if.write_register(REGISTER, VALUE).unwrap();

        i2c_if.release().done();
    }

    #[test]
    fn test_i2c_update_bits_preserves_unmasked_bits() {
        // set bit 1 of the enable register while bit 0 is already set
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDRESS, vec![0x24], vec![0b01]),
            I2cTransaction::write(ADDRESS, vec![0x24, 0b11]),
        ]);

        let mut i2c_if = I2cInterface::new(i2c, ADDRESS);

        i2c_if.update_bits(0x24, 0b10, 0xff).unwrap();

        i2c_if.release().done();
    }

    #[test]
    fn test_i2c_update_bits_read_error_skips_write() {
        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDRESS, vec![0x1C], vec![0]).with_error(ErrorKind::Other)
        ]);

        let mut i2c_if = I2cInterface::new(i2c, ADDRESS);

        let result = i2c_if.update_bits(0x1C, 0b01, 0b01);
        assert_eq!(result, Err(Error::Interface(ErrorKind::Other)));

        i2c_if.release().done();
    }

    #[test]
    fn test_async_i2c_update_bits() {
        use nb::RegisterAccess as _;

        let i2c = I2cMock::new(&[
            I2cTransaction::write_read(ADDRESS, vec![0x10], vec![0b110]),
            I2cTransaction::write(ADDRESS, vec![0x10, 0b100]),
        ]);

        let mut i2c_if = nb::I2cInterface::new(i2c, ADDRESS);

        futures::executor::block_on(i2c_if.update_bits(0x10, 0b010, 0)).unwrap();

        i2c_if.release().done();
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::RegisterAccess;
    use crate::Error;

    #[derive(Debug)]
    #[allow(dead_code)]
    pub(crate) enum Access {
        ReadRegister(u8, u8),
        WriteRegister(u8, u8),
        /// The read of this register fails with a bus error
        FailRead(u8),
        /// The write to this register fails with a bus error
        FailWrite(u8),
    }

    #[derive(Debug)]
    pub(crate) struct MockInterface {
        expected_accesses: Vec<Access>,
    }

    impl MockInterface {
        pub fn new(mut accesses: Vec<Access>) -> Self {
            // reverse order so we can just pop() them
            accesses.reverse();

            Self {
                expected_accesses: accesses,
            }
        }

        pub fn done(&self) {
            assert!(
                self.expected_accesses.is_empty(),
                "Not all expected register accesses were executed"
            );
        }
    }

    impl RegisterAccess for MockInterface {
        type Error = Error<()>;

        fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
            match self.expected_accesses.pop() {
                Some(Access::ReadRegister(reg, value)) => {
                    assert_eq!(
                        reg, register,
                        "Expected read on register {reg:x} but got {register:x}."
                    );
                    Ok(value)
                }
                Some(Access::FailRead(reg)) => {
                    assert_eq!(
                        reg, register,
                        "Expected failing read on register {reg:x} but got {register:x}."
                    );
                    Err(Error::Interface(()))
                }
                Some(access) => {
                    panic!("Unexpected register access when expecting a read: {access:?}")
                }
                None => panic!("Register access beyond the list of expected register accesses"),
            }
        }

        fn write_register(&mut self, register: u8, data: u8) -> Result<(), Self::Error> {
            match self.expected_accesses.pop() {
                Some(Access::WriteRegister(reg, expected_value)) => {
                    assert_eq!(
                        reg, register,
                        "Expected write on register {reg:x} but got {register:x}"
                    );
                    assert_eq!(expected_value, data, "Expected data written to register {reg:x} to be {expected_value:x} but got {data:x}");
                    Ok(())
                }
                Some(Access::FailWrite(reg)) => {
                    assert_eq!(
                        reg, register,
                        "Expected failing write on register {reg:x} but got {register:x}"
                    );
                    Err(Error::Interface(()))
                }
                Some(access) => {
                    panic!("Unexpected register access when expecting a write: {access:?}")
                }
                None => panic!("Register access beyond the list of expected register accesses"),
            }
        }
    }

    /// Register file behaving like the chip's register space.
    #[derive(Debug)]
    pub(crate) struct RegisterFile {
        pub registers: [u8; 256],
    }

    impl RegisterFile {
        pub fn new() -> Self {
            Self {
                registers: [0; 256],
            }
        }
    }

    impl RegisterAccess for RegisterFile {
        type Error = Error<()>;

        fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
            Ok(self.registers[register as usize])
        }

        fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
            self.registers[register as usize] = value;
            Ok(())
        }
    }

    impl super::nb::RegisterAccess for MockInterface {
        type Error = Error<()>;

        async fn read_register(&mut self, register: u8) -> Result<u8, Self::Error> {
            RegisterAccess::read_register(self, register)
        }

        async fn write_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
            RegisterAccess::write_register(self, register, value)
        }
    }
}
