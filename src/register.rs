/// LM3697 registers
///
/// Register map: <https://www.ti.com/lit/ds/symlink/lm3697.pdf>
pub struct Register;
#[allow(dead_code)]
impl Register {
    pub const REVISION: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;

    pub const HVLED_OUTPUT_CONFIG: u8 = 0x10;

    pub const BANK_A_RAMP: u8 = 0x11;
    pub const BANK_B_RAMP: u8 = 0x12;
    pub const RUNTIME_RAMP: u8 = 0x13;
    pub const RAMP_CONFIG: u8 = 0x14;

    pub const BANK_A_FULL_SCALE_CURRENT: u8 = 0x17;
    pub const BANK_B_FULL_SCALE_CURRENT: u8 = 0x18;
    pub const FEEDBACK_ENABLE: u8 = 0x19;

    pub const PWM_CONFIG: u8 = 0x1C;

    pub const BANK_A_BRIGHTNESS_LSB: u8 = 0x20;
    pub const BANK_A_BRIGHTNESS_MSB: u8 = 0x21;
    pub const BANK_B_BRIGHTNESS_LSB: u8 = 0x22;
    pub const BANK_B_BRIGHTNESS_MSB: u8 = 0x23;

    pub const BANK_ENABLE: u8 = 0x24;
}

/// Per-bank register addresses, indexed by bank id.
pub struct BankRegister;
impl BankRegister {
    pub const RAMP: [u8; 2] = [Register::BANK_A_RAMP, Register::BANK_B_RAMP];
    pub const FULL_SCALE_CURRENT: [u8; 2] = [
        Register::BANK_A_FULL_SCALE_CURRENT,
        Register::BANK_B_FULL_SCALE_CURRENT,
    ];
    pub const BRIGHTNESS_LSB: [u8; 2] = [
        Register::BANK_A_BRIGHTNESS_LSB,
        Register::BANK_B_BRIGHTNESS_LSB,
    ];
    pub const BRIGHTNESS_MSB: [u8; 2] = [
        Register::BANK_A_BRIGHTNESS_MSB,
        Register::BANK_B_BRIGHTNESS_MSB,
    ];
}

/// Bitflags for registers
pub struct BitFlags;
#[allow(dead_code)]
impl BitFlags {
    pub const SW_RESET_RESET: u8 = (1 << 0);

    pub const RAMP_UP_SHIFT: u8 = 4;
    pub const RAMP_UP_MASK: u8 = 0xF0;
    pub const RAMP_DOWN_SHIFT: u8 = 0;
    pub const RAMP_DOWN_MASK: u8 = 0x0F;

    pub const RAMP_CONFIG_MASK: u8 = 0x0F;
    /// Start-up/shut-down ramp of each bank taken from its own ramp register
    pub const RAMP_CONFIG_EACH: u8 = 0x05;

    pub const BRIGHTNESS_LSB_BITS: u32 = 3;
    pub const BRIGHTNESS_LSB_MASK: u8 = 0b111;
    pub const BRIGHTNESS_MSB_SHIFT: u32 = Self::BRIGHTNESS_LSB_BITS;
}
