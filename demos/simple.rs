use embedded_hal::delay::DelayNs;
use lm3697::{interface::DEFAULT_ADDRESS, Bank, BankConfig, Lm3697, Strings, MAX_BRIGHTNESS};

fn main() {
    // placeholders, replace with instances from your HAL
    let i2c_bus = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
    let mut delay = embedded_hal_mock::eh1::delay::NoopDelay::new();

    let backlight = BankConfig::new(Bank::A)
        .strings(Strings::HVLED1 | Strings::HVLED2)
        .current_limit(0x13)
        .ramp_up_ms(500)
        .ramp_down_ms(250);
    let keypad = BankConfig::new(Bank::B).strings(Strings::HVLED3);

    let mut led_driver = Lm3697::new_with_i2c(i2c_bus, DEFAULT_ADDRESS);
    led_driver.setup(&[backlight, keypad]).unwrap();
    led_driver.set_enabled(Bank::B, true).unwrap();

    let mut brightness = 0;

    loop {
        // fade the main backlight up and down, the chip ramps between steps
        led_driver.update_status(&backlight, brightness).unwrap();
        brightness = if brightness >= MAX_BRIGHTNESS {
            0
        } else {
            brightness + 64
        };

        delay.delay_ms(20);
    }
}
