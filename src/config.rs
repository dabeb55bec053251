use core::convert::Infallible;
use embassy_time::Duration;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::module_timing;

pub struct NoPin;

impl ErrorType for NoPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Output pin driven through an inverting stage, e.g. an open collector
/// transistor on the module's `PWR_ON` line.
pub struct ReverseOutputPin<P: OutputPin<Error = Infallible>>(pub P);

impl<P: OutputPin<Error = Infallible>> ErrorType for ReverseOutputPin<P> {
    type Error = Infallible;
}

impl<P: OutputPin<Error = Infallible>> OutputPin for ReverseOutputPin<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
        match state {
            PinState::Low => self.0.set_state(PinState::High),
            PinState::High => self.0.set_state(PinState::Low),
        }
    }
}

pub trait ModemConfig {
    type PowerPin: OutputPin;

    /// Power pulse + `AT` probe cycles before giving up
    const POWER_ON_ATTEMPTS: u8 = 10;
    /// PIN status queries before giving up on the SIM
    const SIM_UNLOCK_ATTEMPTS: u8 = 5;

    const BAUD_RATE: u32 = 115_200;
    const PROFILE_ID: u8 = 0;
    /// Enable UART power saving (`AT+UPSV=1`) on connect
    const LOW_POWER_MODE: bool = false;

    const PWR_ON_FIRST_LOW: Duration = module_timing::pwr_on_first_low();
    const PWR_ON_FIRST_HIGH: Duration = module_timing::pwr_on_first_high();
    const PWR_ON_SECOND_LOW: Duration = module_timing::pwr_on_second_low();
    const PWR_ON_SETTLE: Duration = module_timing::pwr_on_settle();

    const PROBE_TIMEOUT: Duration = module_timing::probe_timeout();
    const BRINGUP_TIMEOUT: Duration = module_timing::bringup_timeout();
    const BAUD_SETTLE_TIME: Duration = module_timing::baud_settle_time();
    const SIM_RETRY_DELAY: Duration = module_timing::sim_retry_delay();

    fn power_pin(&mut self) -> Option<&mut Self::PowerPin>;

    fn sim_pin(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_helpers::{Level, MockPin};

    #[test]
    fn reverse_pin_inverts_levels() {
        let pin = MockPin::default();
        let levels = pin.levels();
        let mut pin = ReverseOutputPin(pin);

        pin.set_low().unwrap();
        pin.set_high().unwrap();
        pin.set_state(PinState::Low).unwrap();

        assert_eq!(
            levels.borrow().as_slice(),
            &[Level::High, Level::Low, Level::High]
        );
    }
}
