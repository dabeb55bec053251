use embassy_time::Timer;
use embedded_hal::digital::OutputPin as _;

use crate::{config::ModemConfig, error::Error};

pub(crate) struct PwrCtrl<'a, C> {
    config: &'a mut C,
}

impl<'a, C> PwrCtrl<'a, C>
where
    C: ModemConfig,
{
    pub(crate) fn new(config: &'a mut C) -> Self {
        Self { config }
    }

    /// Toggle `PWR_ON` through the low, high, low, high sequence the module
    /// latches on. The line is left high.
    pub(crate) async fn power_pulse(&mut self) -> Result<(), Error> {
        let Some(pin) = self.config.power_pin() else {
            warn!("No power pin configured");
            return Ok(());
        };

        debug!("Pulsing PWR_ON");
        let res = async {
            pin.set_low().map_err(|_| Error::IoPin)?;
            Timer::after(C::PWR_ON_FIRST_LOW).await;
            pin.set_high().map_err(|_| Error::IoPin)?;
            Timer::after(C::PWR_ON_FIRST_HIGH).await;
            pin.set_low().map_err(|_| Error::IoPin)?;
            Timer::after(C::PWR_ON_SECOND_LOW).await;
            pin.set_high().map_err(|_| Error::IoPin)?;
            Timer::after(C::PWR_ON_SETTLE).await;
            Ok::<_, Error>(())
        }
        .await;

        if res.is_err() {
            pin.set_high().ok();
        }
        res
    }
}
