//! Power-on, bring-up and SIM unlock sequence run by [`Modem::open`].

use atat::AtatCmd;
use embassy_time::Timer;
use embedded_io_async::{Read, Write};
use heapless::String;

use super::{
    handlers::{NoHandler, PinStatusCapture},
    pwr::PwrCtrl,
    Modem,
};
use crate::{
    command::{
        control::{types::Echo, SetDataRate, SetEcho},
        device_lock::{GetPinStatus, SetPin},
        general::{GetCCID, GetFirmwareVersion, GetIMEI, GetManufacturerId, GetModelId},
        mobile_control::{
            types::TerminationErrorMode, SetEventReporting, SetReportMobileTerminationError,
        },
        AT,
    },
    config::ModemConfig,
    error::{Error, OpenError},
    status::SimStatus,
};

/// Stage of the open sequence. A failed stage is reported through
/// [`OpenError::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleState {
    PowerOn,
    Bringup,
    SimUnlock,
    Ready,
}

impl<T, C, const INGRESS_BUF_SIZE: usize, const CMD_BUF_SIZE: usize>
    Modem<T, C, INGRESS_BUF_SIZE, CMD_BUF_SIZE>
where
    T: Read + Write,
    C: ModemConfig,
{
    pub(crate) async fn run_lifecycle(&mut self) -> Result<(), OpenError> {
        let mut state = LifecycleState::PowerOn;
        loop {
            let next = match state {
                LifecycleState::PowerOn => self.power_on().await,
                LifecycleState::Bringup => self.bringup().await,
                LifecycleState::SimUnlock => self.sim_unlock().await,
                LifecycleState::Ready => return Ok(()),
            };

            match next {
                Ok(next) => {
                    debug!("Lifecycle {:?} -> {:?}", state, next);
                    state = next;
                }
                Err(error) => {
                    error!("Lifecycle failed in {:?}: {:?}", state, error);
                    return Err(OpenError { state, error });
                }
            }
        }
    }

    async fn power_on(&mut self) -> Result<LifecycleState, Error> {
        for attempt in 1..=C::POWER_ON_ATTEMPTS {
            PwrCtrl::new(&mut self.config).power_pulse().await?;

            match self.request(&AT, &mut NoHandler, C::PROBE_TIMEOUT).await {
                Ok(_) => {
                    info!("Module powered on after {} attempt(s)", attempt);
                    return Ok(LifecycleState::Bringup);
                }
                Err(e) => warn!("Power-on attempt {} failed: {:?}", attempt, e),
            }
        }

        Err(Error::PoweredDown)
    }

    async fn bringup(&mut self) -> Result<LifecycleState, Error> {
        let timeout = C::BRINGUP_TIMEOUT;

        self.request(&SetEcho { enabled: Echo::Off }, &mut NoHandler, timeout)
            .await?;
        self.request(
            &SetReportMobileTerminationError {
                n: TerminationErrorMode::Verbose,
            },
            &mut NoHandler,
            timeout,
        )
        .await?;
        // Indicator events (+CIEV) only, buffered ones flushed
        self.request(
            &SetEventReporting {
                mode: 1,
                keyp: 0,
                disp: 0,
                ind: 2,
                bfr: 1,
            },
            &mut NoHandler,
            timeout,
        )
        .await?;
        self.request(&SetDataRate { rate: C::BAUD_RATE }, &mut NoHandler, timeout)
            .await?;
        Timer::after(C::BAUD_SETTLE_TIME).await;

        if let Some(imei) = self.identity(&GetIMEI, None).await {
            self.state.device.imei = imei;
        }
        if let Some(manufacturer) = self.identity(&GetManufacturerId, None).await {
            self.state.device.manufacturer = manufacturer;
        }
        if let Some(model) = self.identity(&GetModelId, None).await {
            self.state.device.model = model;
        }
        if let Some(version) = self.identity(&GetFirmwareVersion, None).await {
            self.state.device.version = version;
        }
        if let Some(ccid) = self.identity(&GetCCID, Some("+CCID:")).await {
            self.state.device.ccid = ccid;
        }

        Ok(LifecycleState::SimUnlock)
    }

    /// Identity strings are informational; a failed query leaves the field
    /// empty.
    async fn identity<Cmd: AtatCmd, const N: usize>(
        &mut self,
        cmd: &Cmd,
        prefix: Option<&'static str>,
    ) -> Option<String<N>> {
        match self.fetch_text(cmd, prefix).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Identity query failed: {:?}", e);
                None
            }
        }
    }

    async fn sim_unlock(&mut self) -> Result<LifecycleState, Error> {
        let mut pin_sent = false;

        for _ in 0..C::SIM_UNLOCK_ATTEMPTS {
            match self.query_pin_status().await? {
                SimStatus::Ready => return Ok(LifecycleState::Ready),
                SimStatus::Missing => return Err(Error::SimMissing),
                SimStatus::PinRequired if pin_sent => return Err(Error::SimPinRejected),
                SimStatus::PinRequired => {
                    let Some(pin) = self.config.sim_pin() else {
                        return Err(Error::SimPinRequired);
                    };
                    let pin = String::<8>::try_from(pin).map_err(|_| Error::SimPinRejected)?;

                    match self.send(&SetPin { pin: pin.as_str() }, &mut NoHandler).await {
                        Ok(_) => pin_sent = true,
                        Err(Error::Device(e)) => {
                            warn!("PIN not accepted: {:?}", e);
                            return Err(Error::SimPinRejected);
                        }
                        Err(e) => return Err(e),
                    }
                }
                SimStatus::Unknown => Timer::after(C::SIM_RETRY_DELAY).await,
            }
        }

        Err(Error::SimNotReady)
    }

    async fn query_pin_status(&mut self) -> Result<SimStatus, Error> {
        let mut capture = PinStatusCapture::default();
        match self.send(&GetPinStatus, &mut capture).await {
            Ok(_) => {}
            Err(e @ (Error::Io | Error::ProtocolDesync)) => return Err(e),
            Err(e) => debug!("PIN status query failed: {:?}", e),
        }
        self.state.device.sim = capture.status;
        Ok(capture.status)
    }
}
