pub mod client;
pub mod handlers;
pub mod lifecycle;
mod pwr;
pub mod state;
pub(crate) mod urc_handler;

use atat::AtatCmd;
use embassy_time::{Duration, Instant};
use embedded_io_async::{Read, Write};
use heapless::String;

use crate::{
    classifier::ResponseCategory,
    command::{
        general::GetIMSI,
        mobile_control::GetSignalQuality,
        network_service::{
            GetGPRSNetworkRegistrationStatus, GetNetworkRegistrationStatus,
            SetGPRSNetworkRegistrationStatus, SetNetworkRegistrationStatus,
        },
        power_saving::{PowerSavingMode, SetPowerSavingControl},
        sms::{MessageFormat, SetMessageFormat, SetNewMessageIndication},
    },
    config::ModemConfig,
    error::{Error, OpenError},
    registration::{NetworkStatus, SignalQuality},
    socket::{SocketHandle, SocketSet, MAX_SOCKETS},
    status::DeviceStatus,
};

use self::{
    client::{AtClient, Completion, Flow, ResponseHandler},
    handlers::{NoHandler, TextCapture},
    state::State,
};

/// Ingress capacity that holds the largest socket read reply: 1024 data
/// bytes plus the `+USORF` header and quotes.
pub const DEFAULT_INGRESS_BUF_SIZE: usize = 1536;

/// Handle to a powered, registered-for-service SARA-U270.
///
/// Owns the transport, the configuration and everything learned from the
/// module. Created by [`Modem::open`]; dropping it releases all of it.
///
/// `INGRESS_BUF_SIZE` bounds a single response line. A `+USORD`, `+USORF`
/// or `+URDFILE` reply longer than that never completes, so keep socket and
/// file reads below it when shrinking the buffer.
pub struct Modem<
    T,
    C,
    const INGRESS_BUF_SIZE: usize = DEFAULT_INGRESS_BUF_SIZE,
    const CMD_BUF_SIZE: usize = 128,
> {
    client: AtClient<T, INGRESS_BUF_SIZE, CMD_BUF_SIZE>,
    state: State,
    config: C,
}

impl<T, C, const INGRESS_BUF_SIZE: usize, const CMD_BUF_SIZE: usize>
    Modem<T, C, INGRESS_BUF_SIZE, CMD_BUF_SIZE>
where
    T: Read + Write,
    C: ModemConfig,
{
    /// Power the module on, configure it and unlock the SIM.
    ///
    /// On failure the transport and configuration are dropped and the stage
    /// that failed is reported.
    pub async fn open(transport: T, config: C) -> Result<Self, OpenError> {
        let mut modem = Self {
            client: AtClient::new(transport),
            state: State::new(C::PROFILE_ID),
            config,
        };
        modem.run_lifecycle().await?;
        info!("Modem ready");
        Ok(modem)
    }

    /// Send a raw command and process the response until a terminal token,
    /// a handler decision or `timeout`.
    pub async fn send_and_wait<H>(
        &mut self,
        command: &str,
        handler: &mut H,
        timeout: Duration,
    ) -> Result<Completion, Error>
    where
        H: ResponseHandler + ?Sized,
    {
        self.client
            .send_and_wait(&mut self.state, command, handler, timeout)
            .await
    }

    /// Send a typed command, waiting at most its declared timeout.
    pub async fn send<Cmd, H>(&mut self, cmd: &Cmd, handler: &mut H) -> Result<Completion, Error>
    where
        Cmd: AtatCmd,
        H: ResponseHandler + ?Sized,
    {
        let timeout = Duration::from_millis(u64::from(Cmd::MAX_TIMEOUT_MS));
        self.request(cmd, handler, timeout).await
    }

    pub(crate) async fn request<Cmd, H>(
        &mut self,
        cmd: &Cmd,
        handler: &mut H,
        timeout: Duration,
    ) -> Result<Completion, Error>
    where
        Cmd: AtatCmd,
        H: ResponseHandler + ?Sized,
    {
        self.client.send_cmd(cmd).await?;
        self.client
            .wait_response(&mut self.state, handler, timeout)
            .await
    }

    /// Send `cmd` and return the first line of text it answered with.
    pub async fn fetch_text<Cmd: AtatCmd, const N: usize>(
        &mut self,
        cmd: &Cmd,
        prefix: Option<&'static str>,
    ) -> Result<Option<String<N>>, Error> {
        let mut capture = match prefix {
            Some(prefix) => TextCapture::with_prefix(prefix),
            None => TextCapture::new(),
        };
        self.send(cmd, &mut capture).await?;
        Ok(capture.into_text())
    }

    /// Dispatch URCs arriving while no command is in flight. Returns the
    /// number of URCs seen before `timeout` ran out.
    ///
    /// Stray final result codes (`OK`, `ERROR`, `ABORTED`) are logged and
    /// the pump carries on until the deadline.
    pub async fn poll_unsolicited(&mut self, timeout: Duration) -> Result<usize, Error> {
        let deadline = Instant::now() + timeout;
        let mut count = 0;
        self.client.clear_command();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let res = self
                .client
                .wait_response(
                    &mut self.state,
                    &mut |category: ResponseCategory, _: &[u8]| {
                        if category == ResponseCategory::Unsolicited {
                            count += 1;
                        }
                        Flow::Wait
                    },
                    remaining,
                )
                .await;

            match res {
                Ok(completion) => debug!("Stray final result code while idle: {:?}", completion),
                Err(e @ (Error::Device(_) | Error::Aborted)) => {
                    debug!("Stray final result code while idle: {:?}", e)
                }
                Err(Error::Timeout) => return Ok(count),
                Err(e) => return Err(e),
            }
        }
    }

    /// Network side configuration: SMS notifications, IMSI and registration
    /// URCs with location.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if C::LOW_POWER_MODE {
            self.send(
                &SetPowerSavingControl {
                    mode: PowerSavingMode::Enabled,
                },
                &mut NoHandler,
            )
            .await?;
            self.state.device.low_power = true;
        }

        self.send(
            &SetMessageFormat {
                mode: MessageFormat::Text,
            },
            &mut NoHandler,
        )
        .await?;
        self.send(&SetNewMessageIndication { mode: 2, mt: 1 }, &mut NoHandler)
            .await?;

        if let Some(imsi) = self.fetch_text(&GetIMSI, None).await? {
            self.state.device.imsi = imsi;
        }

        self.send(&SetNetworkRegistrationStatus { n: 2 }, &mut NoHandler)
            .await?;
        self.send(&SetGPRSNetworkRegistrationStatus { n: 2 }, &mut NoHandler)
            .await?;
        Ok(())
    }

    /// Refresh circuit and packet switched registration.
    pub async fn query_registration(&mut self) -> Result<&NetworkStatus, Error> {
        self.send(&GetNetworkRegistrationStatus, &mut NoHandler)
            .await?;
        self.send(&GetGPRSNetworkRegistrationStatus, &mut NoHandler)
            .await?;
        Ok(&self.state.network)
    }

    pub async fn query_signal_quality(&mut self) -> Result<SignalQuality, Error> {
        self.send(&GetSignalQuality, &mut NoHandler).await?;
        Ok(SignalQuality {
            rssi: self.state.network.rssi,
            qual: self.state.network.qual,
        })
    }

    pub fn device(&self) -> &DeviceStatus {
        self.state.device()
    }

    pub fn network(&self) -> &NetworkStatus {
        self.state.network()
    }

    pub fn sockets(&self) -> &SocketSet<MAX_SOCKETS> {
        self.state.sockets()
    }

    /// Register a socket the module just opened.
    pub fn allocate_socket(&mut self, handle: SocketHandle) -> Result<usize, Error> {
        self.state.sockets_mut().allocate(handle)
    }

    pub fn find_socket(&self, handle: SocketHandle) -> Option<usize> {
        self.state.sockets().find(handle)
    }

    pub fn free_socket(&mut self, index: usize) -> bool {
        self.state.sockets_mut().free(index)
    }

    /// Whether the GPRS link dropped since the last call.
    pub fn take_detach_event(&mut self) -> bool {
        self.state.network.take_detached()
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Give back the transport and configuration.
    pub fn close(self) -> (T, C) {
        (self.client.into_inner(), self.config)
    }
}
