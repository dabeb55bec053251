use heapless::String;
use serde::Serialize;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimStatus {
    #[default]
    Unknown,
    Missing,
    PinRequired,
    Ready,
}

/// Identity of the module and its SIM, filled in during bring-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub sim: SimStatus,
    /// Integrated circuit card id
    pub ccid: String<22>,
    pub imsi: String<16>,
    pub imei: String<16>,
    pub manufacturer: String<32>,
    pub model: String<32>,
    pub version: String<32>,
    /// UART power saving enabled
    pub low_power: bool,
}
