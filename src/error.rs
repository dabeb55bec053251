use crate::asynch::lifecycle::LifecycleState;
pub use crate::command::error::{CmeError, DeviceError};

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// No terminal token arrived within the time budget
    Timeout,
    /// The module answered with `ERROR`, `+CME ERROR:` or `+CMS ERROR:`
    Device(DeviceError),
    /// The module discarded the command in flight
    Aborted,
    /// Line framing could not be recovered from the byte stream
    ProtocolDesync,
    /// Socket table full
    ResourceExhausted,
    /// Command does not fit the transmit buffer
    Overflow,
    Io,
    IoPin,
    PoweredDown,

    // SIM errors
    SimMissing,
    SimPinRequired,
    SimPinRejected,
    SimNotReady,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Timeout => defmt::write!(f, "Timeout"),
            Self::Device(e) => defmt::write!(f, "Device({:?})", e),
            Self::Aborted => defmt::write!(f, "Aborted"),
            Self::ProtocolDesync => defmt::write!(f, "ProtocolDesync"),
            Self::ResourceExhausted => defmt::write!(f, "ResourceExhausted"),
            Self::Overflow => defmt::write!(f, "Overflow"),
            Self::Io => defmt::write!(f, "Io"),
            Self::IoPin => defmt::write!(f, "IoPin"),
            Self::PoweredDown => defmt::write!(f, "PoweredDown"),
            Self::SimMissing => defmt::write!(f, "SimMissing"),
            Self::SimPinRequired => defmt::write!(f, "SimPinRequired"),
            Self::SimPinRejected => defmt::write!(f, "SimPinRejected"),
            Self::SimNotReady => defmt::write!(f, "SimNotReady"),
        }
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

/// Failure of [`Modem::open`](crate::asynch::Modem::open), naming the stage
/// that gave up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OpenError {
    pub state: LifecycleState,
    pub error: Error,
}
