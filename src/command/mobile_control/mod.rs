//! ### 5 - Mobile equipment control and status Commands

pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::TerminationErrorMode;

/// 5.6 Mobile termination event reporting +CMER
///
/// Configures sending of URCs from MT to DTE for key pressings, display
/// changes and indicator state changes (`+CIEV`).
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMER", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetEventReporting {
    #[at_arg(position = 0)]
    pub mode: u8,
    #[at_arg(position = 1)]
    pub keyp: u8,
    #[at_arg(position = 2)]
    pub disp: u8,
    #[at_arg(position = 3)]
    pub ind: u8,
    #[at_arg(position = 4)]
    pub bfr: u8,
}

/// 5.19 Report mobile termination error +CMEE
///
/// Configures the formatting of the result code +CME ERROR: <err> as an
/// indication of an error relating to the functionality of the MT.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMEE", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetReportMobileTerminationError {
    #[at_arg(position = 0)]
    pub n: TerminationErrorMode,
}

/// 7.2 Signal quality +CSQ
///
/// Answered with `+CSQ: <rssi>,<qual>`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSQ", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct GetSignalQuality;
