//! ### 7 - Network service
//!
//! Registration replies share their grammar with the URCs and are applied by
//! the unsolicited result code handler.

use super::NoResponse;
use atat::atat_derive::AtatCmd;

/// 7.14 Network registration status +CREG
///
/// Configures the network registration information. With `n = 2` the
/// `+CREG` URC also carries the location area code and cell id.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetNetworkRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 7.14 Network registration status +CREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG?", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct GetNetworkRegistrationStatus;

/// 18.27 GPRS network registration status +CGREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGREG", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetGPRSNetworkRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 18.27 GPRS network registration status +CGREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGREG?", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct GetGPRSNetworkRegistrationStatus;
