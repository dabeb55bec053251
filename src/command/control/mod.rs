//! ### 15 - V24 control and V25ter
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::Echo;

/// 15.9 UART data rate configuration +IPR
///
/// Specifies the data rate at which the DCE accepts commands on the UART
/// interface. The new rate is applied after the final result code.
#[derive(Clone, AtatCmd)]
#[at_cmd("+IPR", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetDataRate {
    #[at_arg(position = 0)]
    pub rate: u32,
}

/// 15.25 Command echo E
///
/// Controls whether the module echoes characters received from the DTE
/// during command state.
#[derive(Clone, AtatCmd)]
#[at_cmd("E", NoResponse, value_sep = false, timeout_ms = 1000, termination = "\r")]
pub struct SetEcho {
    #[at_arg(position = 0)]
    pub enabled: Echo,
}
