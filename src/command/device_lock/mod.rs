//! ### 9 - Device lock

use super::NoResponse;
use atat::atat_derive::AtatCmd;

/// 9.1 Enter PIN +CPIN
///
/// Reads whether the module is waiting for a password. Answered with
/// `+CPIN: <code>`, or `+CME ERROR: SIM not inserted`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN?", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetPinStatus;

/// 9.1 Enter PIN +CPIN
///
/// Enter PIN. If no PIN request is pending, the corresponding error code is returned. If a wrong PIN is given three
/// times, the PUK must be inserted in place of the PIN, followed by the <newpin> which replaces the old pin in
/// the SIM.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct SetPin<'a> {
    #[at_arg(position = 0, len = 8)]
    pub pin: &'a str,
}
