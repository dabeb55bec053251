//! ### 11 - Short Messages Service
//!
//! Only what is needed to get `+CMTI` notifications.

use super::NoResponse;
use atat::atat_derive::{AtatCmd, AtatEnum};

#[derive(Clone, PartialEq, Eq, AtatEnum)]
pub enum MessageFormat {
    Pdu = 0,
    Text = 1,
}

/// 11.4 Message format +CMGF
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGF", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetMessageFormat {
    #[at_arg(position = 0)]
    pub mode: MessageFormat,
}

/// 11.8 New message indication +CNMI
///
/// With `mode = 2, mt = 1` an incoming message is stored and announced with
/// `+CMTI: <mem>,<index>`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CNMI", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetNewMessageIndication {
    #[at_arg(position = 0)]
    pub mode: u8,
    #[at_arg(position = 1)]
    pub mt: u8,
}
