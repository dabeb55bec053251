//! AT Commands for the u-blox SARA-U270\
//! Following the [u-blox cellular modules AT commands manual](https://www.u-blox.com/sites/default/files/u-blox-CEL_ATCommands_%28UBX-13002752%29.pdf)
//!
//! Every command is terminated by a bare carriage return, the module answers
//! with `\r\n` framed lines.

pub mod control;
pub mod device_lock;
pub mod error;
pub mod general;
pub mod mobile_control;
pub mod network_service;
pub mod power_saving;
pub mod sms;

use atat::atat_derive::{AtatCmd, AtatResp};

#[derive(Clone, AtatResp)]
pub struct NoResponse;

/// Attention, used to probe the module after power up
#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct AT;
