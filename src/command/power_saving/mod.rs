//! ### 16 - Power saving

use super::NoResponse;
use atat::atat_derive::{AtatCmd, AtatEnum};

#[derive(Clone, PartialEq, Eq, AtatEnum)]
pub enum PowerSavingMode {
    /// 0 (default): disabled
    Disabled = 0,
    /// 1: enabled, the module sleeps after 6 s of UART inactivity
    Enabled = 1,
}

/// 16.2 Power saving control +UPSV
#[derive(Clone, AtatCmd)]
#[at_cmd("+UPSV", NoResponse, timeout_ms = 1000, termination = "\r")]
pub struct SetPowerSavingControl {
    #[at_arg(position = 0)]
    pub mode: PowerSavingMode,
}
