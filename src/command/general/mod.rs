//! ### 4 - General Commands
//!
//! The identification commands answer with a single bare text line followed
//! by `OK`, except `+CCID` which prefixes its line.

use super::NoResponse;
use atat::atat_derive::AtatCmd;

/// 4.1 Manufacturer identification +CGMI
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMI", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetManufacturerId;

/// 4.3 Model identification +CGMM
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMM", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetModelId;

/// 4.5 Firmware version identification +CGMR
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMR", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetFirmwareVersion;

/// 4.7 IMEI identification +CGSN
///
/// Returns the product serial number, the International Mobile Equipment
/// Identity (IMEI) of the MT.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGSN", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetIMEI;

/// 4.11 International mobile subscriber identification +CIMI
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIMI", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetIMSI;

/// 4.12 Card identification +CCID
///
/// Returns the ICCID (Integrated Circuit Card ID) of the SIM-card. ICCID is a
/// serial number identifying the SIM.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CCID", NoResponse, timeout_ms = 10000, termination = "\r")]
pub struct GetCCID;
