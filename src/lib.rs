#![cfg_attr(not(test), no_std)]
//! AT command protocol engine for the u-blox SARA-U270 cellular module.
//!
//! Bytes from the serial link are framed into lines by [`framer`], split
//! into tokens by [`classifier`], and routed by the [`asynch`] client either
//! to the caller of the command in flight or to the unsolicited result code
//! handler, which keeps [`registration`], [`status`] and [`socket`] state
//! current. [`asynch::Modem::open`] powers the module on and brings it up.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod asynch;
pub mod classifier;
pub mod command;
pub mod config;
pub mod error;
pub mod framer;
mod module_timing;
pub mod registration;
mod scan;
pub mod socket;
pub mod status;

#[cfg(test)]
mod test_helpers;

pub use asynch::Modem;
pub use error::{Error, OpenError};
