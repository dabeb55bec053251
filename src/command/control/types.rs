//! Argument and parameter types used by V24 control and V25ter Commands and Responses
use atat::atat_derive::AtatEnum;

#[derive(Clone, PartialEq, Eq, AtatEnum)]
pub enum Echo {
    /// 0: echo off
    Off = 0,
    /// 1 (default and factory-programmed value): echo on
    On = 1,
}
