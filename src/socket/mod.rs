mod set;

pub use set::SocketSet;

use embassy_time::Duration;
use serde::Serialize;

/// Number of sockets the SARA-U270 can hold open at once
pub const MAX_SOCKETS: usize = 7;

/// Socket identifier assigned by the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocketHandle(pub u8);

impl core::fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocketEntry {
    /// `None` marks a free slot
    pub handle: Option<SocketHandle>,
    /// Bytes the module reported as readable
    pub pending: u32,
    pub connected: bool,
    pub open: bool,
    /// Read timeout, `Duration::MAX` blocks
    pub timeout: Duration,
}

impl SocketEntry {
    pub const CLOSED: Self = Self {
        handle: None,
        pending: 0,
        connected: false,
        open: false,
        timeout: Duration::MAX,
    };

    pub fn is_blocking(&self) -> bool {
        self.timeout == Duration::MAX
    }
}

impl Default for SocketEntry {
    fn default() -> Self {
        Self::CLOSED
    }
}
