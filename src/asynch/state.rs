use crate::{
    registration::NetworkStatus,
    socket::{SocketSet, MAX_SOCKETS},
    status::DeviceStatus,
};

/// Everything the module tells us about itself, owned by the task driving
/// the modem and updated while responses are processed.
#[derive(Debug, Clone)]
pub struct State {
    pub(crate) device: DeviceStatus,
    pub(crate) network: NetworkStatus,
    pub(crate) sockets: SocketSet<MAX_SOCKETS>,
    /// PDP profile in use, matched against `+UUPSDD`
    pub(crate) profile_id: u8,
}

impl State {
    pub fn new(profile_id: u8) -> Self {
        Self {
            device: DeviceStatus::default(),
            network: NetworkStatus::new(),
            sockets: SocketSet::new(),
            profile_id,
        }
    }

    pub fn device(&self) -> &DeviceStatus {
        &self.device
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    pub fn sockets(&self) -> &SocketSet<MAX_SOCKETS> {
        &self.sockets
    }

    pub fn sockets_mut(&mut self) -> &mut SocketSet<MAX_SOCKETS> {
        &mut self.sockets
    }
}
