//! Unsolicited result code dispatch.
//!
//! URCs update [`State`] directly. Malformed or unrecognised ones are logged
//! and dropped, leaving the state untouched.

use no_std_net::Ipv4Addr;

use super::state::State;
use crate::{
    fmt::LossyStr,
    registration::{RegType, RegistrationParams, SignalQuality},
    scan::{split_urc, Scanner},
    socket::SocketHandle,
};

/// `+CIEV` indicator number of the GPRS attach state
const CIEV_GPRS_INDICATOR: i32 = 9;
/// `+CIEV: 9,<v>` value while attached
const CIEV_GPRS_ATTACHED: i32 = 2;

pub(crate) fn handle_unsolicited(state: &mut State, token: &[u8]) {
    let Some((name, args)) = split_urc(token) else {
        debug!("Not a URC: {:?}", LossyStr(token));
        return;
    };

    let handled = match name {
        b"CMTI" => new_message(state, args),
        b"CIEV" => indicator(state, args),
        b"UUSORD" | b"UUSORF" => data_available(state, args),
        b"UUSOCL" => socket_closed(state, args),
        b"UUPSDD" => context_deactivated(state, args),
        b"UUPSDA" => context_activated(state, args),
        b"CREG" => registration(state, RegType::Creg, args),
        b"CGREG" => registration(state, RegType::Cgreg, args),
        b"CSQ" => signal_quality(state, args),
        _ => {
            trace!("Ignoring URC {:?}", LossyStr(name));
            Some(())
        }
    };

    if handled.is_none() {
        warn!("Malformed URC: {:?}", LossyStr(token));
    }
}

/// `+CMTI: "<mem>",<index>`
fn new_message(state: &mut State, args: &[u8]) -> Option<()> {
    let mut s = Scanner::new(args);
    s.quoted()?;
    s.literal(b",")?;
    let index = u16::try_from(s.int()?).ok()?;
    info!("New SMS at index {}", index);
    state.network.sms_index = Some(index);
    Some(())
}

/// `+CIEV: <ind>,<value>`, only the GPRS indicator is tracked
fn indicator(state: &mut State, args: &[u8]) -> Option<()> {
    let mut s = Scanner::new(args);
    let ind = s.int()?;
    s.literal(b",")?;
    let value = s.int()?;
    if ind == CIEV_GPRS_INDICATOR {
        let attached = value == CIEV_GPRS_ATTACHED;
        if state.network.attached && !attached {
            info!("GPRS detached");
        }
        state.network.set_attached(attached);
    }
    Some(())
}

/// `+UUSORD: <socket>,<length>` and `+UUSORF: <socket>,<length>`
fn data_available(state: &mut State, args: &[u8]) -> Option<()> {
    let mut s = Scanner::new(args);
    let handle = socket_handle(&mut s)?;
    s.literal(b",")?;
    let len = u32::try_from(s.int()?).ok()?;
    if !state.sockets.set_pending(handle, len) {
        debug!("Data on unknown socket {}", handle.0);
    }
    Some(())
}

/// `+UUSOCL: <socket>`
fn socket_closed(state: &mut State, args: &[u8]) -> Option<()> {
    let mut s = Scanner::new(args);
    let handle = socket_handle(&mut s)?;
    match state.sockets.find(handle) {
        Some(index) => {
            info!("Socket {} closed by the module", handle.0);
            state.sockets.free(index);
        }
        None => debug!("Close of unknown socket {}", handle.0),
    }
    Some(())
}

/// `+UUPSDD: <profile_id>`
fn context_deactivated(state: &mut State, args: &[u8]) -> Option<()> {
    let profile = Scanner::new(args).int()?;
    if profile == i32::from(state.profile_id) {
        info!("PDP context {} deactivated", profile);
        state.network.deactivate();
    }
    Some(())
}

/// `+UUPSDA: <result>,"<ip>"`
fn context_activated(state: &mut State, args: &[u8]) -> Option<()> {
    let mut s = Scanner::new(args);
    let result = s.int()?;
    if result != 0 {
        warn!("PDP context activation failed: {}", result);
        return Some(());
    }
    s.literal(b",")?;
    let ip: Ipv4Addr = core::str::from_utf8(s.quoted()?).ok()?.parse().ok()?;
    info!("PDP context active");
    state.network.ip = Some(ip);
    Some(())
}

fn registration(state: &mut State, reg_type: RegType, args: &[u8]) -> Option<()> {
    let params = RegistrationParams::parse(reg_type, args);
    params.status?;
    debug!("Registration update: {:?}", params);
    state.network.apply(&params);
    Some(())
}

fn signal_quality(state: &mut State, args: &[u8]) -> Option<()> {
    let quality = SignalQuality::parse(args)?;
    state.network.apply_signal(&quality);
    Some(())
}

fn socket_handle(s: &mut Scanner<'_>) -> Option<SocketHandle> {
    u8::try_from(s.int()?).ok().map(SocketHandle)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registration::{AccessTechnology, RegistrationStatus};

    #[test]
    fn socket_close_frees_slot() {
        let mut state = State::new(0);
        state.sockets.allocate(SocketHandle(1)).unwrap();
        state.sockets.allocate(SocketHandle(3)).unwrap();

        handle_unsolicited(&mut state, b"\r\n+UUSOCL: 3\r\n");
        assert_eq!(state.sockets.find(SocketHandle(3)), None);
        assert_eq!(state.sockets.find(SocketHandle(1)), Some(0));

        // Unknown socket is ignored
        handle_unsolicited(&mut state, b"\r\n+UUSOCL: 6\r\n");
        assert_eq!(state.sockets.len(), 1);
    }

    #[test]
    fn data_available_sets_pending() {
        let mut state = State::new(0);
        let index = state.sockets.allocate(SocketHandle(2)).unwrap();

        handle_unsolicited(&mut state, b"\r\n+UUSORD: 2,120\r\n");
        assert_eq!(state.sockets.get(index).unwrap().pending, 120);

        handle_unsolicited(&mut state, b"\r\n+UUSORF: 2,8\r\n");
        assert_eq!(state.sockets.get(index).unwrap().pending, 8);

        handle_unsolicited(&mut state, b"\r\n+UUSORD: 5,10\r\n");
        assert_eq!(state.sockets.len(), 1);
    }

    #[test]
    fn gprs_indicator_latches_detach() {
        let mut state = State::new(0);
        handle_unsolicited(&mut state, b"\r\n+CIEV: 9,2\r\n");
        assert!(state.network.attached);

        handle_unsolicited(&mut state, b"\r\n+CIEV: 2,0\r\n");
        assert!(state.network.attached);

        handle_unsolicited(&mut state, b"\r\n+CIEV: 9,1\r\n");
        assert!(!state.network.attached);
        assert!(state.network.take_detached());
    }

    #[test]
    fn pdp_context_updates() {
        let mut state = State::new(1);
        handle_unsolicited(&mut state, b"\r\n+UUPSDA: 0,\"10.20.30.40\"\r\n");
        assert_eq!(state.network.ip, Some(Ipv4Addr::new(10, 20, 30, 40)));
        // Activation alone does not mark the module attached
        assert!(!state.network.attached);
        handle_unsolicited(&mut state, b"\r\n+CIEV: 9,2\r\n");

        // Other profile
        handle_unsolicited(&mut state, b"\r\n+UUPSDD: 0\r\n");
        assert!(state.network.ip.is_some());

        handle_unsolicited(&mut state, b"\r\n+UUPSDD: 1\r\n");
        assert_eq!(state.network.ip, None);
        assert!(!state.network.attached);
        assert!(state.network.take_detached());
    }

    #[test]
    fn registration_and_signal() {
        let mut state = State::new(0);
        handle_unsolicited(&mut state, b"\r\n+CREG: 1,\"00A1\",\"0001B2C3\",0\r\n");
        handle_unsolicited(&mut state, b"\r\n+CGREG: 5\r\n");
        handle_unsolicited(&mut state, b"\r\n+CSQ: 20,0\r\n");

        let network = &state.network;
        assert_eq!(network.csd, RegistrationStatus::Home);
        assert_eq!(network.psd, RegistrationStatus::Roaming);
        assert_eq!(network.lac, Some(0x00A1));
        assert_eq!(network.ci, Some(0x0001_B2C3));
        assert_eq!(network.act, AccessTechnology::Gsm);
        assert_eq!(network.rssi, Some(-73));
        assert_eq!(network.qual, Some(0));
    }

    #[test]
    fn new_sms_index() {
        let mut state = State::new(0);
        handle_unsolicited(&mut state, b"\r\n+CMTI: \"SM\",4\r\n");
        assert_eq!(state.network.sms_index, Some(4));
    }

    #[test]
    fn malformed_urcs_leave_state_alone() {
        let mut state = State::new(0);
        state.sockets.allocate(SocketHandle(3)).unwrap();
        let before = state.network.clone();

        handle_unsolicited(&mut state, b"\r\n+UUSOCL: x\r\n");
        handle_unsolicited(&mut state, b"\r\n+CREG: zz\r\n");
        handle_unsolicited(&mut state, b"\r\n+UUPSDA: 0,\"not an ip\"\r\n");
        handle_unsolicited(&mut state, b"\r\n+CSQ: 12\r\n");
        handle_unsolicited(&mut state, b"\r\n+UUSTUFF: 1\r\n");

        assert_eq!(state.network, before);
        assert_eq!(state.sockets.len(), 1);
    }
}
