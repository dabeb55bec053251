use core::str::FromStr;

/// Payload of a terminal error token (`ERROR`, `+CME ERROR:`, `+CMS ERROR:`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    Generic,
    Cme(CmeError),
    Cms(u16),
}

impl DeviceError {
    /// Parse the raw token bytes, including any framing.
    pub fn from_token(token: &[u8]) -> Self {
        core::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::Generic)
    }
}

impl FromStr for DeviceError {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if let Some(err) = s.trim().strip_prefix("+CME ERROR:") {
            Self::Cme(err.parse().unwrap_or(CmeError::Unknown))
        } else if let Some(err) = s.trim().strip_prefix("+CMS ERROR:") {
            Self::Cms(err.trim().parse().unwrap_or(500))
        } else {
            Self::Generic
        })
    }
}

/// Mobile termination error result codes +CME ERROR
///
/// Both the numeric (`AT+CMEE=1`) and the verbose (`AT+CMEE=2`) forms are
/// understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CmeError {
    PhoneFailure,
    NoConnectionToPhone,
    OperationNotAllowed,
    OperationNotSupported,
    SimNotInserted,
    SimPinRequired,
    SimPukRequired,
    SimFailure,
    SimBusy,
    SimWrong,
    IncorrectPassword,
    SimPin2Required,
    SimPuk2Required,
    MemoryFull,
    NotFound,
    NoNetworkService,
    NetworkTimeout,
    NetworkNotAllowed,
    Unknown,
    Other(u16),
}

const CME_ERRORS: &[(u16, &str, CmeError)] = &[
    (0, "phone failure", CmeError::PhoneFailure),
    (1, "no connection to phone", CmeError::NoConnectionToPhone),
    (3, "operation not allowed", CmeError::OperationNotAllowed),
    (4, "operation not supported", CmeError::OperationNotSupported),
    (10, "SIM not inserted", CmeError::SimNotInserted),
    (11, "SIM PIN required", CmeError::SimPinRequired),
    (12, "SIM PUK required", CmeError::SimPukRequired),
    (13, "SIM failure", CmeError::SimFailure),
    (14, "SIM busy", CmeError::SimBusy),
    (15, "SIM wrong", CmeError::SimWrong),
    (16, "incorrect password", CmeError::IncorrectPassword),
    (17, "SIM PIN2 required", CmeError::SimPin2Required),
    (18, "SIM PUK2 required", CmeError::SimPuk2Required),
    (20, "memory full", CmeError::MemoryFull),
    (22, "not found", CmeError::NotFound),
    (30, "no network service", CmeError::NoNetworkService),
    (31, "network timeout", CmeError::NetworkTimeout),
    (32, "network not allowed - emergency calls only", CmeError::NetworkNotAllowed),
    (100, "unknown", CmeError::Unknown),
];

impl CmeError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Other(code) => *code,
            other => CME_ERRORS
                .iter()
                .find(|(_, _, e)| e == other)
                .map(|(code, _, _)| *code)
                .unwrap_or(100),
        }
    }
}

impl FromStr for CmeError {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(());
        }

        if let Ok(code) = s.parse::<u16>() {
            return Ok(CME_ERRORS
                .iter()
                .find(|(c, _, _)| *c == code)
                .map(|(_, _, e)| *e)
                .unwrap_or(Self::Other(code)));
        }

        CME_ERRORS
            .iter()
            .find(|(_, text, _)| text.eq_ignore_ascii_case(s))
            .map(|(_, _, e)| *e)
            .ok_or(())
    }
}
