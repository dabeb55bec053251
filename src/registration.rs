use no_std_net::Ipv4Addr;
use serde::Serialize;

use crate::scan::Scanner;

/// LAC reported while the cell is unknown
const LAC_UNKNOWN: u32 = 0xFFFF;
/// Cell id reported while the cell is unknown
const CI_UNKNOWN: u32 = 0xFFFF_FFFF;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationStatus {
    #[default]
    Unknown,
    Denied,
    NotRegistered,
    Home,
    Roaming,
}

impl RegistrationStatus {
    /// Map a 3GPP `<stat>` value. Searching (2) counts as not registered.
    pub fn from_stat(stat: i32) -> Option<Self> {
        Some(match stat {
            0 | 2 => Self::NotRegistered,
            1 => Self::Home,
            3 => Self::Denied,
            4 => Self::Unknown,
            5 => Self::Roaming,
            _ => return None,
        })
    }

    pub fn registered(&self) -> bool {
        matches!(self, Self::Home | Self::Roaming)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessTechnology {
    #[default]
    Unknown,
    Gsm,
    Edge,
    Utran,
}

impl AccessTechnology {
    /// Map a 3GPP `<AcT>` value. The HSPA variants (4 to 6) are all UTRAN.
    pub fn from_act(act: i32) -> Option<Self> {
        Some(match act {
            0 | 1 => Self::Gsm,
            2 | 4 | 5 | 6 => Self::Utran,
            3 => Self::Edge,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegType {
    /// Circuit switched, `+CREG`
    Creg,
    /// Packet switched, `+CGREG`
    Cgreg,
}

/// Fields of one `+CREG`/`+CGREG` line. Only fields present in the line are
/// `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistrationParams {
    pub reg_type: RegType,
    pub status: Option<RegistrationStatus>,
    pub lac: Option<u16>,
    pub ci: Option<u32>,
    pub act: Option<AccessTechnology>,
}

impl RegistrationParams {
    /// Parse the arguments of either the read command reply
    /// (`<n>,<stat>[,"<lac>","<ci>"[,<AcT>]]`) or the URC
    /// (`<stat>[,"<lac>","<ci>"[,<AcT>]]`).
    ///
    /// Parsing stops at the first malformed field; everything before it is
    /// kept.
    pub fn parse(reg_type: RegType, args: &[u8]) -> Self {
        let mut params = Self {
            reg_type,
            status: None,
            lac: None,
            ci: None,
            act: None,
        };

        let (mut s, stat) = match Self::reply_form(args) {
            Some(reply) => reply,
            None => {
                let mut s = Scanner::new(args);
                match s.int() {
                    Some(stat) => (s, stat),
                    None => return params,
                }
            }
        };

        params.status = RegistrationStatus::from_stat(stat);
        params.parse_location(&mut s);
        params
    }

    /// Leading `<n>` echoed back by the read command
    fn reply_form(args: &[u8]) -> Option<(Scanner<'_>, i32)> {
        let mut s = Scanner::new(args);
        s.int()?;
        s.literal(b",")?;
        let stat = s.int()?;
        Some((s, stat))
    }

    fn parse_location(&mut self, s: &mut Scanner<'_>) -> Option<()> {
        s.literal(b",")?;
        let lac = s.quoted_hex()?;
        if lac != LAC_UNKNOWN {
            self.lac = u16::try_from(lac).ok();
        }

        s.literal(b",")?;
        let ci = s.quoted_hex()?;
        if ci != CI_UNKNOWN {
            self.ci = Some(ci);
        }

        s.literal(b",")?;
        self.act = AccessTechnology::from_act(s.int()?);
        Some(())
    }
}

/// `+CSQ: <rssi>,<qual>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    /// Received signal strength in dBm
    pub rssi: Option<i16>,
    /// Bit error rate class, 0 (best) to 7
    pub qual: Option<u8>,
}

impl SignalQuality {
    pub fn parse(args: &[u8]) -> Option<Self> {
        let mut s = Scanner::new(args);
        let rssi = s.int()?;
        s.literal(b",")?;
        let qual = s.int()?;

        Some(Self {
            rssi: match rssi {
                0..=31 => Some(-113 + 2 * rssi as i16),
                _ => None,
            },
            qual: match qual {
                0..=7 => Some(qual as u8),
                _ => None,
            },
        })
    }
}

/// Network side state as reported by the module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStatus {
    /// Circuit switched registration
    pub csd: RegistrationStatus,
    /// Packet switched registration
    pub psd: RegistrationStatus,
    pub act: AccessTechnology,
    pub rssi: Option<i16>,
    pub qual: Option<u8>,
    pub lac: Option<u16>,
    pub ci: Option<u32>,
    /// GPRS attached, as last reported by `+CIEV`
    pub attached: bool,
    /// Address of the active PDP context
    pub ip: Option<Ipv4Addr>,
    /// Storage index of the latest incoming SMS
    pub sms_index: Option<u16>,
    #[serde(skip)]
    pub(crate) detached: bool,
}

impl NetworkStatus {
    pub const fn new() -> Self {
        Self {
            csd: RegistrationStatus::Unknown,
            psd: RegistrationStatus::Unknown,
            act: AccessTechnology::Unknown,
            rssi: None,
            qual: None,
            lac: None,
            ci: None,
            attached: false,
            ip: None,
            sms_index: None,
            detached: false,
        }
    }

    /// Apply the fields present in `params`, leaving the rest untouched.
    pub fn apply(&mut self, params: &RegistrationParams) {
        if let Some(status) = params.status {
            match params.reg_type {
                RegType::Creg => self.csd = status,
                RegType::Cgreg => self.psd = status,
            }
        }
        if let Some(lac) = params.lac {
            self.lac = Some(lac);
        }
        if let Some(ci) = params.ci {
            self.ci = Some(ci);
        }
        if let Some(act) = params.act {
            self.act = act;
        }
    }

    pub fn apply_signal(&mut self, quality: &SignalQuality) {
        self.rssi = quality.rssi;
        self.qual = quality.qual;
    }

    /// Track the GPRS attach indicator, latching a detach event when an
    /// attached link drops.
    pub fn set_attached(&mut self, attached: bool) {
        if self.attached && !attached {
            self.detached = true;
        }
        self.attached = attached;
    }

    /// PDP context went down on the network side.
    pub fn deactivate(&mut self) {
        self.ip = None;
        self.set_attached(false);
    }

    /// Whether a detach happened since the last call.
    pub fn take_detached(&mut self) -> bool {
        core::mem::take(&mut self.detached)
    }

    pub fn registered(&self) -> bool {
        self.csd.registered() || self.psd.registered()
    }
}
