use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const SMTP_PORT: u16 = 25;
pub const SUBMISSION_PORT: u16 = 587;
pub const SMTPS_PORT: u16 = 465;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    /// TLS from the first byte (port 465).
    ImplicitTls,
}

impl Transport {
    pub fn for_port(port: u16) -> Self {
        if port == SMTPS_PORT {
            Self::ImplicitTls
        } else {
            Self::Plain
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::ImplicitTls => f.write_str("tls"),
        }
    }
}

/// Everything one connection attempt needs. Built once per attempt and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub domain: String,
    pub mx_host: String,
    pub helo_name: String,
    pub from_address: String,
    pub to_address: String,
    pub port: u16,
    pub transport: Transport,
    pub timeout: Duration,
    /// `Some(outcome)` skips the network entirely and reports `outcome`.
    pub simulation: Option<bool>,
}

impl SessionConfig {
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
