use std::time::Duration;

use crate::address::ParsedAddress;
use crate::smtp::{DEFAULT_TIMEOUT, SMTP_PORT, SessionConfig, Transport};

/// Controls how [`verify_email`](crate::verify::verify_email) and the
/// operations built on it interrogate SMTP servers.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Envelope sender used in `MAIL FROM`.
    pub from_email: String,
    pub helo_name: Option<String>,
    pub timeout: Duration,
    /// First port tried on each host; 587 then 465 follow.
    pub port: u16,
    /// Additional exchanges tried after the preferred one.
    pub retry_count: u32,
    pub simulation_mode: bool,
    pub simulation_result: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            from_email: String::new(),
            helo_name: None,
            timeout: DEFAULT_TIMEOUT,
            port: SMTP_PORT,
            retry_count: 2,
            simulation_mode: false,
            simulation_result: false,
        }
    }
}

impl VerifyOptions {
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
            ..Self::default()
        }
    }

    /// Every attempt of a run reports `result` without touching the network.
    pub fn simulated(mut self, result: bool) -> Self {
        self.simulation_mode = true;
        self.simulation_result = result;
        self
    }

    /// Name used in `EHLO`: explicit value, else the sender's domain.
    pub fn helo_name(&self, sender: &ParsedAddress) -> String {
        self.helo_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| sender.ascii_domain.clone())
    }

    pub(crate) fn session_config(
        &self,
        target: &ParsedAddress,
        sender: &ParsedAddress,
        mx_host: &str,
        port: u16,
        transport: Transport,
    ) -> SessionConfig {
        SessionConfig {
            domain: target.ascii_domain.clone(),
            mx_host: mx_host.to_string(),
            helo_name: self.helo_name(sender),
            from_address: sender.probe_form(),
            to_address: target.probe_form(),
            port,
            transport,
            timeout: self.timeout,
            simulation: self.simulation_mode.then_some(self.simulation_result),
        }
    }
}
