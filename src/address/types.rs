use thiserror::Error;

/// An address that passed validation, split and normalised for probing.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub original: String,
    pub local: String,
    pub domain: String,
    pub ascii_domain: String,
}

impl ParsedAddress {
    /// `local@ascii_domain`, the form sent in `RCPT TO`.
    pub fn probe_form(&self) -> String {
        format!("{}@{}", self.local, self.ascii_domain)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("invalid email address: {}", reasons.join("; "))]
    Invalid { reasons: Vec<String> },
    #[error("{field} normalises to an empty string")]
    EmptyName { field: &'static str },
}

impl AddressError {
    pub(crate) fn invalid(reasons: Vec<String>) -> Self {
        Self::Invalid { reasons }
    }
}
