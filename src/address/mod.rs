//! Address validation run before any DNS or SMTP activity, and the name
//! normalisation used to build candidate local-parts.

mod domain;
mod local;
mod names;
mod types;

pub use names::normalize_name;
pub use types::{AddressError, ParsedAddress};

use domain::check_domain;
use local::check_local;

/// Validates `email` and splits it into local-part and ASCII domain.
pub fn parse_address(email: &str) -> Result<ParsedAddress, AddressError> {
    let input = email.trim();
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let mut reasons = Vec::new();
    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let parts: Vec<&str> = input.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return Err(AddressError::invalid(reasons));
    }
    let (local, domain) = (parts[0], parts[1]);

    check_local(local, &mut reasons);
    let ascii_domain = check_domain(domain, &mut reasons);

    match ascii_domain {
        Some(ascii_domain) if reasons.is_empty() => Ok(ParsedAddress {
            original: email.to_string(),
            local: local.to_string(),
            domain: domain.to_lowercase(),
            ascii_domain,
        }),
        _ => Err(AddressError::invalid(reasons)),
    }
}

/// Validates a bare domain (catch-all detection, pattern detection, guessing).
pub fn parse_domain(domain: &str) -> Result<String, AddressError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(AddressError::Empty);
    }
    let mut reasons = Vec::new();
    match check_domain(trimmed, &mut reasons) {
        Some(ascii) => Ok(ascii),
        None => Err(AddressError::invalid(reasons)),
    }
}
