/// Convertit le domaine en ASCII (IDNA) et vérifie les labels.
/// Returns the ASCII form when the domain is usable; problems are pushed into `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> Option<String> {
    let ascii = match idna::domain_to_ascii(domain) {
        Ok(d) => d,
        Err(_) => {
            reasons.push("domain punycode conversion failed".to_string());
            return None;
        }
    };

    if ascii.is_empty() {
        reasons.push("domain empty after IDNA conversion".to_string());
        return None;
    }

    let before = reasons.len();
    if !ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{label}' length {} > 63",
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!("domain label '{label}' cannot start/end with '-'"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{label}' has invalid chars"));
        }
    }

    (reasons.len() == before).then_some(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_domain_ok() {
        let mut reasons = vec![];
        let ascii = check_domain("Example.com", &mut reasons);
        assert!(reasons.is_empty(), "{reasons:?}");
        assert_eq!(ascii.as_deref(), Some("example.com"));
    }

    #[test]
    fn idn_domain_is_punycoded() {
        let mut reasons = vec![];
        let ascii = check_domain("exämple.com", &mut reasons).expect("valid idn");
        assert!(ascii.starts_with("xn--"));
    }

    #[test]
    fn label_too_long() {
        let long = "a".repeat(64);
        let mut reasons = vec![];
        assert!(check_domain(&format!("{long}.com"), &mut reasons).is_none());
        assert!(!reasons.is_empty());
    }

    #[test]
    fn dotless_domain_rejected() {
        let mut reasons = vec![];
        assert!(check_domain("localhost", &mut reasons).is_none());
    }
}
