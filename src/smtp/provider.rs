/// Exchange hostnames of the Yahoo/AOL family, which answer 250 to nearly
/// any RCPT TO and bounce afterwards.
const ACCEPT_THEN_BOUNCE: &[&str] = &["yahoodns.net", "yahoo.com", "aol.com"];

/// Advisory only: the acceptance verdict is never altered by this flag.
pub fn is_high_false_positive_host(mx_host: &str) -> bool {
    let host = mx_host.to_ascii_lowercase();
    ACCEPT_THEN_BOUNCE.iter().any(|needle| host.contains(needle))
}
