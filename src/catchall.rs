//! Catch-all detection: probe the domain with an address nobody owns.

use rand::{Rng, distributions::Alphanumeric};

use crate::address::{ParsedAddress, parse_domain};
use crate::mx::{self, LookupMx};
use crate::verify::{
    NetworkRunner, SessionRunner, VerificationStatus, VerifyOptions, no_route_message,
    parse_sender, probe_route,
};

const PROBE_LOCAL_LEN: usize = 20;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchAllResult {
    pub domain: String,
    pub has_catch_all: bool,
    pub mail_route: Vec<String>,
    pub probed_address: Option<String>,
    pub error: Option<String>,
    pub high_false_positive_risk: bool,
    /// The probe got a real answer from a server.
    pub conclusive: bool,
}

impl CatchAllResult {
    fn failed(domain: &str, mail_route: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.to_string(),
            has_catch_all: false,
            mail_route,
            probed_address: None,
            error: Some(error.into()),
            high_false_positive_risk: false,
            conclusive: false,
        }
    }

    pub(crate) fn is_no_route(&self) -> bool {
        self.mail_route.is_empty() && self.error.is_some()
    }
}

/// 20 lowercase alphanumerics; only needs to make a collision with a real
/// mailbox implausible.
pub fn random_local_part() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PROBE_LOCAL_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Reports whether `domain` accepts mail for any local-part.
pub async fn detect_catch_all(domain: &str, options: &VerifyOptions) -> CatchAllResult {
    let resolver = match mx::system_resolver() {
        Ok(resolver) => resolver,
        Err(err) => return CatchAllResult::failed(domain, Vec::new(), err.to_string()),
    };
    detect_with(domain, options, &resolver, &NetworkRunner).await
}

pub(crate) async fn detect_with<R, S>(
    domain: &str,
    options: &VerifyOptions,
    resolver: &R,
    runner: &S,
) -> CatchAllResult
where
    R: LookupMx,
    S: SessionRunner,
{
    let ascii_domain = match parse_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => {
            return CatchAllResult::failed(domain, Vec::new(), format!("Invalid domain: {err}"));
        }
    };
    let sender = match parse_sender(options) {
        Ok(sender) => sender,
        Err(err) => return CatchAllResult::failed(&ascii_domain, Vec::new(), err),
    };

    let route = match mx::resolve_with(resolver, &ascii_domain).await {
        Ok(route) => route,
        Err(err) => return CatchAllResult::failed(&ascii_domain, Vec::new(), err.to_string()),
    };
    if route.is_empty() {
        return CatchAllResult::failed(&ascii_domain, Vec::new(), no_route_message(&ascii_domain));
    }

    let local = random_local_part();
    let probe = ParsedAddress {
        original: format!("{local}@{ascii_domain}"),
        local,
        domain: ascii_domain.clone(),
        ascii_domain: ascii_domain.clone(),
    };
    tracing::debug!(target: "catchall", domain = %ascii_domain, probe = %probe.original, "probing");
    // same route for the probe and the report
    let verification = probe_route(&probe, &sender, &route, options, runner).await;
    let probed_address = probe.original;

    if verification.exists {
        tracing::warn!(target: "catchall", domain = %ascii_domain, "domain accepts any recipient");
    }
    CatchAllResult {
        domain: ascii_domain,
        has_catch_all: verification.exists,
        mail_route: route.host_names(),
        probed_address: Some(probed_address),
        conclusive: verification.is_conclusive(),
        // a plain rejection of the probe is the expected answer, not an error
        error: match verification.status {
            VerificationStatus::Exists | VerificationStatus::Rejected => None,
            _ => verification.error,
        },
        high_false_positive_risk: verification.high_false_positive_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::tests::StubResolver;
    use crate::verify::tests::ScriptedRunner;

    fn options() -> VerifyOptions {
        VerifyOptions::new("probe@example.org")
    }

    fn resolver() -> StubResolver {
        StubResolver::with_hosts(&[(10, "mx1.example.com"), (20, "mx2.example.com")])
    }

    #[test]
    fn random_local_part_shape() {
        let local = random_local_part();
        assert_eq!(local.len(), 20);
        assert!(local.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(local, random_local_part());
    }

    #[tokio::test]
    async fn simulated_acceptance_means_catch_all() {
        let result = detect_with(
            "Example.com",
            &options().simulated(true),
            &resolver(),
            &NetworkRunner,
        )
        .await;
        assert!(result.has_catch_all);
        assert!(result.conclusive);
        assert_eq!(result.error, None);
        assert_eq!(result.mail_route, vec!["mx1.example.com", "mx2.example.com"]);

        let probed = result.probed_address.expect("probe address");
        let (local, domain) = probed.split_once('@').expect("address");
        assert_eq!(domain, "example.com");
        assert_eq!(local.len(), 20);
        assert!(local.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn rejected_probe_is_not_catch_all() {
        let runner = ScriptedRunner::accepting(&[]);
        let result = detect_with("example.com", &options(), &resolver(), &runner).await;
        assert!(!result.has_catch_all);
        assert!(result.conclusive);
        assert_eq!(result.error, None);
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_servers_are_reported() {
        let runner = ScriptedRunner::refusing();
        let result = detect_with("example.com", &options(), &resolver(), &runner).await;
        assert!(!result.has_catch_all);
        assert!(!result.conclusive);
        assert!(result.error.is_some());
        assert_eq!(runner.call_count(), 6);
    }

    #[tokio::test]
    async fn invalid_sender_is_rejected_before_dns() {
        let resolver = resolver();
        let runner = ScriptedRunner::refusing();
        let result = detect_with(
            "example.com",
            &VerifyOptions::new("not-an-address"),
            &resolver,
            &runner,
        )
        .await;

        assert_eq!(resolver.calls.get(), 0);
        assert_eq!(runner.call_count(), 0);
        assert!(result.mail_route.is_empty());
        assert!(result.probed_address.is_none());
        assert!(
            result
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("Invalid sender address")
        );
    }

    #[tokio::test]
    async fn route_is_resolved_once_and_probed_as_reported() {
        let resolver = resolver();
        let runner = ScriptedRunner::refusing();
        let result = detect_with("example.com", &options(), &resolver, &runner).await;

        assert_eq!(resolver.calls.get(), 1);
        let probed_hosts: Vec<String> = runner
            .calls
            .borrow()
            .iter()
            .map(|cfg| cfg.mx_host.clone())
            .collect();
        assert_eq!(probed_hosts[0], result.mail_route[0]);
        assert_eq!(probed_hosts[5], result.mail_route[1]);
        assert!(
            runner
                .recipients()
                .iter()
                .all(|to| Some(to) == result.probed_address.as_ref())
        );
    }

    #[tokio::test]
    async fn no_route_reports_error() {
        let runner = ScriptedRunner::refusing();
        let result = detect_with(
            "example-empty-mx.test",
            &options(),
            &StubResolver::empty(),
            &runner,
        )
        .await;
        assert!(result.is_no_route());
        assert!(result.probed_address.is_none());
        assert!(
            result
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("No MX records found")
        );
        assert_eq!(runner.call_count(), 0);
    }
}
