//! Domain-wide pattern detection with made-up people.
//!
//! Nobody is called "Zqxvbnmk Wjplkrtd", so any acceptance among the probes
//! means the domain takes everything and the run is aborted.

use crate::address::parse_domain;
use crate::mx::{self, LookupMx};
use crate::verify::{
    NetworkRunner, SessionRunner, VerifyOptions, no_route_message, parse_sender,
};

use super::{EmailFormat, FormatTag, Guess, generate_candidates, verify_in_batches};

/// (first, last) pairs that should not exist anywhere.
pub const SYNTHETIC_NAMES: [(&str, &str); 2] =
    [("zqxvbnmk", "wjplkrtd"), ("xkcdqwzy", "vbnmjqtr")];

const PROBED_FORMATS: usize = 5;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternReport {
    pub domain: String,
    pub has_catch_all: bool,
    /// Synthetic addresses checked, in probing order.
    pub probes: Vec<Guess>,
    /// Formats to try with a real name, best first. Empty unless every probe
    /// was cleanly rejected.
    pub candidate_formats: Vec<EmailFormat>,
    pub error: Option<String>,
    pub high_false_positive_risk: bool,
}

impl PatternReport {
    fn failed(domain: &str, error: impl Into<String>) -> Self {
        Self {
            domain: domain.to_string(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

pub async fn detect_pattern(domain: &str, options: &VerifyOptions) -> PatternReport {
    let resolver = match mx::system_resolver() {
        Ok(resolver) => resolver,
        Err(err) => return PatternReport::failed(domain, err.to_string()),
    };
    detect_pattern_with(domain, options, &resolver, &NetworkRunner).await
}

pub(crate) async fn detect_pattern_with<R, S>(
    domain: &str,
    options: &VerifyOptions,
    resolver: &R,
    runner: &S,
) -> PatternReport
where
    R: LookupMx,
    S: SessionRunner,
{
    let ascii_domain = match parse_domain(domain) {
        Ok(ascii) => ascii,
        Err(err) => return PatternReport::failed(domain, format!("Invalid domain: {err}")),
    };
    if let Err(err) = parse_sender(options) {
        return PatternReport::failed(&ascii_domain, err);
    }
    match mx::resolve_with(resolver, &ascii_domain).await {
        Ok(route) if route.is_empty() => {
            return PatternReport::failed(&ascii_domain, no_route_message(&ascii_domain));
        }
        Ok(_) => {}
        Err(err) => return PatternReport::failed(&ascii_domain, err.to_string()),
    }

    let probes: Vec<(String, EmailFormat)> = SYNTHETIC_NAMES
        .iter()
        .flat_map(|(first, last)| {
            generate_candidates(first, last, &ascii_domain)
                .into_iter()
                .take(PROBED_FORMATS)
        })
        .map(|c| (c.address, c.format))
        .collect();

    let mut report = PatternReport {
        domain: ascii_domain.clone(),
        ..PatternReport::default()
    };
    let mut inconclusive = None;

    for batch in probes.chunks(super::BATCH_SIZE) {
        let addresses: Vec<String> = batch.iter().map(|(address, _)| address.clone()).collect();
        let results = verify_in_batches(&addresses, options, resolver, runner).await;

        for ((address, format), result) in batch.iter().zip(results) {
            report.high_false_positive_risk |= result.high_false_positive_risk;
            if !result.is_conclusive() && inconclusive.is_none() {
                inconclusive = result.error.clone();
            }
            report.probes.push(Guess {
                address: address.clone(),
                exists: result.exists,
                format: FormatTag::Known(*format),
            });
        }

        if report.probes.iter().any(|g| g.exists) {
            tracing::warn!(
                target: "guess",
                domain = %ascii_domain,
                "synthetic address accepted, treating domain as catch-all"
            );
            report.has_catch_all = true;
            report.error = Some(format!(
                "A made-up address was accepted: {ascii_domain} looks like a catch-all domain, \
                 pattern detection aborted"
            ));
            return report;
        }
    }

    match inconclusive {
        Some(cause) => report.error = Some(cause),
        None => {
            report.candidate_formats = EmailFormat::ALL[..PROBED_FORMATS].to_vec();
            tracing::info!(
                target: "guess",
                domain = %ascii_domain,
                "all synthetic probes rejected"
            );
        }
    }
    report
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
        StubResolver::with_hosts(&[(10, "mx.example.com")])
    }

    #[tokio::test]
    async fn clean_rejections_yield_baseline_formats() {
        let runner = ScriptedRunner::accepting(&[]);
        let report = detect_pattern_with("example.com", &options(), &resolver(), &runner).await;

        assert!(!report.has_catch_all);
        assert_eq!(report.error, None);
        assert_eq!(report.probes.len(), 10);
        assert_eq!(runner.call_count(), 10);
        assert_eq!(report.probes[0].address, "zqxvbnmk.wjplkrtd@example.com");
        assert_eq!(report.probes[5].address, "xkcdqwzy.vbnmjqtr@example.com");
        assert_eq!(
            report.candidate_formats,
            vec![
                EmailFormat::FirstDotLast,
                EmailFormat::FirstLast,
                EmailFormat::First,
                EmailFormat::Last,
                EmailFormat::InitialLast,
            ]
        );
    }

    #[tokio::test]
    async fn acceptance_aborts_after_its_batch() {
        // fourth probe, so the second batch
        let runner = ScriptedRunner::accepting(&["wjplkrtd@example.com"]);
        let report = detect_pattern_with("example.com", &options(), &resolver(), &runner).await;

        assert!(report.has_catch_all);
        assert_eq!(report.probes.len(), 6);
        assert_eq!(runner.call_count(), 6);
        assert!(report.candidate_formats.is_empty());
        assert!(report.error.as_deref().unwrap_or_default().contains("catch-all"));
    }

    #[tokio::test]
    async fn simulated_acceptance_stops_on_first_batch() {
        let report = detect_pattern_with(
            "example.com",
            &options().simulated(true),
            &resolver(),
            &NetworkRunner,
        )
        .await;
        assert!(report.has_catch_all);
        assert_eq!(report.probes.len(), 3);
    }

    #[tokio::test]
    async fn unreachable_servers_leave_no_baseline() {
        let runner = ScriptedRunner::refusing();
        let report = detect_pattern_with("example.com", &options(), &resolver(), &runner).await;

        assert!(!report.has_catch_all);
        assert!(report.candidate_formats.is_empty());
        assert!(
            report
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("Could not connect")
        );
    }

    #[tokio::test]
    async fn empty_route_is_reported_without_probing() {
        let runner = ScriptedRunner::refusing();
        let report = detect_pattern_with(
            "example-empty-mx.test",
            &options(),
            &StubResolver::empty(),
            &runner,
        )
        .await;
        assert!(report.probes.is_empty());
        assert_eq!(runner.call_count(), 0);
        assert!(
            report
                .error
                .as_deref()
                .unwrap_or_default()
                .starts_with("No MX records found for example-empty-mx.test")
        );
    }
}
