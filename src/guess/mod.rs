//! Guessing a person's address at a domain.
//!
//! [`guess_email`] checks catch-all status first: on a catch-all domain every
//! candidate is reported as existing with format `unknown (catch-all)`.
//! Otherwise the eleven candidates are verified in sequential batches of
//! [`BATCH_SIZE`] concurrent checks and existing addresses are moved to the
//! front without disturbing relative order.

mod detect;
mod patterns;

pub use detect::{PatternReport, SYNTHETIC_NAMES, detect_pattern};
pub use patterns::{CandidateEmail, EmailFormat, FormatTag, derive_format, generate_candidates};

use futures::future::join_all;

use crate::address::{AddressError, normalize_name, parse_domain};
use crate::catchall::detect_with;
use crate::mx::{self, LookupMx};
use crate::verify::{
    NetworkRunner, PROBE_CAVEAT, SessionRunner, VerificationResult, VerifyOptions, parse_sender,
    verify_with,
};

/// Verifications running at once; batches run one after another.
pub const BATCH_SIZE: usize = 3;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRequest {
    pub first_name: String,
    pub last_name: String,
    pub domain: String,
}

impl GuessRequest {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            domain: domain.into(),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub address: String,
    pub exists: bool,
    pub format: FormatTag,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessResult {
    pub guesses: Vec<Guess>,
    pub has_catch_all: bool,
    pub error: Option<String>,
    pub high_false_positive_risk: bool,
}

impl GuessResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn best(&self) -> Option<&Guess> {
        self.guesses.first().filter(|g| g.exists)
    }
}

/// Existing addresses first; relative order inside each group is kept.
pub fn rank_guesses(guesses: &mut [Guess]) {
    guesses.sort_by_key(|guess| !guess.exists);
}

pub async fn guess_email(request: &GuessRequest, options: &VerifyOptions) -> GuessResult {
    let resolver = match mx::system_resolver() {
        Ok(resolver) => resolver,
        Err(err) => return GuessResult::failed(err.to_string()),
    };
    guess_with(request, options, &resolver, &NetworkRunner).await
}

pub(crate) async fn guess_with<R, S>(
    request: &GuessRequest,
    options: &VerifyOptions,
    resolver: &R,
    runner: &S,
) -> GuessResult
where
    R: LookupMx,
    S: SessionRunner,
{
    let domain = match validate_request(request, options) {
        Ok(domain) => domain,
        Err(err) => return GuessResult::failed(err),
    };

    let catch_all = detect_with(&domain, options, resolver, runner).await;
    if catch_all.is_no_route() {
        return GuessResult {
            error: catch_all.error,
            ..GuessResult::default()
        };
    }

    let candidates = generate_candidates(&request.first_name, &request.last_name, &domain);

    if catch_all.has_catch_all {
        tracing::info!(
            target: "guess",
            domain = %domain,
            "catch-all domain, skipping verification"
        );
        return GuessResult {
            guesses: candidates
                .into_iter()
                .map(|c| Guess {
                    address: c.address,
                    exists: true,
                    format: FormatTag::CatchAll,
                })
                .collect(),
            has_catch_all: true,
            error: None,
            high_false_positive_risk: catch_all.high_false_positive_risk,
        };
    }

    let addresses: Vec<String> = candidates.into_iter().map(|c| c.address).collect();
    let results = verify_in_batches(&addresses, options, resolver, runner).await;

    let high_false_positive_risk = results.iter().any(|r| r.high_false_positive_risk);
    let error = if results.iter().any(|r| r.exists) {
        None
    } else {
        Some(
            results
                .iter()
                .find(|r| !r.is_conclusive())
                .and_then(|r| r.error.clone())
                .unwrap_or_else(|| format!("No candidate address was accepted. {PROBE_CAVEAT}")),
        )
    };

    let mut guesses: Vec<Guess> = addresses
        .into_iter()
        .zip(results)
        .map(|(address, result)| Guess {
            format: derive_format(&address, &request.first_name, &request.last_name),
            exists: result.exists,
            address,
        })
        .collect();
    rank_guesses(&mut guesses);

    tracing::info!(
        target: "guess",
        domain = %domain,
        found = guesses.iter().filter(|g| g.exists).count(),
        "guess finished"
    );
    GuessResult {
        guesses,
        has_catch_all: false,
        error,
        high_false_positive_risk,
    }
}

fn validate_request(request: &GuessRequest, options: &VerifyOptions) -> Result<String, String> {
    for (field, value) in [
        ("first name", &request.first_name),
        ("last name", &request.last_name),
    ] {
        if normalize_name(value).is_empty() {
            return Err(AddressError::EmptyName { field }.to_string());
        }
    }
    parse_sender(options)?;
    parse_domain(&request.domain).map_err(|err| format!("Invalid domain: {err}"))
}

/// Results come back in the order of `addresses`, whatever the completion
/// order inside a batch.
pub(crate) async fn verify_in_batches<R, S>(
    addresses: &[String],
    options: &VerifyOptions,
    resolver: &R,
    runner: &S,
) -> Vec<VerificationResult>
where
    R: LookupMx,
    S: SessionRunner,
{
    let mut results = Vec::with_capacity(addresses.len());
    for batch in addresses.chunks(BATCH_SIZE) {
        tracing::debug!(target: "guess", batch = ?batch, "verifying batch");
        let checks = batch
            .iter()
            .map(|address| verify_with(address, options, resolver, runner));
        results.extend(join_all(checks).await);
    }
    results
}
