//! Verification orchestrator.
//!
//! [`verify_email`] validates the address, resolves the mail route and walks
//! the [`attempt_plan`]: the preferred exchange on the configured port, then
//! 587 and 465 (TLS), then the same sequence on up to `retry_count`
//! alternate exchanges. Connection-level failures move to the next step;
//! everything ends in a [`VerificationResult`], never in an error.

mod options;
mod plan;
mod types;

pub use options::VerifyOptions;
pub use plan::{PlannedAttempt, attempt_plan, port_sequence};
pub use types::{AttemptOutcome, PROBE_CAVEAT, ProbeAttempt, VerificationResult, VerificationStatus};

use crate::address::{AddressError, ParsedAddress, parse_address};
use crate::mx::{self, LookupMx, MailRoute};
use crate::smtp::{SessionConfig, SessionError, SessionOutcome, run_session};

/// Seam between the orchestrator and the session client.
pub(crate) trait SessionRunner {
    async fn run(&self, config: &SessionConfig) -> Result<SessionOutcome, SessionError>;
}

pub(crate) struct NetworkRunner;

impl SessionRunner for NetworkRunner {
    async fn run(&self, config: &SessionConfig) -> Result<SessionOutcome, SessionError> {
        run_session(config).await
    }
}

/// Checks whether `email` is likely accepted by its mail exchanger, without
/// sending mail.
pub async fn verify_email(email: &str, options: &VerifyOptions) -> VerificationResult {
    let resolver = match mx::system_resolver() {
        Ok(resolver) => resolver,
        Err(err) => {
            return VerificationResult::negative(email, VerificationStatus::Failed, err, Vec::new());
        }
    };
    verify_with(email, options, &resolver, &NetworkRunner).await
}

pub(crate) async fn verify_with<R, S>(
    email: &str,
    options: &VerifyOptions,
    resolver: &R,
    runner: &S,
) -> VerificationResult
where
    R: LookupMx,
    S: SessionRunner,
{
    let (target, sender) = match validate_inputs(email, options) {
        Ok(pair) => pair,
        Err(err) => {
            return VerificationResult::negative(
                email,
                VerificationStatus::InvalidInput,
                err,
                Vec::new(),
            );
        }
    };

    let route = match mx::resolve_with(resolver, &target.ascii_domain).await {
        Ok(route) => route,
        Err(err) => {
            return VerificationResult::negative(email, VerificationStatus::Failed, err, Vec::new());
        }
    };

    if route.is_empty() {
        tracing::info!(target: "verify", domain = %target.ascii_domain, "no MX records");
        return VerificationResult::negative(
            email,
            VerificationStatus::NoRoute,
            no_route_message(&target.ascii_domain),
            Vec::new(),
        );
    }

    probe_route(&target, &sender, &route, options, runner).await
}

pub(crate) fn no_route_message(domain: &str) -> String {
    format!("No MX records found for {domain}")
}

fn validate_inputs(
    email: &str,
    options: &VerifyOptions,
) -> Result<(ParsedAddress, ParsedAddress), String> {
    let target = parse_address(email).map_err(|err| format!("Invalid email address: {err}"))?;
    let sender = parse_sender(options)?;
    Ok((target, sender))
}

/// The envelope sender, checked like any other input before DNS is queried.
pub(crate) fn parse_sender(options: &VerifyOptions) -> Result<ParsedAddress, String> {
    parse_address(&options.from_email).map_err(|err| match err {
        AddressError::Empty => "Sender address (from email) is required".to_string(),
        other => format!("Invalid sender address: {other}"),
    })
}

/// Walks the attempt plan over an already resolved, non-empty route.
pub(crate) async fn probe_route<S: SessionRunner>(
    target: &ParsedAddress,
    sender: &ParsedAddress,
    route: &MailRoute,
    options: &VerifyOptions,
    runner: &S,
) -> VerificationResult {
    let email = target.original.as_str();
    let plan = attempt_plan(route, options.port, options.retry_count);
    let mut attempts = Vec::with_capacity(plan.len());
    let mut last_failure = None;

    for step in plan {
        let config = options.session_config(target, sender, &step.host, step.port, step.transport);
        tracing::debug!(
            target: "verify",
            email,
            host = %step.host,
            port = step.port,
            transport = %step.transport,
            "attempt"
        );

        match runner.run(&config).await {
            Ok(outcome) => {
                let accepted = outcome.accepted;
                attempts.push(ProbeAttempt {
                    host: step.host.clone(),
                    port: step.port,
                    transport: step.transport,
                    outcome: if accepted {
                        AttemptOutcome::Accepted
                    } else {
                        AttemptOutcome::Rejected
                    },
                });
                tracing::info!(target: "verify", email, host = %step.host, accepted, "verdict");
                let result = if accepted {
                    VerificationResult::exists(email, outcome.high_false_positive_risk, attempts)
                } else {
                    VerificationResult::negative(
                        email,
                        VerificationStatus::Rejected,
                        format!("{} was not accepted by {}", config.to_address, step.host),
                        attempts,
                    )
                };
                return result.with_risk(outcome.high_false_positive_risk);
            }
            Err(err) if err.is_connection_failure() => {
                tracing::warn!(
                    target: "verify",
                    email,
                    host = %step.host,
                    port = step.port,
                    error = %err,
                    "connection failure, trying next option"
                );
                attempts.push(ProbeAttempt {
                    host: step.host.clone(),
                    port: step.port,
                    transport: step.transport,
                    outcome: AttemptOutcome::ConnectionFailed {
                        message: err.to_string(),
                    },
                });
                last_failure = Some(err.to_string());
            }
            Err(err) => {
                tracing::warn!(
                    target: "verify",
                    email,
                    host = %step.host,
                    error = %err,
                    "session failed"
                );
                let cause = format!("SMTP session with {}:{} failed: {err}", step.host, step.port);
                attempts.push(ProbeAttempt {
                    host: step.host,
                    port: step.port,
                    transport: step.transport,
                    outcome: AttemptOutcome::Failed {
                        message: err.to_string(),
                    },
                });
                return VerificationResult::negative(
                    email,
                    VerificationStatus::Failed,
                    cause,
                    attempts,
                );
            }
        }
    }

    let cause = format!(
        "Could not connect to any mail server for {} after {} attempts (last error: {})",
        target.ascii_domain,
        attempts.len(),
        last_failure.as_deref().unwrap_or("none")
    );
    VerificationResult::negative(email, VerificationStatus::Unreachable, cause, attempts)
}
