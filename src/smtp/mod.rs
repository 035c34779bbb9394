//! Mail-session client: one connection, one recipient, one verdict.
//!
//! [`run_session`] dials the exchange (plain or implicit TLS), drives the
//! [`HandshakeState`] machine and reports whether `RCPT TO` was accepted.
//! A simulation switch on [`SessionConfig`] bypasses the network.

mod config;
mod error;
mod handshake;
mod provider;
mod reply;
mod session;

pub use config::{
    DEFAULT_TIMEOUT, SMTP_PORT, SMTPS_PORT, SUBMISSION_PORT, SessionConfig, Transport,
};
pub use error::SessionError;
pub use handshake::{Command, Envelope, HandshakeState, Transition};
pub use provider::is_high_false_positive_host;
pub use reply::SmtpReply;
pub use session::{SessionOutcome, run_session};
