#![forbid(unsafe_code)]
//! mailprobe_lib : vérification d'existence d'adresses e-mail par sondage SMTP.
//!
//! The probe resolves the domain's MX route, opens a session with the
//! preferred exchanger and stops after `RCPT TO`: no mail is ever sent.
//! Servers often block or lie to such probes, so a negative answer is never
//! a certainty and carries a caveat.
//!
//! ```no_run
//! # async fn demo() {
//! use mailprobe_lib::{VerifyOptions, verify_email};
//!
//! let options = VerifyOptions::new("probe@my-domain.example");
//! let result = verify_email("someone@example.com", &options).await;
//! println!("{} exists: {}", result.email, result.exists);
//! # }
//! ```

pub mod address;
pub mod catchall;
pub mod guess;
pub mod mx;
pub mod smtp;
pub mod verify;

pub use address::{AddressError, ParsedAddress, normalize_name, parse_address, parse_domain};
pub use catchall::{CatchAllResult, detect_catch_all};
pub use guess::{
    CandidateEmail, EmailFormat, FormatTag, Guess, GuessRequest, GuessResult, PatternReport,
    derive_format, detect_pattern, generate_candidates, guess_email, rank_guesses,
};
pub use mx::{Error as MxError, MailRoute, MxRecord, resolve_mail_route};
pub use smtp::{SessionConfig, SessionError, SessionOutcome, Transport, run_session};
pub use verify::{VerificationResult, VerificationStatus, VerifyOptions, verify_email};
