//! Mail-route resolution.
//!
//! The public entry point is [`resolve_mail_route`], which performs an
//! asynchronous MX lookup using the system resolver and returns the
//! exchanges ordered by ascending preference. A domain without MX records
//! yields an empty [`MailRoute`], never an error.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{resolve_mail_route, system_resolver};
pub use types::{MailRoute, MxRecord};

pub(crate) use resolver::{LookupMx, resolve_with};
