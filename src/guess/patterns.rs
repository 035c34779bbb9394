//! Candidate local-parts for a person at a domain. Pure, no I/O.

use std::fmt;

use crate::address::normalize_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailFormat {
    FirstDotLast,
    FirstLast,
    First,
    Last,
    InitialLast,
    FirstLastInitial,
    InitialDotLast,
    FirstDotLastInitial,
    LastDotFirst,
    LastFirst,
    Initials,
}

impl EmailFormat {
    /// Generation order, which is also the ranking baseline.
    pub const ALL: [EmailFormat; 11] = [
        Self::FirstDotLast,
        Self::FirstLast,
        Self::First,
        Self::Last,
        Self::InitialLast,
        Self::FirstLastInitial,
        Self::InitialDotLast,
        Self::FirstDotLastInitial,
        Self::LastDotFirst,
        Self::LastFirst,
        Self::Initials,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Self::FirstDotLast => "first.last",
            Self::FirstLast => "firstlast",
            Self::First => "first",
            Self::Last => "last",
            Self::InitialLast => "flast",
            Self::FirstLastInitial => "firstl",
            Self::InitialDotLast => "f.last",
            Self::FirstDotLastInitial => "first.l",
            Self::LastDotFirst => "last.first",
            Self::LastFirst => "lastfirst",
            Self::Initials => "fl",
        }
    }

    /// Builds the local-part from already normalised names.
    pub fn local_part(self, first: &str, last: &str) -> String {
        let f = initial(first);
        let l = initial(last);
        match self {
            Self::FirstDotLast => format!("{first}.{last}"),
            Self::FirstLast => format!("{first}{last}"),
            Self::First => first.to_string(),
            Self::Last => last.to_string(),
            Self::InitialLast => format!("{f}{last}"),
            Self::FirstLastInitial => format!("{first}{l}"),
            Self::InitialDotLast => format!("{f}.{last}"),
            Self::FirstDotLastInitial => format!("{first}.{l}"),
            Self::LastDotFirst => format!("{last}.{first}"),
            Self::LastFirst => format!("{last}{first}"),
            Self::Initials => format!("{f}{l}"),
        }
    }
}

impl fmt::Display for EmailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn initial(name: &str) -> &str {
    name.get(..1).unwrap_or_default()
}

/// Format label attached to a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    Known(EmailFormat),
    /// Local-part matches none of the templates.
    Custom,
    /// Domain accepts everything; the format cannot be told apart.
    CatchAll,
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(format) => f.write_str(format.tag()),
            Self::Custom => f.write_str("custom"),
            Self::CatchAll => f.write_str("unknown (catch-all)"),
        }
    }
}

#[cfg(feature = "with-serde")]
impl serde::Serialize for EmailFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

#[cfg(feature = "with-serde")]
impl serde::Serialize for FormatTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEmail {
    pub address: String,
    pub format: EmailFormat,
}

/// The eleven candidates for `first_name last_name` at `domain`, in
/// [`EmailFormat::ALL`] order. Names are reduced to `[a-z0-9]`.
pub fn generate_candidates(first_name: &str, last_name: &str, domain: &str) -> Vec<CandidateEmail> {
    let first = normalize_name(first_name);
    let last = normalize_name(last_name);
    let domain = domain.trim().to_ascii_lowercase();
    EmailFormat::ALL
        .iter()
        .map(|format| CandidateEmail {
            address: format!("{}@{domain}", format.local_part(&first, &last)),
            format: *format,
        })
        .collect()
}

/// Re-derives which template produced `address`; the first matching
/// template wins.
pub fn derive_format(address: &str, first_name: &str, last_name: &str) -> FormatTag {
    let local = address
        .rsplit_once('@')
        .map_or(address, |(local, _)| local)
        .to_ascii_lowercase();
    let first = normalize_name(first_name);
    let last = normalize_name(last_name);
    EmailFormat::ALL
        .iter()
        .find(|format| format.local_part(&first, &last) == local)
        .map_or(FormatTag::Custom, |format| FormatTag::Known(*format))
}
