use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

use crate::address::AddressError;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("cannot resolve '{domain}': {source}")]
    InvalidDomain {
        domain: String,
        #[source]
        source: AddressError,
    },
    #[error("system resolver unavailable: {source}")]
    ResolverInit {
        #[source]
        source: ResolveError,
    },
    #[error("DNS lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn invalid_domain(domain: &str, source: AddressError) -> Self {
        Self::InvalidDomain {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: ResolveError) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(domain: &str, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.to_string(),
            source,
        }
    }
}
