use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};

use super::{Error, MailRoute, MxRecord};
use crate::address::parse_domain;

/// Builds a resolver from the system configuration (`/etc/resolv.conf`).
pub fn system_resolver() -> Result<TokioAsyncResolver, Error> {
    TokioAsyncResolver::tokio_from_system_conf().map_err(Error::resolver_init)
}

/// Lookup the mail route for `domain` using the system resolver.
///
/// The domain is validated and converted to its ASCII form before querying
/// DNS; an invalid domain never reaches the resolver.
pub async fn resolve_mail_route(domain: &str) -> Result<MailRoute, Error> {
    let ascii = parse_domain(domain).map_err(|err| Error::invalid_domain(domain, err))?;
    let resolver = system_resolver()?;
    resolve_with(&resolver, &ascii).await
}

pub(crate) async fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MailRoute, Error>
where
    R: LookupMx,
{
    let records = match resolver.lookup_mx(ascii_domain).await {
        Ok(records) => records,
        Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Vec::new(),
        Err(err) => return Err(Error::lookup(ascii_domain, err)),
    };

    let route = MailRoute::from_records(records);
    tracing::debug!(
        target: "mx",
        domain = ascii_domain,
        hosts = ?route.host_names(),
        "resolved mail route"
    );
    Ok(route)
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.mx_lookup(domain).await?;
        let records = lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(mx.exchange().to_utf8())))
            .collect();
        Ok(records)
    }
}
