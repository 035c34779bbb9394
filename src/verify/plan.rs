use crate::mx::MailRoute;
use crate::smtp::{SMTPS_PORT, SUBMISSION_PORT, Transport};

/// One (host, port, transport) triple of the fallback sequence.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAttempt {
    pub host: String,
    pub port: u16,
    pub transport: Transport,
}

/// Ports tried on each host, in order: the configured one, then 587, then
/// 465 over TLS. Repeats are skipped.
pub fn port_sequence(first: u16) -> Vec<(u16, Transport)> {
    let mut ports = Vec::with_capacity(3);
    for port in [first, SUBMISSION_PORT, SMTPS_PORT] {
        if !ports.iter().any(|(p, _)| *p == port) {
            ports.push((port, Transport::for_port(port)));
        }
    }
    ports
}

/// The full fallback policy as data: the preferred exchange plus at most
/// `retry_count` alternates, each with the whole port sequence.
pub fn attempt_plan(route: &MailRoute, first_port: u16, retry_count: u32) -> Vec<PlannedAttempt> {
    let max_hosts = usize::try_from(retry_count)
        .unwrap_or(usize::MAX)
        .saturating_add(1);
    let ports = port_sequence(first_port);
    route
        .hosts()
        .take(max_hosts)
        .flat_map(|host| {
            ports.iter().map(move |(port, transport)| PlannedAttempt {
                host: host.to_string(),
                port: *port,
                transport: *transport,
            })
        })
        .collect()
}
