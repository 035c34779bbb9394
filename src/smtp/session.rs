use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::config::{SessionConfig, Transport};
use super::error::SessionError;
use super::handshake::{Command, Envelope, HandshakeState};
use super::provider::is_high_false_positive_host;
use super::reply::read_reply;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub accepted: bool,
    /// The exchange belongs to a provider known to accept then bounce.
    pub high_false_positive_risk: bool,
}

impl From<&SessionConfig> for Envelope {
    fn from(config: &SessionConfig) -> Self {
        Self {
            helo_name: config.helo_name.clone(),
            from_address: config.from_address.clone(),
            to_address: config.to_address.clone(),
        }
    }
}

/// Opens one connection to `config.mx_host:config.port`, runs the
/// single-recipient check and releases the connection on every path.
///
/// Refusal, timeout and socket errors are returned as `Err`: "could not
/// determine" is never reported as a rejected recipient.
pub async fn run_session(config: &SessionConfig) -> Result<SessionOutcome, SessionError> {
    let high_false_positive_risk = is_high_false_positive_host(&config.mx_host);

    if let Some(accepted) = config.simulation {
        tracing::debug!(
            target: "smtp_session",
            host = %config.mx_host,
            port = config.port,
            accepted,
            "simulated session"
        );
        return Ok(SessionOutcome {
            accepted,
            high_false_positive_risk,
        });
    }

    let accepted = guarded(config, connect_and_drive(config)).await?;
    Ok(SessionOutcome {
        accepted,
        high_false_positive_risk,
    })
}

/// Applies the per-connection deadline. Dropping the future on expiry
/// drops the socket with it.
pub(crate) async fn guarded<F, T>(config: &SessionConfig, fut: F) -> Result<T, SessionError>
where
    F: Future<Output = Result<T, SessionError>>,
{
    timeout(config.timeout, fut)
        .await
        .map_err(|_| SessionError::Timeout {
            host: config.mx_host.clone(),
            port: config.port,
            timeout_ms: config.timeout_ms(),
        })?
}

async fn connect_and_drive(config: &SessionConfig) -> Result<bool, SessionError> {
    tracing::debug!(
        target: "smtp_session",
        host = %config.mx_host,
        port = config.port,
        transport = %config.transport,
        "connecting"
    );
    let tcp = TcpStream::connect((config.mx_host.as_str(), config.port))
        .await
        .map_err(|source| SessionError::Connect {
            host: config.mx_host.clone(),
            port: config.port,
            source,
        })?;

    let envelope = Envelope::from(config);
    match config.transport {
        Transport::Plain => drive(tcp, &envelope).await,
        Transport::ImplicitTls => {
            let tls_error = |source| SessionError::Tls {
                host: config.mx_host.clone(),
                source,
            };
            let connector = native_tls::TlsConnector::new().map_err(tls_error)?;
            let tls = tokio_native_tls::TlsConnector::from(connector)
                .connect(&config.mx_host, tcp)
                .await
                .map_err(tls_error)?;
            drive(tls, &envelope).await
        }
    }
}

/// Runs the handshake over an already-connected stream.
pub(crate) async fn drive<S>(stream: S, envelope: &Envelope) -> Result<bool, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut stream = BufStream::new(stream);
    let mut state = HandshakeState::AwaitGreeting;

    loop {
        let reply = match read_reply(&mut stream).await {
            Ok(reply) => reply,
            // after QUIT a hang-up or a broken socket no longer matters
            Err(err) => return state.on_close().ok_or(err),
        };
        tracing::debug!(target: "smtp_session", code = reply.code, message = %reply.message, "S");

        let transition = state.on_reply(&reply, envelope);
        state = transition.next;
        if let Some(command) = transition.command {
            tracing::debug!(target: "smtp_session", command = %command, "C");
            if let Err(err) = send(&mut stream, &command).await {
                return match command {
                    Command::Quit => state.on_close().ok_or(err),
                    _ => Err(err),
                };
            }
        }
        if let Some(accepted) = state.outcome() {
            return Ok(accepted);
        }
    }
}

async fn send<S>(stream: &mut BufStream<S>, command: &Command) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let line = format!("{command}\r\n");
    stream
        .write_all(line.as_bytes())
        .await
        .map_err(SessionError::io)?;
    stream.flush().await.map_err(SessionError::io)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::io::Builder;

    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            helo_name: "probe.example.org".to_string(),
            from_address: "probe@example.org".to_string(),
            to_address: "jane@example.com".to_string(),
        }
    }

    fn config(host: &str, port: u16, simulation: Option<bool>) -> SessionConfig {
        SessionConfig {
            domain: "example.com".to_string(),
            mx_host: host.to_string(),
            helo_name: "probe.example.org".to_string(),
            from_address: "probe@example.org".to_string(),
            to_address: "jane@example.com".to_string(),
            port,
            transport: Transport::for_port(port),
            timeout: Duration::from_millis(15_000),
            simulation,
        }
    }

    fn script_until_rcpt(rcpt_reply: &'static [u8]) -> Builder {
        let mut builder = Builder::new();
        builder
            .read(b"220 mx.example.com ESMTP ready\r\n")
            .write(b"EHLO probe.example.org\r\n")
            .read(b"250-mx.example.com\r\n250-SIZE 35882577\r\n250 8BITMIME\r\n")
            .write(b"MAIL FROM:<probe@example.org>\r\n")
            .read(b"250 2.1.0 OK\r\n")
            .write(b"RCPT TO:<jane@example.com>\r\n")
            .read(rcpt_reply)
            .write(b"QUIT\r\n");
        builder
    }

    #[tokio::test]
    async fn accepted_recipient() {
        let mock = script_until_rcpt(b"250 2.1.5 OK\r\n")
            .read(b"221 2.0.0 closing\r\n")
            .build();
        assert!(drive(mock, &envelope()).await.expect("session"));
    }

    #[tokio::test]
    async fn rejected_recipient_still_quits() {
        let mock = script_until_rcpt(b"550 5.1.1 user unknown\r\n")
            .read(b"221 bye\r\n")
            .build();
        assert!(!drive(mock, &envelope()).await.expect("session"));
    }

    #[tokio::test]
    async fn hang_up_after_quit_keeps_verdict() {
        let mock = script_until_rcpt(b"250 OK\r\n").build();
        assert!(drive(mock, &envelope()).await.expect("session"));
    }

    #[tokio::test]
    async fn rejected_sender_skips_rcpt() {
        let mock = Builder::new()
            .read(b"220 mx ready\r\n")
            .write(b"EHLO probe.example.org\r\n")
            .read(b"250 mx\r\n")
            .write(b"MAIL FROM:<probe@example.org>\r\n")
            .read(b"553 sender rejected\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();
        assert!(!drive(mock, &envelope()).await.expect("session"));
    }

    #[tokio::test]
    async fn hang_up_mid_session_is_an_error() {
        let mock = Builder::new()
            .read(b"220 mx ready\r\n")
            .write(b"EHLO probe.example.org\r\n")
            .build();
        let err = drive(mock, &envelope()).await.expect_err("closed early");
        assert!(matches!(err, SessionError::ConnectionClosed));
        assert!(err.is_connection_failure());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_greeting_stalls_until_timeout() {
        let mock = Builder::new()
            .read(b"554 no service\r\n")
            .wait(Duration::from_secs(60))
            .build();
        let cfg = config("mx.example.com", 25, None);
        let err = guarded(&cfg, drive(mock, &envelope()))
            .await
            .expect_err("should time out");
        match err {
            SessionError::Timeout { timeout_ms, .. } => assert_eq!(timeout_ms, 15_000),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn simulation_skips_network() {
        let cfg = config("host.invalid", 25, Some(true));
        let outcome = run_session(&cfg).await.expect("simulated");
        assert!(outcome.accepted);
        assert!(!outcome.high_false_positive_risk);

        let cfg = config("mta7.am0.yahoodns.net", 25, Some(false));
        let outcome = run_session(&cfg).await.expect("simulated");
        assert!(!outcome.accepted);
        assert!(outcome.high_false_positive_risk);
    }

    #[tokio::test]
    async fn refused_connection_is_connection_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = run_session(&config("127.0.0.1", port, None))
            .await
            .expect_err("nothing listens");
        assert!(err.is_connection_failure(), "{err:?}");
    }
}
