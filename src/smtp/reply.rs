use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::error::SessionError;

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Reads one (possibly multi-line) reply. EOF before the first line maps to
/// [`SessionError::ConnectionClosed`].
pub(crate) async fn read_reply<R>(reader: &mut R) -> Result<SmtpReply, SessionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        let mut raw = String::new();
        let bytes = reader
            .read_line(&mut raw)
            .await
            .map_err(SessionError::io)?;
        if bytes == 0 {
            return Err(SessionError::ConnectionClosed);
        }
        if raw.ends_with('\n') {
            raw.pop();
            if raw.ends_with('\r') {
                raw.pop();
            }
        }

        if raw.len() < 3 || !raw.is_char_boundary(3) {
            return Err(SessionError::protocol(format!("invalid SMTP reply: '{raw}'")));
        }
        let code_part = &raw[..3];
        let parsed_code = code_part.parse::<u16>().map_err(|_| {
            SessionError::protocol(format!("invalid SMTP status code: '{code_part}'"))
        })?;
        match code {
            Some(existing) if existing != parsed_code => {
                return Err(SessionError::protocol(format!(
                    "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                )));
            }
            Some(_) => {}
            None => code = Some(parsed_code),
        }
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        message_lines.push(raw.get(4..).unwrap_or_default().to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.unwrap_or_default(),
        message: message_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(input: &[u8]) -> Result<SmtpReply, SessionError> {
        let mut reader = input;
        read_reply(&mut reader).await
    }

    #[tokio::test]
    async fn single_line() {
        let reply = parse(b"220 mx.example.com ESMTP ready\r\n").await.expect("reply");
        assert_eq!(reply, SmtpReply::new(220, "mx.example.com ESMTP ready"));
    }

    #[tokio::test]
    async fn multi_line_ehlo() {
        let reply = parse(b"250-mx.example.com\r\n250-SIZE 1000\r\n250 8BITMIME\r\n")
            .await
            .expect("reply");
        assert_eq!(reply.code, 250);
        assert_eq!(reply.message, "mx.example.com\nSIZE 1000\n8BITMIME");
    }

    #[tokio::test]
    async fn bare_code_without_text() {
        let reply = parse(b"221\n").await.expect("reply");
        assert_eq!(reply, SmtpReply::new(221, ""));
    }

    #[tokio::test]
    async fn inconsistent_codes_are_protocol_errors() {
        let err = parse(b"250-first\r\n251 second\r\n").await.expect_err("mismatch");
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[tokio::test]
    async fn garbage_is_protocol_error() {
        let err = parse(b"hello there\r\n").await.expect_err("garbage");
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[tokio::test]
    async fn eof_is_connection_closed() {
        let err = parse(b"").await.expect_err("eof");
        assert!(matches!(err, SessionError::ConnectionClosed));
    }
}
