//! The single-recipient check as an explicit state machine.
//!
//! Each state has its own transition function taking the server reply and
//! returning the next state plus the command to send, if any. The sequence
//! is strictly forward: greeting, EHLO, MAIL FROM, RCPT TO, QUIT.

use std::fmt;

use super::reply::SmtpReply;

const GREETING: u16 = 220;
const OK: u16 = 250;
const CLOSING: u16 = 221;

/// The fixed inputs of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub helo_name: String,
    pub from_address: String,
    pub to_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ehlo(String),
    MailFrom(String),
    RcptTo(String),
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo(name) => write!(f, "EHLO {name}"),
            Self::MailFrom(from) => write!(f, "MAIL FROM:<{from}>"),
            Self::RcptTo(to) => write!(f, "RCPT TO:<{to}>"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitGreeting,
    AwaitIdentificationAck,
    AwaitSenderAck,
    AwaitRecipientAck,
    AwaitClose { accepted: bool },
    Finished { accepted: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: HandshakeState,
    pub command: Option<Command>,
}

impl Transition {
    fn send(next: HandshakeState, command: Command) -> Self {
        Self {
            next,
            command: Some(command),
        }
    }

    fn stay(state: HandshakeState) -> Self {
        Self {
            next: state,
            command: None,
        }
    }

    /// Negative outcome: skip the remaining steps and say goodbye.
    fn abandon() -> Self {
        Self::send(HandshakeState::AwaitClose { accepted: false }, Command::Quit)
    }
}

impl HandshakeState {
    pub fn on_reply(self, reply: &SmtpReply, envelope: &Envelope) -> Transition {
        match self {
            Self::AwaitGreeting => greeting(reply, envelope),
            Self::AwaitIdentificationAck => identification_ack(reply, envelope),
            Self::AwaitSenderAck => sender_ack(reply, envelope),
            Self::AwaitRecipientAck => recipient_ack(reply),
            Self::AwaitClose { accepted } => close(reply, accepted),
            Self::Finished { .. } => Transition::stay(self),
        }
    }

    /// The server hung up. Only meaningful once QUIT has been sent.
    pub fn on_close(self) -> Option<bool> {
        match self {
            Self::AwaitClose { accepted } | Self::Finished { accepted } => Some(accepted),
            _ => None,
        }
    }

    pub fn outcome(self) -> Option<bool> {
        match self {
            Self::Finished { accepted } => Some(accepted),
            _ => None,
        }
    }
}

/// Anything but 220 leaves the session waiting; the session timeout ends it.
fn greeting(reply: &SmtpReply, envelope: &Envelope) -> Transition {
    if reply.code == GREETING {
        Transition::send(
            HandshakeState::AwaitIdentificationAck,
            Command::Ehlo(envelope.helo_name.clone()),
        )
    } else {
        Transition::stay(HandshakeState::AwaitGreeting)
    }
}

fn identification_ack(reply: &SmtpReply, envelope: &Envelope) -> Transition {
    if reply.code == OK {
        Transition::send(
            HandshakeState::AwaitSenderAck,
            Command::MailFrom(envelope.from_address.clone()),
        )
    } else {
        Transition::abandon()
    }
}

fn sender_ack(reply: &SmtpReply, envelope: &Envelope) -> Transition {
    if reply.code == OK {
        Transition::send(
            HandshakeState::AwaitRecipientAck,
            Command::RcptTo(envelope.to_address.clone()),
        )
    } else {
        Transition::abandon()
    }
}

fn recipient_ack(reply: &SmtpReply) -> Transition {
    Transition::send(
        HandshakeState::AwaitClose {
            accepted: reply.code == OK,
        },
        Command::Quit,
    )
}

/// 221 or anything else: the verdict is already recorded.
fn close(reply: &SmtpReply, accepted: bool) -> Transition {
    if reply.code != CLOSING {
        tracing::debug!(target: "smtp_session", code = reply.code, "unexpected reply to QUIT");
    }
    Transition::stay(HandshakeState::Finished { accepted })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            helo_name: "probe.example.org".to_string(),
            from_address: "probe@example.org".to_string(),
            to_address: "jane@example.com".to_string(),
        }
    }

    fn reply(code: u16) -> SmtpReply {
        SmtpReply::new(code, "text")
    }

    #[test]
    fn greeting_sends_ehlo() {
        let t = HandshakeState::AwaitGreeting.on_reply(&reply(220), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitIdentificationAck);
        assert_eq!(
            t.command.map(|c| c.to_string()).as_deref(),
            Some("EHLO probe.example.org")
        );
    }

    #[test]
    fn bad_greeting_stalls() {
        let t = HandshakeState::AwaitGreeting.on_reply(&reply(554), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitGreeting);
        assert!(t.command.is_none());
    }

    #[test]
    fn ehlo_ack_sends_mail_from() {
        let t = HandshakeState::AwaitIdentificationAck.on_reply(&reply(250), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitSenderAck);
        assert_eq!(t.command, Some(Command::MailFrom("probe@example.org".into())));
        assert_eq!(
            t.command.map(|c| c.to_string()).as_deref(),
            Some("MAIL FROM:<probe@example.org>")
        );
    }

    #[test]
    fn rejected_ehlo_goes_straight_to_quit() {
        let t = HandshakeState::AwaitIdentificationAck.on_reply(&reply(502), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitClose { accepted: false });
        assert_eq!(t.command, Some(Command::Quit));
    }

    #[test]
    fn sender_ack_sends_rcpt_to() {
        let t = HandshakeState::AwaitSenderAck.on_reply(&reply(250), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitRecipientAck);
        assert_eq!(
            t.command.map(|c| c.to_string()).as_deref(),
            Some("RCPT TO:<jane@example.com>")
        );
        let t = HandshakeState::AwaitSenderAck.on_reply(&reply(550), &envelope());
        assert_eq!(t.next, HandshakeState::AwaitClose { accepted: false });
    }

    #[test]
    fn recipient_verdict_then_quit() {
        let accepted = HandshakeState::AwaitRecipientAck.on_reply(&reply(250), &envelope());
        assert_eq!(accepted.next, HandshakeState::AwaitClose { accepted: true });
        assert_eq!(accepted.command, Some(Command::Quit));

        for code in [251, 450, 550, 553] {
            let t = HandshakeState::AwaitRecipientAck.on_reply(&reply(code), &envelope());
            assert_eq!(t.next, HandshakeState::AwaitClose { accepted: false }, "{code}");
            assert_eq!(t.command, Some(Command::Quit));
        }
    }

    #[test]
    fn close_finishes_with_recorded_verdict() {
        let state = HandshakeState::AwaitClose { accepted: true };
        let t = state.on_reply(&reply(221), &envelope());
        assert_eq!(t.next.outcome(), Some(true));
        assert!(t.command.is_none());
        let t = state.on_reply(&reply(500), &envelope());
        assert_eq!(t.next.outcome(), Some(true));
    }

    #[test]
    fn hang_up_only_resolves_after_quit() {
        assert_eq!(HandshakeState::AwaitGreeting.on_close(), None);
        assert_eq!(HandshakeState::AwaitRecipientAck.on_close(), None);
        assert_eq!(HandshakeState::AwaitClose { accepted: true }.on_close(), Some(true));
    }
}
