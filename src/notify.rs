//! Notification mails: composition and SMTP submission.
//!
//! Every resolved recipient of a section gets one plain-text mail quoting the whole section.
//! Alias recipients are greeted with the alias table's phrase, everybody else by name.

use crate::alias::AliasTable;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BODY_INTRO: &str =
    "Du sollst über irgendwas informiert werden. Im Sitzungsprotokoll steht dazu folgendes:";
const BODY_SIGNATURE: &str = "Viele Grüße, Dein SPAM-Skript.";

#[derive(Debug, thiserror::Error)]
/// Failure to hand a mail to the mail server.
pub enum MailError {
    /// A sender or recipient is not a valid mailbox.
    #[error("invalid mailbox {address:?}: {source}")]
    Address {
        /// The rejected address.
        address: String,
        /// Parser error.
        #[source]
        source: lettre::address::AddressError,
    },
    /// The message could not be assembled.
    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),
    /// The server did not accept the credentials.
    #[error("login as {user} failed: {source}")]
    Login {
        /// User name that was tried.
        user: String,
        /// Transport error reported during authentication.
        #[source]
        source: lettre::transport::smtp::Error,
    },
    /// Talking to the server failed.
    #[error("smtp transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    /// The server was reached but the session could not be established.
    #[error("mail server {host} is not available")]
    Unavailable {
        /// Host of the mail server.
        host: String,
    },
    /// The server answered but did not accept the mail.
    #[error("mail to {to} was refused: {reason}")]
    Refused {
        /// Recipient of the refused mail.
        to: String,
        /// Server's explanation.
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A composed mail ready for submission.
pub struct OutgoingMail {
    /// Sender mailbox.
    pub from: String,
    /// Recipient mailbox.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

#[derive(Clone, Debug)]
/// Sender and subject shared by every mail of a run.
pub struct MailSettings {
    /// Sender mailbox.
    pub from: String,
    /// Prefix put before the section heading in the subject.
    pub subject_prefix: String,
}

/// Mail submission service.
pub trait Mailer {
    /// Submits one mail.
    ///
    /// # Errors
    ///
    /// Returns an error if the mail could not be handed over.
    fn send(&mut self, mail: &OutgoingMail) -> Result<(), MailError>;
}

#[must_use]
/// Salutation for a recipient mentioned as `token`.
pub fn greeting(aliases: &AliasTable, token: &str) -> String {
    aliases
        .greeting_for(token)
        .map_or_else(|| format!("Hallo {token}"), ToString::to_string)
}

#[must_use]
/// Mail to `address` about the section headed `heading` with content `section_text`.
pub fn compose(
    settings: &MailSettings,
    aliases: &AliasTable,
    heading: &str,
    section_text: &str,
    token: &str,
    address: &str,
) -> OutgoingMail {
    let body = format!(
        "{},\n\n{BODY_INTRO}\n\n{section_text}\n\n\n{BODY_SIGNATURE}",
        greeting(aliases, token)
    );
    OutgoingMail {
        from: settings.from.clone(),
        to: address.to_string(),
        subject: format!("{}: {heading}", settings.subject_prefix),
        body,
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Authenticated STARTTLS connection to a submission server.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Connects to `host:port` and logs in, so bad credentials surface before any mail is sent.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Login`] only if the server rejects the credentials. An unreachable
    /// server is [`MailError::Transport`] or [`MailError::Unavailable`].
    pub fn login(host: &str, port: u16, user: &str, password: &str) -> Result<Self, MailError> {
        let transport = SmtpTransport::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        match transport.test_connection() {
            Ok(true) => {
                debug!(host, port, user, "smtp login succeeded");
                Ok(Self { transport })
            }
            Ok(false) => Err(MailError::Unavailable {
                host: host.to_string(),
            }),
            Err(source) if is_auth_rejection(&source) => Err(MailError::Login {
                user: user.to_string(),
                source,
            }),
            Err(source) => Err(MailError::Transport(source)),
        }
    }
}

/// A permanent reply during login is a credential rejection; connection and TLS failures are
/// not.
fn is_auth_rejection(err: &lettre::transport::smtp::Error) -> bool {
    err.is_permanent()
}

impl Mailer for SmtpMailer {
    fn send(&mut self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(mailbox(&mail.from)?)
            .to(mailbox(&mail.to)?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())?;

        let response = self.transport.send(&message)?;
        if !response.is_positive() {
            return Err(MailError::Refused {
                to: mail.to.clone(),
                reason: response
                    .message()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/notify.rs"]
mod tests;
