//! In-memory collaborators for unit tests.

use crate::directory::{Directory, DirectoryError, DirectoryRecord};
use crate::notify::{MailError, Mailer, OutgoingMail};
use crate::resolver::Prompt;
use std::collections::{HashMap, VecDeque};
use std::io;

/// Directory backed by a map; records every identifier it is asked for.
#[derive(Default)]
pub(crate) struct MemoryDirectory {
    records: HashMap<String, Vec<DirectoryRecord>>,
    offline: bool,
    pub searches: Vec<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn with_person(self, uid: &str, mail: &str) -> Self {
        let record = DirectoryRecord::with_mail(format!("uid={uid},ou=People"), mail);
        self.with_records(uid, vec![record])
    }

    pub fn with_records(mut self, uid: &str, records: Vec<DirectoryRecord>) -> Self {
        self.records.insert(uid.to_string(), records);
        self
    }
}

impl Directory for MemoryDirectory {
    fn search(&mut self, identifier: &str) -> Result<Vec<DirectoryRecord>, DirectoryError> {
        self.searches.push(identifier.to_string());
        if self.offline {
            return Err(DirectoryError::Unreachable {
                url: "memory://offline".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "offline").into(),
            });
        }
        Ok(self.records.get(identifier).cloned().unwrap_or_default())
    }
}

/// Prompt answering from a fixed script, then reporting end of input.
pub(crate) struct ScriptedPrompt {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(ToString::to_string).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, token: &str, _heading: &str) -> io::Result<Option<String>> {
        self.asked.push(token.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Mailer that keeps every mail, optionally refusing once a limit is reached.
#[derive(Default)]
pub(crate) struct RecordingMailer {
    pub sent: Vec<OutgoingMail>,
    refuse_after: Option<usize>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_after(limit: usize) -> Self {
        Self {
            refuse_after: Some(limit),
            ..Self::default()
        }
    }
}

impl Mailer for RecordingMailer {
    fn send(&mut self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.refuse_after.is_some_and(|limit| self.sent.len() >= limit) {
            return Err(MailError::Refused {
                to: mail.to.clone(),
                reason: "mailbox full".to_string(),
            });
        }
        self.sent.push(mail.clone());
        Ok(())
    }
}
