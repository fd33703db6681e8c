//! Orchestrates one run over the minutes.
//!
//! The document is segmented once; every section then goes through extraction, resolution,
//! renaming and notification in ordinal order. Tokens nobody could resolve are collected across
//! sections in document order.

use crate::alias::AliasTable;
use crate::document::Document;
use crate::notify::{compose, MailError, MailSettings, Mailer, OutgoingMail};
use crate::resolver::Resolver;
use crate::section::{Section, SectionError};
use crate::segmenter::segment;
use crate::template::OutlineEntry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
/// Mail delivery stopped part-way; mails already sent stay sent.
#[error("mail delivery stopped after {sent} sent mails: {source}")]
pub struct NotifyError {
    /// Mails accepted before the failure.
    pub sent: usize,
    /// Why delivery stopped.
    #[source]
    pub source: MailError,
}

#[derive(Debug, thiserror::Error)]
/// Failure of a pipeline step.
pub enum PipelineError {
    /// A section step failed.
    #[error(transparent)]
    Section(#[from] SectionError),
    /// Mail delivery failed.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Mails one section would send.
pub struct PlannedSection {
    /// Section ordinal.
    pub ordinal: usize,
    /// Heading at planning time.
    pub heading: String,
    /// One mail per resolved recipient.
    pub mails: Vec<OutgoingMail>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Everything a run would send, for review without sending.
pub struct NotificationPlan {
    /// Sections in ordinal order.
    pub sections: Vec<PlannedSection>,
    /// Tokens that will not be notified.
    pub unresolved: Vec<String>,
}

/// State of one run over a document.
pub struct Pipeline {
    sections: Vec<Section>,
    unresolved: Vec<String>,
}

impl Pipeline {
    #[must_use]
    /// Segments `document` into sections.
    pub fn new(document: &Document) -> Self {
        let sections: Vec<Section> = segment(document.lines())
            .into_iter()
            .map(Section::from)
            .collect();
        info!(sections = sections.len(), "segmented minutes");
        Self {
            sections,
            unresolved: Vec::new(),
        }
    }

    #[must_use]
    /// Sections in ordinal order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// Mentions nobody could resolve, in document order.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    #[must_use]
    /// `(ordinal, heading)` of every section.
    pub fn headings(&self) -> Vec<(usize, &str)> {
        self.sections
            .iter()
            .map(|section| (section.ordinal, section.heading_text.as_str()))
            .collect()
    }

    /// Extracts and resolves the mentions of every section.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is unreachable or the operator prompt fails; nothing
    /// is accumulated for the failing section.
    pub fn resolve(
        &mut self,
        document: &Document,
        resolver: &mut Resolver<'_>,
    ) -> Result<(), PipelineError> {
        for section in &mut self.sections {
            let mentions = section.extract_tokens(document.lines())?.len();
            debug!(ordinal = section.ordinal, mentions, "extracted mentions");
            section.resolve(resolver)?;
            self.unresolved.extend_from_slice(section.unresolved());
        }
        Ok(())
    }

    /// Renames every heading to `<word> <ordinal>: <text>` and rewrites the heading blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if a section has not been resolved yet.
    pub fn rename(&mut self, document: &mut Document, word: &str) -> Result<(), PipelineError> {
        for section in &mut self.sections {
            section.rename(document.lines_mut(), word)?;
        }
        Ok(())
    }

    #[must_use]
    /// Mails every section would send, in ordinal order.
    pub fn plan(
        &self,
        document: &Document,
        settings: &MailSettings,
        aliases: &AliasTable,
    ) -> NotificationPlan {
        let sections = self
            .sections
            .iter()
            .map(|section| PlannedSection {
                ordinal: section.ordinal,
                heading: section.heading_text.clone(),
                mails: mails_for(section, document, settings, aliases),
            })
            .collect();
        NotificationPlan {
            sections,
            unresolved: self.unresolved.clone(),
        }
    }

    /// Sends one mail per resolved recipient, section by section, and returns how many were
    /// sent.
    ///
    /// Stops at the first failure. Mails already sent are not taken back.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] with the count of mails sent before the failure, or a section
    /// error if a section has not been renamed yet.
    pub fn notify(
        &mut self,
        document: &Document,
        settings: &MailSettings,
        aliases: &AliasTable,
        mailer: &mut dyn Mailer,
    ) -> Result<usize, PipelineError> {
        let mut sent = 0;
        for section in &mut self.sections {
            for mail in mails_for(section, document, settings, aliases) {
                mailer
                    .send(&mail)
                    .map_err(|source| NotifyError { sent, source })?;
                sent += 1;
                info!(to = %mail.to, heading = %section.heading_text, "mail sent");
            }
            section.mark_notified()?;
        }
        Ok(sent)
    }

    #[must_use]
    /// Headings and bodies for rendering.
    pub fn outline<'d>(&'d self, document: &'d Document) -> Vec<OutlineEntry<'d>> {
        self.sections
            .iter()
            .map(|section| OutlineEntry {
                ordinal: section.ordinal,
                heading: &section.heading_text,
                body: section.body(document.lines()),
            })
            .collect()
    }
}

fn mails_for(
    section: &Section,
    document: &Document,
    settings: &MailSettings,
    aliases: &AliasTable,
) -> Vec<OutgoingMail> {
    let text = section.text(document.lines());
    section
        .recipients()
        .map(|(token, address)| {
            compose(
                settings,
                aliases,
                &section.heading_text,
                &text,
                token,
                address,
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/pipeline.rs"]
mod tests;
