use super::{Pipeline, PipelineError};
use crate::alias::AliasTable;
use crate::document::Document;
use crate::notify::MailSettings;
use crate::resolver::{Resolver, SkipPrompt};
use crate::section::SectionState;
use crate::testing::{MemoryDirectory, RecordingMailer, ScriptedPrompt};
use chrono::Local;
use std::fs;
use tempfile::TempDir;

const MINUTES: &str = "\
===
Begrüßung
===
${max} begrüßt alle.


===
Finanzen
===
${finanzen} prüft die Kasse.";

fn settings() -> MailSettings {
    MailSettings {
        from: "simo@example.org".to_string(),
        subject_prefix: "Gemeinsame Sitzung".to_string(),
    }
}

fn aliases() -> AliasTable {
    AliasTable::builtin("example.org")
}

#[test]
fn test_end_to_end_two_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("2024-05-06.txt");
    fs::write(&path, MINUTES).unwrap();

    let mut document = Document::open(&path).unwrap();
    assert_eq!(document.lines().len(), 10);

    let aliases = aliases();
    let mut directory = MemoryDirectory::new().with_person("max", "max@uni.example");
    let mut prompt = ScriptedPrompt::new(&[]);
    let mut pipeline = Pipeline::new(&document);
    assert_eq!(pipeline.sections().len(), 2);

    {
        let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);
        pipeline.resolve(&document, &mut resolver).unwrap();
    }
    for section in pipeline.sections() {
        assert_eq!(section.addresses().len(), 1);
    }
    assert!(pipeline.unresolved().is_empty());

    pipeline.rename(&mut document, "TOP").unwrap();
    assert_eq!(
        pipeline.headings(),
        vec![(1, "TOP 1: Begrüßung"), (2, "TOP 2: Finanzen")]
    );

    let mut mailer = RecordingMailer::new();
    let sent = pipeline
        .notify(&document, &settings(), &aliases, &mut mailer)
        .unwrap();
    assert_eq!(sent, 2);
    assert!(pipeline
        .sections()
        .iter()
        .all(|section| section.state() == SectionState::Notified));

    assert_eq!(mailer.sent[0].to, "max@uni.example");
    assert_eq!(mailer.sent[0].subject, "Gemeinsame Sitzung: TOP 1: Begrüßung");
    assert!(mailer.sent[0].body.starts_with("Hallo max,"));
    assert_eq!(mailer.sent[1].to, "finanzen@example.org");
    assert!(mailer.sent[1].body.contains("TOP 2: Finanzen\n"));

    document.stamp(Local::now());
    document.save().unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[0].starts_with(":Protocoldude: Mails versandt @ "));
    assert_eq!(lines[1], "");
    assert_eq!(lines[3], "TOP 1: Begrüßung");
    assert_eq!(lines[9], "TOP 2: Finanzen");
}

#[test]
fn test_document_without_headings_is_nothing_to_do() {
    let document = Document::from_text("x.txt", "Nur Notizen, ${max}.\n");
    let aliases = aliases();
    let mut directory = MemoryDirectory::new();
    let mut prompt = SkipPrompt;
    let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);

    let mut pipeline = Pipeline::new(&document);
    pipeline.resolve(&document, &mut resolver).unwrap();
    assert!(pipeline.sections().is_empty());
    assert!(directory.searches.is_empty());
}

#[test]
fn test_unresolved_accumulate_in_document_order() {
    let document = Document::from_text(
        "x.txt",
        "===\nA\n===\n${zwei} ${eins}\n\n===\nB\n===\n${drei} ${eins}\n",
    );
    let aliases = aliases();
    let mut directory = MemoryDirectory::new();
    let mut prompt = SkipPrompt;
    let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);

    let mut pipeline = Pipeline::new(&document);
    pipeline.resolve(&document, &mut resolver).unwrap();

    // duplicates across sections are independent mentions
    assert_eq!(pipeline.unresolved(), ["zwei", "eins", "drei", "eins"]);
}

#[test]
fn test_directory_outage_is_fatal() {
    let document = Document::from_text("x.txt", "===\nA\n===\n${max}\n");
    let aliases = aliases();
    let mut directory = MemoryDirectory::offline();
    let mut prompt = SkipPrompt;
    let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);

    let mut pipeline = Pipeline::new(&document);
    let err = pipeline.resolve(&document, &mut resolver).unwrap_err();
    assert!(matches!(err, PipelineError::Section(_)));
    assert!(err.to_string().contains("unreachable"));
}

#[test]
fn test_mail_failure_reports_sent_count() {
    let mut document = Document::from_text(
        "x.txt",
        "===\nA\n===\n${fachschaft} ${finanzen}\n\n===\nB\n===\n${akfest}\n",
    );
    let aliases = aliases();
    let mut directory = MemoryDirectory::new();
    let mut prompt = SkipPrompt;
    let mut pipeline = Pipeline::new(&document);
    {
        let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);
        pipeline.resolve(&document, &mut resolver).unwrap();
    }
    pipeline.rename(&mut document, "TOP").unwrap();

    let mut mailer = RecordingMailer::refusing_after(2);
    let err = pipeline
        .notify(&document, &settings(), &aliases, &mut mailer)
        .unwrap_err();

    match err {
        PipelineError::Notify(notify) => assert_eq!(notify.sent, 2),
        other => panic!("expected a notify error, got {other}"),
    }
    assert_eq!(mailer.sent.len(), 2);
    assert_eq!(pipeline.sections()[0].state(), SectionState::Notified);
    assert_eq!(pipeline.sections()[1].state(), SectionState::Renamed);
}

#[test]
fn test_notify_requires_rename() {
    let document = Document::from_text("x.txt", "===\nA\n===\nText\n");
    let aliases = aliases();
    let mut pipeline = Pipeline::new(&document);
    let mut mailer = RecordingMailer::new();

    let err = pipeline
        .notify(&document, &settings(), &aliases, &mut mailer)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Section(_)));
}

#[test]
fn test_plan_lists_mails_without_sending() {
    let mut document = Document::from_text("x.txt", "===\nA\n===\n${vertagt} ${wer}\n");
    let aliases = aliases();
    let mut directory = MemoryDirectory::new();
    let mut prompt = SkipPrompt;
    let mut pipeline = Pipeline::new(&document);
    {
        let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);
        pipeline.resolve(&document, &mut resolver).unwrap();
    }
    pipeline.rename(&mut document, "TOP").unwrap();

    let plan = pipeline.plan(&document, &settings(), &aliases);
    assert_eq!(plan.sections.len(), 1);
    assert_eq!(plan.sections[0].heading, "TOP 1: A");
    assert_eq!(plan.sections[0].mails.len(), 1);
    assert_eq!(plan.sections[0].mails[0].to, "vertagt@example.org");
    assert!(plan.sections[0].mails[0].body.starts_with("Liebe SiMo,"));
    assert_eq!(plan.unresolved, vec!["wer"]);

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["sections"][0]["ordinal"], 1);
    assert_eq!(json["unresolved"][0], "wer");
}

#[test]
fn test_outline_uses_renamed_headings() {
    let mut document = Document::from_text("x.txt", "===\nA\n===\nText\n");
    let aliases = aliases();
    let mut directory = MemoryDirectory::new();
    let mut prompt = SkipPrompt;
    let mut pipeline = Pipeline::new(&document);
    {
        let mut resolver = Resolver::new(&aliases, &mut directory, &mut prompt);
        pipeline.resolve(&document, &mut resolver).unwrap();
    }
    pipeline.rename(&mut document, "TOP").unwrap();

    let outline = pipeline.outline(&document);
    assert_eq!(outline.len(), 1);
    assert_eq!(outline[0].heading, "TOP 1: A");
    assert_eq!(outline[0].body, ["Text".to_string()]);
}
