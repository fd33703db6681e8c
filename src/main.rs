//! protocoldude: numbers the agenda items of meeting minutes and notifies everyone mentioned.
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use protocoldude::alias::AliasTable;
use protocoldude::config::Config;
use protocoldude::directory::LdapDirectory;
use protocoldude::document::Document;
use protocoldude::input;
use protocoldude::notify::{MailError, MailSettings, SmtpMailer};
use protocoldude::pipeline::{NotifyError, Pipeline, PipelineError};
use protocoldude::resolver::{ConsolePrompt, Prompt, Resolver, SkipPrompt};
use protocoldude::template;
use protocoldude::vcs::Svn;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protocoldude", version)]
#[command(
    about = "Turns quickly written minutes into numbered agenda items and mails everyone mentioned",
    long_about = "Turns quickly written minutes into numbered agenda items and mails everyone \
                  mentioned.\n\nHeadings look like\n\n    ===\n    <name>\n    ===\n\nand people \
                  or lists to notify are mentioned as ${<uni-id>}, ${<list>} or \
                  ${<external@some.com>}."
)]
struct Args {
    /// Minutes named yyyy-mm-dd.txt, or the URL of a pad
    #[arg(value_name = "FILE")]
    infile: String,

    /// Do not commit the minutes to Subversion
    #[arg(long)]
    disable_svn: bool,

    /// Do not check the file name of the minutes
    #[arg(long = "disable-path-checking")]
    disable_path_check: bool,

    /// Do not send any mail
    #[arg(long)]
    disable_mail: bool,

    /// Sender of the notifications
    #[arg(long = "fromaddr", value_name = "ADDRESS")]
    from_address: Option<String>,

    /// Subject prefix of the notifications
    #[arg(long = "mail-subject", value_name = "PREFIX")]
    mail_subject: Option<String>,

    /// Configuration file instead of ./protocoldude.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the notification plan as JSON instead of sending
    #[arg(long)]
    plan: bool,

    /// Also write the processed minutes as Markdown
    #[arg(long, value_name = "PATH")]
    render: Option<PathBuf>,

    /// Send again even if the minutes were already processed
    #[arg(long)]
    force: bool,

    /// Never ask about unknown recipients; skip them
    #[arg(long)]
    no_interactive: bool,

    /// Subversion commit message
    #[arg(long, value_name = "MESSAGE")]
    commit_message: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("protocoldude=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?;

    // Override config with command line args
    if let Some(from) = &args.from_address {
        cfg.from_address.clone_from(from);
    }
    if let Some(subject) = &args.mail_subject {
        cfg.subject_prefix.clone_from(subject);
    }

    println!("\nProtokoll \"{}\" wird bearbeitet ..\n", args.infile);
    let mut document = open_document(&args)?;

    let sending = !args.disable_mail && !args.plan;
    if sending && document.is_stamped() && !args.force && !confirm_resend()? {
        println!("Abgebrochen, es wurde nichts verändert.");
        return Ok(());
    }

    let aliases = AliasTable::builtin(cfg.org_domain.as_str());
    let mut pipeline = Pipeline::new(&document);
    if pipeline.sections().is_empty() {
        println!("Keine TOPs gefunden, es gibt niemanden zu benachrichtigen.");
    }

    {
        let mut directory = LdapDirectory::new(cfg.ldap_url.as_str(), cfg.ldap_base_dn.as_str());
        let mut prompt: Box<dyn Prompt> = if args.no_interactive {
            Box::new(SkipPrompt)
        } else {
            Box::new(ConsolePrompt::stdio())
        };
        let mut resolver = Resolver::new(&aliases, &mut directory, prompt.as_mut());
        pipeline
            .resolve(&document, &mut resolver)
            .context("resolving recipients")?;
    }
    pipeline.rename(&mut document, &cfg.marker_word)?;
    print!("{}", template::render_contents(&pipeline.headings()));

    let settings = MailSettings {
        from: cfg.from_address.clone(),
        subject_prefix: cfg.subject_prefix.clone(),
    };

    let mut sent = 0;
    let mut delivery_error = None;
    if args.plan {
        let plan = pipeline.plan(&document, &settings, &aliases);
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else if args.disable_mail {
        println!("Mailversand nicht aktiviert!");
    } else {
        let mut mailer = login(&cfg)?;
        match pipeline.notify(&document, &settings, &aliases, &mut mailer) {
            Ok(count) => sent = count,
            Err(PipelineError::Notify(err)) => {
                sent = err.sent;
                delivery_error = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
        report_delivery(sent, delivery_error.as_ref());
    }
    report_unresolved(pipeline.unresolved());

    if sent > 0 {
        document.stamp(Local::now());
    }
    document.save()?;

    if let Some(path) = &args.render {
        let title = document
            .path()
            .file_stem()
            .map_or_else(|| "Protokoll".to_string(), |stem| {
                format!("Protokoll {}", stem.to_string_lossy())
            });
        let rendered = template::render_markdown(&title, &pipeline.outline(&document));
        fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    }

    if args.disable_svn {
        println!("Nichts ins SVN commited!");
    } else {
        let svn = match &args.commit_message {
            Some(message) => Svn::default().message(message.as_str()),
            None => Svn::default(),
        };
        match svn.commit(document.path()) {
            Ok(()) => println!(
                "Protokoll bearbeitet und in den Sumpf geschrieben.\nFür heute hast du's geschafft!"
            ),
            Err(err) => {
                eprintln!("Konnte SVN nicht aktualisieren: {err}");
                eprintln!("Das musst du von Hand reparieren, mit 'svn cleanup' oder so.");
                println!("Das Protokoll wurde trotzdem bearbeitet und gespeichert.");
            }
        }
    }

    match delivery_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn open_document(args: &Args) -> Result<Document> {
    if input::is_remote(&args.infile) {
        return Ok(input::download(&args.infile)?);
    }

    let mut path = PathBuf::from(&args.infile);
    if !args.disable_path_check {
        path = input::ensure_minutes_file_name(&path, &mut io::stdin().lock(), &mut io::stdout())?;
    }
    Ok(Document::open(path)?)
}

fn ask_line(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm_resend() -> Result<bool> {
    println!("Für dieses Protokoll wurden bereits Mails verschickt.");
    let answer = ask_line("Trotzdem alle noch einmal benachrichtigen? [j/N] ")?;
    Ok(matches!(answer.to_lowercase().as_str(), "j" | "ja" | "y" | "yes"))
}

fn login(cfg: &Config) -> Result<SmtpMailer> {
    let user = ask_line("Uni ID für den Mailversand: ")?;
    let attempts = cfg.login_attempts.max(1);
    let mut attempt = 1;
    loop {
        let password = rpassword::prompt_password(format!("Passwort für {user}: "))?;
        match SmtpMailer::login(&cfg.smtp_host, cfg.smtp_port, &user, &password) {
            Ok(mailer) => return Ok(mailer),
            Err(MailError::Login { .. }) if attempt < attempts => {
                eprintln!("Du hast die falschen Anmeldedaten eingegeben!");
                eprintln!("Bitte versuche es noch einmal:");
                attempt += 1;
            }
            Err(err) => return Err(err).context("logging in to the mail server"),
        }
    }
}

fn report_delivery(sent: usize, error: Option<&NotifyError>) {
    match sent {
        1 => println!("\nEs wurde erfolgreich eine Mail versendet!\n"),
        n => println!("\nEs wurden erfolgreich {n} Mails verschickt.\n"),
    }
    if let Some(err) = error {
        eprintln!("Danach ist der Versand fehlgeschlagen: {}", err.source);
    }
}

fn report_unresolved(unresolved: &[String]) {
    if unresolved.is_empty() {
        return;
    }
    println!("An folgende Nutzer konnte keine Mail versandt werden:");
    for user in unresolved {
        println!("    - {user}");
    }
}
