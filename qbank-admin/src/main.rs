//! qbank-admin - command line client for the QBank gateway
//!
//! Drives the same controllers the dashboard screens use: login, tree
//! browsing, content CRUD, and the doctor media operations.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use qbank_admin::confirm::{AssumeYes, StdinConfirm};
use qbank_admin::forms::{
    delete, ChapterForm, DeleteOutcome, DeleteTarget, EntityForm, FormController, QuestionForm,
    SubjectForm, SubmitOutcome, TopicForm,
};
use qbank_admin::media::{AssetKind, GenerateOutcome, MediaController};
use qbank_admin::tree::ContentTree;
use qbank_admin::{Gateway, HttpGateway};
use qbank_common::models::Voice;

#[derive(Parser, Debug)]
#[command(name = "qbank-admin", about = "QBank admin client")]
struct Args {
    /// Gateway base URL
    #[arg(long, env = "QBANK_SERVER", default_value = "http://127.0.0.1:5730")]
    server: String,

    /// Bearer token from a previous login
    #[arg(long, env = "QBANK_TOKEN")]
    token: Option<String>,

    /// Skip confirmation prompts
    #[arg(long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the session token
    Login { identifier: String, password: String },

    /// Print the full content tree
    Tree,

    /// Create a subject
    AddSubject {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a chapter under a subject
    AddChapter {
        subject_id: i64,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a topic under a chapter
    AddTopic {
        chapter_id: i64,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a question under a chapter (or a topic with --topic)
    AddQuestion {
        subject_id: i64,
        chapter_id: i64,
        #[arg(long)]
        topic: Option<i64>,
        #[arg(long)]
        text: String,
        /// Lettered option, repeatable: --option a="Mitochondria"
        #[arg(long = "option", value_parser = parse_option)]
        options: Vec<(String, String)>,
        #[arg(long)]
        correct: Option<String>,
    },

    /// Delete a subject (cascades to everything under it)
    RmSubject { id: i64 },

    /// Delete a chapter (cascades)
    RmChapter { id: i64 },

    /// Delete a topic (cascades)
    RmTopic { id: i64 },

    /// Delete a question
    RmQuestion { id: i64 },

    /// Generate or regenerate a question's explanation text
    Explain {
        question_id: i64,
        #[arg(long)]
        regenerate: bool,
    },

    /// Generate or regenerate a question's voice audio
    Narrate {
        question_id: i64,
        #[arg(long, value_parser = parse_voice)]
        voice: Voice,
        #[arg(long)]
        regenerate: bool,
    },
}

fn parse_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, content)) if !key.is_empty() => Ok((key.to_string(), content.to_string())),
        _ => Err("expected key=content, e.g. a=Mitochondria".to_string()),
    }
}

fn parse_voice(s: &str) -> Result<Voice, String> {
    Voice::parse(s).ok_or_else(|| "expected 'male' or 'female'".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let mut gateway = HttpGateway::new(&args.server)?;
    if let Some(token) = &args.token {
        gateway = gateway.with_token(token.clone());
    }

    match args.command {
        Command::Login { identifier, password } => {
            let response = gateway.login(&identifier, &password).await?;
            println!("{}", response.token);

            // Greeting data comes from an unverified decode; the gateway
            // re-verifies the token on every request regardless.
            if let Ok(claims) = qbank_common::api::auth::decode_for_display(&response.token) {
                let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| claims.exp.to_string());
                eprintln!(
                    "Logged in as {} ({}), session valid until {}",
                    claims.name,
                    claims.role.as_str(),
                    expires
                );
            }
        }

        Command::Tree => {
            let mut tree = ContentTree::new();
            tree.load(&gateway).await?;
            for subject in tree.subjects() {
                println!("{} {}", subject.subject.id, subject.subject.name);
                for chapter in &subject.chapters {
                    println!("  {} {}", chapter.chapter.id, chapter.chapter.name);
                    for question in &chapter.questions {
                        println!("    q{} {}", question.id, question.question_text);
                    }
                    for topic in &chapter.topics {
                        println!("    {} {}", topic.topic.id, topic.topic.name);
                        for question in &topic.questions {
                            println!("      q{} {}", question.id, question.question_text);
                        }
                    }
                }
            }
        }

        Command::AddSubject { name, description } => {
            let mut controller = FormController::new();
            controller.open_create(EntityForm::Subject(SubjectForm { name, description }));
            submit(&mut controller, &gateway).await?;
        }

        Command::AddChapter { subject_id, name, description } => {
            let mut controller = FormController::new();
            controller.open_create(EntityForm::Chapter(ChapterForm {
                subject_id,
                name,
                description,
            }));
            submit(&mut controller, &gateway).await?;
        }

        Command::AddTopic { chapter_id, name, description } => {
            let mut controller = FormController::new();
            controller.open_create(EntityForm::Topic(TopicForm {
                chapter_id,
                name,
                description,
            }));
            submit(&mut controller, &gateway).await?;
        }

        Command::AddQuestion { subject_id, chapter_id, topic, text, options, correct } => {
            let mut form = QuestionForm::new(subject_id, chapter_id, topic);
            form.question_text = text;
            for (key, content) in options {
                match form.options.iter_mut().find(|o| o.option_key == key) {
                    Some(option) => option.content = content,
                    None => form.options.push(qbank_common::models::QuestionOption {
                        option_key: key,
                        content,
                    }),
                }
            }
            form.correct_key = correct;

            let mut controller = FormController::new();
            controller.open_create(EntityForm::Question(form));
            submit(&mut controller, &gateway).await?;
        }

        Command::RmSubject { id } => {
            let target = DeleteTarget::Subject { id, name: format!("#{}", id) };
            remove(&gateway, target, args.yes).await?;
        }
        Command::RmChapter { id } => {
            let target = DeleteTarget::Chapter { id, name: format!("#{}", id) };
            remove(&gateway, target, args.yes).await?;
        }
        Command::RmTopic { id } => {
            let target = DeleteTarget::Topic { id, name: format!("#{}", id) };
            remove(&gateway, target, args.yes).await?;
        }
        Command::RmQuestion { id } => {
            let target = DeleteTarget::Question { id };
            remove(&gateway, target, args.yes).await?;
        }

        Command::Explain { question_id, regenerate } => {
            let mut media = MediaController::new();
            match media
                .generate(&gateway, question_id, AssetKind::Explanation, regenerate)
                .await?
            {
                GenerateOutcome::Generated(text) => println!("{}", text),
                GenerateOutcome::Busy => {}
            }
        }

        Command::Narrate { question_id, voice, regenerate } => {
            let kind = match voice {
                Voice::Female => AssetKind::FemaleAudio,
                Voice::Male => AssetKind::MaleAudio,
            };
            let mut media = MediaController::new();
            match media.generate(&gateway, question_id, kind, regenerate).await? {
                GenerateOutcome::Generated(url) => println!("{}", url),
                GenerateOutcome::Busy => {}
            }
        }
    }

    Ok(())
}

async fn submit(controller: &mut FormController, gateway: &HttpGateway) -> Result<()> {
    match controller.submit(gateway).await? {
        SubmitOutcome::Saved => {
            eprintln!("Saved");
            Ok(())
        }
        other => bail!("submission not sent: {:?}", other),
    }
}

async fn remove(gateway: &HttpGateway, target: DeleteTarget, yes: bool) -> Result<()> {
    let outcome = if yes {
        delete(gateway, &AssumeYes, target).await?
    } else {
        delete(gateway, &StdinConfirm, target).await?
    };
    match outcome {
        DeleteOutcome::Deleted => eprintln!("Deleted"),
        DeleteOutcome::Cancelled => eprintln!("Cancelled"),
    }
    Ok(())
}
