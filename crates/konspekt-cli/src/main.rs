use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use konspekt_core::{
    ChatClient, JsonStore, LectureStore, PipelineState, Provider, WhisperTranscriber,
    format_lecture_readable, format_questions_readable, process_lecture,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Openai,
    Grok,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "konspekt")]
#[command(
    about = "Transcribe lecture audio with Whisper, summarize it, and generate quiz questions"
)]
struct Cli {
    /// Data directory for lectures and questions
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a lecture audio file
    Add {
        /// Path to the lecture audio (16 kHz mono WAV)
        audio: PathBuf,

        /// Lecture title
        #[arg(short, long, default_value = "Untitled lecture")]
        title: String,
    },

    /// Run the transcription, summarization, and quiz pipeline for a lecture
    Process {
        /// Lecture identifier returned by `add`
        lecture_id: String,

        /// Number of multiple-choice questions to generate
        #[arg(long, default_value_t = 3)]
        mcq: u32,

        /// Number of true/false questions to generate
        #[arg(long, default_value_t = 0)]
        tf: u32,

        /// Path to the Whisper ggml model file (e.g. ggml-small.bin)
        #[arg(short, long)]
        model: PathBuf,

        /// AI provider for summaries and questions
        #[arg(short, long, default_value = "openai")]
        provider: CliProvider,

        /// Clear previously stored questions before generating new ones
        #[arg(long)]
        fresh: bool,
    },

    /// Show a lecture's summary and transcript status
    Show { lecture_id: String },

    /// List the stored quiz questions for a lecture
    Questions { lecture_id: String },
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = JsonStore::new(cli.data_dir.unwrap_or_else(JsonStore::default_root));

    match cli.command {
        Command::Add { audio, title } => {
            let lecture = store.create_lecture(&title, &audio).await?;
            println!(
                "{} Registered lecture {}",
                style("✓").green().bold(),
                style(&lecture.id).cyan()
            );
        }

        Command::Process {
            lecture_id,
            mcq,
            tf,
            model,
            provider,
            fresh,
        } => {
            let provider: Provider = provider.into();

            // Validate the API key before any transcription work starts
            let backend = match ChatClient::new(&provider) {
                Ok(backend) => backend,
                Err(e) => {
                    eprintln!("{} {}", style("Error:").red().bold(), e);
                    std::process::exit(1);
                }
            };
            let transcriber = WhisperTranscriber::new(model);

            if fresh {
                store.clear_questions(&lecture_id).await?;
            }

            println!(
                "\n{}  {}\n",
                style("konspekt").cyan().bold(),
                style("Lecture Pipeline").dim()
            );

            let spinner = create_spinner(&format!(
                "Processing lecture with {} ({} MCQ, {} TF)...",
                provider.name(),
                mcq,
                tf
            ));
            let report =
                process_lecture(&transcriber, &backend, &store, &lecture_id, mcq, tf).await?;
            spinner.finish_and_clear();

            match report.state {
                PipelineState::Aborted => {
                    println!(
                        "{} Pipeline aborted: transcription produced no usable text",
                        style("✗").red().bold()
                    );
                }
                _ => {
                    println!(
                        "{} Transcribed and summarized ({} chunks{})",
                        style("✓").green().bold(),
                        report.chunk_count,
                        if report.summary_degraded {
                            ", summary degraded"
                        } else {
                            ""
                        }
                    );
                    println!(
                        "{} Stored {} MCQ and {} TF questions",
                        style("✓").green().bold(),
                        report.mcq_stored,
                        report.tf_stored
                    );
                }
            }
        }

        Command::Show { lecture_id } => {
            let lecture = store.get_lecture(&lecture_id).await?;
            println!("{}", style("─".repeat(60)).dim());
            println!("{}", format_lecture_readable(&lecture));
        }

        Command::Questions { lecture_id } => {
            let questions = store.questions_for(&lecture_id).await?;
            println!("{}", style("─".repeat(60)).dim());
            println!("{}", format_questions_readable(&questions));
        }
    }

    Ok(())
}
