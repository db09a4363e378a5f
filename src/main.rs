use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{ArgGroup, Parser};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::input::{read_input, split_questions, InputSource};
use crate::llm::config::{
    API_KEY_ENV, DEFAULT_API_URL, DEFAULT_LONG_MODEL, DEFAULT_SHORT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use crate::llm::{Answerer, HttpCompletionClient, LLMConfig, RetryPolicy};
use crate::output::{print_answers, ProgressBarObserver};

mod input;
mod llm;
mod output;

/// Answers questions about a passage of text using an OpenAI-compatible chat model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("passage_source").required(true).args(["passage", "passage_text"])))]
#[command(group(ArgGroup::new("question_source").required(true).args(["questions", "question"])))]
struct Args {
    /// File holding the passage (`-` for stdin)
    #[arg(short, long)]
    passage: Option<String>,

    /// Passage given directly on the command line
    #[arg(long)]
    passage_text: Option<String>,

    /// File with one question per line (`-` for stdin)
    #[arg(short, long)]
    questions: Option<String>,

    /// A single question; may be repeated
    #[arg(long)]
    question: Vec<String>,

    /// Chat completion API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// Model used for prompts under 3000 tokens
    #[arg(long, default_value = DEFAULT_SHORT_MODEL)]
    short_model: String,

    /// Model used for prompts of 3000 tokens or more
    #[arg(long, default_value = DEFAULT_LONG_MODEL)]
    long_model: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Only retry timeouts, network errors, rate limits and server errors
    #[arg(long)]
    retry_transient_only: bool,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level)?;

    let llm_config = setup_llm_config(&args);

    let (passage, questions) = collect_inputs(&args)?;

    let client = Arc::new(HttpCompletionClient::new(&llm_config)?);
    let answerer = Answerer::new(client, llm_config);

    let answers = if args.no_progress {
        answerer.answer_all(&passage, &questions).await
    } else {
        let progress = ProgressBarObserver::new(questions.len());
        answerer
            .answer_all_with_progress(&passage, &questions, &progress)
            .await
    };

    print_answers(&questions, &answers)?;

    Ok(())
}

fn setup_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .with_level(true)
        .init();

    Ok(())
}

fn setup_llm_config(args: &Args) -> LLMConfig {
    let retry_policy = if args.retry_transient_only {
        RetryPolicy::TransientOnly
    } else {
        RetryPolicy::Always
    };

    let config = LLMConfig::new(args.api_url.clone(), args.api_key.clone())
        .with_models(args.short_model.clone(), args.long_model.clone())
        .with_timeout(Duration::from_secs(args.timeout))
        .with_retry_policy(retry_policy);

    if config.api_key.is_none() {
        warn!("No API key set ({}); requests will likely be rejected", API_KEY_ENV);
    }
    info!("Using {} with models {} / {}", config.api_url, config.short_model, config.long_model);

    config
}

fn collect_inputs(args: &Args) -> Result<(String, Vec<String>)> {
    let passage_source = match (&args.passage, &args.passage_text) {
        (Some(path), _) => InputSource::from_path_arg(path),
        (None, Some(text)) => InputSource::Inline(text.clone()),
        (None, None) => bail!("A passage is required"),
    };

    let questions_source = args.questions.as_deref().map(InputSource::from_path_arg);

    let both_stdin = passage_source.is_stdin()
        && questions_source.as_ref().is_some_and(InputSource::is_stdin);
    if both_stdin {
        bail!("Passage and questions cannot both be read from stdin");
    }

    let passage = read_input(&passage_source)?;
    // Only file and stdin input is line-based; each --question is one question.
    let questions = match questions_source {
        Some(source) => split_questions(&read_input(&source)?),
        None => args.question.clone(),
    };
    info!("Read passage of {} bytes and {} questions", passage.len(), questions.len());

    Ok((passage, questions))
}
