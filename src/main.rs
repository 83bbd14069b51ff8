//! Resume scorer: resume vs. job description compatibility scoring

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_scorer::cli::{self, Cli, Commands, ConfigAction};
use resume_scorer::config::{Config, OutputFormat};
use resume_scorer::error::{Result, ResumeScorerError};
use resume_scorer::input::InputManager;
use resume_scorer::output::{report_path, save_report_to_file, ReportGenerator, ReportMetadata, ScoreReport};
use resume_scorer::pipeline::{InferenceContext, MatchPipeline, ScoreRequest};
use resume_scorer::processing::document::DocumentRole;
use resume_scorer::scoring::types::ScoringStrategy;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    match run_command(cli.command, config, cli.config).await {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}

/// Returns `false` when the command ran but the scoring request did not succeed
async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<bool> {
    match command {
        Commands::Score {
            resume,
            job,
            job_text,
            strategy,
            output,
            save,
        } => {
            cli::validate_file_extension(&resume, &["pdf", "txt", "md", "markdown"])
                .map_err(|e| ResumeScorerError::Validation(format!("Resume file: {}", e)))?;
            if let Some(job) = &job {
                cli::validate_file_extension(job, &["txt", "md", "markdown"])
                    .map_err(|e| ResumeScorerError::Validation(format!("Job description file: {}", e)))?;
            }

            let strategy = match strategy {
                Some(s) => cli::parse_strategy(&s).map_err(ResumeScorerError::Validation)?,
                None => config.scoring.default_strategy,
            };
            let output_format = match output {
                Some(o) => cli::parse_output_format(&o).map_err(ResumeScorerError::Validation)?,
                None => config.output.format,
            };

            let context = load_context(&config)?;
            let start_time = Instant::now();

            let input_manager = InputManager::new();
            let resume_document = input_manager.load_document(&resume).await?;
            let (job_description, job_source) = match (job, job_text) {
                (Some(path), _) => (
                    input_manager.extract_text(&path).await?,
                    path.display().to_string(),
                ),
                (None, Some(text)) => (text, "inline".to_string()),
                (None, None) => {
                    return Err(ResumeScorerError::Validation(
                        "either --job or --job-text is required".to_string(),
                    ))
                }
            };

            let request = ScoreRequest::new(resume_document, job_description);
            let response = MatchPipeline::new(&context).handle(&request, strategy);

            let metadata = ReportMetadata::new(
                resume.display().to_string(),
                job_source,
                strategy,
                context.decision_labels(),
                start_time.elapsed().as_millis() as u64,
            );
            let report = ScoreReport::new(response, metadata);

            let generator = ReportGenerator::with_options(config.output.color_output, true, true);
            let rendered = generator.generate_report(&report, output_format)?;
            println!("{}", rendered);

            if let Some(save) = save {
                let save_path = report_path(&save, output_format, &resume.display().to_string());
                // Saved console output never carries color codes
                let saved = match output_format {
                    OutputFormat::Console => ReportGenerator::with_options(false, true, true)
                        .generate_report(&report, output_format)?,
                    _ => rendered,
                };
                save_report_to_file(&saved, &save_path)?;
                info!("Report saved to {}", save_path.display());
            }

            Ok(report.is_success())
        }

        Commands::Check => {
            let context = load_context(&config)?;
            println!("Scoring strategies:");
            for strategy in [ScoringStrategy::Classifier, ScoringStrategy::Similarity] {
                let status = if context.is_available(strategy) {
                    "available"
                } else {
                    "unavailable"
                };
                println!("  {:<12} {}", strategy.as_str(), status);
            }
            let lemmas = if context.lemmatizes() { "loaded" } else { "missing" };
            println!("Lemma table: {}", lemmas);
            Ok(true)
        }

        Commands::Inspect { input, role, encode } => {
            let role = cli::parse_role(&role).map_err(ResumeScorerError::Validation)?;
            let context = load_context(&config)?;
            inspect_document(&context, &input, role, encode).await?;
            Ok(true)
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    let content = toml::to_string_pretty(&config).map_err(|e| {
                        ResumeScorerError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("# {}\n{}", path.display(), content);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset: {}", path.display());
                }
                Some(ConfigAction::Path) => println!("{}", path.display()),
            }
            Ok(true)
        }
    }
}

/// Load the inference context behind a spinner
fn load_context(config: &Config) -> Result<InferenceContext> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Loading scoring artifacts...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let context = InferenceContext::load(config);
    spinner.finish_and_clear();
    context
}

async fn inspect_document(
    context: &InferenceContext,
    input: &Path,
    role: DocumentRole,
    encode: bool,
) -> Result<()> {
    let text = InputManager::new().extract_text(input).await?;
    let pipeline = MatchPipeline::new(context);
    let tokens = pipeline.tokens_for(&text, role);

    println!("{} ({} characters, {} tokens)", input.display(), text.len(), tokens.len());
    println!("{}", tokens.joined());

    if encode {
        let scorer = context
            .classifier_scorer()
            .ok_or(ResumeScorerError::ScorerUnavailable(ScoringStrategy::Classifier))?;
        let encoded = scorer.encoder().encode_for_role(&tokens.joined(), role);
        println!(
            "\nEncoded ({} positions, {} known tokens):\n{:?}",
            encoded.len(),
            encoded.content_len(),
            encoded.as_slice()
        );
    }

    Ok(())
}
