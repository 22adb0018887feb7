use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use super::format;
use crate::api::{SimilarRequest, StudioClient};
use crate::auth::{AuthError, CredentialStore, Credentials, TokenSource};
use crate::models::{Difficulty, QuestionKind};
use crate::timeline::Settled;
use crate::tui::{ClientBackend, run_studio};
use crate::utils::environment::LOG_VAR;
use crate::utils::{Config, format_path_with_tilde};

#[derive(Parser)]
#[command(name = "question-studio")]
#[command(version)]
#[command(about = "Generate exam questions and refine them version by version", long_about = None)]
pub struct Cli {
    /// Backend origin (overrides QSTUDIO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        /// Prompted for on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// End the session and forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List recent question sessions
    Recent,
    /// List the questions of one session
    Session { session_id: String },
    /// Show one stored question
    Show { question_id: String },
    /// Show every version of a question and the refinement chat
    History { question_id: String },
    /// Apply one refinement instruction and print the new version
    Refine { question_id: String, instruction: String },
    /// Open the interactive refinement studio
    Studio { question_id: String },
    /// Generate questions from a PDF
    GenerateDoc {
        pdf: PathBuf,
        /// Question type: mcq or open
        #[arg(long = "type", default_value = "mcq")]
        kind: QuestionKind,
        #[arg(long, default_value_t = 10)]
        quantity: u32,
    },
    /// Generate questions similar to the one in an image
    GenerateSimilar {
        image: PathBuf,
        #[arg(long)]
        instruction: String,
        /// easy, medium or hard
        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 10)]
        quantity: u32,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    init_tracing(cli.verbose, matches!(command, Commands::Studio { .. }))?;

    let mut config = Config::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "configuration loaded");

    let runtime = Runtime::new().context("Failed to start async runtime")?;
    execute(command, &config, &runtime)
}

/// Install the stderr subscriber. `QSTUDIO_LOG` takes precedence over `--verbose`.
///
/// The studio owns the terminal, so it only logs when `QSTUDIO_LOG` asks for it.
fn init_tracing(verbose: bool, studio: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = match tracing_subscriber::EnvFilter::try_from_env(LOG_VAR) {
        Ok(filter) => filter,
        Err(_) if studio => return Ok(()),
        Err(_) => tracing_subscriber::EnvFilter::new(level),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn execute(command: Commands, config: &Config, runtime: &Runtime) -> Result<()> {
    let store = CredentialStore::new(&config.state_dir);

    match command {
        Commands::Login { email, password } => {
            let password = read_password(password)?;
            let client = StudioClient::new(&config.api_url, None)?;
            let creds = runtime.block_on(client.login(&email, &password))?;
            store.save(&creds)?;
            let who = creds.user.as_ref().map(|u| u.email.as_str()).unwrap_or(email.as_str());
            println!("Logged in as {}", who);
            println!("Token stored in {}", format_path_with_tilde(store.path()));
        }
        Commands::Signup { email, password, display_name } => {
            let password = read_password(password)?;
            let client = StudioClient::new(&config.api_url, None)?;
            let outcome =
                runtime.block_on(client.signup(&email, &password, display_name.as_deref()))?;
            println!("{}", outcome.message);
            match outcome.credentials {
                Some(creds) => {
                    store.save(&creds)?;
                    println!("Token stored in {}", format_path_with_tilde(store.path()));
                }
                None => println!("Confirm your email, then run `question-studio login`."),
            }
        }
        Commands::Logout => logout(config, &store, runtime)?,
        Commands::Whoami => {
            let (client, source) = authed_client(config, &store)?;
            let user = runtime.block_on(client.me()).map_err(|e| {
                if e.is_unauthorized() {
                    anyhow!("session expired; run `question-studio login` again")
                } else {
                    anyhow!(e)
                }
            })?;
            println!("{}", format::user_line(&user, source));
        }
        Commands::Recent => {
            let (client, _) = authed_client(config, &store)?;
            let sessions = runtime.block_on(client.recent_sessions())?;
            print!("{}", format::session_list(&sessions));
        }
        Commands::Session { session_id } => {
            let (client, _) = authed_client(config, &store)?;
            let questions = runtime.block_on(client.session_questions(&session_id))?;
            if questions.is_empty() {
                println!("Session {} has no questions.", session_id);
            }
            for (i, record) in questions.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", format::question_card(record, Some(i + 1)));
            }
        }
        Commands::Show { question_id } => {
            let (client, _) = authed_client(config, &store)?;
            let record =
                runtime.block_on(client.fetch_question(&question_id)).map_err(load_error)?;
            print!("{}", format::question_detail(&record));
        }
        Commands::History { question_id } => {
            let (client, _) = authed_client(config, &store)?;
            let timeline =
                runtime.block_on(client.load_timeline(&question_id)).map_err(load_error)?;
            print!("{}", format::timeline_report(&timeline));
        }
        Commands::Refine { question_id, instruction } => {
            let (client, _) = authed_client(config, &store)?;
            let mut timeline =
                runtime.block_on(client.load_timeline(&question_id)).map_err(load_error)?;

            let pending = timeline.begin_refinement(&instruction)?;
            let outcome = runtime.block_on(client.refine(pending.question_id(), pending.instruction()));
            let settled = timeline.settle(pending, outcome);

            let refined = matches!(settled, Settled::Refined { .. });
            print!("{}", format::refinement_report(&timeline, refined));
            if let Settled::Failed { reason } = settled {
                bail!("Refinement failed: {}", reason);
            }
        }
        Commands::Studio { question_id } => {
            let (client, _) = authed_client(config, &store)?;
            let timeline =
                runtime.block_on(client.load_timeline(&question_id)).map_err(load_error)?;
            let backend = ClientBackend::new(client, runtime.handle().clone());
            run_studio(timeline, Box::new(backend))?;
        }
        Commands::GenerateDoc { pdf, kind, quantity } => {
            let (client, _) = authed_client(config, &store)?;
            println!("Uploading {} ...", format_path_with_tilde(&pdf));
            let result = runtime.block_on(client.generate_from_document(&pdf, kind, quantity))?;
            print!("{}", format::generation_summary(&result));
        }
        Commands::GenerateSimilar { image, instruction, difficulty, quantity } => {
            let (client, _) = authed_client(config, &store)?;
            println!("Uploading {} ...", format_path_with_tilde(&image));
            let request = SimilarRequest { instruction, difficulty, quantity };
            let result = runtime.block_on(client.generate_similar(&image, &request))?;
            print!("{}", format::generation_summary(&result));
        }
    }

    Ok(())
}

/// Client carrying the active credentials; fails before any request when there are none
fn authed_client(config: &Config, store: &CredentialStore) -> Result<(StudioClient, TokenSource)> {
    let (creds, source) =
        store.resolve(config.token_override.as_deref())?.ok_or(AuthError::NotLoggedIn)?;
    debug!(%source, "using stored session");
    Ok((StudioClient::new(&config.api_url, Some(creds))?, source))
}

/// The backend session is revoked best-effort; the local token is always forgotten
fn logout(config: &Config, store: &CredentialStore, runtime: &Runtime) -> Result<()> {
    let creds: Option<Credentials> = match store.load() {
        Ok(creds) => creds,
        Err(e) => {
            warn!(error = %e, "could not read stored credentials");
            None
        }
    };

    if let Some(creds) = creds {
        let client = StudioClient::new(&config.api_url, Some(creds))?;
        if let Err(e) = runtime.block_on(client.logout()) {
            warn!(error = %e, "backend logout failed");
        }
    }

    if store.delete()? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

fn load_error(error: crate::api::ApiError) -> anyhow::Error {
    anyhow!("Couldn't load question: {}", error)
}

fn read_password(provided: Option<String>) -> Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
