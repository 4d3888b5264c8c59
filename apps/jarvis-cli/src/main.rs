use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use assistant_core::services::StatusReport;
use assistant_core::{Session, Settings};
use contact_store::{import_file, normalize_phone, ContactStore, ImportSpec};
use intent_parser::IntentParser;
use voice_local::plugin::{new_input_backend, InputBackendKind};
use voice_local::{ConsoleInput, ConsoleSpeaker, ListenConfig, ScriptedInput, SpeechInput};

#[derive(Parser, Debug)]
#[command(
    name = "jarvis",
    version,
    about = "Jarvis voice assistant",
    disable_help_subcommand = true
)]
struct Cli {
    /// Settings file in KEY=value form (defaults to ./.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Database file; overrides JARVIS_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Input {
    Console,
    Mock,
    Mic,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listen for commands until silence or "stop listening"
    Listen {
        #[arg(long, value_enum, default_value_t = Input::Console)]
        input: Input,
        /// Utterances for the mock input, in order
        #[arg(long = "say")]
        script: Vec<String>,
        /// Skip the spoken greeting
        #[arg(long, action = ArgAction::SetTrue)]
        quiet: bool,
    },
    /// Run a single typed command
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show which intent a command maps to
    Classify {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Address book maintenance
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Launch shortcuts for the open command
    Shortcut {
        #[command(subcommand)]
        command: ShortcutCommands,
    },
    /// Report which API credentials are configured
    ApiStatus,
}

#[derive(Subcommand, Debug)]
enum ContactCommands {
    /// Import contacts from a delimited export
    Import {
        file: PathBuf,
        /// Zero-based column holding the name
        #[arg(long, default_value_t = 0)]
        name_col: usize,
        /// Zero-based column holding the phone number
        #[arg(long, default_value_t = 21)]
        phone_col: usize,
        #[arg(long)]
        email_col: Option<usize>,
        #[arg(long, default_value_t = ',')]
        delimiter: char,
        /// The first row is data, not a header
        #[arg(long, action = ArgAction::SetTrue)]
        no_header: bool,
    },
    /// Show tables, contact count and a few entries
    Check {
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },
    /// List contacts matching a name fragment, best first
    Find {
        #[arg(required = true)]
        name: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ShortcutCommands {
    /// Map a name to an application path
    AddApp { name: String, path: String },
    /// Map a name to a web address
    AddWeb { name: String, url: String },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();
    let settings = load_settings(cli.env_file.as_deref(), cli.db)?;

    match cli.command {
        Commands::Listen {
            input,
            script,
            quiet,
        } => listen(settings, input, script, quiet),
        Commands::Ask { text } => ask(settings, &text.join(" ")),
        Commands::Classify { text, json } => classify(&settings, &text.join(" "), json),
        Commands::Contacts { command } => contacts(&settings, command),
        Commands::Shortcut { command } => shortcut(&settings, command),
        Commands::ApiStatus => {
            let report = StatusReport::from_keys(&settings.keys);
            for line in report.detail_lines() {
                println!("{line}");
            }
            for line in report.spoken_lines() {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_settings(env_file: Option<&Path>, db: Option<PathBuf>) -> Result<Settings> {
    let mut settings = match env_file {
        Some(path) => Settings::from_env_file(path)?,
        None if Path::new(".env").is_file() => Settings::from_env_file(".env")?,
        None => Settings::from_env(),
    };
    if db.is_some() {
        settings.database_path = db;
    }
    Ok(settings)
}

fn open_store(settings: &Settings) -> Result<ContactStore> {
    let path = settings.resolve_database_path()?;
    let store = ContactStore::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;
    info!("database: {}", path.display());
    Ok(store)
}

fn listen(settings: Settings, input: Input, script: Vec<String>, quiet: bool) -> Result<()> {
    let listen_cfg = ListenConfig::default();
    let transcription = settings.transcription();
    let source: Box<dyn SpeechInput> = match input {
        Input::Mock if !script.is_empty() => Box::new(ScriptedInput::from_lines(script)),
        Input::Mock => new_input_backend(InputBackendKind::Mock, listen_cfg, &transcription)
            .map_err(anyhow::Error::msg)?,
        Input::Console => new_input_backend(InputBackendKind::Console, listen_cfg, &transcription)
            .map_err(anyhow::Error::msg)?,
        Input::Mic => new_input_backend(InputBackendKind::Microphone, listen_cfg, &transcription)
            .map_err(anyhow::Error::msg)?,
    };
    let speaker = Box::new(ConsoleSpeaker::stdout(&settings.assistant_name));

    let mut session = Session::open(settings, source, speaker)?;
    if !quiet {
        session.greet();
    }
    let cycles = session.run_continuous();
    info!(cycles, "back to idle");
    session.close()?;
    Ok(())
}

fn ask(settings: Settings, text: &str) -> Result<()> {
    // follow-up questions are answered on stdin
    let source = Box::new(ConsoleInput::stdin());
    let speaker = Box::new(ConsoleSpeaker::stdout(&settings.assistant_name));
    let mut session = Session::open(settings, source, speaker)?;

    let outcome = session.submit_text(text);
    if outcome.response.as_ref().is_some_and(|r| !r.handled) {
        warn!("command was not handled");
    }
    session.close()?;
    Ok(())
}

fn classify(settings: &Settings, text: &str, json: bool) -> Result<()> {
    let parser = IntentParser::new(settings.intent_config())?;
    let result = parser.parse(text);
    if json {
        println!("{}", serde_json::to_string_pretty(&result.intent)?);
    } else {
        println!("{}\t(rule: {})", result.intent, result.rule);
    }
    Ok(())
}

fn contacts(settings: &Settings, command: ContactCommands) -> Result<()> {
    let mut store = open_store(settings)?;
    match command {
        ContactCommands::Import {
            file,
            name_col,
            phone_col,
            email_col,
            delimiter,
            no_header,
        } => {
            let spec = ImportSpec {
                name_col,
                phone_col,
                email_col,
                delimiter,
                has_header: !no_header,
            };
            let report = import_file(&mut store, &file, &spec)
                .with_context(|| format!("importing {}", file.display()))?;
            if let Some(cols) = report.header_columns {
                println!("header columns: {cols}");
            }
            println!(
                "imported {} contacts, skipped {} rows",
                report.imported, report.skipped
            );
        }
        ContactCommands::Check { sample } => {
            println!("tables: {}", store.table_names()?.join(", "));
            println!("contacts: {}", store.count()?);
            for c in store.sample(sample)? {
                println!("{}\t{}\t{}", c.id, c.name, c.phone);
            }
        }
        ContactCommands::Find { name } => {
            let fragment = name.join(" ").to_lowercase();
            let matches = store.find_matches(&fragment)?;
            if matches.is_empty() {
                println!("no contacts match {fragment:?}");
            }
            for m in matches {
                println!(
                    "{:?}\t{}\t{}",
                    m.kind,
                    m.contact.name,
                    normalize_phone(&m.contact.phone, &settings.default_country_code)
                );
            }
        }
    }
    store.close()?;
    Ok(())
}

fn shortcut(settings: &Settings, command: ShortcutCommands) -> Result<()> {
    let store = open_store(settings)?;
    match command {
        ShortcutCommands::AddApp { name, path } => {
            store.add_app_shortcut(&name, &path)?;
            println!("{name} -> {path}");
        }
        ShortcutCommands::AddWeb { name, url } => {
            store.add_web_shortcut(&name, &url)?;
            println!("{name} -> {url}");
        }
    }
    store.close()?;
    Ok(())
}
