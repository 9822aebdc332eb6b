use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use course_core::Progress;
use course_core::model::LessonId;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AppServices, CertificateEmitter, Clock, CompletionTracker, MarkOutcome, PlaybackCoordinator,
    load_catalog,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://elearn.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    MissingLessonId,
    InvalidLessonId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingLessonId => write!(f, "complete requires a lesson id"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid lesson id: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug)]
enum CommandError {
    Incomplete { completed: usize, total: usize },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Incomplete { completed, total } => write!(
                f,
                "certificate not earned yet: {completed} of {total} lessons complete"
            ),
        }
    }
}

impl std::error::Error for CommandError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    coordinator: Mutex<Option<PlaybackCoordinator>>,
    certificates: Arc<CertificateEmitter>,
    recipient: Option<String>,
}

impl UiApp for DesktopApp {
    fn take_coordinator(&self) -> Option<PlaybackCoordinator> {
        self.coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn certificates(&self) -> Arc<CertificateEmitter> {
        Arc::clone(&self.certificates)
    }

    fn recipient(&self) -> Option<String> {
        self.recipient.clone()
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    catalog: Option<PathBuf>,
    out_dir: PathBuf,
    recipient: Option<String>,
    positional: Vec<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  elearn [ui]                [options]");
    eprintln!("  elearn status              [options]");
    eprintln!("  elearn complete <lesson>   [options]");
    eprintln!("  elearn certificate         [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     default {DEFAULT_DB_URL}");
    eprintln!("  --catalog <file>      JSON course catalog, default built-in");
    eprintln!("  --out-dir <dir>       certificate download directory, default cwd");
    eprintln!("  --name <recipient>    name printed on the certificate");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ELEARN_DB_URL, ELEARN_CATALOG, ELEARN_OUT_DIR, ELEARN_RECIPIENT, ELEARN_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Status,
    Complete,
    Certificate,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "status" => Some(Self::Status),
            "complete" => Some(Self::Complete),
            "certificate" => Some(Self::Certificate),
            _ => None,
        }
    }

    fn takes_positional(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Args {
    /// Env values seed the defaults; flags override them.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let non_blank = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let mut db_url = non_blank("ELEARN_DB_URL")
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut catalog = non_blank("ELEARN_CATALOG").map(PathBuf::from);
        let mut out_dir = non_blank("ELEARN_OUT_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut recipient = non_blank("ELEARN_RECIPIENT");
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--catalog" => catalog = Some(PathBuf::from(require_value(args, "--catalog")?)),
                "--out-dir" => out_dir = PathBuf::from(require_value(args, "--out-dir")?),
                "--name" => recipient = Some(require_value(args, "--name")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        Ok(Self {
            db_url,
            catalog,
            out_dir,
            recipient,
            positional,
        })
    }

    fn lesson_id(&self) -> Result<LessonId, ArgsError> {
        let raw = self.positional.first().ok_or(ArgsError::MissingLessonId)?;
        LessonId::new(raw.as_str()).map_err(|_| ArgsError::InvalidLessonId { raw: raw.clone() })
    }
}

/// Turn `path`, `sqlite:path` or `sqlite://path` into an absolute
/// `sqlite://` URL. In-memory and `file:` URLs pass through.
fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    let passthrough = ["sqlite://", "sqlite::memory:", "sqlite:file:"];
    if passthrough.iter().any(|prefix| raw.starts_with(prefix)) {
        return raw.to_string();
    }
    let path = Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("ELEARN_LOG")
        .unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: launching UI when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok())
        .and_then(|args| match args.positional.first() {
            Some(extra) if !cmd.takes_positional() => Err(ArgsError::UnknownArg(extra.clone())),
            _ => Ok(args),
        })
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    // Validate before touching the database.
    let lesson_id = match cmd {
        Command::Complete => Some(parsed.lesson_id()?),
        _ => None,
    };

    let catalog = load_catalog(parsed.catalog.as_deref()).await?;

    ensure_db_dir(&parsed.db_url)?;
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        catalog,
        Clock::system(),
        parsed.out_dir.clone(),
    )
    .await?;
    tracing::debug!(db = %parsed.db_url, out_dir = %parsed.out_dir.display(), "services ready");

    match cmd {
        Command::Ui => {
            let coordinator = services.load_coordinator().await;
            let app = DesktopApp {
                coordinator: Mutex::new(Some(coordinator)),
                certificates: services.certificates(),
                recipient: parsed.recipient,
            };

            let app: Arc<dyn UiApp> = Arc::new(app);
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            // Explicitly disable it so the app doesn't behave like a modal window.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("E-Learn")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Status => {
            let tracker = services.load_tracker().await;
            print_status(&tracker);
            Ok(())
        }
        Command::Complete => {
            let Some(lesson_id) = lesson_id else {
                return Err(ArgsError::MissingLessonId.into());
            };
            let mut tracker = services.load_tracker().await;
            match tracker.mark_complete(&lesson_id).await? {
                MarkOutcome::Completed => println!("{lesson_id}: completed"),
                MarkOutcome::AlreadyComplete => println!("{lesson_id}: already complete"),
            }
            let progress = tracker.progress();
            println!(
                "Overall: {} of {} lessons complete ({}%)",
                progress.completed(),
                progress.total(),
                progress.percent()
            );
            Ok(())
        }
        Command::Certificate => {
            let progress = services.load_tracker().await.progress();
            if !progress.is_complete() {
                return Err(CommandError::Incomplete {
                    completed: progress.completed(),
                    total: progress.total(),
                }
                .into());
            }
            let certificates = services.certificates();
            let document = certificates.emit(parsed.recipient.as_deref())?;
            let path = certificates.save(&document).await?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn print_status(tracker: &CompletionTracker) {
    for course in tracker.catalog().courses() {
        let progress = Progress::course(course, tracker.completed());
        println!(
            "{}: {}/{}",
            course.title(),
            progress.completed(),
            progress.total()
        );
        for lesson in course.lessons() {
            let mark = if tracker.is_complete(lesson.id()) { "x" } else { " " };
            println!(
                "  [{mark}] {} {}  {}",
                lesson.id(),
                lesson.title(),
                lesson.video().watch_url()
            );
        }
    }
    let overall = tracker.progress();
    println!(
        "Overall: {} of {} lessons complete ({}%)",
        overall.completed(),
        overall.total(),
        overall.percent()
    );
}

/// The database file is created on connect, but its directory must exist.
fn ensure_db_dir(db_url: &str) -> Result<(), ArgsError> {
    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        });
    }
    if let Some(dir) = Path::new(file).parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|_| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(ToString::to_string);
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Args::parse(&mut iter, |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.catalog, None);
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.recipient, None);
    }

    #[test]
    fn flags_override_env() {
        let args = parse(
            &["--db", "sqlite:///tmp/flag.sqlite3", "--name", "Grace"],
            &[
                ("ELEARN_DB_URL", "sqlite:///tmp/env.sqlite3"),
                ("ELEARN_RECIPIENT", "Ada"),
                ("ELEARN_OUT_DIR", "/tmp/certs"),
            ],
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/flag.sqlite3");
        assert_eq!(args.recipient.as_deref(), Some("Grace"));
        assert_eq!(args.out_dir, PathBuf::from("/tmp/certs"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let args = parse(&[], &[("ELEARN_RECIPIENT", "  "), ("ELEARN_CATALOG", "")]).unwrap();
        assert_eq!(args.recipient, None);
        assert_eq!(args.catalog, None);
    }

    #[test]
    fn positional_lesson_id_is_collected() {
        let args = parse(&["r2", "--out-dir", "out"], &[]).unwrap();
        assert_eq!(args.lesson_id().unwrap().as_str(), "r2");
        assert_eq!(args.out_dir, PathBuf::from("out"));
    }

    #[test]
    fn missing_flag_value_and_unknown_flags_are_errors() {
        assert!(matches!(
            parse(&["--db"], &[]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse(&["--verbose"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&[], &[]).unwrap().lesson_id(),
            Err(ArgsError::MissingLessonId)
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url(" sqlite:///var/lib/elearn.db ".into()),
            "sqlite:///var/lib/elearn.db"
        );
        let url = normalize_sqlite_url("sqlite:data/elearn.sqlite3".into());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/elearn.sqlite3"), "{url}");
    }

    #[test]
    fn db_dir_rejects_urls_without_a_file() {
        assert!(ensure_db_dir("sqlite://").is_err());
        assert!(ensure_db_dir("sqlite::memory:").is_ok());
    }

    #[test]
    fn subcommands_parse() {
        assert_eq!(Command::from_arg("status"), Some(Command::Status));
        assert_eq!(Command::from_arg("complete"), Some(Command::Complete));
        assert!(Command::Complete.takes_positional());
        assert!(!Command::Certificate.takes_positional());
        assert_eq!(Command::from_arg("seed"), None);
    }
}
