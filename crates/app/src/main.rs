use std::fmt;
use std::net::IpAddr;

use app::api::{AppState, router};
use app::config::{Config, normalize_sqlite_url, prepare_sqlite_file};
use app::logging::init_tracing;
use app::terminal;
use services::{AppServices, Clock};
use tokio::io::BufReader;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidHost { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidHost { raw } => write!(f, "invalid --host value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app serve    [--db <sqlite_url>] [--host <ip>] [--port <port>]");
    eprintln!("  app courses");
    eprintln!("  app progress <course> [--db <sqlite_url>]");
    eprintln!("  app complete <course> <lesson> [--db <sqlite_url>]");
    eprintln!("  app reset    <course> [--db <sqlite_url>]");
    eprintln!("  app quiz     <course> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://progress.sqlite3");
    eprintln!("  --host 127.0.0.1 --port 3000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, HOST, PORT, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Serve,
    Courses,
    Progress { course: String },
    Complete { course: String, lesson: String },
    Reset { course: String },
    Quiz { course: String },
}

/// Parse `argv` (without the program name) on top of `config`.
fn parse_args(
    argv: Vec<String>,
    mut config: Config,
) -> Result<Option<(Command, Config)>, ArgsError> {
    let mut iter = argv.into_iter();
    let mut positional = Vec::new();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut iter, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = normalize_sqlite_url(value);
            }
            "--host" => {
                let value = require_value(&mut iter, "--host")?;
                config.host = value
                    .parse::<IpAddr>()
                    .map_err(|_| ArgsError::InvalidHost { raw: value.clone() })?;
            }
            "--port" => {
                let value = require_value(&mut iter, "--port")?;
                config.port = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
            }
            "--help" | "-h" => return Ok(None),
            flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let mut take = |name: &'static str| {
        positional
            .next()
            .ok_or(ArgsError::MissingArgument { name })
    };
    let command = match take("command").ok().as_deref() {
        None | Some("serve") => Command::Serve,
        Some("courses") => Command::Courses,
        Some("progress") => Command::Progress {
            course: take("course")?,
        },
        Some("complete") => Command::Complete {
            course: take("course")?,
            lesson: take("lesson")?,
        },
        Some("reset") => Command::Reset {
            course: take("course")?,
        },
        Some("quiz") => Command::Quiz {
            course: take("course")?,
        },
        Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
    };
    if let Some(extra) = positional.next() {
        return Err(ArgsError::UnknownArg(extra));
    }

    Ok(Some((command, config)))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, config)) = parse_args(argv, Config::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing(&config.log_level);

    // Open + migrate SQLite at startup; core and services never see the URL.
    prepare_sqlite_file(&config.db_url)?;
    let clock = Clock::system();
    let services = AppServices::new_sqlite(&config.db_url, clock).await?;
    let mut stdout = std::io::stdout();

    match command {
        Command::Serve => {
            let app = router(AppState::new(services, clock));
            let addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, db = %config.db_url, "listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            tracing::info!("server stopped");
        }
        Command::Courses => terminal::print_courses(&services, &mut stdout)?,
        Command::Progress { course } => {
            terminal::print_progress(&services, &course, &mut stdout).await?;
        }
        Command::Complete { course, lesson } => {
            terminal::complete_lesson(&services, &course, &lesson, &mut stdout).await?;
        }
        Command::Reset { course } => {
            terminal::reset_progress(&services, &course, &mut stdout).await?;
        }
        Command::Quiz { course } => {
            let input = BufReader::new(tokio::io::stdin());
            terminal::run_quiz(&services, &course, input, &mut stdout).await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn base() -> Config {
        Config::from_lookup(|_| None)
    }

    #[test]
    fn no_arguments_serves() {
        let (command, config) = parse_args(args(&[]), base()).unwrap().unwrap();
        assert_eq!(command, Command::Serve);
        assert_eq!(config, base());
    }

    #[test]
    fn flags_override_config() {
        let (command, config) = parse_args(
            args(&["serve", "--port", "8081", "--host", "0.0.0.0", "--db", "sqlite::memory:"]),
            base(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(command, Command::Serve);
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8081");
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn subcommands_take_positionals() {
        let (command, _) = parse_args(args(&["complete", "study-skills", "3"]), base())
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            Command::Complete {
                course: "study-skills".into(),
                lesson: "3".into()
            }
        );
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(matches!(
            parse_args(args(&["quiz"]), base()),
            Err(ArgsError::MissingArgument { name: "course" })
        ));
        assert!(matches!(
            parse_args(args(&["--port", "x"]), base()),
            Err(ArgsError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_args(args(&["--db"]), base()),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            parse_args(args(&["dance"]), base()),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(parse_args(args(&["-h"]), base()), Ok(None)));
    }
}
