use std::fmt;

use learn_core::model::{CourseId, UserId, UserIdentity};
use services::{AppServices, Clock};
use storage::http::RemoteConfig;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingUser,
    InvalidUser { raw: String },
    InvalidCourseId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingUser => write!(f, "no user given (use --user or LEARN_USER_ID)"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid course id: {raw}"),
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
    eprintln!("  cargo run -p app -- [options] dashboard");
    eprintln!("  cargo run -p app -- [options] catalog [--search <query>]");
    eprintln!("  cargo run -p app -- [options] enroll <course-id>");
    eprintln!("  cargo run -p app -- [options] bookmark <course-id>");
    eprintln!("  cargo run -p app -- [options] ingest <playlist-id> <course-title>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --api-url <url>      data service base URL");
    eprintln!("  --user <id>          user id");
    eprintln!("  --groups <a,b>       identity groups (Admin enables ingest)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_API_URL, LEARN_API_TOKEN, LEARN_API_TIMEOUT_SECS,");
    eprintln!("  LEARN_USER_ID, LEARN_USER_GROUPS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Dashboard,
    Catalog { search: String },
    Enroll(CourseId),
    Bookmark(CourseId),
    Ingest { playlist_id: String, course_title: String },
}

impl Command {
    fn parse(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        match name {
            "dashboard" => Ok(Self::Dashboard),
            "catalog" => {
                let mut search = String::new();
                while let Some(arg) = args.next() {
                    match arg.as_str() {
                        "--search" => search = require_value(args, "--search")?,
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Ok(Self::Catalog { search })
            }
            "enroll" => Ok(Self::Enroll(course_arg(args, "enroll")?)),
            "bookmark" => Ok(Self::Bookmark(course_arg(args, "bookmark")?)),
            "ingest" => {
                let playlist_id = args.next().ok_or(ArgsError::MissingArgument {
                    command: "ingest",
                    name: "playlist-id",
                })?;
                let course_title = args.next().ok_or(ArgsError::MissingArgument {
                    command: "ingest",
                    name: "course-title",
                })?;
                Ok(Self::Ingest {
                    playlist_id,
                    course_title,
                })
            }
            other => Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }
}

fn course_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<CourseId, ArgsError> {
    let raw = args.next().ok_or(ArgsError::MissingArgument {
        command,
        name: "course-id",
    })?;
    CourseId::new(&raw).map_err(|_| ArgsError::InvalidCourseId { raw })
}

struct Args {
    api_url: Option<String>,
    identity: UserIdentity,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        let mut api_url = std::env::var("LEARN_API_URL").ok();
        let mut user = std::env::var("LEARN_USER_ID").ok();
        let mut groups = std::env::var("LEARN_USER_GROUPS").unwrap_or_default();

        let command_name = loop {
            let Some(arg) = args.next() else {
                return Err(ArgsError::MissingArgument {
                    command: "app",
                    name: "command",
                });
            };
            match arg.as_str() {
                "--api-url" => api_url = Some(require_value(&mut args, "--api-url")?),
                "--user" => user = Some(require_value(&mut args, "--user")?),
                "--groups" => groups = require_value(&mut args, "--groups")?,
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => break arg,
            }
        };
        let command = Command::parse(&command_name, &mut args)?;

        let raw_user = user.ok_or(ArgsError::MissingUser)?;
        let user_id =
            UserId::new(&raw_user).map_err(|_| ArgsError::InvalidUser { raw: raw_user })?;
        let identity = UserIdentity::new(user_id).with_groups(groups.split(',').map(str::to_string));

        Ok(Self {
            api_url,
            identity,
            command,
        })
    }

    fn remote_config(&self) -> Result<RemoteConfig, storage::http::RemoteConfigError> {
        RemoteConfig::from_lookup(|key| match key {
            "LEARN_API_URL" => self.api_url.clone(),
            _ => std::env::var(key).ok(),
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() || matches!(argv[0].as_str(), "--help" | "-h" | "help") {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let config = parsed.remote_config()?;
    debug!(base_url = %config.base_url(), "using remote data service");
    let services = AppServices::remote(config, Clock::default())?;
    let identity = &parsed.identity;

    match &parsed.command {
        Command::Dashboard => {
            let dashboard = services.dashboard().load(identity).await?;
            if dashboard.courses.is_empty() {
                println!("Not enrolled in any course yet.");
            }
            for course in &dashboard.courses {
                println!(
                    "{:>3}%  {:<40} {}/{} lessons  [{}]",
                    course.percentage,
                    course.title,
                    course.watched_items,
                    course.total_items,
                    course.course_id
                );
            }
            if !dashboard.bookmarks.is_empty() {
                println!();
                println!("Bookmarked:");
                for bookmark in &dashboard.bookmarks {
                    println!("  {}  [{}]", bookmark.title, bookmark.course_id);
                }
            }
        }
        Command::Catalog { search } => {
            let catalog = services.catalog();
            let entries = catalog.browse(search).await?;
            let bookmarks = catalog.bookmarks(identity).await?;
            for entry in &entries {
                let mark = if bookmarks.contains(entry.course_id()) {
                    '*'
                } else {
                    ' '
                };
                let total = entry
                    .total_videos()
                    .map_or_else(|| "?".to_string(), |n| n.to_string());
                println!(
                    "{mark} {:<40} {:>4} lessons  [{}]",
                    entry.title().unwrap_or_default(),
                    total,
                    entry.course_id()
                );
            }
            if entries.is_empty() {
                println!("No courses match.");
            }
        }
        Command::Enroll(course_id) => {
            let catalog = services.catalog();
            let entry = catalog.find(course_id).await?;
            catalog.enroll(identity, &entry).await?;
            println!("Enrolled in {}.", entry.title().unwrap_or(course_id.as_str()));
        }
        Command::Bookmark(course_id) => {
            let catalog = services.catalog();
            let entry = catalog.find(course_id).await?;
            let mut bookmarks = catalog.bookmarks(identity).await?;
            let now_bookmarked = catalog
                .toggle_bookmark(identity, &entry, &mut bookmarks)
                .await?;
            let verb = if now_bookmarked { "Bookmarked" } else { "Removed bookmark for" };
            println!("{verb} {}.", entry.title().unwrap_or(course_id.as_str()));
        }
        Command::Ingest {
            playlist_id,
            course_title,
        } => {
            if !identity.is_admin() {
                eprintln!("warning: {} is not in the Admin group", identity.user_id());
            }
            let message = services
                .catalog()
                .ingest_playlist(playlist_id, course_title)
                .await?;
            println!("{message}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
