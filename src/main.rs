//! Serenity - daily Bible verses in your terminal
#![allow(clippy::uninlined_format_args)]

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use serenity::api::ApiClient;
use serenity::auth::{EncryptedFileStore, Session};
use serenity::feed::{Feed, LoadOutcome, load_pages};
use serenity::models::{Category, Verse};
use serenity::{Config, paths};

fn main() -> Result<()> {
    let command = parse_args()?;

    if matches!(command, Command::Run) {
        init_file_logging();
        return serenity::app::run();
    }

    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match command {
        Command::Run => Ok(()),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Categories => {
            list_categories();
            Ok(())
        }
        other => Runtime::new()?.block_on(run_command(other)),
    }
}

/// The TUI owns the terminal, so logs go to a file instead
fn init_file_logging() {
    let Ok(path) = paths::log_path() else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();
}

/// CLI commands
enum Command {
    Run,
    Login,
    Signup,
    Logout,
    Whoami,
    Verses { category: String, pages: usize },
    Liked,
    Lookup { query: String },
    Conversations,
    Categories,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Run);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "login" => Ok(Command::Login),
        "signup" => Ok(Command::Signup),
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::Whoami),

        "verses" | "v" => {
            let category = args
                .get(2)
                .filter(|a| !a.starts_with('-'))
                .cloned()
                .unwrap_or_else(|| serenity::models::HIS_WILL.to_string());
            let pages = args
                .iter()
                .position(|a| a == "--pages" || a == "-p")
                .and_then(|i| args.get(i + 1))
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);
            Ok(Command::Verses { category, pages })
        }

        "liked" => Ok(Command::Liked),

        "lookup" => {
            let query = args[2..].join(" ");
            if query.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "Missing verse address or id\nExample: serenity lookup \"John 3:16\""
                ));
            }
            Ok(Command::Lookup { query })
        }

        "conversations" | "inbox" => Ok(Command::Conversations),
        "categories" => Ok(Command::Categories),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'serenity --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path =
        paths::config_path().map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
✝ Serenity - daily Bible verses in your terminal

USAGE:
    serenity                           Launch TUI
    serenity [COMMAND]

COMMANDS:
    login                              Sign in with email and password
    signup                             Create an account
    logout                             Sign out and forget the session
    whoami                             Show the signed-in user

    verses [category] [OPTIONS]        Print verses for a category
      Options:
        -p, --pages <n>                Pages to fetch (default: 1)
      Examples:
        serenity verses
        serenity verses anxiety --pages 3

    liked                              List liked verses
    lookup <address | id>              Find a verse
      Examples:
        serenity lookup "John 3:16"
        serenity lookup 1042

    conversations                      List conversations
    categories                         List verse categories

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (TUI):
    Navigation
      Tab / 1-6     Switch view
      ←/→ h/l       Previous / next verse

    Actions
      Space         Like / unlike
      c             Pick a category
      s             Share text
      r             Reload
      n             New conversation

    View
      t             Change theme
      ?             Help

CONFIG:
    {}
"#,
        serenity::LOGO,
        config_path
    );
}

fn print_version() {
    println!("serenity {}", serenity::VERSION);
}

fn list_categories() {
    println!("Categories:\n");
    for category in Category::all() {
        println!("  {:<16} {}", category.slug(), category.display_name());
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn open_session(config: &Config) -> Result<Session> {
    let store = EncryptedFileStore::open()?;
    let api = ApiClient::with_timeout(
        config.api_base_url(),
        Arc::new(store),
        config.request_timeout(),
    );
    Ok(Session::new(api))
}

fn require_sign_in(session: &Session) -> Result<()> {
    if session.is_signed_in() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Not signed in. Run: serenity login"))
    }
}

fn print_verse(verse: &Verse) {
    let heart = if verse.liked { "♥" } else { "♡" };
    println!("\n{}", textwrap::fill(&verse.text, 72));
    println!("  {} {}", verse.reference(), heart);
}

async fn run_command(command: Command) -> Result<()> {
    let config = Config::load()?;
    let session = open_session(&config)?;

    match command {
        Command::Login => {
            let email = prompt("Email")?;
            let password = prompt("Password")?;
            if let Err(errors) = serenity::validation::login(&email, &password) {
                for (field, message) in errors.iter() {
                    eprintln!("{}: {message}", field.label());
                }
                return Err(anyhow::anyhow!("Invalid credentials"));
            }
            let user = session
                .login(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            match user {
                Some(user) => println!("✓ Signed in as {}", user.display_name()),
                None => println!("✓ Signed in"),
            }
        }

        Command::Signup => {
            let email = prompt("Email")?;
            let password = prompt("Password")?;
            let confirmation = prompt("Confirm password")?;
            if let Err(errors) = serenity::validation::signup(&email, &password, &confirmation) {
                for (field, message) in errors.iter() {
                    eprintln!("{}: {message}", field.label());
                }
                return Err(anyhow::anyhow!("Invalid sign up details"));
            }
            session
                .signup(&email, &password, &confirmation)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("✓ Account created, you are signed in");
        }

        Command::Logout => {
            if let Err(e) = session.logout().await {
                tracing::warn!("Server logout failed: {e}");
            }
            println!("✓ Signed out");
        }

        Command::Whoami => {
            require_sign_in(&session)?;
            let user = session.refresh().await.context("Failed to load profile")?;
            println!("{}", user.display_name());
            if let Some(email) = &user.email {
                println!("  {email}");
            }
        }

        Command::Verses { category, pages } => {
            require_sign_in(&session)?;
            let category = Category::new(category);
            if !category.is_known() {
                return Err(anyhow::anyhow!(
                    "Unknown category: {}\nRun 'serenity categories' to list them",
                    category.slug()
                ));
            }

            let mut feed = Feed::new(0).with_prefetch_threshold(config.prefetch_threshold);
            let outcomes = load_pages(
                &mut feed,
                session.api(),
                &category.search_url(config.api_base_url()),
                pages.max(1),
            )
            .await;
            if let Some(LoadOutcome::Failed { .. }) = outcomes.last()
                && feed.verses().is_empty()
            {
                return Err(anyhow::anyhow!("Could not load verses"));
            }

            println!("✝ {}", category.display_name());
            println!("{}", "─".repeat(60));
            for verse in feed.verses() {
                print_verse(verse);
            }
            if let Some(pagination) = feed.pagination() {
                println!(
                    "\n{} verses, page {} of {}",
                    pagination.count, pagination.page, pagination.pages
                );
            }
        }

        Command::Liked => {
            require_sign_in(&session)?;
            let verses = session.api().liked().await.context("Failed to load liked verses")?;
            if verses.is_empty() {
                println!("No liked verses yet.");
            }
            for verse in &verses {
                println!("  {:<10} {}", verse.short_reference(), verse.preview());
            }
        }

        Command::Lookup { query } => {
            require_sign_in(&session)?;
            let verses = match parse_address(&query) {
                Some((book, chapter, verse)) => {
                    session.api().search_by_address(book, chapter, verse).await
                }
                None => {
                    let id: u64 = query
                        .trim()
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Expected \"Book chapter:verse\" or an id"))?;
                    session.api().search_by_id(id).await
                }
            }
            .context("Lookup failed")?;

            if verses.is_empty() {
                println!("No verse found.");
            }
            for verse in &verses {
                print_verse(verse);
            }
        }

        Command::Conversations => {
            require_sign_in(&session)?;
            let conversations = session
                .api()
                .conversations()
                .await
                .context("Failed to load conversations")?;
            if conversations.is_empty() {
                println!("No conversations yet.");
            }
            for conversation in conversations {
                let preview = conversation
                    .last_message
                    .as_ref()
                    .map(serenity::models::LastMessage::preview)
                    .unwrap_or_default();
                println!("  {}\n    {}", conversation.title(), preview);
            }
        }

        Command::Run | Command::Categories | Command::Help | Command::Version => {}
    }

    Ok(())
}

/// Split "1 John 3:16" into ("1 John", 3, 16)
fn parse_address(query: &str) -> Option<(&str, u32, u32)> {
    let (book, reference) = query.trim().rsplit_once(' ')?;
    let (chapter, verse) = reference.split_once(':')?;
    Some((book.trim(), chapter.parse().ok()?, verse.parse().ok()?))
}
