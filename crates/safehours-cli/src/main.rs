use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use safehours_cli::commands::{add, edit, export, import, list, status, timeline, util, week};
use safehours_cli::{Cli, Commands, Config};
use safehours_db::{ActivityStore, Database};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tracing may already be initialized in tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match cli.command {
        Some(Commands::Add {
            date,
            start,
            duration,
            end,
            kind,
            pre_post,
            note,
        }) => {
            let mut db = open_database(cli.config.as_deref())?;
            let args = add::AddArgs {
                date: util::date_or_today(date),
                start,
                duration,
                end,
                kind,
                pre_post,
                note,
            };
            add::run(&mut stdout, &mut db, &args)?;
        }
        Some(Commands::Edit {
            id,
            date,
            start,
            end,
            duration,
            kind,
            pre_post,
            note,
        }) => {
            let mut db = open_database(cli.config.as_deref())?;
            let args = edit::EditArgs {
                date,
                start,
                end,
                duration,
                kind,
                pre_post,
                note,
            };
            edit::run(&mut stdout, &mut db, &id, args)?;
        }
        Some(Commands::Delete { id }) => {
            let mut db = open_database(cli.config.as_deref())?;
            edit::delete(&mut stdout, &mut db, &id)?;
        }
        Some(Commands::List { date, json }) => {
            let db = open_database(cli.config.as_deref())?;
            list::run(&mut stdout, &db, date, json)?;
        }
        Some(Commands::Status { date, json }) => {
            let db = open_database(cli.config.as_deref())?;
            let activities = db.snapshot()?;
            status::run(&mut stdout, &activities, util::date_or_today(date), json)?;
        }
        Some(Commands::Week { date, json }) => {
            let db = open_database(cli.config.as_deref())?;
            let activities = db.snapshot()?;
            week::run(&mut stdout, &activities, util::date_or_today(date), json)?;
        }
        Some(Commands::Timeline { date }) => {
            let db = open_database(cli.config.as_deref())?;
            let date = util::date_or_today(date);
            let activities: Vec<_> = db
                .list_activities_on(date)?
                .into_iter()
                .map(|stored| stored.activity)
                .collect();
            timeline::run(&mut stdout, &activities, date)?;
        }
        Some(Commands::Export { format, output }) => {
            let db = open_database(cli.config.as_deref())?;
            let activities = db.snapshot()?;
            export::run(&activities, format, output.as_deref())?;
        }
        Some(Commands::Import {
            path,
            format,
            replace,
        }) => {
            let mut db = open_database(cli.config.as_deref())?;
            import::run(&mut stdout, &mut db, &path, format, replace)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
