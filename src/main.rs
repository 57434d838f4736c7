use clap::Parser;
use color_eyre::Result;
use std::path::{Path, PathBuf};

use doneward::cli::{self, Cli, Commands};
use doneward::{Config, Database, Profile, TaskStore, logging, ordering, utils};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev selects a separate config, database and log
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config_path = match &cli.config {
        Some(path) => utils::expand_path(path),
        None => Config::get_config_path(profile)?,
    };
    let mut config = Config::load_from(&config_path)?;

    let db_path = config.get_database_path(profile);
    let log_path = db_path
        .parent()
        .map(|dir| dir.join("doneward.log"))
        .unwrap_or_else(|| PathBuf::from("doneward.log"));
    if let Err(e) = logging::init(&log_path) {
        eprintln!("Logging disabled: {}", e);
    }
    tracing::info!(?profile, config = %config_path.display(), "starting doneward");

    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    prepopulate_if_needed(&mut config, &config_path, &db)?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let store = TaskStore::open(db)?;
            let app = doneward::tui::App::new(config, config_path, db_path, store);
            doneward::tui::run_event_loop(app)?;
        }
        Commands::Add { text, top, bottom } => {
            let insert = cli::insert_position_for(top, bottom, config.insert_position);
            let added = cli::handle_add(&text, insert, &db)?;
            println!("Added {} task(s)", added);
        }
        Commands::List { json } => {
            cli::handle_list(json, &db, &mut std::io::stdout().lock())?;
        }
        Commands::Archive { search, json } => {
            cli::handle_archive(
                search.as_deref(),
                json,
                config.time_format,
                &db,
                &mut std::io::stdout().lock(),
            )?;
        }
        Commands::Clear { yes } => {
            let removed = cli::handle_clear(yes, &db)?;
            println!("Deleted {} task(s)", removed);
        }
    }

    Ok(())
}

/// Seed the tutorial tasks the first time the app runs against this config
fn prepopulate_if_needed(config: &mut Config, config_path: &Path, db: &Database) -> Result<()> {
    if config.prepopulated {
        return Ok(());
    }
    if db.get_all_active()?.is_empty() && db.get_all_done()?.is_empty() {
        for task in ordering::tutorial_tasks() {
            db.insert_task(&task)?;
        }
        tracing::info!("seeded tutorial tasks");
    }
    config.prepopulated = true;
    config.save_to(config_path)?;
    Ok(())
}
