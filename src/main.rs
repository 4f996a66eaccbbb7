use clap::Parser;
use color_eyre::Result;
use tdl::cli::{self, Cli, Commands};
use tdl::{BlobGateway, Config, Database, Profile, TaskStore};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();
    let result = run(cli);
    tdl::logging::flush();
    result
}

fn run(cli: Cli) -> Result<()> {
    // Profile is determined solely by the --dev flag
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&tdl::utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    // Logging is best-effort; the app works without it
    if let Err(e) = tdl::logging::init_logging(&config.log_level, &config.get_log_dir()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let storage_path = config.get_storage_path();
    let db = Database::new(
        storage_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Storage path contains invalid UTF-8"))?,
    )?;
    let gateway = BlobGateway::with_key(db, &config.storage_key);
    let mut store = TaskStore::open(gateway);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = tdl::tui::App::new(config, store);
            tdl::tui::run_event_loop(app)?;
        }
        Commands::Lists => cli::handle_lists(&store),
        Commands::Show { list, search, ids } => cli::handle_show(&store, list, search, ids),
        Commands::NewList { name } => cli::handle_new_list(&mut store, name),
        Commands::UseList { id } => cli::handle_use_list(&mut store, id),
        Commands::RenameList { id, name } => cli::handle_rename_list(&mut store, id, name),
        Commands::DeleteList { id } => cli::handle_delete_list(&mut store, id),
        Commands::Add {
            content,
            category,
            time,
            parent,
        } => cli::handle_add(
            &mut store,
            content,
            category.unwrap_or(config.default_category),
            time,
            parent,
        ),
        Commands::Toggle { id } => cli::handle_toggle(&mut store, id),
        Commands::Delete { id } => cli::handle_delete(&mut store, id),
        Commands::Move { from, to } => cli::handle_move(&mut store, from, to),
        Commands::Export => cli::handle_export(&store)?,
        Commands::Reset => cli::handle_reset(store.gateway_mut())?,
    }

    Ok(())
}
