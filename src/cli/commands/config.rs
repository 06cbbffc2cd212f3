use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::db::log::ttlog_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        get,
        set,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        // ---- GET ----
        if let Some(key) = get {
            println!("{}", ConfigLogic::get(cfg, key)?);
        }

        // ---- SET ----
        let mut current = cfg.clone();
        if let Some(assignment) = set {
            current = ConfigLogic::set(cfg, assignment)?;
            if let Ok(pool) = DbPool::open(&current.database) {
                ttlog_or_warn(&pool.conn, "config", "set", assignment);
            }
        }

        // ---- PRINT ----
        if *print_config {
            ConfigLogic::print(&current)?;
        }

        // ---- CHECK ----
        if *check {
            ConfigLogic::check(&path)?;
        }

        // ---- EDIT ----
        if *edit_config {
            if !path.exists() {
                current.save()?;
            }
            ConfigLogic::edit(&path, editor)?;
        }
    }

    Ok(())
}
