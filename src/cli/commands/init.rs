use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::ttlog_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (unless in test mode)
///  - the SQLite log database
pub fn handle(cli: &Cli) -> AppResult<()> {
    // 1️⃣ configuration
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;
    let path = Config::config_file();

    println!("⚙️  Initializing sheetfill…");
    println!("📄 Config file : {}", path.display());
    println!("🗄️  Database   : {}", &cfg.database);

    // 2️⃣ log database (tables + migrations)
    let pool = DbPool::open(&cfg.database)?;
    println!("✅ Database initialized at {}", &cfg.database);

    // 3️⃣ internal log (non-blocking)
    ttlog_or_warn(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    );

    println!("🎉 sheetfill initialization completed!");
    Ok(())
}
