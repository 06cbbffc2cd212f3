use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::engine::{Action, Engine, EngineSettings, Request, Response};
use crate::db::log::ttlog_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::page::PageContext;
use crate::page::locators::Locators;
use crate::page::snapshot::{SimulatedPage, TimesheetSnapshot};
use crate::utils::date;
use crate::utils::path::resolve_page;
use std::io::Read;

/// Handle `message`: one request in, one JSON status line out.
///
/// Malformed or unknown requests are answered without touching the page.
/// Only I/O around the exchange (unreadable page, stdin) can fail the
/// command; everything the engine reports goes into the response.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Message { page, json } = cmd else {
        return Ok(());
    };

    let raw = match json {
        Some(s) => s.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    // 1️⃣ validate the request
    let request = match serde_json::from_str::<Request>(raw.trim()) {
        Ok(request) => request,
        Err(e) => {
            let response = Response::error(format!("Malformed request: {}", e));
            return respond(cfg, page, &response);
        }
    };
    if Action::parse(request.action.trim()).is_none() {
        return respond(cfg, page, &Response::error("Unknown action"));
    }

    // 2️⃣ run it against the page
    let path = resolve_page(page)?;
    let snapshot = TimesheetSnapshot::load(&path)?;
    let mut sheet = SimulatedPage::new(&snapshot)?;

    let ctx = PageContext::new(Locators::default(), cfg.waiter());
    let engine = Engine::new(EngineSettings::from_config(cfg), ctx, date::today());
    let response = engine.handle(&mut sheet, &request);

    if response.is_completed() && sheet.writes() > 0 {
        sheet.to_snapshot().save(&path)?;
    }

    respond(cfg, &path.to_string_lossy(), &response)
}

/// Log the exchange (non-blocking) and print the response.
fn respond(cfg: &Config, target: &str, response: &Response) -> AppResult<()> {
    let line = serde_json::to_string(response)?;
    if let Ok(pool) = DbPool::open(&cfg.database) {
        ttlog_or_warn(&pool.conn, "message", target, &line);
    }
    println!("{}", line);
    Ok(())
}
