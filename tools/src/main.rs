//! eco-admin: headless maintenance CLI for the EcoDenuncias database.
//!
//! Usage:
//!   eco-admin migrate    --db eco.db
//!   eco-admin list       --db eco.db [--zone Norte] [--category contaminacion_agua]
//!                        [--status pendiente] [--days 30] [--limit 20]
//!   eco-admin set-status --db eco.db --id 7 --status en_proceso
//!                        [--notes "cuadrilla asignada"] [--actor "Mesa de partes"]
//!   eco-admin history    --db eco.db --id 7
//!   eco-admin report     --db eco.db [--from 2025-01-01] [--to 2025-03-31] [--json]

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use ecodenuncias_core::{
    complaint_repository::{ComplaintFilters, ComplaintRepository},
    report_engine::ReportEngine,
    types::{Category, ComplaintStatus},
    Clock, DateRange, RepoConfig, Store,
};
use std::env;
use std::rc::Rc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(command) = args.get(1).map(String::as_str) else {
        bail!("missing command (migrate | list | set-status | history | report)");
    };
    let db = flag_value(&args, "--db").unwrap_or_else(|| "eco.db".to_string());

    let store = Rc::new(Store::open(&db)?);
    store.migrate()?;

    match command {
        "migrate" => {
            println!("schema up to date: {db}");
            Ok(())
        }
        "list" => cmd_list(&args, store),
        "set-status" => cmd_set_status(&args, store),
        "history" => cmd_history(&args, store),
        "report" => cmd_report(&args, store),
        other => bail!("unknown command: {other}"),
    }
}

fn cmd_list(args: &[String], store: Rc<Store>) -> Result<()> {
    let repo = ComplaintRepository::new(store, RepoConfig::default(), Clock::System);
    let filters = ComplaintFilters {
        zone: flag_value(args, "--zone"),
        category: parse_category(args)?,
        status: parse_status_flag(args)?,
        since_days: flag_value(args, "--days")
            .map(|d| d.parse::<i64>().context("--days must be an integer"))
            .transpose()?,
        limit: flag_value(args, "--limit")
            .map(|l| l.parse::<u32>().context("--limit must be an integer"))
            .transpose()?,
    };

    let complaints = repo.list_filtered(&filters)?;
    println!("{} complaint(s)", complaints.len());
    for c in complaints {
        println!(
            "  #{:<5} {:<22} {:<10} {:<8} {}  {}",
            c.id,
            c.category,
            c.status,
            c.priority,
            c.created_at.format("%Y-%m-%d"),
            c.location_address,
        );
    }
    Ok(())
}

fn cmd_set_status(args: &[String], store: Rc<Store>) -> Result<()> {
    let repo = ComplaintRepository::new(store, RepoConfig::default(), Clock::System);
    let id = required_flag(args, "--id")?
        .parse::<i64>()
        .context("--id must be an integer")?;
    let status =
        parse_status_flag(args)?.context("--status is required (pendiente|en_proceso|resuelta)")?;
    let notes = flag_value(args, "--notes");
    let actor = flag_value(args, "--actor");

    let t = repo.transition_status(id, status, notes.as_deref(), actor.as_deref())?;
    println!(
        "complaint {}: {} -> {} by {} at {}",
        t.complaint_id, t.previous_status, t.new_status, t.responsible_actor, t.changed_at,
    );
    Ok(())
}

fn cmd_history(args: &[String], store: Rc<Store>) -> Result<()> {
    let repo = ComplaintRepository::new(store, RepoConfig::default(), Clock::System);
    let id = required_flag(args, "--id")?
        .parse::<i64>()
        .context("--id must be an integer")?;

    let history = repo.history(id)?;
    if history.is_empty() {
        println!("complaint {id}: no status changes recorded");
    }
    for entry in history {
        println!(
            "  {}  {} -> {}  ({}){}",
            entry.changed_at,
            entry.previous_status,
            entry.new_status,
            entry.responsible_actor,
            entry
                .notes
                .map(|n| format!("  \"{n}\""))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

fn cmd_report(args: &[String], store: Rc<Store>) -> Result<()> {
    let engine = ReportEngine::new(store);
    let range = DateRange::new(
        parse_date_flag(args, "--from")?,
        parse_date_flag(args, "--to")?,
    );
    log::debug!("report range: {range:?}");

    if args.iter().any(|a| a == "--json") {
        let report = serde_json::json!({
            "general": engine.general_statistics(range)?,
            "distribution": engine.status_distribution(range)?,
            "top_categories": engine.top_categories(5, range)?,
            "top_locations": engine.top_locations(5, range)?,
            "time_series": engine.time_series(range)?,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = engine.general_statistics(range)?;
    println!("total:               {}", stats.total);
    println!("  pendiente:         {}", stats.pending);
    println!("  en_proceso:        {}", stats.in_progress);
    println!("  resuelta:          {}", stats.resolved);
    println!("avg resolution days: {:.2}", stats.avg_resolution_days);
    println!("resolution rate:     {:.2}%", stats.resolution_rate);
    println!("complaints per day:  {:.2}", stats.avg_complaints_per_day);

    println!("\ntop categories:");
    for c in engine.top_categories(5, range)? {
        println!("  {:<22} {}", c.category, c.total);
    }
    println!("\ntop locations:");
    for l in engine.top_locations(5, range)? {
        println!("  {:<40} {}", l.location, l.total);
    }
    println!("\ndaily evolution:");
    for d in engine.time_series(range)? {
        println!("  {}  {}", d.day, d.total);
    }
    Ok(())
}

// ── Flag helpers ───────────────────────────────────────────────────

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn required_flag(args: &[String], flag: &str) -> Result<String> {
    flag_value(args, flag).with_context(|| format!("missing required flag {flag}"))
}

fn parse_category(args: &[String]) -> Result<Option<Category>> {
    flag_value(args, "--category")
        .map(|raw| Category::parse(&raw).with_context(|| format!("unknown category: {raw}")))
        .transpose()
}

fn parse_status_flag(args: &[String]) -> Result<Option<ComplaintStatus>> {
    flag_value(args, "--status")
        .map(|raw| ComplaintStatus::parse(&raw).with_context(|| format!("unknown status: {raw}")))
        .transpose()
}

fn parse_date_flag(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("{flag} must be YYYY-MM-DD, got {raw}"))
        })
        .transpose()
}
