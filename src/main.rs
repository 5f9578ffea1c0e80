use std::sync::Arc;

use tracing::info;

use tally::config::Config;
use tally::dates;
use tally::planner::{InMemorySource, NewSession, PlanError, SessionPlanner, Snapshot};

const USAGE: &str = "usage:
  tally board <snapshot.json>
  tally check <snapshot.json> <product_id> <start YYYY-MM-DD> <end YYYY-MM-DD>
  tally suggest <snapshot.json> <product_id>
  tally create <snapshot.json> <actor email> <product_id> <start YYYY-MM-DD> <end YYYY-MM-DD> [title]";

fn load_snapshot(path: &str) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn parse_date_arg(raw: &str) -> Result<tally::model::CalendarDate, String> {
    dates::try_parse_local_date(raw).ok_or_else(|| format!("invalid date: {raw}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the JSON result; logs go to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Arc::new(Config::from_env());
    info!("session length: {} days", config.session_length_days);
    info!("fallback admins: {}", config.fallback_admins.len());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = args.split_first().ok_or(USAGE)?;
    let snapshot_path = rest.first().ok_or(USAGE)?;
    let snapshot = load_snapshot(snapshot_path)?;
    info!(
        "loaded {} products, {} sessions from {snapshot_path}",
        snapshot.products.len(),
        snapshot.sessions.len()
    );

    let source = Arc::new(InMemorySource::from_snapshot(snapshot));
    let planner = SessionPlanner::new(source, config);
    let today = dates::today();

    let output = match (command.as_str(), &rest[1..]) {
        ("board", []) => serde_json::to_value(planner.board().await?)?,
        ("check", [product_id, start, end]) => {
            let start = parse_date_arg(start)?;
            let end = parse_date_arg(end)?;
            match planner.check_candidate(product_id, start, end, today).await {
                Ok(window) => serde_json::json!({ "ok": true, "window": window }),
                Err(PlanError::Conflict(conflict)) => serde_json::json!({
                    "ok": false,
                    "kind": conflict.kind,
                    "conflicting": conflict.conflicting,
                    "message": conflict.to_string(),
                }),
                Err(e) => return Err(e.into()),
            }
        }
        ("suggest", [product_id]) => {
            serde_json::to_value(planner.suggest_window(product_id, today).await?)?
        }
        ("create", [actor, product_id, start, end, title @ ..]) if title.len() <= 1 => {
            let new = NewSession {
                product_id: product_id.clone(),
                title: title.first().cloned(),
                start_date: parse_date_arg(start)?,
                end_date: parse_date_arg(end)?,
            };
            let created = planner.create_session_as(actor, new, today).await?;
            let updated = serde_json::to_string_pretty(&planner.source().snapshot())?;
            std::fs::write(snapshot_path, updated)?;
            info!("wrote {snapshot_path}");
            serde_json::to_value(created)?
        }
        _ => return Err(USAGE.into()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
