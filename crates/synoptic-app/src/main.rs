// Synoptic Edge entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the report)
// 2. Load config
// 3. Build services over one shared data-access layer
// 4. Fetch the prop board and evaluate edges
// 5. Weather for the top edges' venues, then the leaderboard
// 6. Suggested parlay from the best positive-EV legs
// 7. AI insight for the top edge, when an API key is configured
//
// `--json` prints the evaluated board as a service response instead.

use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use tracing::{info, warn};

use synoptic_app::advisor::Advisor;
use synoptic_app::edge::{evaluate_board, PropEdge};
use synoptic_app::parlay::ParlayBuilder;
use synoptic_app::services::{Services, Weather};
use synoptic_core::{config, DataStatus, ServiceResponse};
use synoptic_llm::LlmClient;

const TOP_EDGES: usize = 5;
const SUGGESTED_LEGS: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Synoptic Edge starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: bankroll ${}, {}x Kelly, {} attempts",
        config.bankroll.amount, config.bankroll.fractional_kelly, config.data_access.max_attempts
    );

    let services = Services::from_config(&config);

    let board = services.props.board().await;
    let props = board.data.clone().unwrap_or_default();
    let edges = evaluate_board(&props, &config.bankroll);
    info!("Evaluated {} props", edges.len());

    if std::env::args().any(|a| a == "--json") {
        let response = board.map(|_| edges);
        let json = serde_json::to_string_pretty(&response).context("failed to serialize board")?;
        println!("{json}");
        return Ok(());
    }

    println!("SYNOPTIC EDGE");
    println!("Props board: {}", freshness(&board));
    print_edges(&edges);

    // Weather for each distinct home venue among the top edges.
    let mut weather: HashMap<String, Weather> = HashMap::new();
    println!("\nWeather");
    for edge in edges.iter().take(TOP_EDGES) {
        let venue = edge.prop.team.as_str();
        if venue.is_empty() || weather.contains_key(venue) {
            continue;
        }
        let resp = services.weather.for_venue(venue).await;
        match &resp.data {
            Some(w) => {
                println!(
                    "  {:<4} {:<32} {:>3.0}F wind {:>2.0} mph precip {:>2.0}%  impact {:<11} [{}]",
                    w.venue,
                    w.stadium,
                    w.temperature_f,
                    w.wind_mph,
                    w.precipitation_pct,
                    w.impact,
                    freshness(&resp)
                );
                weather.insert(venue.to_string(), w.clone());
            }
            None => println!("  {:<4} {}", venue, freshness(&resp)),
        }
    }

    let leaderboard = services.leaderboard.weekly().await;
    println!("\nWeekly leaderboard: {}", freshness(&leaderboard));
    for entry in leaderboard.data.iter().flatten() {
        println!(
            "  {:>2}. {:<18} {:>2}-{:<2} {:>+6.1}u  ROI {:>+6.1}%  streak {}",
            entry.rank, entry.handle, entry.wins, entry.losses, entry.units_won, entry.roi, entry.streak
        );
    }

    let mut slip = ParlayBuilder::new(config.parlay.max_legs, config.bankroll.amount)
        .context("invalid parlay settings")?;
    slip.fill_from_edges(&edges, SUGGESTED_LEGS);
    println!("\nSuggested parlay");
    if slip.is_empty() {
        println!("  No positive-EV legs on the board.");
    } else {
        for (i, leg) in slip.legs().iter().enumerate() {
            println!("  {}. {} ({:+.0})", i + 1, leg.label, leg.leg.market_odds);
        }
        let summary = slip.summary();
        println!(
            "  Odds {:+.0}  hit {:.1}%  EV {:+.1}%  vs fair {:+.1}%  confidence {:.0}  risk {}",
            summary.analysis.parlay_odds,
            summary.analysis.combined_probability * 100.0,
            summary.analysis.expected_value,
            summary.vig_expected_value,
            summary.confidence,
            summary.analysis.risk_level
        );
        println!(
            "  Stake ${:.2}  ({}; up to {} legs of this quality)",
            summary.kelly_stake,
            if summary.analysis.should_bet { "bet" } else { "pass" },
            summary.analysis.recommended_max_legs
        );
    }

    let llm = LlmClient::from_config(&config);
    match (llm.is_active(), edges.first()) {
        (true, Some(top)) => {
            info!("LLM client initialized (API key configured)");
            let advisor = Advisor::new(llm, config.llm.max_tokens);
            println!("\nAI insight: {} {}", top.prop.player, top.prop.market);
            match advisor.analyze(top, weather.get(&top.prop.team)).await {
                Ok(insight) => println!(
                    "  {} ({}% confidence) {}",
                    insight.verdict, insight.confidence, insight.summary
                ),
                Err(e) => {
                    warn!("AI insight failed: {}", e);
                    println!("  unavailable: {e}");
                }
            }
        }
        (false, _) => info!("LLM client disabled (no API key)"),
        (true, None) => {}
    }

    info!("Synoptic Edge finished");
    Ok(())
}

fn print_edges(edges: &[PropEdge]) {
    if edges.is_empty() {
        println!("  No props available.");
        return;
    }
    println!("\nTop edges");
    for edge in edges.iter().take(TOP_EDGES) {
        let best = edge.best();
        let fair = best
            .fair_probability
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:<20} {:<16} {:<5} {:>6.1} ({:+.0})  model {:>5.1}%  fair {:>6}  EV {:>+6.1}%  stake ${:.2}",
            edge.prop.player,
            edge.prop.market,
            edge.best_side.to_string(),
            edge.prop.line,
            best.market_odds,
            best.model_probability * 100.0,
            fair,
            best.ev,
            edge.kelly_stake
        );
    }
}

fn freshness<T>(resp: &ServiceResponse<T>) -> String {
    let when = |at: &DateTime<Utc>| at.with_timezone(&Local).format("%H:%M:%S").to_string();
    match (resp.status, &resp.last_updated, &resp.error) {
        (DataStatus::Unavailable, _, Some(e)) => format!("unavailable ({e})"),
        (DataStatus::Stale, Some(at), _) => format!("stale, last good data {}", when(at)),
        (status, Some(at), _) => format!("{status} {}", when(at)),
        (status, None, _) => status.to_string(),
    }
}

/// Initialize tracing to log to a file; stdout is reserved for the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("synoptic.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("synoptic=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
