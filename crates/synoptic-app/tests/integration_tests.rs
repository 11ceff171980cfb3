// Integration tests for Synoptic Edge.
//
// These exercise the shipped defaults and sample board through the public
// API: config loading, services over a shared data-access layer, edge
// evaluation, the parlay slip, and the advisor with a canned completion.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use synoptic_app::advisor::{Advisor, Verdict};
use synoptic_app::edge::evaluate_board;
use synoptic_app::parlay::ParlayBuilder;
use synoptic_app::services::props::load_props;
use synoptic_app::services::Services;
use synoptic_core::config::{ensure_config_files, load_config_from, Config};
use synoptic_core::{DataAccess, DataStatus, RetryPolicy};
use synoptic_llm::{Completion, CompletionRequest, CompletionService, LlmClient, LlmError};

// ===========================================================================
// Test helpers
// ===========================================================================

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Load the shipped `defaults/settings.toml` through the normal copy-then-load
/// path in a scratch directory, pointing the props feed at the sample board.
fn shipped_config(name: &str) -> Config {
    let base = std::env::temp_dir().join(format!("synoptic_it_{name}"));
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(base.join("defaults")).unwrap();
    fs::copy(
        workspace_root().join("defaults/settings.toml"),
        base.join("defaults/settings.toml"),
    )
    .unwrap();

    ensure_config_files(&base).unwrap();
    let mut config = load_config_from(&base).unwrap();
    config.data_paths.props = workspace_root()
        .join("data/props.csv")
        .display()
        .to_string();
    let _ = fs::remove_dir_all(&base);
    config
}

fn services(config: &Config) -> Services {
    let access = Arc::new(DataAccess::new(RetryPolicy::from_config(&config.data_access)));
    Services::with_access(config, access)
}

// ===========================================================================
// Shipped files
// ===========================================================================

#[test]
fn shipped_defaults_load_and_validate() {
    let config = shipped_config("defaults");
    assert_eq!(config.bankroll.amount, 1000.0);
    assert_eq!(config.bankroll.fractional_kelly, 0.25);
    assert_eq!(config.data_access.max_attempts, 3);
    assert_eq!(config.data_access.backoff_base_ms, 100);
    assert!(config.credentials.anthropic_api_key.is_none());
    assert!(!LlmClient::from_config(&config).is_active());
}

#[test]
fn sample_board_parses_with_unique_ids() {
    let props = load_props(&workspace_root().join("data/props.csv")).unwrap();
    assert_eq!(props.len(), 15);

    let mut ids: Vec<&str> = props.iter().map(|p| p.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), props.len());
}

// ===========================================================================
// Services -> edges -> slip
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn board_flows_into_edges_and_parlay() {
    let config = shipped_config("flow");
    let services = services(&config);

    let board = services.props.board().await;
    assert_eq!(board.status, DataStatus::Live);
    let props = board.data.unwrap();

    let edges = evaluate_board(&props, &config.bankroll);
    assert_eq!(edges.len(), props.len());
    assert!(edges.windows(2).all(|w| w[0].best_ev() >= w[1].best_ev()));
    assert!(edges[0].best_ev() > 0.0);
    let max_stake = config.bankroll.amount * 0.05;
    assert!(edges.iter().all(|e| e.kelly_stake >= 0.0 && e.kelly_stake <= max_stake));

    let mut slip = ParlayBuilder::new(config.parlay.max_legs, config.bankroll.amount).unwrap();
    let added = slip.fill_from_edges(&edges, 3);
    assert_eq!(added, 3);
    assert_eq!(slip.legs()[0].prop_id, edges[0].prop.id);

    let summary = slip.summary();
    assert_eq!(summary.legs, 3);
    assert!(summary.analysis.parlay_odds > 0.0);
    assert!(summary.analysis.expected_value > 0.0);
    assert!(summary.kelly_stake >= 0.0);

    // Second read comes from the cache.
    assert_eq!(services.props.board().await.status, DataStatus::Cached);
}

#[tokio::test(start_paused = true)]
async fn missing_board_is_unavailable_but_other_feeds_work() {
    let mut config = shipped_config("missing");
    config.data_paths.props = "/nonexistent/props.csv".to_string();
    let services = services(&config);

    let board = services.props.board().await;
    assert_eq!(board.status, DataStatus::Unavailable);
    assert!(board.data.is_none());
    assert!(board.error.unwrap().contains("after 3 attempts"));

    let leaderboard = services.leaderboard.weekly().await;
    assert_eq!(leaderboard.status, DataStatus::Live);
    let weather = services.weather.for_venue("KC").await;
    assert_eq!(weather.status, DataStatus::Live);
}

#[tokio::test(start_paused = true)]
async fn board_response_serialises_to_wire_shape() {
    let config = shipped_config("wire");
    let services = services(&config);

    let board = services.props.board().await;
    let edges = evaluate_board(board.data.as_deref().unwrap_or_default(), &config.bankroll);
    let json = serde_json::to_value(board.map(|_| edges)).unwrap();

    assert_eq!(json["status"], "live");
    assert!(json["lastUpdated"].is_string());
    assert!(json.get("error").is_none());
    assert!(json["data"][0]["prop"]["overOdds"].is_number());
    assert!(json["data"][0]["bestSide"].is_string());
}

// ===========================================================================
// Advisor
// ===========================================================================

struct ScriptedClient(&'static str);

#[async_trait]
impl CompletionService for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        assert!(request.user.contains("BEST SIDE"));
        Ok(Completion {
            text: self.0.to_string(),
            input_tokens: 120,
            output_tokens: 30,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn advisor_reviews_top_edge() {
    let config = shipped_config("advisor");
    let services = services(&config);

    let props = services.props.board().await.data.unwrap();
    let edges = evaluate_board(&props, &config.bankroll);
    let top = &edges[0];
    let weather = services.weather.for_venue(&top.prop.team).await.data;

    let advisor = Advisor::new(
        ScriptedClient(r#"Here is my take: {"verdict":"under","confidence":61,"summary":"Fade."}"#),
        config.llm.max_tokens,
    );
    let insight = advisor.analyze(top, weather.as_ref()).await.unwrap();
    assert_eq!(insight.verdict, Verdict::Under);
    assert_eq!(insight.confidence, 61);
    assert_eq!(insight.summary, "Fade.");
}

#[tokio::test]
async fn disabled_llm_reports_not_configured() {
    let config = shipped_config("disabled_llm");
    let props = load_props(Path::new(&config.data_paths.props)).unwrap();
    let edges = evaluate_board(&props, &config.bankroll);

    let advisor = Advisor::new(LlmClient::from_config(&config), config.llm.max_tokens);
    let err = advisor.analyze(&edges[0], None).await.unwrap_err();
    assert_eq!(err, LlmError::NotConfigured);
}
