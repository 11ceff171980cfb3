// AI advisor: a second opinion on a single prop edge.
//
// The prompt carries every number already computed (line, projection,
// probabilities, EV, stake, weather) so the model comments on context rather
// than doing arithmetic. The reply is asked for as a small JSON object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use synoptic_llm::{CompletionRequest, CompletionService, LlmError};
use tracing::{info, warn};

use crate::edge::PropEdge;
use crate::services::Weather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Over,
    Under,
    Pass,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Verdict::Over => "OVER",
            Verdict::Under => "UNDER",
            Verdict::Pass => "PASS",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsight {
    pub verdict: Verdict,
    /// 0-100.
    pub confidence: u8,
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn system_prompt() -> String {
    "You are a disciplined NFL player-prop analyst.\n\
     \n\
     All probabilities, expected values and stakes you receive are already computed \
     from a normal model of the player's projection. Do not recompute them.\n\
     Weigh matchup, usage and weather context against the numbers and decide whether \
     the bet is worth making.\n\
     \n\
     Reply with a single JSON object and nothing else:\n\
     {\"verdict\": \"over\" | \"under\" | \"pass\", \"confidence\": 0-100, \"summary\": \"<two sentences>\"}"
        .to_string()
}

pub fn build_prop_prompt(edge: &PropEdge, weather: Option<&Weather>) -> String {
    let prop = &edge.prop;
    let mut out = String::new();

    out.push_str(&format!(
        "PROP: {} ({} vs {}) {} line {}\n",
        prop.player, prop.team, prop.opponent, prop.market, prop.line
    ));
    out.push_str(&format!(
        "MODEL: projection {:.1}, std dev {:.1}\n",
        prop.projection, prop.std_dev
    ));

    for side in [&edge.over, &edge.under] {
        let fair = side
            .fair_probability
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!(
            "{}: odds {:+.0}, model {:.1}%, vig-free market {}, EV {:+.1}%\n",
            side.side,
            side.market_odds,
            side.model_probability * 100.0,
            fair,
            side.ev
        ));
    }

    out.push_str(&format!(
        "BEST SIDE: {} with fractional-Kelly stake ${:.2}\n",
        edge.best_side, edge.kelly_stake
    ));

    match weather {
        Some(w) if w.dome => out.push_str(&format!("WEATHER: {} (dome), impact none\n", w.stadium)),
        Some(w) => out.push_str(&format!(
            "WEATHER: {} {:.0}F, wind {:.0} mph, precipitation {:.0}%, impact {}\n",
            w.stadium, w.temperature_f, w.wind_mph, w.precipitation_pct, w.impact
        )),
        None => out.push_str("WEATHER: unavailable\n"),
    }

    out.push_str("\nGive your verdict.");
    out
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

/// Parse the first JSON object in `text` as an insight; whatever follows it
/// is ignored. Anything the model gets wrong degrades to a `Pass` carrying
/// the raw reply.
pub fn parse_insight(text: &str) -> AiInsight {
    match extract_insight(text) {
        Some(insight) => insight,
        None => {
            warn!("unparsable advisor reply; falling back to pass");
            AiInsight {
                verdict: Verdict::Pass,
                confidence: 0,
                summary: text.trim().to_string(),
            }
        }
    }
}

fn extract_insight(text: &str) -> Option<AiInsight> {
    let start = text.find('{')?;
    let v = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<Value>()
        .next()?
        .ok()?;

    let verdict = match v.get("verdict")?.as_str()?.trim().to_ascii_lowercase().as_str() {
        "over" => Verdict::Over,
        "under" => Verdict::Under,
        "pass" => Verdict::Pass,
        _ => return None,
    };
    let confidence = v
        .get("confidence")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);
    let summary = v
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(AiInsight {
        verdict,
        confidence,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Advisor
// ---------------------------------------------------------------------------

pub struct Advisor<C> {
    client: C,
    max_tokens: u32,
}

impl<C: CompletionService> Advisor<C> {
    pub fn new(client: C, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    pub async fn analyze(
        &self,
        edge: &PropEdge,
        weather: Option<&Weather>,
    ) -> Result<AiInsight, LlmError> {
        let request = CompletionRequest {
            system: system_prompt(),
            user: build_prop_prompt(edge, weather),
            max_tokens: self.max_tokens,
        };
        let completion = self.client.complete(&request).await?;
        info!(
            prop_id = %edge.prop.id,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "advisor reply received"
        );
        Ok(parse_insight(&completion.text))
    }
}
