//! `skill_trend_scan_v1`: reports trending topics per platform.
//!
//! Topics come from a fixed in-process catalog so results are reproducible.
//! [`fetch_trends`] runs the skill against the bundled contract without a
//! skills directory, returning the same stamped output as a dispatched call.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use chimera_core::contract::{ContractDocument, ContractRegistry};
use chimera_core::dispatch::Dispatcher;
use chimera_core::handler::{HandlerRegistry, SkillHandler};
use chimera_types::Payload;
use chimera_types::error::HandlerError;
use chimera_types::error_contract::{ErrorCode, ErrorContract};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SKILL_ID: &str = "skill_trend_scan_v1";

pub const DEFAULT_MAX_RESULTS: usize = 5;
const MAX_RESULTS_CAP: usize = 25;

struct CatalogEntry {
    platform: &'static str,
    topic: &'static str,
    confidence: f64,
    sources: &'static [(&'static str, &'static str)],
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        platform: "web",
        topic: "WebAssembly components",
        confidence: 0.82,
        sources: &[
            ("Component model status", "https://example.com/web/wasm-components"),
            ("WASI preview 2 in practice", "https://example.com/web/wasi-p2"),
        ],
    },
    CatalogEntry {
        platform: "web",
        topic: "Edge databases",
        confidence: 0.64,
        sources: &[("Edge data, one year later", "https://example.com/web/edge-db")],
    },
    CatalogEntry {
        platform: "web",
        topic: "Passkeys",
        confidence: 0.57,
        sources: &[("Passkey adoption report", "https://example.com/web/passkeys")],
    },
    CatalogEntry {
        platform: "news",
        topic: "AI regulation",
        confidence: 0.91,
        sources: &[
            ("Parliament passes AI act amendments", "https://example.com/news/ai-act"),
            ("What the new rules mean for startups", "https://example.com/news/ai-startups"),
        ],
    },
    CatalogEntry {
        platform: "news",
        topic: "Chip supply",
        confidence: 0.73,
        sources: &[("Foundry capacity outlook", "https://example.com/news/foundry")],
    },
    CatalogEntry {
        platform: "news",
        topic: "Open source funding",
        confidence: 0.48,
        sources: &[("Maintainers and money", "https://example.com/news/oss-funding")],
    },
    CatalogEntry {
        platform: "social",
        topic: "Rust in the kernel",
        confidence: 0.87,
        sources: &[
            ("Thread: first Rust drivers merged", "https://example.com/social/rust-kernel"),
            ("Poll: would you write drivers in Rust?", "https://example.com/social/rust-poll"),
        ],
    },
    CatalogEntry {
        platform: "social",
        topic: "Local-first apps",
        confidence: 0.69,
        sources: &[("Why sync engines are back", "https://example.com/social/local-first")],
    },
    CatalogEntry {
        platform: "social",
        topic: "Terminal UIs",
        confidence: 0.52,
        sources: &[("Show and tell: TUI dashboards", "https://example.com/social/tui")],
    },
];

#[derive(Debug, Deserialize)]
struct TrendScanInput {
    #[serde(default)]
    platforms: Vec<String>,
    #[serde(default)]
    max_results: Option<f64>,
}

/// One source backing a trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSource {
    pub title: String,
    pub url: String,
}

/// A trending topic with a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendTopic {
    pub topic: String,
    pub confidence: f64,
    pub platform: String,
    pub sources: Vec<TrendSource>,
}

/// Platforms the catalog knows about, sorted.
pub fn supported_platforms() -> Vec<&'static str> {
    let set: BTreeSet<&str> = CATALOG.iter().map(|e| e.platform).collect();
    set.into_iter().collect()
}

/// Scan the catalog for `platforms`, most confident first.
pub fn scan(platforms: &[String], max_results: usize) -> Result<Vec<TrendTopic>, HandlerError> {
    let requested: BTreeSet<String> = platforms
        .iter()
        .map(|p| p.trim().to_ascii_lowercase())
        .filter(|p| !p.is_empty())
        .collect();
    if requested.is_empty() {
        return Err(HandlerError::with_code(
            "NO_PLATFORMS",
            "at least one platform is required",
        ));
    }

    let supported = supported_platforms();
    if let Some(unknown) = requested.iter().find(|p| !supported.contains(&p.as_str())) {
        let mut details = Payload::new();
        details.insert("platform".into(), Value::String(unknown.clone()));
        details.insert("supported".into(), Value::from(supported.clone()));
        return Err(HandlerError::with_code(
            "UNSUPPORTED_PLATFORM",
            format!("platform '{unknown}' is not supported"),
        )
        .with_details(details));
    }

    let mut topics: Vec<TrendTopic> = CATALOG
        .iter()
        .filter(|entry| requested.contains(entry.platform))
        .map(|entry| TrendTopic {
            topic: entry.topic.to_owned(),
            confidence: entry.confidence,
            platform: entry.platform.to_owned(),
            sources: entry
                .sources
                .iter()
                .map(|(title, url)| TrendSource {
                    title: (*title).to_owned(),
                    url: (*url).to_owned(),
                })
                .collect(),
        })
        .collect();

    topics.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    topics.truncate(max_results);
    Ok(topics)
}

const BUNDLED_CONTRACT: &str = include_str!("../../../../skills/skill_trend_scan_v1/contract.json");

static STANDALONE: LazyLock<Result<Dispatcher, String>> = LazyLock::new(standalone_dispatcher);

fn standalone_dispatcher() -> Result<Dispatcher, String> {
    let document: Value = serde_json::from_str(BUNDLED_CONTRACT).map_err(|e| e.to_string())?;
    let contracts = ContractRegistry::load([ContractDocument::new(
        "skill_trend_scan_v1/contract.json",
        document,
    )])
    .map_err(|e| e.to_string())?;

    let mut handlers = HandlerRegistry::new();
    handlers.register(SKILL_ID, TrendScanHandler);
    Ok(Dispatcher::new(Arc::new(contracts), Arc::new(handlers)))
}

/// Run a trend scan directly.
///
/// The input is checked against the bundled `skill_trend_scan_v1` contract
/// and the output carries its `spec_version` and `contract_version`, exactly
/// as [`Dispatcher::invoke`] would return them.
pub async fn fetch_trends(input: &Payload) -> Result<Payload, ErrorContract> {
    match &*STANDALONE {
        Ok(dispatcher) => dispatcher.invoke(SKILL_ID, input).await,
        Err(e) => Err(ErrorContract::new(
            ErrorCode::InternalError,
            format!("bundled trend_scan contract failed to load: {e}"),
            None,
            false,
            None,
        )),
    }
}

/// The unstamped `{ "topics": [...] }` output for a raw input object.
fn scan_input(input: &Payload) -> Result<Payload, HandlerError> {
    let input: TrendScanInput = serde_json::from_value(Value::Object(input.clone()))
        .map_err(|e| HandlerError::new(format!("invalid trend_scan input: {e}")))?;
    let max_results = input
        .max_results
        .map_or(DEFAULT_MAX_RESULTS as f64, f64::trunc)
        .clamp(1.0, MAX_RESULTS_CAP as f64) as usize;

    let topics = scan(&input.platforms, max_results)?;
    tracing::debug!(count = topics.len(), "Trend scan finished");

    let mut output = Payload::new();
    output.insert(
        "topics".into(),
        serde_json::to_value(topics).map_err(|e| HandlerError::new(e.to_string()))?,
    );
    Ok(output)
}

/// Handler for [`SKILL_ID`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendScanHandler;

impl SkillHandler for TrendScanHandler {
    async fn handle(&self, input: &Payload) -> Result<Payload, HandlerError> {
        scan_input(input)
    }
}
