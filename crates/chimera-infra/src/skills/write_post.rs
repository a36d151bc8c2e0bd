//! `skill_write_post_v1`: drafts short social posts about a topic.
//!
//! Output is deterministic for a given input: variants come from a fixed
//! template set chosen by tone, and each text is trimmed to the target
//! platform's length limit.

use chimera_core::handler::SkillHandler;
use chimera_types::Payload;
use chimera_types::error::HandlerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SKILL_ID: &str = "skill_write_post_v1";

pub const MAX_VARIANTS: u64 = 5;

const SUPPORTED_PLATFORMS: [&str; 5] = ["x", "linkedin", "instagram", "threads", "facebook"];

const PROFESSIONAL: [&str; 5] = [
    "{topic}: here is what matters right now.",
    "Three lessons from working on {topic} this quarter.",
    "{topic} is moving faster than most teams expect. A short summary of where it stands.",
    "If you are planning around {topic}, start with the fundamentals.",
    "Our take on {topic}, and what we are watching next.",
];

const CASUAL: [&str; 5] = [
    "Been thinking about {topic} all week.",
    "Hot take: {topic} is underrated.",
    "Quick thread on {topic}, because why not.",
    "Anyone else deep into {topic} lately?",
    "{topic}. That's the post.",
];

#[derive(Debug, Deserialize)]
struct WritePostInput {
    topic: String,
    platform: String,
    #[serde(default)]
    tone: Option<String>,
    #[serde(default)]
    variants: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PostItem {
    text: String,
    platform: String,
    char_count: usize,
}

/// Character limit of a post on `platform`.
pub fn platform_limit(platform: &str) -> usize {
    match platform {
        "x" => 280,
        "linkedin" => 3000,
        _ => 2200,
    }
}

fn templates_for(tone: Option<&str>) -> &'static [&'static str; 5] {
    match tone.map(str::to_ascii_lowercase).as_deref() {
        Some("casual") | Some("playful") => &CASUAL,
        _ => &PROFESSIONAL,
    }
}

fn truncate_to(text: String, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text;
    }
    let mut trimmed: String = text.chars().take(limit.saturating_sub(1)).collect();
    trimmed.push('…');
    trimmed
}

/// Draft posts for the given input.
pub fn write_posts(input: &Payload) -> Result<Payload, HandlerError> {
    let input: WritePostInput = serde_json::from_value(Value::Object(input.clone()))
        .map_err(|e| HandlerError::new(format!("invalid write_post input: {e}")))?;

    let topic = input.topic.trim();
    if topic.is_empty() {
        return Err(HandlerError::with_code("EMPTY_TOPIC", "topic must not be empty"));
    }

    let platform = input.platform.trim().to_ascii_lowercase();
    if !SUPPORTED_PLATFORMS.contains(&platform.as_str()) {
        let mut details = Payload::new();
        details.insert("platform".into(), Value::String(input.platform.clone()));
        details.insert(
            "supported".into(),
            Value::from(SUPPORTED_PLATFORMS.to_vec()),
        );
        return Err(HandlerError::with_code(
            "UNSUPPORTED_PLATFORM",
            format!("platform '{}' is not supported", input.platform),
        )
        .with_details(details));
    }

    let variants = input.variants.unwrap_or(1.0).clamp(1.0, MAX_VARIANTS as f64) as usize;
    let limit = platform_limit(&platform);
    let templates = templates_for(input.tone.as_deref());

    let items: Vec<PostItem> = templates
        .iter()
        .take(variants)
        .map(|template| {
            let text = truncate_to(template.replace("{topic}", topic), limit);
            PostItem {
                char_count: text.chars().count(),
                text,
                platform: platform.clone(),
            }
        })
        .collect();

    let mut output = Payload::new();
    output.insert(
        "items".into(),
        serde_json::to_value(items).map_err(|e| HandlerError::new(e.to_string()))?,
    );
    Ok(output)
}

/// Handler for [`SKILL_ID`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WritePostHandler;

impl SkillHandler for WritePostHandler {
    async fn handle(&self, input: &Payload) -> Result<Payload, HandlerError> {
        write_posts(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn default_is_one_variant() {
        let output = write_posts(&input(json!({"topic": "Rust", "platform": "x"}))).unwrap();
        let items = output["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0]["text"].as_str().unwrap().contains("Rust"));
        assert_eq!(items[0]["platform"], json!("x"));
    }

    #[test]
    fn variants_are_clamped() {
        let many = write_posts(&input(json!({"topic": "Rust", "platform": "x", "variants": 50}))).unwrap();
        assert_eq!(many["items"].as_array().unwrap().len(), 5);

        let none = write_posts(&input(json!({"topic": "Rust", "platform": "x", "variants": 0}))).unwrap();
        assert_eq!(none["items"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn text_fits_platform_limit() {
        let topic = "a".repeat(400);
        let output = write_posts(&input(json!({"topic": topic, "platform": "X", "variants": 2}))).unwrap();
        for item in output["items"].as_array().unwrap() {
            let text = item["text"].as_str().unwrap();
            assert_eq!(text.chars().count(), 280);
            assert!(text.ends_with('…'));
            assert_eq!(item["char_count"], json!(280));
        }
    }

    #[test]
    fn tone_selects_templates() {
        let casual = write_posts(&input(json!({"topic": "Rust", "platform": "threads", "tone": "Casual"}))).unwrap();
        let formal = write_posts(&input(json!({"topic": "Rust", "platform": "threads"}))).unwrap();
        assert_ne!(casual["items"][0]["text"], formal["items"][0]["text"]);
    }

    #[test]
    fn unsupported_platform_is_coded() {
        let err = write_posts(&input(json!({"topic": "Rust", "platform": "myspace"}))).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("UNSUPPORTED_PLATFORM"));
        assert_eq!(err.details.unwrap()["platform"], json!("myspace"));
    }

    #[test]
    fn blank_topic_is_coded() {
        let err = write_posts(&input(json!({"topic": "   ", "platform": "x"}))).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("EMPTY_TOPIC"));
    }

    #[test]
    fn malformed_input_is_uncoded() {
        let err = write_posts(&input(json!({"platform": "x"}))).unwrap_err();
        assert!(err.code.is_none());
    }

    #[test]
    fn output_is_deterministic() {
        let request = input(json!({"topic": "Rust", "platform": "linkedin", "variants": 3}));
        assert_eq!(write_posts(&request).unwrap(), write_posts(&request).unwrap());
    }
}
