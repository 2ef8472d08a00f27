use super::*;
use rand::Rng;
use std::time::Instant;

/// One entry in the responder's rule table. `triggers` are matched against
/// the lower-cased question; the first matching rule composes the reply
/// from the lower-cased scene text.
struct Rule {
    triggers: &'static [&'static str],
    respond: fn(&str) -> String,
}

/// Evaluated top to bottom, first match wins
const RULES: &[Rule] = &[
    Rule {
        triggers: &["color", "colour"],
        respond: color_reply,
    },
    Rule {
        triggers: &["how many", "count", "number"],
        respond: count_reply,
    },
    Rule {
        triggers: &["what is", "what's", "object", "animal", "person", "who"],
        respond: identity_reply,
    },
    Rule {
        triggers: &["where", "location", "position"],
        respond: location_reply,
    },
    Rule {
        triggers: &["size", "how big", "large", "small"],
        respond: size_reply,
    },
];

const COLOR_WORDS: &[&str] = &[
    "red", "orange", "yellow", "green", "blue", "purple", "pink", "brown", "black", "white",
    "gray", "grey",
];

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

const SUBJECT_WORDS: &[&str] = &[
    "dog", "cat", "bird", "horse", "fish", "person", "people", "man", "woman", "child", "car",
    "bus", "bicycle", "building", "house", "tree", "flower", "sign", "ball", "table", "chair",
];

const POSITION_WORDS: &[&str] = &[
    "left",
    "right",
    "center",
    "middle",
    "top",
    "bottom",
    "corner",
    "background",
    "foreground",
];

const SIZE_WORDS: &[&str] = &["huge", "large", "big", "small", "tiny"];

/// Filler sentences for questions no rule covers; picked pseudo-randomly
const GENERIC_REPLIES: &[&str] = &[
    "I can see details that might help answer your question.",
    "Let me look more carefully at that part of the image.",
    "Nothing about that stands out strongly in the image.",
    "That part of the image is hard to make out clearly.",
];

fn find_first<'a>(scene: &str, words: &[&'a str]) -> Option<&'a str> {
    words.iter().copied().find(|w| scene.contains(w))
}

fn color_reply(scene: &str) -> String {
    match find_first(scene, COLOR_WORDS) {
        Some(color) => format!("I can see a prominent {} color in the image.", color),
        None => "The colors are muted and hard to pin down.".to_string(),
    }
}

fn count_reply(scene: &str) -> String {
    let spelled = find_first(scene, NUMBER_WORDS).map(str::to_string);
    let numeral = scene
        .split(|ch: char| !ch.is_ascii_digit())
        .find(|s| !s.is_empty())
        .map(str::to_string);

    match spelled.or(numeral) {
        Some(n) => format!("I can count {} distinct objects in the scene.", n),
        None => "I can make out a small handful of distinct objects.".to_string(),
    }
}

fn identity_reply(scene: &str) -> String {
    match find_first(scene, SUBJECT_WORDS) {
        Some(subject) => format!("There's a {} visible in the image.", subject),
        None => "The main subject is hard to identify with confidence.".to_string(),
    }
}

fn location_reply(scene: &str) -> String {
    match find_first(scene, POSITION_WORDS) {
        Some(position) => format!("It sits toward the {} of the frame.", position),
        None => "It doesn't sit in any obviously distinct part of the frame.".to_string(),
    }
}

fn size_reply(scene: &str) -> String {
    match find_first(scene, SIZE_WORDS) {
        Some(size) => format!("It looks {} relative to the rest of the scene.", size),
        None => "Its size is unremarkable compared to its surroundings.".to_string(),
    }
}

/// Pick a reply for `question` by running the rule table against `scene`.
///
/// Matched rules are deterministic for identical inputs; only the generic
/// fallback draws at random.
pub fn compose_reply(question: &str, scene: &str) -> String {
    let question = question.to_lowercase();
    let scene = scene.to_lowercase();

    for rule in RULES {
        if rule.triggers.iter().any(|t| question.contains(t)) {
            return (rule.respond)(&scene);
        }
    }

    let mut rng = rand::rng();
    GENERIC_REPLIES[rng.random_range(0..GENERIC_REPLIES.len())].to_string()
}

/// The baseline provider: no model anywhere, just the rule table.
pub struct CannedProvider;

impl CannedProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CannedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyProvider for CannedProvider {
    async fn reply(&self, request: ReplyRequest) -> ResponderResult<ReplyResponse> {
        let start = Instant::now();
        let text = compose_reply(&request.question, &request.scene);

        Ok(ReplyResponse {
            text,
            metadata: ReplyMetadata {
                provider: "canned".to_string(),
                latency_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_question_reports_color_from_scene() {
        let reply = compose_reply("What color is it?", "A red ball on green grass");
        assert!(reply.contains("red"));
    }

    #[test]
    fn color_question_without_scene_color_is_deterministic() {
        let scene = "A ball on the grass at dusk";
        let reply = compose_reply("what colour is the ball?", scene);
        assert_eq!(reply, "The colors are muted and hard to pin down.");
        assert_eq!(reply, compose_reply("what colour is the ball?", scene));
    }

    #[test]
    fn count_question_picks_up_spelled_numbers() {
        let reply = compose_reply("How many people are there?", "Three people on a bench");
        assert!(reply.contains("three"));
    }

    #[test]
    fn count_question_picks_up_numerals() {
        let reply = compose_reply("count the cars", "A parking lot with 4 cars");
        assert!(reply.contains('4'));
    }

    #[test]
    fn identity_question_names_the_subject() {
        let reply = compose_reply("What animal is this?", "A dog running in a park");
        assert!(reply.contains("dog"));
    }

    #[test]
    fn location_question_uses_position_words() {
        let reply = compose_reply("Where is it?", "A sign in the top left corner");
        assert!(reply.contains("left") || reply.contains("top"));
    }

    #[test]
    fn size_question_uses_size_words() {
        let reply = compose_reply("How big is it?", "A tiny bird on a wire");
        assert!(reply.contains("tiny"));
    }

    #[test]
    fn earlier_rules_win_when_several_trigger() {
        // Question mentions both color and count; color is checked first
        let reply = compose_reply(
            "What color are they and how many are there?",
            "Two blue chairs",
        );
        assert!(reply.contains("blue"));
        assert!(!reply.contains("count"));
    }

    #[test]
    fn unmatched_question_falls_back_to_generic_filler() {
        let reply = compose_reply("Tell me a story about it.", "A red ball");
        assert!(GENERIC_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn provider_wraps_the_rule_table() {
        let provider = CannedProvider::new();
        let response = provider
            .reply(ReplyRequest {
                question: "what color is it?".to_string(),
                challenge_id: "1".to_string(),
                scene: "a red ball".to_string(),
            })
            .await
            .unwrap();

        assert!(response.text.contains("red"));
        assert_eq!(response.metadata.provider, "canned");
    }
}
