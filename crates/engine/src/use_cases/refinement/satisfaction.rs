//! Satisfaction inferred from the refinement conversation.

use branchwright_domain::common::clamp_score;
use branchwright_domain::RefinementConversation;

const CONFIRMATION_WEIGHT: f64 = 0.4;
const NO_PENDING_WEIGHT: f64 = 0.25;
const MATURITY_WEIGHT: f64 = 0.15;
const SENTIMENT_WEIGHT: f64 = 0.2;

/// Iterations after which a session counts as mature.
const MATURE_ITERATIONS: u32 = 3;
/// User messages considered for sentiment.
const SENTIMENT_WINDOW: usize = 3;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "perfect", "better", "excellent", "nice", "like", "yes", "works",
    "happy", "done", "thanks", "beautiful",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "hate", "wrong", "boring", "confusing", "weak", "flat", "dull", "no", "not",
    "dislike", "meh",
];

/// Weighted blend of explicit confirmation, zero pending instructions,
/// session maturity and lexical sentiment of recent user messages.
pub fn inferred_satisfaction(conversation: &RefinementConversation) -> f64 {
    let confirmation = flag(conversation.last_user_message_confirms());
    let no_pending = flag(conversation.pending_instructions().is_empty());
    let mature = flag(conversation.iteration() >= MATURE_ITERATIONS);
    let texts: Vec<&str> = conversation
        .recent_user_messages(SENTIMENT_WINDOW)
        .into_iter()
        .map(|m| m.content.as_str())
        .collect();
    let sentiment = lexical_sentiment(&texts);

    clamp_score(
        CONFIRMATION_WEIGHT * confirmation
            + NO_PENDING_WEIGHT * no_pending
            + MATURITY_WEIGHT * mature
            + SENTIMENT_WEIGHT * sentiment,
    )
}

/// Sentiment in `[0, 1]`; 0.5 when no signal words appear.
pub fn lexical_sentiment(texts: &[&str]) -> f64 {
    let (positive, negative) = texts
        .iter()
        .flat_map(|t| t.split(|c: char| !c.is_alphabetic()))
        .map(str::to_lowercase)
        .fold((0usize, 0usize), |(pos, neg), word| {
            if POSITIVE_WORDS.contains(&word.as_str()) {
                (pos + 1, neg)
            } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                (pos, neg + 1)
            } else {
                (pos, neg)
            }
        });
    let hits = positive + negative;
    if hits == 0 {
        return 0.5;
    }
    let polarity = (positive as f64 - negative as f64) / hits as f64;
    clamp_score((polarity + 1.0) / 2.0)
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
