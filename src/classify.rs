use crate::models::Signal;

/// Fixed dimension keyword table. The lists are matched as lowercase
/// substrings and must stay stable so reports remain comparable run to run.
pub static DIMENSION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "warmth",
        &["warm", "kind", "friendly", "cold", "harsh", "nice", "gentle", "caring"],
    ),
    (
        "distance",
        &["formal", "casual", "stiff", "relaxed", "professional", "chill", "friendly"],
    ),
    (
        "proactivity",
        &["initiative", "proactive", "autonomous", "anticipat", "just do it", "don't ask"],
    ),
    (
        "humor",
        &["funny", "humor", "laugh", "joke", "lol", "haha", "witty", "amusing"],
    ),
    (
        "caution",
        &["careful", "cautious", "bold", "risk", "safe", "trust", "autonomous"],
    ),
    (
        "verbosity",
        &["short", "brief", "long", "verbose", "concise", "too much", "less", "more detail", "bullet"],
    ),
];

/// Map a signal to the dimensions its text touches. Substring containment
/// only, no word boundaries; a signal can match any number of dimensions.
pub fn classify(signal: &Signal) -> Vec<&'static str> {
    let text = format!("{} {}", signal.summary, signal.context).to_lowercase();

    DIMENSION_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(dim, _)| *dim)
        .collect()
}
