use super::contains_any;

/// Self-harm and suicide phrases that short-circuit the pipeline.
pub const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "better off dead",
    "no reason to live",
    "self harm",
    "self-harm",
    "hurt myself",
    "cut myself",
    "overdose",
];

pub fn is_crisis(text: &str) -> bool {
    contains_any(text, CRISIS_KEYWORDS)
}
