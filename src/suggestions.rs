//! Canned suggestion prompts
//!
//! Each label is sent to the agent verbatim when clicked.

/// Columns in the suggestion grid
pub const GRID_COLUMNS: usize = 3;

pub const SUGGESTIONS: [&str; 12] = [
    "😴 Sleep",
    "🗣️ Social anxiety",
    "📱 Digital habits",
    "💓 Stress",
    "🧠 ADHD focus",
    "🔉 Inner critic",
    "⚡ Burnout",
    "😰 Worrying",
    "🧘 Meditation",
    "🫁 Breathing",
    "❓ Normal anxiety",
    "🛟 Grounding",
];

pub fn is_suggestion(label: &str) -> bool {
    SUGGESTIONS.contains(&label)
}

/// Suggestions laid out row by row
pub fn grid() -> Vec<Vec<&'static str>> {
    SUGGESTIONS
        .chunks(GRID_COLUMNS)
        .map(<[&str]>::to_vec)
        .collect()
}
