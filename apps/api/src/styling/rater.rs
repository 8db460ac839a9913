//! Outfit Rater: scores a photographed outfit against a theme and occasion.
//!
//! A static decision table: each recognised theme has an occasion group it
//! suits and a softer branch for every other occasion. Unknown themes get a
//! flat default. Nothing here is computed from the photo itself.

use serde::{Deserialize, Serialize};

/// Full critique returned to the caller and kept in rating history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub overall_score: u32, // 0 – 100
    pub theme_appropriateness: u32,
    pub occasion_suitability: u32,
    pub style_cohesion: u32,
    pub color_coordination: u32,
    pub accessories: u32,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub star_rating: u32, // 1 – 5
}

struct Scores {
    overall: u32,
    theme: u32,
    occasion: u32,
    cohesion: u32,
    color: u32,
    accessories: u32,
}

/// One row of the decision table.
struct Verdict {
    scores: Scores,
    feedback: &'static str,
    strengths: &'static [&'static str],
    improvements: &'static [&'static str],
}

/// A recognised theme: the occasions it suits, and the verdicts for a match
/// and for anything else.
struct ThemeRule {
    theme: &'static str,
    occasions: &'static [&'static str],
    matched: Verdict,
    unmatched: Verdict,
}

// Off-theme rows leave cohesion, color and accessories unscored.
const RULES: &[ThemeRule] = &[
    ThemeRule {
        theme: "formal",
        occasions: &["work", "office", "business"],
        matched: Verdict {
            scores: Scores { overall: 85, theme: 90, occasion: 95, cohesion: 80, color: 85, accessories: 75 },
            feedback: "Excellent formal look! This outfit is perfectly suited for a professional setting. \
                       The formal theme aligns beautifully with the work occasion.",
            strengths: &["Professional appearance", "Appropriate for business setting", "Clean and polished look"],
            improvements: &["Consider adding a statement accessory", "Ensure proper fit and tailoring"],
        },
        unmatched: Verdict {
            scores: Scores { overall: 70, theme: 90, occasion: 60, cohesion: 0, color: 0, accessories: 0 },
            feedback: "Great formal styling, but might be too formal for this occasion. \
                       Consider adapting the formality level.",
            strengths: &["Well-executed formal look", "Good color coordination"],
            improvements: &["Adjust formality to match occasion", "Consider more casual accessories"],
        },
    },
    ThemeRule {
        theme: "casual",
        occasions: &["daily", "travel", "sports"],
        matched: Verdict {
            scores: Scores { overall: 88, theme: 95, occasion: 90, cohesion: 85, color: 80, accessories: 75 },
            feedback: "Perfect casual outfit! This look is ideal for everyday wear and matches the occasion beautifully.",
            strengths: &["Comfortable and practical", "Great for daily activities", "Relaxed yet put-together"],
            improvements: &["Add a pop of color or pattern", "Consider layering for versatility"],
        },
        unmatched: Verdict {
            scores: Scores { overall: 75, theme: 90, occasion: 70, cohesion: 0, color: 0, accessories: 0 },
            feedback: "Nice casual look, but you might want to elevate it slightly for this occasion.",
            strengths: &["Comfortable and stylish", "Good casual execution"],
            improvements: &["Add more sophisticated elements", "Consider dressier accessories"],
        },
    },
    ThemeRule {
        theme: "party",
        occasions: &["party", "event", "date"],
        matched: Verdict {
            scores: Scores { overall: 90, theme: 95, occasion: 92, cohesion: 88, color: 85, accessories: 90 },
            feedback: "Fabulous party look! This outfit is perfect for a fun event and really captures the party vibe.",
            strengths: &["Eye-catching and fun", "Perfect for social events", "Great use of accessories"],
            improvements: &["Ensure comfort for dancing", "Consider the venue's dress code"],
        },
        unmatched: Verdict {
            scores: Scores { overall: 65, theme: 90, occasion: 50, cohesion: 0, color: 0, accessories: 0 },
            feedback: "Great party styling, but might be too flashy for this occasion. Consider toning it down.",
            strengths: &["Bold and confident", "Great party elements"],
            improvements: &["Adapt to occasion appropriateness", "Consider more subtle styling"],
        },
    },
    ThemeRule {
        theme: "romantic",
        occasions: &["date", "romantic dinner", "special occasion"],
        matched: Verdict {
            scores: Scores { overall: 92, theme: 95, occasion: 90, cohesion: 90, color: 88, accessories: 85 },
            feedback: "Absolutely romantic and elegant! This outfit is perfect for a special date or romantic occasion.",
            strengths: &["Elegant and romantic", "Perfect for special moments", "Beautiful color choices"],
            improvements: &["Consider adding delicate jewelry", "Ensure the outfit is comfortable for the evening"],
        },
        unmatched: Verdict {
            scores: Scores { overall: 70, theme: 90, occasion: 60, cohesion: 0, color: 0, accessories: 0 },
            feedback: "Beautiful romantic styling, but might be too dressy for this occasion.",
            strengths: &["Elegant and feminine", "Great romantic elements"],
            improvements: &["Adjust formality level", "Consider more practical elements"],
        },
    },
];

static DEFAULT_VERDICT: Verdict = Verdict {
    scores: Scores { overall: 75, theme: 80, occasion: 75, cohesion: 70, color: 75, accessories: 70 },
    feedback: "Nice outfit! It shows good style sense and works well for the intended occasion.",
    strengths: &["Good overall styling", "Appropriate for the occasion"],
    improvements: &["Consider adding more personality", "Experiment with accessories"],
};

/// Rates an outfit. Total: every theme/occasion/description yields a rating.
pub fn rate(theme: &str, occasion: &str, description: &str) -> Rating {
    let verdict = RULES
        .iter()
        .find(|rule| rule.theme == theme)
        .map(|rule| {
            if rule.occasions.contains(&occasion) {
                &rule.matched
            } else {
                &rule.unmatched
            }
        })
        .unwrap_or(&DEFAULT_VERDICT);

    let mut feedback = verdict.feedback.to_string();
    if !description.is_empty() {
        feedback.push_str(&format!(
            " Based on your description '{description}', this outfit shows great attention to detail."
        ));
    }

    let scores = &verdict.scores;
    Rating {
        overall_score: scores.overall,
        theme_appropriateness: scores.theme,
        occasion_suitability: scores.occasion,
        style_cohesion: scores.cohesion,
        color_coordination: scores.color,
        accessories: scores.accessories,
        feedback,
        strengths: to_strings(verdict.strengths),
        improvements: to_strings(verdict.improvements),
        star_rating: star_rating(scores.overall),
    }
}

/// `clamp(round(overall / 20), 1, 5)`, rounding halves to even.
pub fn star_rating(overall_score: u32) -> u32 {
    let stars = (f64::from(overall_score) / 20.0).round_ties_even() as u32;
    stars.clamp(1, 5)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
