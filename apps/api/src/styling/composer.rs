//! Outfit Composer: fills the four outfit slots from the wardrobe.
//!
//! Pure and deterministic: selection always walks items in stored order, so the
//! same wardrobe, mood and occasion produce the same outfit. This is also the
//! result substituted whenever the advisor cannot answer.

use serde::{Deserialize, Serialize};

use crate::wardrobe::models::{ItemCategory, WardrobeItem};

pub const TOP_PLACEHOLDER: &str = "Choose a comfortable top";
pub const BOTTOM_PLACEHOLDER: &str = "Select appropriate bottoms";
pub const SHOES_PLACEHOLDER: &str = "Pick suitable shoes";
pub const ACCESSORIES_PLACEHOLDER: &str = "Add finishing touches";

const FORMAL: &str = "formal";

/// Mood → styling tip. Moods not listed get [`DEFAULT_TIP`].
const STYLING_TIPS: &[(&str, &str)] = &[
    (
        "formal",
        "Opt for classic pieces in neutral colors. Ensure everything is well-fitted and polished. \
         Add a blazer or structured jacket for extra sophistication.",
    ),
    (
        "casual",
        "Keep it relaxed and comfortable. Mix textures and add personal touches. \
         Don't be afraid to layer pieces for a more interesting look.",
    ),
    (
        "party",
        "Go bold with colors and statement pieces. Don't forget to accessorize! \
         Add some sparkle or metallic accents to make it party-ready.",
    ),
    (
        "romantic",
        "Choose soft, flowing fabrics and romantic colors. \
         Add delicate accessories and consider layering for a dreamy look.",
    ),
    (
        "edgy",
        "Mix textures and add bold accessories. \
         Don't be afraid to break fashion rules and make a statement.",
    ),
];

const DEFAULT_TIP: &str = "Choose pieces that make you feel confident and comfortable. \
     Trust your instincts and add your personal touch.";

/// A suggested outfit: one description per slot plus guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub top: String,
    pub bottom: String,
    pub shoes: String,
    pub accessories: String,
    pub styling_tips: String,
    pub reasoning: String,
}

/// Builds an outfit from `items` for the given mood and occasion.
///
/// Slot candidates:
/// - top: `top` and `dress` items; for mood `formal` the first item styled
///   `formal` wins, otherwise the first candidate is shown with a hint to dress
///   it up
/// - bottom, shoes, accessories: first item of that category
///
/// Empty slots keep their placeholder text.
pub fn compose(items: &[WardrobeItem], mood: &str, occasion: &str) -> Outfit {
    let first_of = |category: ItemCategory| items.iter().find(|i| i.item_type == category);

    let top = select_top(items, mood).unwrap_or_else(|| TOP_PLACEHOLDER.to_string());
    let bottom = first_of(ItemCategory::Bottom)
        .map(describe)
        .unwrap_or_else(|| BOTTOM_PLACEHOLDER.to_string());
    let shoes = first_of(ItemCategory::Shoes)
        .map(describe)
        .unwrap_or_else(|| SHOES_PLACEHOLDER.to_string());
    let accessories = first_of(ItemCategory::Accessories)
        .map(describe)
        .unwrap_or_else(|| ACCESSORIES_PLACEHOLDER.to_string());

    Outfit {
        top,
        bottom,
        shoes,
        accessories,
        styling_tips: styling_tip(mood).to_string(),
        reasoning: reasoning(mood, occasion),
    }
}

fn select_top(items: &[WardrobeItem], mood: &str) -> Option<String> {
    let mut tops = items
        .iter()
        .filter(|i| matches!(i.item_type, ItemCategory::Top | ItemCategory::Dress));
    let first = tops.clone().next()?;

    if mood != FORMAL {
        return Some(describe(first));
    }
    match tops.find(|i| i.style == FORMAL) {
        Some(formal) => Some(describe(formal)),
        None => Some(format!(
            "{} {} - dress it up with accessories",
            first.color, first.item_type
        )),
    }
}

/// `"<color> <category> (<style>)"`
fn describe(item: &WardrobeItem) -> String {
    format!("{} {} ({})", item.color, item.item_type, item.style)
}

pub fn styling_tip(mood: &str) -> &'static str {
    STYLING_TIPS
        .iter()
        .find(|(m, _)| *m == mood)
        .map(|(_, tip)| *tip)
        .unwrap_or(DEFAULT_TIP)
}

fn reasoning(mood: &str, occasion: &str) -> String {
    format!(
        "This outfit is designed for a {mood} mood and {occasion} occasion. \
         The selected pieces work together to create a cohesive look that matches your desired style."
    )
}
