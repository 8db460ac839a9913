pub const ADVISOR_SYSTEM: &str = "You are a professional fashion stylist with expertise in \
    creating outfits for different moods and occasions.";

/// Placeholders: {wardrobe}, {mood}, {occasion}
pub const OUTFIT_PROMPT_TEMPLATE: &str = r#"Based on the user's wardrobe and their desired mood/occasion, suggest a complete outfit.

User's Wardrobe:
{wardrobe}

Desired Mood: {mood}
Occasion: {occasion}

Suggest a complete outfit by selecting items from the wardrobe. Consider:
1. Color coordination
2. Style matching
3. Occasion appropriateness
4. Mood expression

Return JSON with this structure:
{
  "outfit": {
    "top": "item description",
    "bottom": "item description",
    "shoes": "item description",
    "accessories": "item description"
  },
  "styling_tips": "Brief styling advice",
  "reasoning": "Why this outfit works for the mood/occasion"
}"#;
