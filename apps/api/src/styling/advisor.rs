//! Styling advisor: optional external outfit suggestions.
//!
//! `AppState` holds an `Arc<dyn Advisor>`. `LlmAdvisor` asks the
//! text-generation API; `DisabledAdvisor` is used when no API key is set.
//! Callers go through [`suggest_outfit`], which bounds the call with a timeout
//! and falls back to the local composer on any failure, so an unavailable
//! advisor never reaches the user as an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::styling::composer::{compose, Outfit};
use crate::styling::prompts::{ADVISOR_SYSTEM, OUTFIT_PROMPT_TEMPLATE};
use crate::wardrobe::models::WardrobeItem;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor is not configured")]
    NotConfigured,

    #[error("advisor call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("advisor did not answer within {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Advisor: Send + Sync {
    async fn suggest(
        &self,
        items: &[WardrobeItem],
        mood: &str,
        occasion: &str,
    ) -> Result<Outfit, AdvisorError>;
}

/// Advisor used when no text-generation backend is configured.
pub struct DisabledAdvisor;

#[async_trait]
impl Advisor for DisabledAdvisor {
    async fn suggest(
        &self,
        _items: &[WardrobeItem],
        _mood: &str,
        _occasion: &str,
    ) -> Result<Outfit, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}

pub struct LlmAdvisor(pub LlmClient);

/// Shape the model is asked to reply with.
#[derive(Debug, Deserialize)]
struct AdvisorReply {
    outfit: SlotReply,
    styling_tips: String,
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct SlotReply {
    top: String,
    bottom: String,
    shoes: String,
    accessories: String,
}

impl From<AdvisorReply> for Outfit {
    fn from(reply: AdvisorReply) -> Self {
        Outfit {
            top: reply.outfit.top,
            bottom: reply.outfit.bottom,
            shoes: reply.outfit.shoes,
            accessories: reply.outfit.accessories,
            styling_tips: reply.styling_tips,
            reasoning: reply.reasoning,
        }
    }
}

#[async_trait]
impl Advisor for LlmAdvisor {
    async fn suggest(
        &self,
        items: &[WardrobeItem],
        mood: &str,
        occasion: &str,
    ) -> Result<Outfit, AdvisorError> {
        let prompt = build_prompt(items, mood, occasion);
        let system = format!("{ADVISOR_SYSTEM} {JSON_ONLY_SYSTEM}");
        let reply: AdvisorReply = self.0.call_json(&prompt, &system).await?;
        Ok(reply.into())
    }
}

fn build_prompt(items: &[WardrobeItem], mood: &str, occasion: &str) -> String {
    let wardrobe = items
        .iter()
        .map(|i| format!("- {} ({}, {} style)", i.item_type, i.color, i.style))
        .collect::<Vec<_>>()
        .join("\n");

    OUTFIT_PROMPT_TEMPLATE
        .replace("{wardrobe}", &wardrobe)
        .replace("{mood}", mood)
        .replace("{occasion}", occasion)
}

/// Asks the advisor for an outfit, substituting [`compose`] when it is not
/// configured, fails, replies with something unparseable, or runs past
/// `timeout`.
pub async fn suggest_outfit(
    advisor: &dyn Advisor,
    items: &[WardrobeItem],
    mood: &str,
    occasion: &str,
    timeout: Duration,
) -> Outfit {
    let result = match tokio::time::timeout(timeout, advisor.suggest(items, mood, occasion)).await
    {
        Ok(result) => result,
        Err(_) => Err(AdvisorError::Timeout(timeout)),
    };

    match result {
        Ok(outfit) => outfit,
        Err(AdvisorError::NotConfigured) => {
            debug!("Advisor not configured, composing outfit locally");
            compose(items, mood, occasion)
        }
        Err(e) => {
            warn!("Advisor unavailable, composing outfit locally: {e}");
            compose(items, mood, occasion)
        }
    }
}
