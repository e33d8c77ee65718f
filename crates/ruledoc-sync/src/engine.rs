use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use ruledoc_core::Settings;

/// Sampling temperature. Kept low so the model makes literal edits rather
/// than creative rewrites.
const TEMPERATURE: f32 = 0.1;

/// Seam between the pipeline and the generation service. The loop only sees
/// this trait, so tests run it against scripted fakes.
#[async_trait]
pub trait TextGenerator {
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, String>;
}

fn map_backend(provider: &str) -> Result<LLMBackend, String> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}

/// Generation client backed by the configured provider. One chat call per
/// rule, first candidate only.
pub struct LlmGenerator {
    provider: String,
    api_key: String,
    model: String,
}

impl LlmGenerator {
    pub fn new(settings: &Settings) -> Self {
        LlmGenerator {
            provider: settings.provider.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, String> {
        let backend = map_backend(&self.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.model)
            .system(system)
            .temperature(TEMPERATURE);

        if !self.api_key.is_empty() {
            builder = builder.api_key(&self.api_key);
        }

        let llm = builder.build().map_err(|e| format!("build LLM: {e}"))?;

        let messages = vec![ChatMessage::user().content(user_msg).build()];

        let response = llm.chat(&messages).await.map_err(|e| format!("chat: {e}"))?;

        // Empty output means "nothing to change", not a failure.
        Ok(response.text().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map_to_backends() {
        for provider in [
            "openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek",
        ] {
            assert!(map_backend(provider).is_ok(), "{provider}");
        }
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let err = map_backend("palm").unwrap_err();
        assert!(err.contains("palm"));
    }
}
