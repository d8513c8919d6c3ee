//! Narrative Generator
//!
//! Turns a day's metrics into a short blog-style paragraph via any
//! [`LlmProvider`]. Failures are typed so the run loop can choose between
//! aborting and writing the matching placeholder.

use std::sync::Arc;

use agent_core::{AgentError, GenerationOptions, LlmProvider};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::MetricRecord;

/// System instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You are a professional financial blogger specializing in Bitcoin ETFs. \
Write a concise, 3-4 sentence daily summary of the BlackRock IBIT ETF activity. \
Focus on the net flow and any significant change in holdings or price. \
Maintain an informative and moderately optimistic tone.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("text-generation credential missing: {0}")]
    CredentialMissing(String),

    #[error("text-generation service unreachable or refused the request: {0}")]
    Transport(String),

    #[error("unexpected text-generation failure: {0}")]
    Unexpected(String),
}

impl NarrativeError {
    /// Text written to the page in place of a generated narrative
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::CredentialMissing(_) => "AI content generation failed: Missing API Key.",
            Self::Transport(_) => "AI content generation failed due to API connection error.",
            Self::Unexpected(_) => "AI content generation failed due to an unexpected error.",
        }
    }
}

impl From<AgentError> for NarrativeError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::MissingCredential(var) => Self::CredentialMissing(var),
            e if e.is_transport() => Self::Transport(e.to_string()),
            e => Self::Unexpected(e.to_string()),
        }
    }
}

/// `1234567.5` -> `1,234,567.5`; display only
pub fn group_thousands(value: Decimal) -> String {
    let text = value.to_string();
    let (sign, unsigned) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// User prompt embedding the record's date and all five figures
pub fn build_prompt(record: &MetricRecord) -> String {
    format!(
        "Write the summary based on these key metrics:\n\n\
         Latest IBIT ETF Metrics (Date: {date}):\n\
         - BTC Price: ${price}\n\
         - Total BTC Holdings: {holdings} BTC\n\
         - Daily BTC Net Flow: {btc_flow} BTC\n\
         - Total AUM (USD): ${aum}\n\
         - Daily USD Net Flow: ${usd_flow}\n",
        date = record.date.format("%Y-%m-%d"),
        price = group_thousands(record.price),
        holdings = group_thousands(record.holdings),
        btc_flow = group_thousands(record.btc_flow),
        aum = group_thousands(record.aum),
        usd_flow = group_thousands(record.usd_flow),
    )
}

/// Collapse the model output into one paragraph
pub fn normalize(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct NarrativeGenerator {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl NarrativeGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            options: GenerationOptions::default().with_model(model),
        }
    }

    pub async fn generate(&self, record: &MetricRecord) -> Result<String, NarrativeError> {
        tracing::info!(
            provider = self.provider.name(),
            model = %self.options.model,
            "Generating narrative"
        );

        let completion = self
            .provider
            .prompt(SYSTEM_PROMPT, &build_prompt(record), &self.options)
            .await?;

        let text = normalize(&completion.content);
        if text.is_empty() {
            return Err(NarrativeError::Unexpected("model returned only whitespace".into()));
        }
        Ok(text)
    }

    /// Never fails: errors degrade to their placeholder text, returned
    /// alongside the error it stands in for
    pub async fn generate_or_placeholder(
        &self,
        record: &MetricRecord,
    ) -> (String, Option<NarrativeError>) {
        match self.generate(record).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!("Narrative generation failed, writing placeholder: {}", e);
                (e.placeholder().to_string(), Some(e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use agent_core::{Completion, Message, Result as CoreResult};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Provider returning a scripted answer and recording what it was sent
    pub struct ScriptedProvider {
        reply: Mutex<Option<CoreResult<String>>>,
        pub seen: Mutex<Vec<Message>>,
    }

    impl ScriptedProvider {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Mutex::new(Some(Ok(text.to_string()))),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: AgentError) -> Self {
            Self {
                reply: Mutex::new(Some(Err(err))),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> CoreResult<Completion> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            let content = self
                .reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(AgentError::Other("called twice".into())))?;
            Ok(Completion {
                content,
                model: options.model.clone(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    pub fn scenario() -> MetricRecord {
        MetricRecord::derive(
            NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            dec!(65000),
            dec!(306050.0),
            dec!(305613.5),
        )
        .unwrap()
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec!(65000)), "65,000");
        assert_eq!(group_thousands(dec!(306050.0)), "306,050.0");
        assert_eq!(group_thousands(dec!(19893250000.0)), "19,893,250,000.0");
        assert_eq!(group_thousands(dec!(436.5)), "436.5");
        assert_eq!(group_thousands(dec!(-1200.25)), "-1,200.25");
        assert_eq!(group_thousands(dec!(0)), "0");
    }

    #[test]
    fn test_prompt_embeds_all_figures() {
        let prompt = build_prompt(&scenario());
        for needle in [
            "Date: 2024-11-05",
            "BTC Price: $65,000",
            "Total BTC Holdings: 306,050.0 BTC",
            "Daily BTC Net Flow: 436.5 BTC",
            "Total AUM (USD): $19,893,250,000.0",
            "Daily USD Net Flow: $28,372,500.0",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?} in {prompt}");
        }
    }

    #[test]
    fn test_normalize_collapses_lines() {
        assert_eq!(
            normalize("IBIT added 436.5 BTC.\n\nPrices held firm.\r\n  AUM tops $19.9B.  \n"),
            "IBIT added 436.5 BTC. Prices held firm. AUM tops $19.9B."
        );
    }

    #[test]
    fn test_error_mapping_and_placeholders() {
        let missing: NarrativeError = AgentError::MissingCredential("GEMINI_API_KEY".into()).into();
        assert_eq!(missing.placeholder(), "AI content generation failed: Missing API Key.");

        let transport: NarrativeError = AgentError::ProviderUnavailable("timeout".into()).into();
        assert!(matches!(transport, NarrativeError::Transport(_)));

        let unexpected: NarrativeError = AgentError::EmptyResponse("Gemini".into()).into();
        assert!(matches!(unexpected, NarrativeError::Unexpected(_)));

        let texts = [missing.placeholder(), transport.placeholder(), unexpected.placeholder()];
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
    }

    #[tokio::test]
    async fn test_generate_sends_persona_and_metrics() {
        let provider = Arc::new(ScriptedProvider::replying("Strong day.\nInflows rose."));
        let generator = NarrativeGenerator::new(provider.clone(), "test-model");

        let text = generator.generate(&scenario()).await.unwrap();
        assert_eq!(text, "Strong day. Inflows rose.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].content, SYSTEM_PROMPT);
        assert!(seen[1].content.contains("Daily BTC Net Flow: 436.5 BTC"));
    }

    #[tokio::test]
    async fn test_no_placeholder_when_generation_succeeds() {
        let generator = NarrativeGenerator::new(Arc::new(ScriptedProvider::replying("Flat day.")), "m");
        let (text, err) = generator.generate_or_placeholder(&scenario()).await;
        assert_eq!(text, "Flat day.");
        assert!(err.is_none());
    }

    #[tokio::test]
    async fn test_blank_reply_is_unexpected() {
        let generator = NarrativeGenerator::new(Arc::new(ScriptedProvider::replying(" \n ")), "m");
        let err = generator.generate(&scenario()).await.unwrap_err();
        assert!(matches!(err, NarrativeError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_placeholder_on_missing_credential() {
        let provider = ScriptedProvider::failing(AgentError::MissingCredential("GEMINI_API_KEY".into()));
        let generator = NarrativeGenerator::new(Arc::new(provider), "m");

        let (text, err) = generator.generate_or_placeholder(&scenario()).await;
        assert_eq!(text, "AI content generation failed: Missing API Key.");
        assert!(matches!(err, Some(NarrativeError::CredentialMissing(_))));
    }
}
