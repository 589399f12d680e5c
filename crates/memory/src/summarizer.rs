//! Summarizers: distill a conversation window into a topic or a summary.
//!
//! [`LlmSummarizer`] asks a language model for a JSON object. Providers
//! without a structured mode are asked in plain text and the object is
//! parsed out of the answer.

use std::sync::Arc;

use async_trait::async_trait;
use parley_core::error::{ProviderError, SummarizationError};
use parley_core::provider::parse_json_object;
use parley_core::{
    Analysis, AnalysisTask, CompletionRequest, Message, Provider, Sentiment, Summarizer, Summary,
    Topic, TopicCategory,
};
use serde_json::{Map, Value};
use tracing::debug;

const ANALYZER_SYSTEM_PROMPT: &str = "You are a context analyzer specialized in extracting \
relevant information from conversations. Always answer with a single JSON object.";

/// Summarizer backed by any provider.
pub struct LlmSummarizer {
    provider: Arc<dyn Provider>,
    temperature: f32,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<dyn Provider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    fn transcript(messages: &[Message]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.speaker(), m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn prompt(task: AnalysisTask, transcript: &str) -> String {
        match task {
            AnalysisTask::Topic => format!(
                "Analyze the conversation below and identify its main topic.\n\
                 Answer with a JSON object with the keys:\n\
                 - \"topic\": a short description of the main topic\n\
                 - \"type\": one of GENERAL, TECHNICAL, CREATIVE, ANALYTICAL, PERSONAL\n\
                 - \"subtopics\": a list of related subtopics\n\n\
                 Conversation:\n{transcript}"
            ),
            AnalysisTask::Summary => format!(
                "Summarize the conversation below.\n\
                 Answer with a JSON object with the keys:\n\
                 - \"summary\": a concise summary\n\
                 - \"key_points\": a list of the key points\n\
                 - \"sentiment\": one of positive, neutral, negative, mixed\n\n\
                 Conversation:\n{transcript}"
            ),
        }
    }

    async fn ask(&self, request: CompletionRequest) -> Result<Value, SummarizationError> {
        match self.provider.complete_json(request.clone()).await {
            Ok(value) => Ok(value),
            Err(ProviderError::Unsupported { .. }) => {
                debug!(provider = %self.provider.name(), "No structured mode, parsing plain text");
                let response = self.provider.complete(request).await?;
                Ok(parse_json_object(&response.text)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn analyze(
        &self,
        messages: &[Message],
        task: AnalysisTask,
    ) -> Result<Analysis, SummarizationError> {
        if messages.is_empty() {
            return Ok(match task {
                AnalysisTask::Topic => Analysis::Topic(Topic::fallback()),
                AnalysisTask::Summary => Analysis::Summary(Summary::fallback()),
            });
        }

        let request = CompletionRequest::new(Self::prompt(task, &Self::transcript(messages)))
            .with_system(ANALYZER_SYSTEM_PROMPT)
            .with_temperature(self.temperature);

        let value = self.ask(request).await?;
        let Value::Object(object) = value else {
            return Err(SummarizationError::Malformed("expected a JSON object".into()));
        };

        match task {
            AnalysisTask::Topic => parse_topic(&object).map(Analysis::Topic),
            AnalysisTask::Summary => parse_summary(&object).map(Analysis::Summary),
        }
    }
}

fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_topic(object: &Map<String, Value>) -> Result<Topic, SummarizationError> {
    let summary = object
        .get("topic")
        .and_then(Value::as_str)
        .ok_or_else(|| SummarizationError::Malformed("missing \"topic\"".into()))?;

    let category = object
        .get("type")
        .and_then(Value::as_str)
        .and_then(TopicCategory::parse)
        .unwrap_or_default();

    Ok(Topic {
        category,
        summary: summary.to_string(),
        subtopics: string_list(object, "subtopics"),
    })
}

fn parse_summary(object: &Map<String, Value>) -> Result<Summary, SummarizationError> {
    let text = object
        .get("summary")
        .and_then(Value::as_str)
        .ok_or_else(|| SummarizationError::Malformed("missing \"summary\"".into()))?;

    let sentiment = object
        .get("sentiment")
        .and_then(Value::as_str)
        .and_then(Sentiment::parse)
        .unwrap_or_default();

    Ok(Summary {
        text: text.to_string(),
        key_points: string_list(object, "key_points"),
        sentiment,
    })
}

/// Summarizer used when `[summarizer] provider = "none"`.
pub struct DisabledSummarizer;

#[async_trait]
impl Summarizer for DisabledSummarizer {
    fn name(&self) -> &str {
        "none"
    }

    async fn analyze(
        &self,
        _messages: &[Message],
        _task: AnalysisTask,
    ) -> Result<Analysis, SummarizationError> {
        Err(SummarizationError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::CompletionResponse;
    use std::sync::Mutex;

    /// Answers every request with a fixed payload and records the prompts.
    struct CannedProvider {
        json: Option<Value>,
        text: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedProvider {
        fn json(value: Value) -> Self {
            Self {
                json: Some(value),
                text: String::new(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn text(text: &str) -> Self {
            Self {
                json: None,
                text: text.into(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "mistral"
        }

        fn model(&self) -> &str {
            "mistral-large-latest"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt);
            Ok(CompletionResponse {
                text: self.text.clone(),
                model: self.model().into(),
            })
        }

        async fn complete_json(&self, request: CompletionRequest) -> Result<Value, ProviderError> {
            match &self.json {
                Some(value) => {
                    self.prompts.lock().unwrap().push(request.prompt);
                    Ok(value.clone())
                }
                None => Err(ProviderError::Unsupported {
                    provider: self.name().into(),
                    operation: "structured completion".into(),
                }),
            }
        }
    }

    fn window() -> Vec<Message> {
        vec![
            Message::user("Como funciona o borrow checker?"),
            Message::agent("Ele verifica referências em tempo de compilação."),
        ]
    }

    #[tokio::test]
    async fn parses_topic() {
        let provider = Arc::new(CannedProvider::json(serde_json::json!({
            "topic": "Rust ownership",
            "type": "TECHNICAL",
            "subtopics": ["borrowing", "lifetimes"]
        })));
        let summarizer = LlmSummarizer::new(provider.clone(), 0.3);

        let analysis = summarizer.analyze(&window(), AnalysisTask::Topic).await.unwrap();
        let Analysis::Topic(topic) = analysis else {
            panic!("expected a topic");
        };
        assert_eq!(topic.category, TopicCategory::Technical);
        assert_eq!(topic.summary, "Rust ownership");
        assert_eq!(topic.subtopics, vec!["borrowing", "lifetimes"]);

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("User: Como funciona o borrow checker?"));
        assert!(prompts[0].contains("Assistant: Ele verifica"));
    }

    #[tokio::test]
    async fn parses_summary_with_unknown_sentiment() {
        let provider = Arc::new(CannedProvider::json(serde_json::json!({
            "summary": "Discussion about the borrow checker",
            "key_points": ["compile-time checks"],
            "sentiment": "curious"
        })));
        let summarizer = LlmSummarizer::new(provider, 0.3);

        let Analysis::Summary(summary) =
            summarizer.analyze(&window(), AnalysisTask::Summary).await.unwrap()
        else {
            panic!("expected a summary");
        };
        assert_eq!(summary.text, "Discussion about the borrow checker");
        assert_eq!(summary.key_points, vec!["compile-time checks"]);
        assert_eq!(summary.sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn missing_key_is_malformed() {
        let provider = Arc::new(CannedProvider::json(serde_json::json!({"type": "GENERAL"})));
        let summarizer = LlmSummarizer::new(provider, 0.3);
        let err = summarizer.analyze(&window(), AnalysisTask::Topic).await.unwrap_err();
        assert!(matches!(err, SummarizationError::Malformed(_)));
    }

    #[tokio::test]
    async fn plain_text_provider_is_parsed() {
        let provider = Arc::new(CannedProvider::text(
            "Sure:\n```json\n{\"topic\": \"Travel\", \"type\": \"personal\"}\n```",
        ));
        let summarizer = LlmSummarizer::new(provider, 0.3);

        let Analysis::Topic(topic) =
            summarizer.analyze(&window(), AnalysisTask::Topic).await.unwrap()
        else {
            panic!("expected a topic");
        };
        assert_eq!(topic.summary, "Travel");
        assert_eq!(topic.category, TopicCategory::Personal);
        assert!(topic.subtopics.is_empty());
    }

    #[tokio::test]
    async fn empty_window_skips_provider() {
        let provider = Arc::new(CannedProvider::json(serde_json::json!({})));
        let summarizer = LlmSummarizer::new(provider.clone(), 0.3);
        let analysis = summarizer.analyze(&[], AnalysisTask::Summary).await.unwrap();
        assert_eq!(analysis, Analysis::Summary(Summary::fallback()));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_always_fails() {
        let err = DisabledSummarizer
            .analyze(&window(), AnalysisTask::Topic)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::Disabled));
    }
}
