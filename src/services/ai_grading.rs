use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;
use crate::db::models::TopicStrength;
use crate::db::types::SkillLevel;

pub(crate) const MISSING_KEY_MESSAGE: &str = "AI API Key missing.";
pub(crate) const BASELINE_UNAVAILABLE_FEEDBACK: &str = "AI unavailable.";
pub(crate) const BASELINE_ERROR_FEEDBACK: &str = "Error during analysis.";

const BASELINE_INSTRUCTIONS: &str = r#"
Analyze the code for logic, time complexity, and error patterns.
Output a JSON object with this structure (do not use markdown code blocks):
{
    "skill_level": "Beginner" | "Intermediate" | "Advanced",
    "topic_strength": {"Arrays": 0.0-1.0, "Strings": 0.0-1.0, "Loops": 0.0-1.0},
    "feedback": "Short summary of strengths and weaknesses."
}
"#;

/// A source of free-text completions. The production implementation talks
/// to an OpenAI-compatible endpoint; tests substitute scripted replies.
#[async_trait]
pub(crate) trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub(crate) struct OpenAiCompletions {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiCompletions {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.ai().ai_request_timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().ai_model.clone(),
            max_tokens: settings.ai().ai_max_tokens,
            temperature: settings.ai().ai_temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletions {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_completion_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call completion API")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            anyhow::bail!("completion API returned {status}: {message}");
        }

        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("Missing completion content")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BaselineSample {
    pub(crate) label: Option<String>,
    pub(crate) code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BaselineAssessment {
    pub(crate) skill_level: SkillLevel,
    pub(crate) topic_strength: TopicStrength,
    pub(crate) feedback: String,
}

impl BaselineAssessment {
    fn fallback(feedback: &str) -> Self {
        Self {
            skill_level: SkillLevel::Beginner,
            topic_strength: TopicStrength::new(),
            feedback: feedback.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Verdict {
    pub(crate) is_correct: bool,
    pub(crate) feedback: String,
}

/// Delegates grading and tutoring to a completion backend. Every operation
/// returns a value: a missing backend yields fixed placeholders and backend
/// failures degrade to conservative fallbacks.
#[derive(Clone)]
pub(crate) struct GradingGateway {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl GradingGateway {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        if !settings.ai().is_configured() {
            return Ok(Self::disabled());
        }
        let backend = OpenAiCompletions::from_settings(settings)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    pub(crate) fn with_backend(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend: Some(backend) }
    }

    pub(crate) fn disabled() -> Self {
        Self { backend: None }
    }

    pub(crate) async fn assess_baseline(&self, samples: &[BaselineSample]) -> BaselineAssessment {
        let prompt = baseline_prompt(samples);
        match self.call("assess_baseline", &prompt).await {
            None => BaselineAssessment::fallback(BASELINE_UNAVAILABLE_FEEDBACK),
            Some(Err(_)) => BaselineAssessment::fallback(BASELINE_ERROR_FEEDBACK),
            Some(Ok(raw)) => parse_baseline(&raw).unwrap_or_else(|| {
                tracing::warn!(response_len = raw.len(), "Baseline response was not a JSON object");
                BaselineAssessment::fallback(BASELINE_ERROR_FEEDBACK)
            }),
        }
    }

    pub(crate) async fn grade_submission(&self, problem_description: &str, code: &str) -> Verdict {
        let prompt = grading_prompt(problem_description, code);
        match self.call("grade_submission", &prompt).await {
            None => Verdict { is_correct: false, feedback: MISSING_KEY_MESSAGE.to_string() },
            Some(Err(err)) => Verdict { is_correct: false, feedback: format!("AI Error: {err}") },
            Some(Ok(raw)) => parse_verdict(&raw),
        }
    }

    pub(crate) async fn explain(
        &self,
        problem_description: &str,
        current_code: &str,
        question: &str,
    ) -> String {
        let prompt = tutoring_prompt(problem_description, current_code, question);
        match self.call("explain", &prompt).await {
            None => MISSING_KEY_MESSAGE.to_string(),
            Some(Err(err)) => format!("AI Error: {err}"),
            Some(Ok(answer)) => answer,
        }
    }

    async fn call(&self, operation: &'static str, prompt: &str) -> Option<Result<String>> {
        let Some(backend) = self.backend.as_ref() else {
            metrics::counter!("ai_requests_total", "operation" => operation, "outcome" => "skipped")
                .increment(1);
            return None;
        };

        let timer = Instant::now();
        let result = backend.complete(prompt).await;
        let elapsed = timer.elapsed().as_secs_f64();
        let outcome = if result.is_ok() { "ok" } else { "error" };

        metrics::counter!("ai_requests_total", "operation" => operation, "outcome" => outcome)
            .increment(1);
        metrics::histogram!("ai_request_duration_seconds", "operation" => operation)
            .record(elapsed);

        match &result {
            Ok(text) => tracing::info!(
                operation,
                duration_seconds = elapsed,
                response_len = text.len(),
                "AI request completed"
            ),
            Err(err) => tracing::warn!(
                operation,
                duration_seconds = elapsed,
                error = %format!("{err:#}"),
                "AI request failed; using fallback"
            ),
        }

        Some(result)
    }
}

fn baseline_prompt(samples: &[BaselineSample]) -> String {
    let mut prompt = String::from("Evaluate the coding skills based on these solutions.\n");
    for sample in samples {
        let label = sample.label.as_deref().unwrap_or("Unknown");
        prompt.push_str(&format!("Question: {label}\nCode: {}\n\n", sample.code));
    }
    prompt.push_str(BASELINE_INSTRUCTIONS);
    prompt
}

fn grading_prompt(problem_description: &str, code: &str) -> String {
    format!(
        "Problem Description: {problem_description}\n\n\
         Student Code:\n{code}\n\n\
         Task:\n\
         1. Determine if the code solves the problem correctly.\n\
         2. Be lenient with function names unless a specific name is mandatory for the logic.\n\
         3. Provide constructive feedback.\n\n\
         Output Format:\n\
         CORRECT: [True/False]\n\
         FEEDBACK: [Your feedback here]\n"
    )
}

fn tutoring_prompt(problem_description: &str, current_code: &str, question: &str) -> String {
    format!(
        "Context: {problem_description}\n\
         Current Code: {current_code}\n\
         Student Question: {question}\n\n\
         Provide a helpful, educational answer without giving away the full solution \
         immediately if possible.\n"
    )
}

/// Removes markdown fence markers anywhere in the text, not just at the edges.
pub(crate) fn strip_code_fences(raw: &str) -> String {
    raw.trim().replace("```json", "").replace("```", "").trim().to_string()
}

/// Best-effort parse of a baseline reply. `None` only when the text is not a
/// JSON object; individual keys fall back to defaults.
pub(crate) fn parse_baseline(raw: &str) -> Option<BaselineAssessment> {
    let value: Value = serde_json::from_str(&strip_code_fences(raw)).ok()?;
    let object = value.as_object()?;

    let skill_level = object
        .get("skill_level")
        .and_then(Value::as_str)
        .and_then(SkillLevel::parse_loose)
        .unwrap_or_default();

    let topic_strength = object
        .get("topic_strength")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(topic, score)| {
                    let score = score.as_f64().filter(|score| score.is_finite())?;
                    Some((topic.clone(), score.clamp(0.0, 1.0)))
                })
                .collect()
        })
        .unwrap_or_default();

    let feedback =
        object.get("feedback").and_then(Value::as_str).unwrap_or_default().to_string();

    Some(BaselineAssessment { skill_level, topic_strength, feedback })
}

/// Correctness is a plain substring match on `CORRECT: True` / `CORRECT: true`;
/// anything else, including a missing marker, counts as incorrect.
pub(crate) fn parse_verdict(raw: &str) -> Verdict {
    let is_correct = raw.contains("CORRECT: True") || raw.contains("CORRECT: true");
    let feedback = match raw.split_once("FEEDBACK:") {
        Some((_, rest)) => rest.trim().to_string(),
        None => raw.to_string(),
    };
    Verdict { is_correct, feedback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, ScriptedBackend};

    #[test]
    fn verdict_requires_exact_marker() {
        let verdict = parse_verdict("CORRECT: True\nFEEDBACK: Nicely done.");
        assert!(verdict.is_correct);
        assert_eq!(verdict.feedback, "Nicely done.");

        assert!(parse_verdict("CORRECT: true\nFEEDBACK: ok").is_correct);
        assert!(!parse_verdict("CORRECT: TRUE\nFEEDBACK: ok").is_correct);
        assert!(!parse_verdict("Correct: True\nFEEDBACK: ok").is_correct);
        assert!(!parse_verdict("CORRECT:True\nFEEDBACK: ok").is_correct);
        assert!(!parse_verdict("CORRECT: False\nFEEDBACK: off by one").is_correct);
    }

    #[test]
    fn verdict_substring_match_is_not_anchored() {
        assert!(parse_verdict("INCORRECT: True").is_correct);
    }

    #[test]
    fn verdict_feedback_falls_back_to_whole_response() {
        let raw = "The solution looks right to me.";
        let verdict = parse_verdict(raw);
        assert!(!verdict.is_correct);
        assert_eq!(verdict.feedback, raw);
    }

    #[test]
    fn verdict_feedback_is_everything_after_first_marker() {
        let verdict = parse_verdict("CORRECT: False\nFEEDBACK:  one\nFEEDBACK: two \n");
        assert_eq!(verdict.feedback, "one\nFEEDBACK: two");
    }

    #[test]
    fn strip_code_fences_removes_all_markers() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn baseline_parses_fenced_json() {
        let raw = "```json\n{\"skill_level\": \"Intermediate\", \"topic_strength\": \
                   {\"Arrays\": 0.7, \"Strings\": 0.4}, \"feedback\": \"Solid loops.\"}\n```";
        let parsed = parse_baseline(raw).expect("baseline");

        assert_eq!(parsed.skill_level, SkillLevel::Intermediate);
        assert_eq!(parsed.topic_strength.get("Arrays"), Some(&0.7));
        assert_eq!(parsed.topic_strength.get("Strings"), Some(&0.4));
        assert_eq!(parsed.feedback, "Solid loops.");
    }

    #[test]
    fn baseline_tolerates_missing_and_garbage_keys() {
        let parsed = parse_baseline(
            "{\"skill_level\": \"Wizard\", \"topic_strength\": {\"Arrays\": \"high\", \
             \"DP\": 3.5, \"Loops\": -1}}",
        )
        .expect("baseline");

        assert_eq!(parsed.skill_level, SkillLevel::Beginner);
        assert_eq!(parsed.topic_strength.get("Arrays"), None);
        assert_eq!(parsed.topic_strength.get("DP"), Some(&1.0));
        assert_eq!(parsed.topic_strength.get("Loops"), Some(&0.0));
        assert_eq!(parsed.feedback, "");

        let empty = parse_baseline("{}").expect("empty object");
        assert_eq!(empty.skill_level, SkillLevel::Beginner);
        assert!(empty.topic_strength.is_empty());
    }

    #[test]
    fn baseline_rejects_non_objects() {
        assert!(parse_baseline("Sure! Here is my analysis").is_none());
        assert!(parse_baseline("[1, 2, 3]").is_none());
    }

    #[test]
    fn baseline_prompt_lists_every_sample() {
        let prompt = baseline_prompt(&[
            BaselineSample { label: Some("Reverse a String".into()), code: "return s[::-1]".into() },
            BaselineSample { label: None, code: "pass".into() },
        ]);

        assert!(prompt.contains("Question: Reverse a String\nCode: return s[::-1]"));
        assert!(prompt.contains("Question: Unknown\nCode: pass"));
        assert!(prompt.contains("\"skill_level\""));
    }

    #[tokio::test]
    async fn disabled_gateway_returns_placeholders() {
        let gateway = GradingGateway::disabled();

        let verdict = gateway.grade_submission("Sum two numbers", "def f(a, b): return a + b").await;
        assert_eq!(
            verdict,
            Verdict { is_correct: false, feedback: "AI API Key missing.".to_string() }
        );

        let baseline = gateway.assess_baseline(&[]).await;
        assert_eq!(baseline.skill_level, SkillLevel::Beginner);
        assert!(baseline.topic_strength.is_empty());
        assert_eq!(baseline.feedback, "AI unavailable.");

        assert_eq!(gateway.explain("ctx", "code", "why?").await, "AI API Key missing.");
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_fallbacks() {
        let backend = ScriptedBackend::failing("upstream timed out");
        let gateway = GradingGateway::with_backend(backend.clone());

        let verdict = gateway.grade_submission("desc", "code").await;
        assert!(!verdict.is_correct);
        assert_eq!(verdict.feedback, "AI Error: upstream timed out");

        let baseline = gateway.assess_baseline(&[]).await;
        assert_eq!(baseline.feedback, "Error during analysis.");

        assert_eq!(gateway.explain("ctx", "code", "q").await, "AI Error: upstream timed out");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn grading_sends_description_and_code() {
        let backend = ScriptedBackend::replying("CORRECT: True\nFEEDBACK: Works for all inputs.");
        let gateway = GradingGateway::with_backend(backend.clone());

        let verdict = gateway.grade_submission("Find indices of two numbers", "def two_sum(): ...").await;

        assert!(verdict.is_correct);
        assert_eq!(verdict.feedback, "Works for all inputs.");
        let prompt = backend.last_prompt().expect("prompt");
        assert!(prompt.contains("Problem Description: Find indices of two numbers"));
        assert!(prompt.contains("def two_sum(): ..."));
        assert!(prompt.contains("CORRECT: [True/False]"));
    }

    #[tokio::test]
    async fn explain_returns_reply_verbatim() {
        let backend = ScriptedBackend::replying("  Think about a hash map.\n");
        let gateway = GradingGateway::with_backend(backend.clone());

        let answer = gateway.explain("Two Sum", "pass", "Where do I start?").await;

        assert_eq!(answer, "  Think about a hash map.\n");
        let prompt = backend.last_prompt().expect("prompt");
        assert!(prompt.contains("Student Question: Where do I start?"));
        assert!(prompt.contains("without giving away the full solution"));
    }

    #[tokio::test]
    async fn malformed_baseline_reply_uses_error_fallback() {
        let gateway =
            GradingGateway::with_backend(ScriptedBackend::replying("I think you're Advanced"));

        let baseline = gateway.assess_baseline(&[]).await;

        assert_eq!(baseline.skill_level, SkillLevel::Beginner);
        assert_eq!(baseline.feedback, "Error during analysis.");
    }

    #[tokio::test]
    async fn openai_backend_reads_first_choice() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let base_url = test_support::spawn_completion_stub(
            200,
            json!({"choices": [{"message": {"role": "assistant", "content": "CORRECT: true"}}]}),
        )
        .await;
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("OPENAI_BASE_URL", &base_url);
        let settings = Settings::load().expect("settings");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_BASE_URL");

        let backend = OpenAiCompletions::from_settings(&settings).expect("backend");
        let reply = backend.complete("hello").await.expect("completion");

        assert_eq!(reply, "CORRECT: true");
    }

    #[tokio::test]
    async fn openai_backend_surfaces_http_errors() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        let base_url = test_support::spawn_completion_stub(
            401,
            json!({"error": {"message": "Incorrect API key provided"}}),
        )
        .await;
        std::env::set_var("OPENAI_API_KEY", "sk-wrong");
        std::env::set_var("OPENAI_BASE_URL", &base_url);
        let settings = Settings::load().expect("settings");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_BASE_URL");

        let gateway = GradingGateway::from_settings(&settings).expect("gateway");
        let verdict = gateway.grade_submission("desc", "code").await;

        assert!(!verdict.is_correct);
        assert!(verdict.feedback.starts_with("AI Error: completion API returned 401"));
        assert!(verdict.feedback.contains("Incorrect API key provided"));
    }
}
