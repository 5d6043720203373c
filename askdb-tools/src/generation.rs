use crate::export::LlmSchemaDocument;
use crate::{AskDbError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, instrument};

pub const REFUSAL_SENTENCE: &str = "Sorry, I cannot answer that based on the available schema.";
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum GeneratedSql {
    Sql(String),
    /// The model said the question cannot be answered from the schema.
    Refused,
}

/// Turns a question plus a schema document into SQL. Nothing returned here is
/// validated or sanitized.
pub trait SqlGenerator: Sync {
    fn generate_sql(
        &self,
        question: &str,
        document: &LlmSchemaDocument,
    ) -> impl Future<Output = Result<GeneratedSql>> + Send;
}

pub fn build_prompt(question: &str, document: &LlmSchemaDocument) -> Result<String> {
    let schema = document.to_json_pretty()?;

    Ok(format!(
        r#"You are a PostgreSQL expert.
Given this database schema and a user question, generate an SQL query that best answers the user's intent.
Avoid DROP, DELETE, INSERT, or UPDATE unless explicitly asked. Only return a valid SQL query in your response. Use only the schema provided to answer the user's query. Do not include explanations.

Schema:
{schema}

User Query:
{question}

Rules:
- Only use the above schema. Do not guess table or column names.
- Always use qualified names like schema.table.column
- If the question cannot be answered from the schema, say: "{REFUSAL_SENTENCE}"

SQL Query:
"#
    ))
}

/// Interprets the raw reply text of a model.
pub fn parse_completion(content: &str) -> Result<GeneratedSql> {
    let sql = strip_code_fence(content.trim()).trim();

    if sql.is_empty() {
        return Err(AskDbError::Generation("model returned an empty reply".to_string()));
    }

    if sql.contains(REFUSAL_SENTENCE) {
        return Ok(GeneratedSql::Refused);
    }

    Ok(GeneratedSql::Sql(sql.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (`sql`, `postgresql`, ...) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end().strip_suffix("```").unwrap_or(body)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

fn completion_content(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AskDbError::Generation("completion contained no message".to_string()))
}

/// Chat-completion client for OpenRouter.
pub struct OpenRouterGenerator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenRouterGenerator {
    pub fn new(api_key: &str) -> Self {
        OpenRouterGenerator {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            endpoint: OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        match std::env::var(OPENROUTER_API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(AskDbError::MissingApiKey(OPENROUTER_API_KEY_VAR)),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl SqlGenerator for OpenRouterGenerator {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate_sql(&self, question: &str, document: &LlmSchemaDocument) -> Result<GeneratedSql> {
        let prompt = build_prompt(question, document)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.0,
        };

        let body = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&request)?)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let content = completion_content(&body)?;
        debug!(reply = %content, "Received completion");

        parse_completion(&content)
    }
}
