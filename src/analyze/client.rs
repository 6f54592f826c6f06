//! OpenAI-compatible chat client used for concept extraction and link
//! summaries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::AnalyzeError;
use super::category::Category;
use super::links;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4.1";

/// Timeout for chat completions calls.
const COMPLETIONS_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for fetching linked pages.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One concept the model found in a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptHit {
    pub concept: String,
    pub link: String,
    pub category: Category,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Concept entry as the model emits it; categories are validated into
/// the taxonomy afterwards.
#[derive(Deserialize)]
struct ModelConcept {
    concept: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    category: String,
}

/// Synchronous client for the analysis service.
pub struct AnalysisClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl AnalysisClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        api_base: Option<String>,
    ) -> Result<Self, AnalyzeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(COMPLETIONS_TIMEOUT)
            .build()
            .map_err(AnalyzeError::Http)?;
        Ok(Self {
            http,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Asks the model for the concepts (and any associated links)
    /// discussed in a note, each categorized within the fixed taxonomy.
    pub fn extract_concepts(
        &self,
        title: &str,
        body: &str,
    ) -> Result<Vec<ConceptHit>, AnalyzeError> {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
        let embedded = links::extract_links(body);
        let link_hint = if embedded.is_empty() {
            String::from("The note contains no links.")
        } else {
            format!("Links present in the note: {}", embedded.join(", "))
        };

        let prompt = format!(
            "Analyze the following note and extract the main concepts it discusses, \
             together with any link each concept refers to.\n\n\
             Title: {title}\n\nContent:\n{body}\n\n{link_hint}\n\n\
             For each concept produce:\n\
             1. a clear, concise description of the concept\n\
             2. the associated link if one appears in the text, otherwise an empty string\n\
             3. a category, chosen from exactly this set: {labels}\n\n\
             Respond ONLY with a JSON array in the form:\n\
             [{{\"concept\": \"...\", \"link\": \"https://...\", \"category\": \"...\"}}]\n\n\
             Use an empty string for \"link\" when a concept has no link. \
             Return an empty array [] if no concepts are identifiable.",
            labels = labels.join(", "),
        );

        let content = self.chat(
            "You are an expert at analyzing content and extracting key concepts. \
             Always respond with valid JSON.",
            &prompt,
            1500,
        )?;

        let raw = strip_code_fence(&content);
        let concepts: Vec<ModelConcept> = serde_json::from_str(raw).map_err(|e| {
            AnalyzeError::BadResponse(format!("model did not return a JSON array: {e}"))
        })?;

        Ok(concepts
            .into_iter()
            .filter(|c| !c.concept.trim().is_empty())
            .map(|c| ConceptHit {
                concept: c.concept,
                link: c.link,
                category: Category::from_label(&c.category),
            })
            .collect())
    }

    /// Summarizes fetched page content in relation to a concept.
    pub fn summarize(
        &self,
        concept: &str,
        link: &str,
        content: &str,
    ) -> Result<String, AnalyzeError> {
        if content.trim().is_empty() {
            return Ok(String::new());
        }
        let content = links::truncate_content(content);
        let prompt = format!(
            "Analyze the following web content and provide a brief, clear summary.\n\n\
             Reference concept: {concept}\nLink: {link}\n\nContent:\n{content}\n\n\
             Provide a summary of at most 2-3 sentences explaining what the content \
             is about, how it relates to the reference concept, and the most \
             important information. Respond ONLY with the summary text, no extra \
             formatting."
        );
        let summary = self.chat(
            "You are an expert at writing clear, concise summaries of web content.",
            &prompt,
            300,
        )?;
        Ok(summary.trim().to_string())
    }

    /// Fetches a linked page and reduces it to plain text.
    pub fn fetch_page(&self, url: &str) -> Result<String, AnalyzeError> {
        if !links::is_fetchable(url) {
            return Ok(String::new());
        }
        let resp = self
            .http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .map_err(AnalyzeError::Http)?;
        if !resp.status().is_success() {
            return Err(AnalyzeError::BadResponse(format!(
                "fetch of {url} returned HTTP {}",
                resp.status()
            )));
        }
        let html = resp.text().map_err(AnalyzeError::Http)?;
        Ok(links::html_to_text(&html))
    }

    fn chat(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, AnalyzeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature: 0.3,
        };

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(AnalyzeError::Http)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AnalyzeError::AuthRejected);
        }
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(AnalyzeError::BadResponse(format!(
                "completions call returned HTTP {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = resp.json().map_err(AnalyzeError::Http)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AnalyzeError::BadResponse("completions reply had no choices".into()))?;
        Ok(content.trim().to_string())
    }
}

/// Drops a surrounding markdown code fence if the model added one.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
