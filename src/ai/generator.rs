use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::GeneratedContent;

use super::ContentGenerator;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SYSTEM_INSTRUCTION: &str = r#"You are the editorial intelligence of a news desk. Turn the draft you are given into two pieces of journalism, staying strictly faithful to the facts it contains.

Editorial rigor:
1. Use ONLY the facts, names, figures and topics present in the draft.
2. Do not research or invent. Add no outside information, even if it seems correct or related. If the draft does not mention a detail, the article must not mention it either.
3. Before answering, check that your text covers exactly the same subject and facts as the draft. If it does not, discard it and write it again.

Output:
- hook: a short, catchy teaser for the home page, at most 150 characters.
- content: the full article. Sophisticated documentary style with an invisible narrator, paragraphs of about four lines, at least 300 words.
- faqs: a few questions and answers a reader might have, answered only from the draft.

Style:
- No conversational filler and no questions addressed to the reader.
- Avoid vague AI vocabulary such as "challenging", "emblematic" or "complex"; use the concrete terms of the draft.
- Write in the same language as the draft."#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model
    }

    fn build_request(title: &str, raw_draft: &str) -> GenerateRequest {
        let prompt = format!(
            "BASE DRAFT (ONLY SOURCE OF FACTS):\n{raw_draft}\n\nHEADLINE:\n{title}\n\n\
             Task: write the hook and the final article based ONLY on the facts above."
        );

        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(SYSTEM_INSTRUCTION.to_string()),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: json!({
                    "type": "OBJECT",
                    "properties": {
                        "hook": {
                            "type": "STRING",
                            "description": "Home page teaser faithful to the draft."
                        },
                        "content": {
                            "type": "STRING",
                            "description": "Full article faithful to the draft."
                        },
                        "faqs": { "type": "STRING" }
                    },
                    "required": ["hook", "content", "faqs"]
                }),
            },
        }
    }
}

/// Pull the structured copy out of a `generateContent` response body.
fn parse_response(response: GenerateResponse) -> Result<GeneratedContent> {
    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(AppError::Generation(
            "the model returned no text".to_string(),
        ));
    }

    serde_json::from_str(&text)
        .map_err(|e| AppError::Generation(format!("malformed model output: {e}")))
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate(&self, title: &str, raw_draft: &str) -> Result<GeneratedContent> {
        let request = Self::build_request(title, raw_draft);
        let url = format!("{GEMINI_API_URL}/{}:generateContent", self.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::Generation(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let content = parse_response(body)?;
        tracing::debug!(model = %self.model, title, "generated content");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &str) -> GenerateResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn parses_structured_output() {
        let body = response(
            r#"{"candidates":[{"content":{"role":"model","parts":[
                {"text":"{\"hook\":\"Ponte cai\",\"content\":\"Corpo\",\"faqs\":\"P: ?\"}"}
            ]}}]}"#,
        );

        let content = parse_response(body).unwrap();
        assert_eq!(content.hook, "Ponte cai");
        assert_eq!(content.body, "Corpo");
        assert_eq!(content.faqs, "P: ?");
    }

    #[test]
    fn joins_split_parts() {
        let body = response(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"{\"hook\":\"h\","},
                {"text":"\"content\":\"b\",\"faqs\":\"f\"}"}
            ]}}]}"#,
        );

        assert_eq!(parse_response(body).unwrap().body, "b");
    }

    #[test]
    fn empty_response_is_an_error() {
        let err = parse_response(response(r#"{"candidates":[]}"#)).unwrap_err();
        assert!(matches!(err, AppError::Generation(msg) if msg.contains("no text")));

        let err = parse_response(response(r#"{}"#)).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn malformed_output_is_an_error() {
        let body = response(r#"{"candidates":[{"content":{"parts":[{"text":"not json"}]}}]}"#);
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, AppError::Generation(msg) if msg.contains("malformed")));
    }

    #[test]
    fn request_carries_draft_title_and_schema() {
        let request = GeminiGenerator::build_request("Ponte cai em SP", "A ponte caiu.");
        let value = serde_json::to_value(&request).unwrap();

        let prompt = value["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("A ponte caiu."));
        assert!(prompt.contains("Ponte cai em SP"));
        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"],
            json!(["hook", "content", "faqs"])
        );
    }
}
