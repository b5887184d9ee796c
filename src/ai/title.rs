use super::intent;
use super::prompt::SESSION_TITLE_PROMPT;
use crate::openai::{CompletionRequest, LanguageModel, Message, Role};

const MAX_TITLE_CHARS: usize = 60;

/// Title derived from keywords when no model is available.
pub fn fallback_title(first_message: &str) -> String {
    let text = first_message.to_lowercase();
    if let Some(destination) = intent::extract_destination(&text) {
        return format!("Trip to {}", destination);
    }
    let title = if text.contains("hotel") {
        "Hotel Search"
    } else if text.contains("flight") {
        "Flight Search"
    } else if text.contains("activit") {
        "Activity Planning"
    } else {
        "Travel Planning"
    };
    title.to_string()
}

fn clean_title(raw: &str) -> Option<String> {
    let title = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    if title.is_empty() {
        return None;
    }
    Some(title.chars().take(MAX_TITLE_CHARS).collect())
}

/// Generate a short session title from the first user message. Always
/// returns something usable, falling back to keyword rules.
pub async fn generate_title(model: Option<&dyn LanguageModel>, first_message: &str) -> String {
    let Some(model) = model else {
        return fallback_title(first_message);
    };

    let request = CompletionRequest::new(vec![
        Message::new(Role::System, SESSION_TITLE_PROMPT),
        Message::new(Role::User, first_message),
    ])
    .temperature(0.3)
    .max_tokens(20);

    match model.complete(&request).await {
        Ok(content) => clean_title(&content).unwrap_or_else(|| fallback_title(first_message)),
        Err(e) => {
            tracing::warn!("Title generation failed, using fallback: {}", e);
            fallback_title(first_message)
        }
    }
}
