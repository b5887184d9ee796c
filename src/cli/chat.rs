use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::api::AppState;
use crate::chat::Message;
use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::core::logging::init_logging;

fn print_travel_results(message: &Message) {
    let Some(travel) = &message.metadata else {
        return;
    };
    let Ok(query) = serde_json::to_string(&travel.query) else {
        return;
    };
    println!("[travel query: {}]", query);
    if let Some(data) = &travel.data {
        let count = data.hotels.as_ref().map_or(0, Vec::len)
            + data.flights.as_ref().map_or(0, Vec::len)
            + data.activities.as_ref().map_or(0, Vec::len);
        println!("[travel results: {}]", count);
    }
}

/// Chat with the assistant in a new session, storing the transcript
/// like any other session.
pub async fn run(config: AppConfig) -> Result<()> {
    init_logging();

    if !config.model_configured() {
        println!("OPENAI_API_KEY is not set, replies use the built-in templates.");
    }
    if !config.search_configured() {
        println!("SERPAPI_KEY is not set, replies are not enriched with web results.");
    }

    let mut rl = DefaultEditor::new()?;
    let db = async_db(&config.db_path).await?;
    let state = AppState::new(db, config)?;

    let session = state.chat.create_session(None, None).await?;
    for message in state.chat.list_messages(&session.id).await? {
        println!("{}\n", message.content);
    }

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                let result = state.chat.send_message(&session.id, &line).await?;
                println!("{}\n", result.assistant_message.content);
                print_travel_results(&result.assistant_message);
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let session = state.chat.get_session(&session.id).await?;
    println!("Saved session '{}' ({})", session.title, session.id);

    Ok(())
}
