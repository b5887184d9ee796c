//! Canned replies used when no language model is configured or the
//! model fails. Routing is keyword based and always produces a
//! non-empty message.

use serde_json::json;

use super::intent::{self, ACTIVITY_KEYWORDS, FLIGHT_KEYWORDS, HOTEL_KEYWORDS, contains_any};
use super::prompt::{GENERAL_PLANNING, Prompt, render};
use super::strategy::Reply;
use crate::travel::QueryType;

fn dest_text(preposition: &str, destination: &Option<String>) -> String {
    destination
        .as_ref()
        .map(|d| format!(" {} {}", preposition, d))
        .unwrap_or_default()
}

fn render_or_default(prompt: Prompt, data: serde_json::Value) -> String {
    render(prompt, &data).unwrap_or_else(|e| {
        tracing::error!("Failed to render {} reply: {}", prompt, e);
        GENERAL_PLANNING.to_string()
    })
}

/// Route the message to a canned reply. Any reply that found a
/// destination also carries a structured query built from the message.
pub fn fallback_reply(message: &str) -> Reply {
    let text = message.to_lowercase();
    let destination = intent::extract_destination(&text);

    let routed = if contains_any(&text, HOTEL_KEYWORDS) {
        Some((Prompt::HotelSearch, QueryType::Hotels, "in"))
    } else if contains_any(&text, FLIGHT_KEYWORDS) {
        Some((Prompt::FlightSearch, QueryType::Flights, "to"))
    } else if contains_any(&text, ACTIVITY_KEYWORDS) {
        Some((Prompt::ActivitySearch, QueryType::Activities, "in"))
    } else {
        None
    };

    if let Some((prompt, query_type, preposition)) = routed {
        let message = render_or_default(
            prompt,
            json!({"dest_text": dest_text(preposition, &destination)}),
        );
        let travel_query = destination
            .is_some()
            .then(|| intent::travel_query(&text, query_type));
        return Reply {
            message,
            travel_query,
        };
    }

    match destination {
        Some(destination) => Reply {
            message: render_or_default(
                Prompt::DestinationOverview,
                json!({"destination": destination}),
            ),
            travel_query: Some(intent::travel_query(&text, QueryType::Mixed)),
        },
        None => Reply {
            message: GENERAL_PLANNING.to_string(),
            travel_query: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_hotel_requests() {
        let reply = fallback_reply("Find hotels in Tokyo for 2 adults");
        assert!(reply.message.contains("accommodation in Tokyo"));
        let query = reply.travel_query.unwrap();
        assert_eq!(query.query_type, QueryType::Hotels);
        assert_eq!(query.destination.as_deref(), Some("Tokyo"));
        assert_eq!(query.guests.as_deref(), Some("2"));
    }

    #[test]
    fn test_hotel_keywords_take_priority() {
        let reply = fallback_reply("flight and hotel to lisbon");
        assert_eq!(reply.travel_query.unwrap().query_type, QueryType::Hotels);
    }

    #[test]
    fn test_routes_flights_and_activities() {
        let reply = fallback_reply("I need to fly somewhere");
        assert!(reply.message.starts_with("Perfect! I'll help you find the best flights."));
        assert!(reply.travel_query.is_none());

        let reply = fallback_reply("Cheap flights to Lisbon");
        assert!(reply.message.contains("Flight Search to Lisbon:"));
        assert_eq!(reply.travel_query.unwrap().query_type, QueryType::Flights);

        let reply = fallback_reply("Things to do in Lima");
        assert!(reply.message.contains("Activities & Experiences in Lima"));
        assert_eq!(reply.travel_query.unwrap().query_type, QueryType::Activities);
    }

    #[test]
    fn test_destination_overview_carries_mixed_query() {
        let reply = fallback_reply("Tell me about Kyoto for 2 people on a budget");
        assert!(reply.message.starts_with("Kyoto is an amazing destination!"));
        let query = reply.travel_query.unwrap();
        assert_eq!(query.query_type, QueryType::Mixed);
        assert_eq!(query.destination.as_deref(), Some("Kyoto"));
        assert_eq!(query.guests.as_deref(), Some("2"));
        assert!(query.budget.is_some());
    }

    #[test]
    fn test_general_reply_is_never_empty() {
        for text in ["", "hello", "   "] {
            let reply = fallback_reply(text);
            assert_eq!(reply.message, GENERAL_PLANNING);
            assert!(reply.travel_query.is_none());
        }
    }
}
