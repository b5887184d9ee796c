//! Rule-based extraction of travel hints from free text.
//!
//! Every extractor is a total function over the lower-cased message.
//! Rules are evaluated in a fixed order and the first match wins, so
//! text mentioning several places yields whichever comes first in the
//! gazetteer, not in the message.

use std::sync::LazyLock;

use regex::Regex;

use crate::travel::{QueryType, TravelQuery};

/// Known place names, checked in order.
pub const GAZETTEER: &[&str] = &[
    // Europe
    "paris", "london", "rome", "barcelona", "amsterdam", "berlin", "prague", "vienna",
    "madrid", "lisbon", "dublin", "edinburgh", "venice", "florence", "milan", "munich",
    "zurich", "stockholm", "copenhagen", "oslo", "helsinki", "warsaw", "budapest",
    "krakow", "athens", "istanbul", "santorini", "mykonos", "dubrovnik", "split",
    // Asia
    "tokyo", "kyoto", "osaka", "seoul", "busan", "bangkok", "phuket", "singapore",
    "hong kong", "macau", "taipei", "manila", "cebu", "bali", "jakarta", "kuala lumpur",
    "penang", "hanoi", "ho chi minh", "siem reap", "phnom penh", "yangon", "mandalay",
    "kathmandu", "pokhara", "delhi", "mumbai", "goa", "jaipur", "agra", "kerala",
    "bangalore", "chennai", "kolkata", "varanasi", "rishikesh", "dharamshala",
    // Americas
    "new york", "los angeles", "san francisco", "chicago", "miami", "las vegas",
    "washington", "boston", "seattle", "portland", "denver", "austin", "nashville",
    "new orleans", "toronto", "vancouver", "montreal", "mexico city", "cancun",
    "playa del carmen", "tulum", "puerto vallarta", "guatemala city", "antigua",
    "san jose", "panama city", "bogota", "medellin", "cartagena", "lima", "cusco",
    "machu picchu", "quito", "guayaquil", "buenos aires", "mendoza", "bariloche",
    "santiago", "valparaiso", "sao paulo", "rio de janeiro", "salvador", "brasilia",
    // Oceania
    "sydney", "melbourne", "brisbane", "perth", "adelaide", "darwin", "cairns",
    "gold coast", "auckland", "wellington", "christchurch", "queenstown", "rotorua",
    // Africa & Middle East
    "dubai", "abu dhabi", "doha", "kuwait city", "riyadh", "jeddah", "muscat",
    "cairo", "alexandria", "marrakech", "casablanca", "fez", "rabat", "tunis",
    "cape town", "johannesburg", "durban", "nairobi", "mombasa", "dar es salaam",
    "zanzibar", "addis ababa", "kigali", "kampala",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Invalid intent regex"))
        .collect()
}

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)next month",
        r"(?i)next week",
        r"(?i)this weekend",
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\b",
        r"\d{1,2}/\d{1,2}",
        r"\d{1,2}-\d{1,2}",
    ])
});

static GUEST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:people|person|guest|adult|traveler)").expect("Invalid guest regex")
});

static BUDGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)budget",
        r"(?i)cheap",
        r"(?i)expensive",
        r"(?i)luxury",
        r"\$\d+",
        r"(?i)under \$?\d+",
    ])
});

// Keyword groups, in routing priority order
pub const HOTEL_KEYWORDS: &[&str] = &["hotel", "accommodation", "stay"];
pub const FLIGHT_KEYWORDS: &[&str] = &["flight", "fly", "plane"];
pub const ACTIVITY_KEYWORDS: &[&str] = &["activity", "activities", "things to do", "attraction"];

/// Words that signal the user wants to look up or book something.
pub const BOOKING_KEYWORDS: &[&str] = &[
    "hotel",
    "flight",
    "book",
    "reserve",
    "availability",
    "prices",
    "cost",
];

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn title_case(place: &str) -> String {
    place
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|p| p.find(text))
        .map(|m| m.as_str().to_string())
}

/// First gazetteer entry found in the text, title-cased.
pub fn extract_destination(text: &str) -> Option<String> {
    let text = text.to_lowercase();
    GAZETTEER
        .iter()
        .find(|place| text.contains(*place))
        .map(|place| title_case(place))
}

/// The literal date expression matched, e.g. "next week" or "6/12".
pub fn extract_dates(text: &str) -> Option<String> {
    first_match(&DATE_PATTERNS, &text.to_lowercase())
}

/// The number of travelers, e.g. "3" for "3 people".
pub fn extract_guests(text: &str) -> Option<String> {
    GUEST_PATTERN
        .captures(&text.to_lowercase())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The literal budget hint matched, e.g. "cheap" or "$200".
pub fn extract_budget(text: &str) -> Option<String> {
    first_match(&BUDGET_PATTERNS, &text.to_lowercase())
}

/// The travel type implied by keywords, if any.
pub fn detect_query_type(text: &str) -> Option<QueryType> {
    let text = text.to_lowercase();
    if contains_any(&text, HOTEL_KEYWORDS) {
        Some(QueryType::Hotels)
    } else if contains_any(&text, FLIGHT_KEYWORDS) {
        Some(QueryType::Flights)
    } else if contains_any(&text, ACTIVITY_KEYWORDS) {
        Some(QueryType::Activities)
    } else {
        None
    }
}

/// Whether the message asks to look up or book something concrete.
pub fn wants_travel_search(text: &str) -> bool {
    contains_any(&text.to_lowercase(), BOOKING_KEYWORDS)
}

/// Build a query of the given type from whatever hints the text has.
pub fn travel_query(text: &str, query_type: QueryType) -> TravelQuery {
    TravelQuery {
        destination: extract_destination(text),
        query_type,
        dates: extract_dates(text),
        guests: extract_guests(text),
        budget: extract_budget(text),
    }
}

/// Build a query whose type comes from keywords, defaulting to
/// `mixed` when nothing narrows it down.
pub fn infer_travel_query(text: &str) -> TravelQuery {
    let query_type = detect_query_type(text).unwrap_or(QueryType::Mixed);
    travel_query(text, query_type)
}
