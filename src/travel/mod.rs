//! Travel result contract. Real hotel, flight and activity providers
//! are not integrated yet, so every lookup returns an empty list in
//! the shape the client renders.
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of travel lookup a query asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Hotels,
    Flights,
    Activities,
    Mixed,
}

impl QueryType {
    /// The concrete search this query maps to. `Mixed` has none.
    pub fn search_type(&self) -> Option<SearchType> {
        match self {
            QueryType::Hotels => Some(SearchType::Hotels),
            QueryType::Flights => Some(SearchType::Flights),
            QueryType::Activities => Some(SearchType::Activities),
            QueryType::Mixed => None,
        }
    }
}

/// The search types recorded in the audit log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Hotels,
    Flights,
    Activities,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Hotels => "hotels",
            SearchType::Flights => "flights",
            SearchType::Activities => "activities",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hotels" => Some(SearchType::Hotels),
            "flights" => Some(SearchType::Flights),
            "activities" => Some(SearchType::Activities),
            _ => None,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured travel intent extracted from free text or returned by
/// the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(rename = "type")]
    pub query_type: QueryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl TravelQuery {
    /// Fill any field missing from `self` with the value from
    /// `other`. The query type of `self` always wins.
    pub fn or(self, other: TravelQuery) -> TravelQuery {
        TravelQuery {
            destination: self.destination.or(other.destination),
            query_type: self.query_type,
            dates: self.dates.or(other.dates),
            guests: self.guests.or(other.guests),
            budget: self.budget.or(other.budget),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelResult {
    pub id: String,
    pub name: String,
    pub rating: f32,
    pub review_count: u32,
    pub price_per_night: f64,
    pub currency: String,
    pub image_url: String,
    pub location: String,
    pub amenities: Vec<String>,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub airport: String,
    pub time: String,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightResult {
    pub id: String,
    pub airline: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration: String,
    pub price: f64,
    pub currency: String,
    pub stops: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub rating: f32,
    pub review_count: u32,
    pub image_url: String,
    pub duration: String,
    pub category: String,
}

/// At most one list is populated, selected by the query type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelSearchResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotels: Option<Vec<HotelResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flights: Option<Vec<FlightResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<ActivityResult>>,
}

#[derive(Clone, Debug, Default)]
pub struct TravelService;

impl TravelService {
    pub fn new() -> Self {
        Self
    }

    // TODO: Replace with a hotel provider (Booking.com, Amadeus)
    async fn search_hotels(&self, query: &TravelQuery) -> Vec<HotelResult> {
        tracing::debug!("Hotel search query: {:?}", query);
        Vec::new()
    }

    // TODO: Replace with a flight provider (Amadeus, Skyscanner)
    async fn search_flights(&self, query: &TravelQuery) -> Vec<FlightResult> {
        tracing::debug!("Flight search query: {:?}", query);
        Vec::new()
    }

    // TODO: Replace with an activities provider (Viator, GetYourGuide)
    async fn search_activities(&self, query: &TravelQuery) -> Vec<ActivityResult> {
        tracing::debug!("Activities search query: {:?}", query);
        Vec::new()
    }

    /// Run the lookup selected by `query.query_type`. A `mixed` query
    /// has no single list to fill and returns no lists at all.
    pub async fn search(&self, query: &TravelQuery) -> TravelSearchResults {
        let mut results = TravelSearchResults::default();
        match query.query_type {
            QueryType::Hotels => results.hotels = Some(self.search_hotels(query).await),
            QueryType::Flights => results.flights = Some(self.search_flights(query).await),
            QueryType::Activities => {
                results.activities = Some(self.search_activities(query).await)
            }
            QueryType::Mixed => {}
        }
        results
    }
}
