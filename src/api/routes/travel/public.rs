//! Public types for the travel API
pub use crate::travel::{
    ActivityResult, FlightEndpoint, FlightResult, HotelResult, QueryType, TravelQuery,
    TravelSearchResults,
};
