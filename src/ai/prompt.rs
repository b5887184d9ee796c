//! Reusable prompts and canned replies using Handlebars for
//! templating. Handlebars adds additional security controls since it
//! can't do much out of the box without registering your own
//! helpers. This is ideal since search snippets and user text should
//! be considered untrusted.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Error, Result};
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

// A simple `inc` helper for use with `each` and `@index` so that
// there can be natural number sequences when rendering (instead of
// starting at 0).
handlebars_helper!(inc: |v: i64| format!("{}", v + 1));

#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    TravelAssistant,
    HotelSearch,
    FlightSearch,
    ActivitySearch,
    DestinationOverview,
    GeneralPlanning,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

pub const SESSION_TITLE_PROMPT: &str = "Generate a short, descriptive title (3-5 words) for a travel chat conversation based on the first user message. Focus on the destination or travel type. Respond with just the title, no quotes or extra text.";

const TRAVEL_ASSISTANT_PROMPT: &str = r#"You are TravelAI, an expert travel assistant that helps users plan amazing trips.

Your capabilities:
- Recommend hotels, flights, activities and attractions
- Create detailed itineraries
- Offer weather information, travel tips and advice

Formatting rules:
- Use short markdown sections with bold headings and bullet points
- Be friendly, knowledgeable and personalize recommendations to the user's preferences
- Never invent prices or availability; say when the user should confirm details

Respond with ONLY a JSON object with two fields:
- "message": your reply to the user as a markdown string
- "travelQuery": null, or an object with "type" (one of "hotels", "flights", "activities", "mixed") and optional "destination", "dates", "guests" and "budget" strings when the user is asking to find or book something
{{#if has_context}}

Real-time search context for the user's message. Use it when it is relevant and mention that it comes from a live search:
{{summary}}

Top results:
{{#each snippets}}
{{inc @index}}. {{title}} ({{link}}): {{snippet}}
{{/each}}
{{/if}}"#;

const HOTEL_SEARCH: &str = r"Great! I'll help you find the perfect accommodation{{dest_text}}. Here are some excellent options I found:

🏨 **Hotel Recommendations{{dest_text}}:**

**Luxury Options:**
- Premium hotels with world-class amenities
- 5-star service and prime locations
- Spa, fine dining, and concierge services

**Mid-Range Choices:**
- Comfortable hotels with great value
- Modern amenities and convenient locations
- Perfect balance of quality and price

**Budget-Friendly:**
- Clean, safe, and affordable options
- Essential amenities for comfortable stays
- Great for budget-conscious travelers

To get more specific recommendations, please let me know:
- Your travel dates
- Number of guests
- Preferred budget range
- Any special requirements (location, amenities, etc.)

I'll provide personalized hotel suggestions with booking links!";

const FLIGHT_SEARCH: &str = r"Perfect! I'll help you find the best flights{{dest_text}}. Here's what I can offer:

✈️ **Flight Search{{dest_text}}:**

**Flight Options:**
- Direct flights for convenience
- Connecting flights for better prices
- Flexible dates for savings
- Multiple airlines comparison

**Booking Benefits:**
- Real-time price tracking
- Flexible cancellation options
- Seat selection assistance
- Baggage information

**Travel Tips:**
- Book 6-8 weeks in advance for best prices
- Tuesday and Wednesday are often cheapest
- Consider nearby airports for savings

To find your perfect flight, I need:
- Departure city/airport
- Travel dates (or flexible date range)
- Number of passengers
- Preferred budget or class (economy/business)

I'll search across multiple airlines to find you the best deals!";

const ACTIVITY_SEARCH: &str = r"Exciting! I'll help you discover amazing activities{{dest_text}}. Here's what awaits you:

🎯 **Activities & Experiences{{dest_text}}:**

**Must-Do Attractions:**
- Iconic landmarks and monuments
- Museums and cultural sites
- Historical tours and experiences

**Adventure & Outdoor:**
- Hiking and nature excursions
- Water sports and beach activities
- Adventure tours and extreme sports

**Cultural Experiences:**
- Local food tours and cooking classes
- Traditional performances and festivals
- Art galleries and local markets

**Family-Friendly:**
- Theme parks and entertainment
- Interactive museums and zoos
- Kid-friendly tours and activities

Let me know more about your preferences:
- What type of activities interest you most?
- How many days will you be visiting?
- Any mobility requirements?
- Adventure level (relaxed, moderate, extreme)?

I'll create a personalized itinerary with the best activities for your trip!";

const DESTINATION_OVERVIEW: &str = r"{{destination}} is an amazing destination! I'm excited to help you plan your trip there.

🌟 **Why {{destination}} is Special:**
- Rich culture and history
- Incredible cuisine and dining
- Beautiful attractions and landmarks
- Unique local experiences

**I can help you with:**
🏨 **Accommodation** - From luxury hotels to budget-friendly options
✈️ **Flights** - Best routes and deals to {{destination}}
🎯 **Activities** - Must-see attractions and hidden gems
🍽️ **Dining** - Local cuisine and restaurant recommendations
🚗 **Transportation** - Getting around the city
📅 **Itinerary** - Day-by-day planning for your trip

**Next Steps:**
To create your perfect {{destination}} experience, tell me:
- When are you planning to visit?
- How long will you stay?
- What's your travel style? (luxury, mid-range, budget)
- What interests you most? (culture, food, nature, nightlife, etc.)

I'll create a customized travel plan just for you!";

/// Has no placeholders so it doubles as the reply of last resort.
pub const GENERAL_PLANNING: &str = r"I'd love to help you plan your trip! I can assist you with:

🏨 **Hotels & Accommodation** - Find the perfect place to stay
✈️ **Flights** - Search for the best flight options
🎯 **Activities** - Discover amazing things to do
🗺️ **Itineraries** - Plan your perfect travel schedule

To get started, tell me:
- Where would you like to go?
- When are you planning to travel?
- What type of experience are you looking for?

I'll provide personalized recommendations to make your trip unforgettable!";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Output is markdown and prompt text, not HTML
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("inc", Box::new(inc));
    let prompts = [
        (Prompt::TravelAssistant, TRAVEL_ASSISTANT_PROMPT),
        (Prompt::HotelSearch, HOTEL_SEARCH),
        (Prompt::FlightSearch, FLIGHT_SEARCH),
        (Prompt::ActivitySearch, ACTIVITY_SEARCH),
        (Prompt::DestinationOverview, DESTINATION_OVERVIEW),
        (Prompt::GeneralPlanning, GENERAL_PLANNING),
    ];
    for (prompt, template) in prompts {
        registry
            .register_template_string(&prompt.to_string(), template)
            .expect("Failed to register template");
    }
    registry
}

static TEMPLATES: LazyLock<Handlebars<'static>> = LazyLock::new(templates);

pub fn render<T: Serialize>(prompt: Prompt, data: &T) -> Result<String, Error> {
    Ok(TEMPLATES.render(&prompt.to_string(), data)?)
}
