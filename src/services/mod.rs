pub mod budget_service;
pub mod carbon_service;
pub mod insight_service;
pub mod itinerary_generation_service;
pub mod preference_service;
pub mod prompt_service;
pub mod reference_data;
