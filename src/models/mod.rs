pub mod activity;
pub mod budget;
pub mod group;
pub mod itinerary;
