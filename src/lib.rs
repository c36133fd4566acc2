pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod places;
pub mod planner;
pub mod routes;
pub mod state;
