pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod exercises;
pub mod health;
pub mod profile;
pub mod progress;
pub mod session;
pub mod workouts;
