//! Care-services booking marketplace: a public service catalog, a booking and
//! payment flow, and an admin back office, served as an HTTP JSON API over
//! SQLite.

pub mod auth;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod pagination;
pub mod payments;
pub mod routes;
pub mod state;
