//! # AlFra server
//! This crate hosts the HTTP server for the AlFra order mirror. It is responsible for:
//! * Pulling recent sales from the Fudo point of sale and mirroring them into the order store.
//! * Receiving Fudo webhook calls and refreshing the sale they name.
//! * Letting authenticated staff move orders through their statuses.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `GET /api/fudo/sync`: Mirrors the most recent Fudo sales.
//! * `POST /api/fudo/webhook?secret=...`: Webhook receiver for Fudo.
//! * `POST /api/orders/status`: Changes the status of an order. Requires a bearer token.
//! * `GET /api/orders/day/{YYYY-MM-DD}`: Orders for one calendar day. Requires a bearer token.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
