pub mod auth;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod image_host;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod validators;
