//! Resume intake service: a multipart `POST /apply` endpoint that stages the
//! uploaded resume, stores it locally or in S3, and records the application
//! in PostgreSQL, plus the form client that submits to it.

pub mod applications;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod state;
pub mod telemetry;
