//! # pubsub-publisher
//!
//! A small publishing client for GCP Pub/Sub compatible services.
//!
//! Credentials come from an injected [`auth::CredentialsProvider`], messages go
//! out through a [`backend::PublishBackend`] (the Pub/Sub REST API or an
//! in-memory backend), and [`client::PublisherClient`] ties the two together:
//! one JSON payload per call, each call awaited until the backend answers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod backend;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod sample;
pub mod types;

pub use error::{Error, Result};
