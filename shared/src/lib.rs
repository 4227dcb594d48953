//! Shared library for the Valentine poem Lambda functions.
//!
//! This crate provides the poem pipeline, integration clients and HTTP helpers used across all Lambda functions.

pub mod background;
pub mod config;
pub mod error;
pub mod http;
pub mod ideation;
pub mod mail;
pub mod models;
pub mod oauth;
pub mod poet;
pub mod render;
pub mod secrets;
pub mod service;
pub mod social;
pub mod themes;
pub mod tweet_log;
pub mod validation;

pub use config::{BackgroundMode, Config, DeliveryMode};
pub use error::{Error, Result};
pub use http::ErrorBody;
pub use models::{GeneratePoemResponse, HealthResponse, PoemRequest, SocialPostRecord};
pub use render::{Artifact, ArtifactFormat};
pub use secrets::{get_secret, load_config};
pub use service::PoemService;
