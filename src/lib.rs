pub mod agent;
pub mod cache;
pub mod cli;
pub mod config;
pub mod embedded;
pub mod error;
pub mod escalation;
pub mod extract;
pub mod fetch;
pub mod files;
pub mod messages;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod router;
pub mod scoring;
pub mod search;
pub mod semantic;
pub mod source;
pub mod summarize;
pub mod tools;

pub use error::{PagebriefError, Result};
