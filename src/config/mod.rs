//! Configuration module - environment-sourced credentials and endpoints
//!
//! All external credentials (Astra DB token + database id, Google API
//! key) are read once at startup. A missing credential fails fast here,
//! before any workflow runs, rather than mid-invocation.

use anyhow::{Context, Result};
use url::Url;

/// Default Astra collection holding the recipe documents
pub const DEFAULT_COLLECTION: &str = "qa_mini_demo";

/// Default Astra keyspace
pub const DEFAULT_KEYSPACE: &str = "default_keyspace";

/// Default Astra region (part of the database endpoint hostname)
const DEFAULT_REGION: &str = "us-east1";

/// Required environment variables, in check order
pub const REQUIRED_VARS: &[&str] = &[
    "ASTRA_DB_APPLICATION_TOKEN",
    "ASTRA_DB_ID",
    "GOOGLE_API_KEY",
];

// ============================================================================
// Config
// ============================================================================

/// Runtime configuration, validated up front
#[derive(Debug, Clone)]
pub struct Config {
    /// Astra DB application token (`AstraCS:...`)
    pub astra_token: String,
    /// Astra database id (UUID)
    pub astra_db_id: String,
    /// Astra database region
    pub astra_region: String,
    /// Google AI API key (Gemini embedding + routing)
    pub google_api_key: String,
    /// Vector collection name
    pub collection: String,
    /// Keyspace the collection lives in
    pub keyspace: String,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Required: `ASTRA_DB_APPLICATION_TOKEN`, `ASTRA_DB_ID`, and
    /// `GOOGLE_API_KEY` (or `GEMINI_API_KEY` as fallback).
    /// Optional: `ASTRA_DB_REGION`, `THAIRECIPES_COLLECTION`,
    /// `THAIRECIPES_KEYSPACE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let astra_token = require(&lookup, "ASTRA_DB_APPLICATION_TOKEN")
            .context("Astra DB token missing")?;
        let astra_db_id = require(&lookup, "ASTRA_DB_ID").context("Astra DB id missing")?;

        // GOOGLE_API_KEY with GEMINI_API_KEY fallback
        let google_api_key = get(&lookup, "GOOGLE_API_KEY")
            .or_else(|| get(&lookup, "GEMINI_API_KEY"))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "API key not found. Set GOOGLE_API_KEY or GEMINI_API_KEY environment variable.\n\
                     Get your API key at: https://aistudio.google.com/app/apikey"
                )
            })?;

        Ok(Self {
            astra_token,
            astra_db_id,
            astra_region: get(&lookup, "ASTRA_DB_REGION")
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            google_api_key,
            collection: get(&lookup, "THAIRECIPES_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            keyspace: get(&lookup, "THAIRECIPES_KEYSPACE")
                .unwrap_or_else(|| DEFAULT_KEYSPACE.to_string()),
        })
    }

    /// Base URL of the Astra database endpoint
    pub fn astra_endpoint(&self) -> Result<Url> {
        let raw = format!(
            "https://{}-{}.apps.astra.datastax.com",
            self.astra_db_id, self.astra_region
        );
        Url::parse(&raw).with_context(|| format!("Invalid Astra endpoint: {}", raw))
    }

    /// Names of required variables missing from the environment
    pub fn missing_from_env() -> Vec<&'static str> {
        Self::missing(|key| std::env::var(key).ok())
    }

    /// Names of required variables missing from the given lookup
    pub fn missing(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
        REQUIRED_VARS
            .iter()
            .filter(|&&name| {
                if name == "GOOGLE_API_KEY" {
                    get(&lookup, "GOOGLE_API_KEY").is_none()
                        && get(&lookup, "GEMINI_API_KEY").is_none()
                } else {
                    get(&lookup, name).is_none()
                }
            })
            .copied()
            .collect()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Lookup a variable, treating empty values as unset
fn get(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Lookup a required variable
fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    get(lookup, key)
        .ok_or_else(|| anyhow::anyhow!("{} not set. Set: export {}=...", key, key))
}

// ============================================================================
// Tests
// ============================================================================
