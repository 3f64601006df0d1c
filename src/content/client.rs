//! Read-only CMS client
//!
//! Thin fetch wrapper over the CMS collections the pages render. Failures
//! never crash a page: callers go through [`or_empty`] and fall back to
//! the "no items" placeholder state.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::types::{Envelope, Event, HomeCard, Project, TeamMember};
use crate::config;

/// Why a CMS read failed
#[derive(Debug)]
pub enum ContentError {
    /// Request never completed (DNS, refused connection, aborted fetch)
    Transport(reqwest::Error),
    /// Server answered with a non-success status
    Status(StatusCode),
    /// Body was not the expected envelope shape
    Decode(reqwest::Error),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::Transport(e) => write!(f, "cms request failed: {e}"),
            ContentError::Status(status) => write!(f, "cms returned {status}"),
            ContentError::Decode(e) => write!(f, "cms response malformed: {e}"),
        }
    }
}

impl std::error::Error for ContentError {}

impl From<reqwest::Error> for ContentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ContentError::Decode(e)
        } else {
            ContentError::Transport(e)
        }
    }
}

/// Client over the configured CMS instance
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ContentClient {
    /// Client for the process-wide configured CMS
    pub fn new() -> Self {
        let config = config::get();
        Self::with_base(config.cms_base_url.clone(), config.cms_token.clone())
    }

    pub fn with_base(base_url: String, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    async fn collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ContentError> {
        let url = format!(
            "{}/api/{}?populate=*",
            self.base_url.trim_end_matches('/'),
            path
        );
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status(status));
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope
            .data
            .into_iter()
            .map(|entry| entry.attributes)
            .collect())
    }

    pub async fn team_members(&self) -> Result<Vec<TeamMember>, ContentError> {
        self.collection("team-members").await
    }

    pub async fn events(&self) -> Result<Vec<Event>, ContentError> {
        self.collection("events").await
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ContentError> {
        self.collection("projects").await
    }

    /// Home cards, sorted by their ordering index
    pub async fn home_cards(&self) -> Result<Vec<HomeCard>, ContentError> {
        let mut cards: Vec<HomeCard> = self.collection("home-cards").await?;
        cards.sort_by_key(|card| card.order);
        Ok(cards)
    }
}

impl Default for ContentClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Page-level catch: log the failure and render the empty state
pub fn or_empty<T>(result: Result<Vec<T>, ContentError>, what: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            log::error!("failed to load {what}: {e}");
            Vec::new()
        }
    }
}
