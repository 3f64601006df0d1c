//! CMS record types
//!
//! The headless CMS wraps every list response in a
//! `{ "data": [ { "id", "attributes": {…} } ] }` envelope; the public
//! types below are the attribute records the pages actually render.

use std::collections::BTreeMap;

use serde::Deserialize;

/// List envelope around a CMS collection
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Vec<Entry<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entry<T> {
    #[allow(dead_code)]
    pub id: u64,
    pub attributes: T,
}

/// About-page team member
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub social_handle: Option<String>,
}

/// Events-page entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Work/portfolio project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Free-form stat labels ("students reached" → "120", …)
    #[serde(default)]
    pub stats: BTreeMap<String, String>,
    #[serde(default)]
    pub featured: bool,
}

/// Home-page promotional card
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeCard {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Icon identifier resolved by the host page
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i32,
}
