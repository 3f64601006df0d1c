//! HTML fragments for the CMS-backed sections
//!
//! Pure string builders consumed by the wasm entry point. An empty
//! collection (no records, or a fetch that fell back through `or_empty`)
//! renders a visible "no items" placeholder instead of wiping the section.

use super::types::{Event, HomeCard, Project, TeamMember};

const EMPTY_STATE: &str = "<p class=\"empty\">Nothing here yet \u{2014} check back soon.</p>";

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn list_or_empty(items: String) -> String {
    if items.is_empty() {
        EMPTY_STATE.to_string()
    } else {
        items
    }
}

pub fn team_members_html(members: &[TeamMember]) -> String {
    list_or_empty(
        members
            .iter()
            .map(|m| {
                format!(
                    "<article class=\"team-card\"><h3>{}</h3><p class=\"role\">{}</p><p>{}</p></article>",
                    escape(&m.name),
                    escape(&m.role),
                    escape(&m.description),
                )
            })
            .collect(),
    )
}

pub fn events_html(events: &[Event]) -> String {
    list_or_empty(
        events
            .iter()
            .map(|e| {
                format!(
                    "<article class=\"event-card{}\"><h3>{}</h3><p class=\"when\">{} {}</p><p class=\"where\">{}</p><p>{}</p></article>",
                    if e.featured { " featured" } else { "" },
                    escape(&e.title),
                    escape(&e.date),
                    escape(&e.time),
                    escape(&e.location),
                    escape(&e.description),
                )
            })
            .collect(),
    )
}

pub fn projects_html(projects: &[Project]) -> String {
    list_or_empty(
        projects
            .iter()
            .map(|p| {
                let stats: String = p
                    .stats
                    .iter()
                    .map(|(k, v)| format!("<li><b>{}</b> {}</li>", escape(v), escape(k)))
                    .collect();
                format!(
                    "<article class=\"project-card\"><h3>{}</h3><p>{}</p><ul class=\"stats\">{}</ul></article>",
                    escape(&p.title),
                    escape(&p.description),
                    stats,
                )
            })
            .collect(),
    )
}

pub fn home_cards_html(cards: &[HomeCard]) -> String {
    list_or_empty(
        cards
            .iter()
            .map(|c| {
                format!(
                    "<article class=\"home-card\" data-icon=\"{}\"><h3>{}</h3><p>{}</p></article>",
                    escape(&c.icon),
                    escape(&c.title),
                    escape(&c.description),
                )
            })
            .collect(),
    )
}
