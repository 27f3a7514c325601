//! Meeting link validation and parsing.
//!
//! Accepts links on the known meeting domains that also carry a recognizable
//! meeting marker, and pulls out whatever identifiers the link carries.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MEETING_DOMAINS: [&str; 4] = [
    "teams.microsoft.com",
    "teams.live.com",
    "meet.lync.com",
    "join.skype.com",
];

const MEETING_MARKERS: [&str; 7] = [
    "meetup-join",
    "meeting_id",
    "conf-id",
    "19:meeting_",
    "19%3ameeting_",
    "/m/",
    "join.skype.com",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMeetingUrl {
    #[error("meeting url is empty")]
    Empty,

    #[error("meeting url could not be parsed: {0}")]
    Unparseable(String),

    #[error("'{0}' is not a supported meeting domain")]
    UnsupportedDomain(String),

    #[error("url does not look like a meeting link")]
    NotAMeetingLink,
}

/// Parses and checks a join link.
pub fn validate_meeting_url(meeting_url: &str) -> Result<Url, InvalidMeetingUrl> {
    let trimmed = meeting_url.trim();
    if trimmed.is_empty() {
        return Err(InvalidMeetingUrl::Empty);
    }

    let url = Url::parse(trimmed).map_err(|e| InvalidMeetingUrl::Unparseable(e.to_string()))?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let on_known_domain = MEETING_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));
    if !on_known_domain {
        return Err(InvalidMeetingUrl::UnsupportedDomain(host));
    }

    let lowered = trimmed.to_ascii_lowercase();
    if !MEETING_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return Err(InvalidMeetingUrl::NotAMeetingLink);
    }

    Ok(url)
}

pub fn is_valid_meeting_url(meeting_url: &str) -> bool {
    validate_meeting_url(meeting_url).is_ok()
}

/// Text following `marker` up to the first of `stops`, if non-empty.
fn capture_after(haystack: &str, marker: &str, stops: &[char]) -> Option<String> {
    let start = haystack.find(marker)? + marker.len();
    let rest = &haystack[start..];
    let end = rest.find(|c: char| stops.contains(&c)).unwrap_or(rest.len());
    let value = &rest[..end];
    (!value.is_empty()).then(|| value.to_string())
}

/// Meeting identifier used to address the call.
pub fn extract_meeting_id(meeting_url: &str) -> Option<String> {
    capture_after(meeting_url, "meetup-join/", &['/', '?'])
        .or_else(|| capture_after(meeting_url, "meeting_id=", &['&']))
        .or_else(|| capture_after(meeting_url, "/m/", &['/', '?']))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    MeetupJoin,
    TeamsWeb,
    TeamsLive,
    Unknown,
}

/// Identifiers carried by a meeting link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MeetingLinkInfo {
    pub meeting_id: Option<String>,
    pub thread_id: Option<String>,
    pub organizer_id: Option<String>,
    pub tenant_id: Option<String>,
    pub conference_id: Option<String>,
    pub kind: Option<LinkKind>,
}

impl MeetingLinkInfo {
    pub fn parse(meeting_url: &str) -> Self {
        let mut info = MeetingLinkInfo {
            meeting_id: capture_after(meeting_url, "meetup-join/", &['/', '?']),
            thread_id: capture_after(meeting_url, "19:meeting_", &['@'])
                .or_else(|| capture_after(meeting_url, "19%3ameeting_", &['%', '@'])),
            organizer_id: capture_after(meeting_url, "organizer=", &['&']),
            tenant_id: capture_after(meeting_url, "tenant=", &['&']),
            conference_id: capture_after(meeting_url, "conf-id=", &['&']),
            kind: None,
        };

        let lowered = meeting_url.to_ascii_lowercase();
        info.kind = Some(if lowered.contains("teams.microsoft.com") {
            if lowered.contains("meetup-join") {
                LinkKind::MeetupJoin
            } else {
                LinkKind::TeamsWeb
            }
        } else if lowered.contains("teams.live.com") {
            LinkKind::TeamsLive
        } else {
            LinkKind::Unknown
        });

        if let Ok(url) = Url::parse(meeting_url.trim()) {
            for (key, value) in url.query_pairs() {
                if value.is_empty() {
                    continue;
                }
                match key.as_ref() {
                    "meetingID" => info.meeting_id = Some(value.into_owned()),
                    "threadId" => info.thread_id = Some(value.into_owned()),
                    "tenantId" => info.tenant_id = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        info
    }
}
