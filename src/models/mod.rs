//! Data model for analysis requests, link probing, and reports
//!
//! Everything here crosses the JSON boundary, so the structs double as
//! wire types. Links and statuses are born inside one request and die
//! with its response; nothing is shared across requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a hyperlink relative to the base document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Resolved host is empty or equals the base document's host
    Internal,
    /// Any other resolved host
    External,
}

/// A hyperlink extracted from the analyzed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL, resolved against the document base
    pub url: String,

    /// Visible anchor text, whitespace-collapsed
    pub text: String,

    /// Internal or external, by host equality
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

impl Link {
    pub fn new(url: impl Into<String>, text: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            kind,
        }
    }
}

/// The probe outcome for a single link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStatus {
    /// The originating link (copied, not referenced)
    pub link: Link,

    /// True iff the probe completed with a status in [200, 399]
    pub accessible: bool,

    /// Observed status code; 0 if the probe did not complete
    pub status_code: u16,

    /// Failure summary; empty iff accessible
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    /// When the probe completed or was abandoned
    pub checked_at: DateTime<Utc>,
}

impl LinkStatus {
    /// Probe completed and the target answered with an accessible code.
    pub fn reached(link: Link, status_code: u16) -> Self {
        Self {
            link,
            accessible: true,
            status_code,
            error: String::new(),
            checked_at: Utc::now(),
        }
    }

    /// Probe completed but the target answered with an error code.
    pub fn unreachable(link: Link, status_code: u16) -> Self {
        Self {
            link,
            accessible: false,
            status_code,
            error: format!("HTTP {}", status_code),
            checked_at: Utc::now(),
        }
    }

    /// Probe failed before any status code was observed.
    pub fn failed(link: Link, error: impl Into<String>) -> Self {
        Self {
            link,
            accessible: false,
            status_code: 0,
            error: error.into(),
            checked_at: Utc::now(),
        }
    }

    /// Synthesized status for a link the batch never finished probing.
    pub fn timed_out(link: Link) -> Self {
        Self::failed(link, "check timeout or not processed")
    }

    /// Rebinds this status to another occurrence of the same URL.
    pub fn with_link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }
}

/// Count of headings at each of the six levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

impl HeadingCounts {
    /// Increments the count for a heading tag name ("h1".."h6").
    ///
    /// Returns false for any other tag name.
    pub fn record(&mut self, tag: &str) -> bool {
        match tag {
            "h1" => self.h1 += 1,
            "h2" => self.h2 += 1,
            "h3" => self.h3 += 1,
            "h4" => self.h4 += 1,
            "h5" => self.h5 += 1,
            "h6" => self.h6 += 1,
            _ => return false,
        }
        true
    }

    pub fn total(&self) -> u32 {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }
}

/// Totals over the link list of one report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub total: usize,
    pub internal: usize,
    pub external: usize,
    pub inaccessible: usize,
}

/// The complete analysis of one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub url: String,
    pub title: String,
    pub document_version: String,
    pub heading_counts: HeadingCounts,
    pub link_summary: LinkSummary,
    pub has_login_form: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            status_code,
            timestamp: Utc::now(),
        }
    }
}

/// Response body for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
