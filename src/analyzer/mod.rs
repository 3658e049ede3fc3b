//! Analysis orchestrator
//!
//! Drives fetch → version detection → walk → link probing → aggregation
//! for one URL under one deadline. Root-document failures are terminal;
//! link-level failures degrade to per-link statuses and never abort the
//! request.

use crate::fetch::Fetch;
use crate::html::{detect_document_version, walk};
use crate::models::{AnalysisReport, Link, LinkKind, LinkStatus, LinkSummary};
use crate::probe::LinkProbeEngine;
use crate::{AnalysisError, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;
use url::Url;

/// Orchestrates one analysis request end to end
///
/// Holds its collaborators as injected dependencies; nothing here is
/// reached through globals.
pub struct Analyzer {
    fetcher: Arc<dyn Fetch>,
    engine: Arc<LinkProbeEngine>,
}

impl Analyzer {
    pub fn new(fetcher: Arc<dyn Fetch>, engine: Arc<LinkProbeEngine>) -> Self {
        Self { fetcher, engine }
    }

    /// Analyzes one page and returns the full report.
    ///
    /// The deadline bounds the whole request: root fetch, walk, and
    /// the probe batch. Probes that miss it come back as synthesized
    /// timeout statuses inside a still-successful report.
    pub async fn analyze(&self, deadline: Instant, url: &str) -> Result<AnalysisReport> {
        Url::parse(url).map_err(|_| AnalysisError::BadRequest {
            url: url.to_string(),
        })?;

        let started = std::time::Instant::now();
        tracing::info!(url, "starting analysis");

        let page = self
            .fetcher
            .fetch(deadline, url)
            .await
            .map_err(|source| AnalysisError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if page.status >= 400 {
            return Err(AnalysisError::Http {
                url: url.to_string(),
                code: page.status,
            });
        }

        let document_version = detect_document_version(&page.body);

        let (summary, links) =
            walk(&page.body, url).map_err(|source| AnalysisError::Parse {
                url: url.to_string(),
                source,
            })?;

        let statuses = match self.engine.check_batch(deadline, &links).await {
            Ok(statuses) => statuses,
            Err(e) => {
                // Engine shutdown mid-request: the report still goes
                // out, with every link marked inaccessible.
                tracing::warn!(url, error = %e, "link probe engine unavailable");
                links
                    .iter()
                    .cloned()
                    .map(|link| LinkStatus::failed(link, e.to_string()))
                    .collect()
            }
        };

        let link_summary = summarize_links(&links, &statuses);

        tracing::info!(
            url,
            links_found = links.len(),
            inaccessible = link_summary.inaccessible,
            duration = ?started.elapsed(),
            "analysis completed"
        );

        Ok(AnalysisReport {
            url: url.to_string(),
            title: summary.title,
            document_version,
            heading_counts: summary.heading_counts,
            link_summary,
            has_login_form: summary.has_login_form,
            analyzed_at: Utc::now(),
        })
    }
}

/// Aggregates classification totals and the inaccessible count.
fn summarize_links(links: &[Link], statuses: &[LinkStatus]) -> LinkSummary {
    let mut summary = LinkSummary {
        total: links.len(),
        ..Default::default()
    };

    for link in links {
        match link.kind {
            LinkKind::Internal => summary.internal += 1,
            LinkKind::External => summary.external += 1,
        }
    }

    summary.inaccessible = statuses.iter().filter(|s| !s.accessible).count();
    summary
}
