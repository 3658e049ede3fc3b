//! Single-pass document walker
//!
//! Walks the parsed tree once, depth-first, collecting the page title,
//! heading counts, the link list with absolute URLs, and the
//! login-form flag. Malformed HTML is never an error; the parser
//! yields a best-effort tree. Only a bad base URL fails the walk.

use crate::html::gunzip_if_needed;
use crate::models::{HeadingCounts, Link, LinkKind};
use crate::{WalkError, WalkResult};
use scraper::{ElementRef, Html};
use url::Url;

const ACTION_KEYWORDS: [&str; 5] = ["login", "signin", "sign-in", "authenticate", "auth"];
const USERNAME_KEYWORDS: [&str; 5] = ["username", "user", "email", "login", "uid"];

/// Everything the walker learns about a page besides its links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// First non-empty `<title>` text, whitespace-trimmed
    pub title: String,

    /// Headings counted per level; empty headings are not counted
    pub heading_counts: HeadingCounts,

    /// True if any form matches the login heuristic
    pub has_login_form: bool,
}

/// Walks a document and extracts its summary and link list.
///
/// `base_url` must be absolute; it anchors relative hrefs and decides
/// the internal/external classification by host equality.
pub fn walk(bytes: &[u8], base_url: &str) -> WalkResult<(WalkSummary, Vec<Link>)> {
    let base = Url::parse(base_url).map_err(|_| WalkError::BadBase {
        url: base_url.to_string(),
    })?;

    let bytes = gunzip_if_needed(bytes);
    let text = String::from_utf8_lossy(&bytes);
    let document = Html::parse_document(&text);

    let mut summary = WalkSummary::default();
    let mut links = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        match element.value().name() {
            "title" => {
                if summary.title.is_empty() {
                    summary.title = element.text().collect::<String>().trim().to_string();
                }
            }
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                if !element.text().collect::<String>().trim().is_empty() {
                    summary.heading_counts.record(tag);
                }
            }
            "a" => {
                if let Some(link) = extract_link(element, &base) {
                    links.push(link);
                }
            }
            "form" => {
                if is_login_form(element) {
                    summary.has_login_form = true;
                }
            }
            _ => {}
        }
    }

    Ok((summary, links))
}

/// Extracts a link from an anchor element, or None if it is skipped.
///
/// Skipped: missing/empty href, fragment-only, javascript:, mailto:,
/// tel:, and hrefs that fail to resolve against the base.
fn extract_link(element: ElementRef, base: &Url) -> Option<Link> {
    let href = element.value().attr("href")?.trim();

    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let resolved = match base.join(href) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!(href, error = %e, "failed to resolve link URL");
            return None;
        }
    };

    // Host equality covers the port: hosts differing only by port are
    // different authorities.
    let kind = match (resolved.host_str(), base.host_str()) {
        (None, _) => LinkKind::Internal,
        (Some(host), Some(base_host))
            if host.eq_ignore_ascii_case(base_host)
                && resolved.port_or_known_default() == base.port_or_known_default() =>
        {
            LinkKind::Internal
        }
        _ => LinkKind::External,
    };

    Some(Link::new(
        resolved.to_string(),
        collapse_whitespace(element.text()),
        kind,
    ))
}

/// Concatenates text fragments with runs of whitespace collapsed to
/// single spaces.
fn collapse_whitespace<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    let joined = fragments.collect::<String>();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Login-form heuristic.
///
/// A form qualifies if its action contains a login-ish keyword, or it
/// holds a password input together with a username-ish input.
fn is_login_form(form: ElementRef) -> bool {
    if let Some(action) = form.value().attr("action") {
        let action = action.to_lowercase();
        if ACTION_KEYWORDS.iter().any(|k| action.contains(k)) {
            return true;
        }
    }

    let mut has_password = false;
    let mut has_username = false;

    for node in form.descendants() {
        let Some(input) = ElementRef::wrap(node) else {
            continue;
        };
        if input.value().name() != "input" {
            continue;
        }

        if let Some(kind) = input.value().attr("type") {
            if kind.eq_ignore_ascii_case("password") {
                has_password = true;
            }
        }

        if let Some(name) = input.value().attr("name") {
            let name = name.to_lowercase();
            if USERNAME_KEYWORDS.iter().any(|k| name.contains(k)) {
                has_username = true;
            }
        }
    }

    has_password && has_username
}
