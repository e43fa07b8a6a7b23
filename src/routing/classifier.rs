// routing/classifier.rs - Route classification for the request-time gate
//
// Rules are evaluated in a fixed order, first match wins:
//   1. api/trpc first segment      -> Api
//   2. reserved framework prefix   -> Excluded (live endpoints fall through)
//   3. static asset extension      -> Excluded
//   4. protected-area prefix       -> Page { protected: true }
//   5. anything else               -> Page { protected: false }

use serde::Serialize;

use crate::config::SiteConfig;

/// File extensions treated as static assets. `json` is deliberately absent.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff", "woff2",
    "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
];

/// First path segments that mark API traffic
pub const API_SEGMENTS: &[&str] = &["api", "trpc"];

/// Framework-internal prefix whose contents are static build output
pub const RESERVED_PREFIX: &str = "/_next/";

/// Paths under the reserved prefix that are live endpoints, not files
pub const RESERVED_LIVE_ENDPOINTS: &[&str] = &["/_next/image"];

/// Classification of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RouteClass {
    /// Static asset or framework internals; never gated
    Excluded,
    /// API surface; the gate runs but does not force authentication
    Api,
    /// Page route, protected when under the authenticated-area prefix
    Page { protected: bool },
}

impl RouteClass {
    pub fn is_protected(&self) -> bool {
        matches!(self, RouteClass::Page { protected: true })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteClass::Excluded => "excluded",
            RouteClass::Api => "api",
            RouteClass::Page { protected: true } => "protected page",
            RouteClass::Page { protected: false } => "public page",
        }
    }
}

/// Classifies request paths against the site's protected prefix
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    protected_prefix: String,
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

impl RouteClassifier {
    pub fn new(protected_prefix: impl Into<String>) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
        }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(site.protected_prefix.clone())
    }

    /// Classify a raw request path, which may still carry a query string
    pub fn classify(&self, raw_path: &str) -> RouteClass {
        let path = strip_query(raw_path);

        if is_api_path(path) {
            return RouteClass::Api;
        }
        if is_reserved_internal(path) {
            return RouteClass::Excluded;
        }
        if has_excluded_extension(path) {
            return RouteClass::Excluded;
        }
        RouteClass::Page {
            protected: self.is_protected_page(raw_path),
        }
    }

    /// Literal, case-sensitive prefix comparison against the raw path
    pub fn is_protected_page(&self, raw_path: &str) -> bool {
        raw_path.starts_with(&self.protected_prefix)
    }
}

fn strip_query(raw_path: &str) -> &str {
    raw_path.split_once('?').map_or(raw_path, |(path, _)| path)
}

fn first_segment(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}

fn is_api_path(path: &str) -> bool {
    API_SEGMENTS.contains(&first_segment(path))
}

fn is_reserved_internal(path: &str) -> bool {
    path.starts_with(RESERVED_PREFIX) && !RESERVED_LIVE_ENDPOINTS.contains(&path)
}

fn has_excluded_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    last_segment
        .rsplit_once('.')
        .map_or(false, |(_, ext)| EXCLUDED_EXTENSIONS.contains(&ext))
}
