// handlers/pages.rs - Page route descriptors
//
// Page markup is rendered client-side; the server answers page routes with a
// small JSON descriptor so gated and public pages are real routes.

use axum::{
    extract::State,
    http::Uri,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Known page routes and their titles
pub const PAGES: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/public/app-info", "App Info"),
    ("/public/contact-us", "Contact Us"),
    ("/application", "Application"),
    ("/application/dashboard", "Dashboard"),
    ("/application/user-page", "User Profile"),
];

#[derive(Debug, Serialize)]
pub struct PageDescriptor {
    pub path: &'static str,
    pub title: &'static str,
    pub protected: bool,
}

/// Fallback for any request no API route or static file matched
pub async fn page(State(state): State<AppState>, uri: Uri) -> Response {
    match find_page(uri.path()) {
        Some((path, title)) => Json(PageDescriptor {
            path,
            title,
            protected: state.classifier.is_protected_page(path),
        })
        .into_response(),
        None => ApiError::not_found("Page not found").into_response(),
    }
}

fn find_page(path: &str) -> Option<(&'static str, &'static str)> {
    let normalized = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    PAGES.iter().copied().find(|(page, _)| *page == normalized)
}
