//! Client-side auth-state redirector.
//!
//! Keeps the browser location consistent with the caller's sign-in state as
//! it resolves after page load. One `AuthRedirector` is owned by one mounted
//! view; its remembered sign-in value is never shared.
//!
//! `observe` is re-run whenever `is_loaded`, `is_signed_in`, or the pathname
//! changes. Only genuine sign-in/sign-out transitions (and the first resolved
//! observation) can navigate, so ordinary page-to-page navigation with an
//! unchanged auth state never triggers a redirect.

use serde::Serialize;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::routing::RouteClassifier;

/// Auth state as reported by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuthState {
    pub is_loaded: bool,
    pub is_signed_in: Option<bool>,
}

impl AuthState {
    pub fn loading() -> Self {
        Self { is_loaded: false, is_signed_in: None }
    }

    pub fn signed_in() -> Self {
        Self { is_loaded: true, is_signed_in: Some(true) }
    }

    pub fn signed_out() -> Self {
        Self { is_loaded: true, is_signed_in: Some(false) }
    }

    /// Sign-in value once loaded; an unresolved flag after load counts as signed out
    pub fn resolved(&self) -> Option<bool> {
        self.is_loaded.then(|| self.is_signed_in.unwrap_or(false))
    }
}

/// Which branch of the state machine an observation falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectPhase {
    Uninitialized,
    InitialResolved,
    Unchanged,
    TransitionToSignedIn,
    TransitionToSignedOut,
}

/// Navigation issued by the redirector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Redirect {
    ToHome,
    ToDashboard,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation to {path} failed: {reason}")]
    Failed { path: String, reason: String },
}

/// Navigation capability, the router's `push`
pub trait Navigator {
    fn push(&mut self, path: &str) -> Result<(), NavigationError>;
}

/// Navigator that records every pushed path in order
#[derive(Debug, Default, Clone)]
pub struct HistoryNavigator {
    pub history: Vec<String>,
}

impl Navigator for HistoryNavigator {
    fn push(&mut self, path: &str) -> Result<(), NavigationError> {
        self.history.push(path.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AuthRedirector {
    classifier: RouteClassifier,
    home_path: String,
    dashboard_path: String,
    previous: Option<bool>,
}

impl Default for AuthRedirector {
    fn default() -> Self {
        Self::new(&SiteConfig::default())
    }
}

impl AuthRedirector {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            classifier: RouteClassifier::from_site(site),
            home_path: site.home_path.clone(),
            dashboard_path: site.dashboard_path.clone(),
            previous: None,
        }
    }

    /// Last sign-in value acted upon, `None` until the first resolved observation
    pub fn previous(&self) -> Option<bool> {
        self.previous
    }

    pub fn phase(&self, state: AuthState) -> RedirectPhase {
        match (state.resolved(), self.previous) {
            (None, _) => RedirectPhase::Uninitialized,
            (Some(_), None) => RedirectPhase::InitialResolved,
            (Some(current), Some(previous)) if current == previous => RedirectPhase::Unchanged,
            (Some(true), Some(false)) => RedirectPhase::TransitionToSignedIn,
            (Some(_), Some(_)) => RedirectPhase::TransitionToSignedOut,
        }
    }

    /// React to the current auth state and pathname.
    ///
    /// A navigation failure propagates unhandled and leaves the remembered
    /// sign-in value untouched.
    pub fn observe<N>(
        &mut self,
        state: AuthState,
        pathname: &str,
        navigator: &mut N,
    ) -> Result<Option<Redirect>, NavigationError>
    where
        N: Navigator + ?Sized,
    {
        let phase = self.phase(state);
        let Some(signed_in) = state.resolved() else {
            return Ok(None);
        };

        let is_protected = self.classifier.is_protected_page(pathname);
        let decision = match phase {
            RedirectPhase::Uninitialized | RedirectPhase::Unchanged => return Ok(None),
            RedirectPhase::InitialResolved => {
                if !signed_in && is_protected {
                    tracing::info!("Signed out user on protected route, redirecting to home from: {}", pathname);
                    Some(Redirect::ToHome)
                } else {
                    None
                }
            }
            RedirectPhase::TransitionToSignedIn => {
                tracing::info!("User signed in, redirecting to dashboard from: {}", pathname);
                Some(Redirect::ToDashboard)
            }
            RedirectPhase::TransitionToSignedOut => {
                if is_protected {
                    tracing::info!("User signed out from protected page, redirecting to home from: {}", pathname);
                    Some(Redirect::ToHome)
                } else {
                    None
                }
            }
        };

        if let Some(redirect) = decision {
            navigator.push(self.target(redirect))?;
        }

        self.previous = Some(signed_in);
        Ok(decision)
    }

    pub fn target(&self, redirect: Redirect) -> &str {
        match redirect {
            Redirect::ToHome => &self.home_path,
            Redirect::ToDashboard => &self.dashboard_path,
        }
    }
}
