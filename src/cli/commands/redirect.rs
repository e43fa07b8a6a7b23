use std::str::FromStr;

use clap::Args;
use serde::Serialize;

use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::config::{self, SiteConfig};
use crate::redirect::{AuthRedirector, AuthState, HistoryNavigator, Redirect, RedirectPhase};

#[derive(Args)]
pub struct RedirectArgs {
    #[arg(long, default_value = "/", help = "Pathname the view starts on")]
    pub path: String,

    #[arg(
        required = true,
        help = "Events in order: loading, signed-in, signed-out, unresolved, goto:<path>"
    )]
    pub events: Vec<String>,
}

/// One input to the simulated view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Auth state update
    Auth(AuthState),
    /// Client-side navigation with unchanged auth state
    Goto(String),
}

impl FromStr for Event {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(Event::Auth(AuthState::loading())),
            "signed-in" => Ok(Event::Auth(AuthState::signed_in())),
            "signed-out" => Ok(Event::Auth(AuthState::signed_out())),
            // Loaded, but the provider never said either way
            "unresolved" => Ok(Event::Auth(AuthState { is_loaded: true, is_signed_in: None })),
            other => match other.strip_prefix("goto:") {
                Some(path) if path.starts_with('/') => Ok(Event::Goto(path.to_string())),
                _ => anyhow::bail!("unknown event '{}'", other),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub event: String,
    pub pathname: String,
    pub phase: RedirectPhase,
    pub redirect: Option<Redirect>,
}

/// Run the redirector over `events`, following each navigation it issues
pub fn simulate(site: &SiteConfig, start: &str, events: &[String]) -> anyhow::Result<(Vec<Step>, Vec<String>)> {
    let mut redirector = AuthRedirector::new(site);
    let mut navigator = HistoryNavigator::default();
    let mut state = AuthState::loading();
    let mut pathname = start.to_string();
    let mut steps = Vec::with_capacity(events.len());

    for raw in events {
        match raw.parse::<Event>()? {
            Event::Auth(next) => state = next,
            Event::Goto(path) => pathname = path,
        }

        let phase = redirector.phase(state);
        let redirect = redirector.observe(state, &pathname, &mut navigator)?;
        steps.push(Step {
            event: raw.clone(),
            pathname: pathname.clone(),
            phase,
            redirect,
        });

        if let Some(redirect) = redirect {
            pathname = redirector.target(redirect).to_string();
        }
    }

    Ok((steps, navigator.history))
}

pub fn handle(args: &RedirectArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let (steps, history) = simulate(&config::config().site, &args.path, &args.events)?;

    match output_format {
        OutputFormat::Json => output_json(&serde_json::json!({ "steps": steps, "history": history })),
        OutputFormat::Text => {
            for step in &steps {
                let outcome = match step.redirect {
                    Some(Redirect::ToHome) => "-> home",
                    Some(Redirect::ToDashboard) => "-> dashboard",
                    None => "",
                };
                println!("{:<14} {:<32} {:?} {}", step.event, step.pathname, step.phase, outcome);
            }
            println!("history: {}", if history.is_empty() { "(none)".to_string() } else { history.join(" ") });
            Ok(())
        }
    }
}
