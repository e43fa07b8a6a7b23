use serde_json::json;

use crate::cli::utils::output_json;
use crate::cli::OutputFormat;
use crate::config;
use crate::routing::{RouteClass, RouteClassifier};

pub fn handle(paths: &[String], output_format: OutputFormat) -> anyhow::Result<()> {
    let classifier = RouteClassifier::from_site(&config::config().site);

    match output_format {
        OutputFormat::Json => {
            let results: Vec<_> = paths
                .iter()
                .map(|path| json!({ "path": path, "class": classifier.classify(path) }))
                .collect();
            output_json(&results)
        }
        OutputFormat::Text => {
            for path in paths {
                println!("{:<40} {}", path, describe(classifier.classify(path)));
            }
            Ok(())
        }
    }
}

fn describe(class: RouteClass) -> &'static str {
    match class {
        RouteClass::Excluded => "excluded (gate bypassed)",
        RouteClass::Api => "api (session attached, never challenged)",
        RouteClass::Page { protected: true } => "protected page (sign-in required)",
        RouteClass::Page { protected: false } => "public page",
    }
}
