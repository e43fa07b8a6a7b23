pub mod classifier;

pub use classifier::{RouteClass, RouteClassifier};
