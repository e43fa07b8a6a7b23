pub mod goal;
pub mod user;

pub use goal::{CreateGoalRequest, Goal, GoalStatus, GoalSummary, NewGoal, StatusCounts};
pub use user::{ProfileUpdate, ProvisionProfile, UserProfile};
