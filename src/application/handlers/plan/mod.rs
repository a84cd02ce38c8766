//! Plan command handlers.

mod replace_plan;

pub use replace_plan::{ReplacePlanCommand, ReplacePlanError, ReplacePlanHandler, ReplacePlanResult};
