pub mod executor;
pub mod planner;

pub use executor::{execute_organize, undo_organize, ExecuteOutcome, UndoOutcome};
pub use planner::preview_organize;
