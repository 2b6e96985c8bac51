//! Pass handlers.

mod issue_pass;

pub use issue_pass::{IssuePassCommand, IssuePassHandler, IssuePassResult};
