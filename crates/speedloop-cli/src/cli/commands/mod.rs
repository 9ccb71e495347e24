//! CLI command handlers, one per file.

mod check;
mod measure;
mod run;

pub use check::run_check;
pub use measure::run_measure;
pub use run::run_loop;
