//! The views module renders a finished cluster report for the terminal.

mod summary;
pub use summary::{print_report, render_json, render_table};
