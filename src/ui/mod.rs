//! User interface module - console output of a run.
//!
//! - `formatter` - Pure formatting functions and colored printers
//! - This module - Printing a whole run

use chrono::Local;

use crate::domain::UserInput;
use crate::usecases::RunOutcome;

pub mod formatter;

pub use formatter::{display_error, display_report, format_report, format_summary};

/// Print the request header followed by every report of the run.
pub fn display_outcome(input: &UserInput, branch: &str, outcome: &RunOutcome) {
    println!("{}", format_summary(input, branch, Local::now().naive_local()));
    for report in outcome.reports() {
        display_report(report);
        println!();
    }
}
