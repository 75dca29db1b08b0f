//! Command implementations.

mod check;
mod extract;

pub use check::execute_check;
pub use extract::{execute_extract, extract_text};
