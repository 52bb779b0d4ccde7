//! Programmatic command layer behind the `memdoc` binary.

mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::{OutputMode, run, run_with_format};
pub use util::{parse_projection, parse_sort};
