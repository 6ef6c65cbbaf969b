//! Run history: where generation records live and how they are stored

mod io;
mod paths;
mod types;

pub use io::{append_jsonl, read_jsonl};
pub use paths::Paths;
pub use types::{GenerationRecord, Outcome};
