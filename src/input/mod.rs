pub mod questions;
pub mod source;

pub use questions::split_questions;
pub use source::{read_input, InputSource};
