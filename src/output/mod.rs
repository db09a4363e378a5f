pub mod formatter;
pub mod progress;

pub use formatter::print_answers;
pub use progress::ProgressBarObserver;
