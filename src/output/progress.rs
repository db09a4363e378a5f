use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::llm::ProgressObserver;

/// Terminal progress bar on stderr, advanced once per answered question.
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        bar.set_style(Self::style());
        bar.set_message("Processing questions...");
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_question_done(&self, completed: usize, total: usize) {
        self.bar.set_position(completed as u64);
        self.bar
            .set_message(format!("Processing question {}/{}...", completed, total));
    }

    fn on_finished(&self) {
        self.bar.finish_with_message("Done");
    }
}
