//! Terminal output for the batch fetcher: a spinner while it runs and a
//! coloured summary line at the end.
//!
//! Uses `indicatif` for the spinner and `console` for styling.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

pub struct BatchProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
}

impl BatchProgress {
    /// Starts the spinner for a search on `title`.
    pub fn start(title: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching vacancies: {title}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
        }
    }

    pub fn finish(&self, inserted: usize) {
        self.pb.finish_and_clear();
        if inserted == 0 {
            println!(
                "  {} No vacancies inserted",
                self.yellow.apply_to("!")
            );
        } else {
            println!(
                "  {} Data successfully inserted into PostgreSQL ({inserted} rows)",
                self.green.apply_to("✓")
            );
        }
    }

    /// Clears the spinner; the caller reports the error.
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

/// Prints a bad-arguments message followed by the usage line.
pub fn print_usage_error(error: &dyn std::fmt::Display, usage: &str) {
    let red = Style::new().red();
    eprintln!("{} {error}", red.apply_to("error:"));
    eprintln!("{usage}");
}
