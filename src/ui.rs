use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::{Duration, Instant};

use crate::engine::TickReport;

#[derive(Clone, Copy, Debug)]
pub enum UiMode {
    Auto,
    Plain,
    Pretty,
}

#[derive(Clone, Debug)]
pub struct Ui {
    mode: UiMode,
    is_tty: bool,
}

impl Ui {
    pub fn new(mode: UiMode, is_tty: bool) -> Self {
        Self { mode, is_tty }
    }

    pub fn from_args(ui_flag: Option<&str>, is_tty: bool) -> Self {
        let mode = match ui_flag {
            Some("plain") => UiMode::Plain,
            Some("pretty") => UiMode::Pretty,
            _ => UiMode::Auto,
        };
        Self::new(mode, is_tty)
    }

    fn use_pretty(&self) -> bool {
        self.is_tty && !matches!(self.mode, UiMode::Plain)
    }

    /// Live feed display. Finishes with a summary line when dropped.
    pub fn feed(&self) -> FeedDisplay {
        if self.use_pretty() {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_message("waiting for first tick…");
            FeedDisplay::new(Some(spinner))
        } else {
            eprintln!("==> detection feed");
            FeedDisplay::new(None)
        }
    }
}

pub struct FeedDisplay {
    start: Instant,
    ticks: u64,
    spinner: Option<ProgressBar>,
}

impl FeedDisplay {
    fn new(spinner: Option<ProgressBar>) -> Self {
        Self {
            start: Instant::now(),
            ticks: 0,
            spinner,
        }
    }

    pub fn show(&mut self, report: &TickReport) {
        self.ticks += 1;
        let line = format_report(report);
        match &self.spinner {
            Some(spinner) => spinner.set_message(line),
            None => eprintln!("{line}"),
        }
    }
}

impl Drop for FeedDisplay {
    fn drop(&mut self) {
        let message = format!(
            "✔ {} ticks ({})",
            self.ticks,
            format_duration(self.start.elapsed())
        );
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message);
        } else {
            eprintln!("{message}");
        }
    }
}

/// One status line per tick, e.g.
/// `[heavy] 6 detected | cars 14 bikes 9 | avg 84.1% | 23.5ms | CAR 91.2%, BIKE 77.0%`.
pub fn format_report(report: &TickReport) -> String {
    let stats = &report.stats;
    let labels: Vec<String> = report.detections.iter().map(|d| d.label()).collect();
    format!(
        "[{}] {} detected | cars {} bikes {} | avg {} | {} | {}",
        report.scenario,
        stats.current_detections,
        stats.total_cars,
        stats.total_bikes,
        stats.avg_confidence_percent(),
        stats.processing_time_label(),
        if labels.is_empty() {
            "-".to_string()
        } else {
            labels.join(", ")
        }
    )
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
