use std::io::Write;

use photodump_core::{upload_url, AppViewModel, JobState, NoticeLevel, PresentationSink, ResultSet};

/// Writes presentation instructions as plain lines.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print_lines<I, L>(&mut self, lines: I)
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        for line in lines {
            let _ = writeln!(self.out, "{}", line.as_ref());
        }
        let _ = self.out.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn show_status(&mut self, text: &str) {
        self.print_lines([format!(">> {text}")]);
    }

    fn show_results(&mut self, results: &ResultSet) {
        self.print_lines(results_lines(results));
    }

    fn show_notice(&mut self, message: &str, level: NoticeLevel) {
        let tag = match level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        self.print_lines([format!("[{tag}] {message}")]);
    }
}

fn results_lines(results: &ResultSet) -> Vec<String> {
    if results.is_empty() {
        return vec!["Results: no photos matched".to_string()];
    }
    let mut lines = vec![format!("Results: {} photo(s)", results.photo_count())];
    for group in results.groups() {
        lines.push(format!("  {} ({})", group.category, group.photos.len()));
        for photo in &group.photos {
            lines.push(format!("    {}", upload_url(photo)));
        }
    }
    lines
}

fn job_label(job: JobState) -> &'static str {
    match job {
        JobState::Idle => "Idle",
        JobState::Starting => "Starting",
        JobState::Running => "Running",
        JobState::Succeeded => "Done",
        JobState::Failed => "Failed",
        JobState::Cancelled => "Cancelled",
    }
}

/// One-line summary printed whenever the state changes.
pub fn render_summary(view: &AppViewModel) -> String {
    let mut summary = format!(
        "[{}] Job: {} | Staged: {} | Categories: {} | Start: {}",
        if view.connected { "online" } else { "offline" },
        job_label(view.job),
        view.staged.len(),
        view.categories.len(),
        if view.start_enabled { "ready" } else { "-" },
    );
    if let Some(stats) = &view.last_add_stats {
        summary.push_str(&format!(
            " | Last add: {} uploaded, {} duplicate(s), {} skipped",
            stats.uploaded, stats.local_duplicates, stats.server_skipped
        ));
    }
    if let Some(modal) = &view.modal {
        summary.push_str(&format!(
            " | Viewing {} ({}/{})",
            modal.src,
            modal.index + 1,
            modal.count
        ));
    }
    summary
}

/// Full view, printed on `status`.
pub fn render_details(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![render_summary(view)];

    if view.staged.is_empty() {
        lines.push("Staged: none".to_string());
    } else {
        lines.push("Staged:".to_string());
        for tile in &view.staged {
            let marker = if tile.removing { " (removing)" } else { "" };
            lines.push(format!("  {}{}", tile.filename, marker));
        }
    }

    if !view.categories.is_empty() {
        lines.push(format!("Categories: {}", view.categories.join(", ")));
    }
    if view.processing_visible {
        if let Some(status) = &view.status_text {
            lines.push(format!("Processing: {status}"));
        }
    }
    if let Some(results) = &view.results {
        lines.extend(results_lines(results));
        if view.download_enabled {
            lines.push("Type 'download' to save the archive".to_string());
        }
    }
    if let Some(modal) = &view.modal {
        let nav = if modal.show_navigation {
            " (next/prev/close)"
        } else {
            " (close)"
        };
        lines.push(format!("Viewer: {}{}", modal.src, nav));
    }
    lines
}
