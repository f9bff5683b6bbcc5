use std::fmt::Write;

use squeeze_core::{
    AppViewModel, ImageRowView, ImageStatus, JobSummary, JobView, Notification,
    NotificationLevel, SortDirection,
};

pub(crate) fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let sort = match view.sort {
        Some(spec) => {
            let arrow = match spec.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            format!(" | sort {:?} {}", spec.column, arrow).to_lowercase()
        }
        None => String::new(),
    };
    let filter = if view.filter.text.is_empty() {
        String::new()
    } else {
        format!(" | filter \"{}\"", view.filter.text)
    };
    let _ = writeln!(
        out,
        "== {} images | page {}/{} | {} selected{}{}{}",
        format_with_commas(view.total_count),
        view.current_page,
        view.total_pages.max(1),
        view.selected_count,
        filter,
        sort,
        if view.list_busy { " | loading..." } else { "" },
    );
    if !view.base_folder.is_empty() {
        let _ = writeln!(out, "   in {}", view.base_folder);
    }

    for row in &view.rows {
        let _ = writeln!(out, "{}", render_row(row));
    }

    if let Some(import) = &view.import {
        let _ = writeln!(out, "importing {}/{}", import.progress, import.total);
    }
    let _ = writeln!(out, "{}", render_job(&view.job));
    if let Some(summary) = &view.job.last_summary {
        let _ = writeln!(out, "last run: {}", render_summary(summary));
    }

    if let Some(row) = &view.inspected {
        let loading = if view.preview_loading { " (preview loading)" } else { "" };
        let _ = writeln!(out, "inspecting {}{}", row.name, loading);
        if !row.info.is_empty() {
            let _ = writeln!(out, "   {}", row.info);
        }
    }
    if view.exit_prompt_open {
        let _ = writeln!(out, "Exit now? A running job will be cancelled. (yes/no)");
    }
    out
}

fn render_row(row: &ImageRowView) -> String {
    let marker = match (row.selected, row.inspected) {
        (true, true) => "[x]>",
        (true, false) => "[x] ",
        (false, true) => "[ ]>",
        (false, false) => "[ ] ",
    };
    let name = if row.subfolder.is_empty() {
        row.name.clone()
    } else {
        format!("{}/{}", row.subfolder, row.name)
    };
    let mut size = format_bytes(row.size);
    if let Some(compressed) = row.compressed_size {
        let _ = write!(size, " -> {}", format_bytes(compressed));
    }
    if let Some(saved) = row.saved_percentage {
        let _ = write!(size, " ({saved}%)");
    }
    let mut dimensions = format!("{}x{}", row.dimensions.0, row.dimensions.1);
    if let Some((width, height)) = row.compressed_dimensions {
        let _ = write!(dimensions, " -> {width}x{height}");
    }

    let mut line = format!(
        "{marker} {:<12} {:<32} {:<28} {:<22} {}",
        row.id,
        name,
        size,
        dimensions,
        status_label(row.status)
    );
    if !row.info.is_empty() && row.status != ImageStatus::Success {
        let _ = write!(line, ": {}", row.info);
    }
    line
}

fn render_job(job: &JobView) -> String {
    let mut line = format!("job: {}", job.label);
    if job.phase.is_active() {
        if job.indeterminate {
            let _ = write!(line, " ({} done)", job.progress);
        } else {
            let _ = write!(line, " {}/{}", job.progress, job.total);
        }
    }
    let actions: Vec<&str> = [
        (job.can_start, "compress"),
        (job.can_pause, "pause"),
        (job.can_resume, "resume"),
        (job.can_cancel, "cancel"),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, name)| *name)
    .collect();
    if !actions.is_empty() {
        let _ = write!(line, " [{}]", actions.join(", "));
    }
    line
}

fn render_summary(summary: &JobSummary) -> String {
    format!(
        "{} images, {} ok, {} skipped, {} errors, saved {} in {:.1}s",
        summary.total_images,
        summary.success,
        summary.skipped,
        summary.errors,
        format_signed_bytes(summary.saved_bytes()),
        summary.elapsed_ms as f64 / 1000.0
    )
}

pub(crate) fn notification(notification: &Notification) -> String {
    let level = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "done",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    let time = chrono::Local::now().format("%H:%M:%S");
    if notification.body.is_empty() {
        format!("[{time}] {level}: {}", notification.title)
    } else {
        format!("[{time}] {level}: {}: {}", notification.title, notification.body)
    }
}

fn status_label(status: ImageStatus) -> &'static str {
    match status {
        ImageStatus::New => "new",
        ImageStatus::Compressing => "working",
        ImageStatus::Success => "ok",
        ImageStatus::Warning => "warning",
        ImageStatus::Error => "error",
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

fn format_signed_bytes(bytes: i64) -> String {
    let text = format_bytes(bytes.unsigned_abs());
    if bytes < 0 {
        format!("-{text}")
    } else {
        text
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use squeeze_core::{
        update, AppState, CompressedVariant, ImageRecord, JobPhase, ListSnapshot, Msg,
    };

    fn loaded() -> AppState {
        let items = vec![
            ImageRecord {
                id: "a".into(),
                name: "a.jpg".into(),
                path: "/photos/trip/a.jpg".into(),
                size: 2048,
                width: 1024,
                height: 768,
                compressed: CompressedVariant {
                    size: 1024,
                    width: 512,
                    height: 384,
                    path: "/out/a.jpg".into(),
                },
                status: ImageStatus::Success,
                ..ImageRecord::default()
            },
            ImageRecord {
                id: "b".into(),
                name: "b.png".into(),
                path: "/photos/b.png".into(),
                size: 100,
                width: 10,
                height: 10,
                info: "bad header".into(),
                status: ImageStatus::Error,
                ..ImageRecord::default()
            },
        ];
        let snapshot = ListSnapshot {
            items,
            base_folder: "/photos".into(),
            total_count: 1234,
        };
        let (state, _) = update(AppState::new(), Msg::ListChanged(snapshot));
        state
    }

    #[test]
    fn header_and_rows() {
        let (state, _) = update(loaded(), Msg::SelectionToggled("a".into()));
        let text = render(&state.view());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "== 1,234 images | page 1/25 | 1 selected");
        assert_eq!(lines[1], "   in /photos");
        assert!(lines[2].starts_with("[x]  a "));
        assert!(lines[2].contains("trip/a.jpg"));
        assert!(lines[2].contains("2.0 KB -> 1.0 KB (50%)"));
        assert!(lines[2].contains("1024x768 -> 512x384"));
        assert!(lines[3].ends_with("error: bad header"));
        assert_eq!(lines[4], "job: idle [compress]");
    }

    #[test]
    fn running_job_shows_progress_and_actions() {
        let (state, _) = update(loaded(), Msg::CompressClicked);
        let (state, _) = update(state, Msg::CompressionProgress(3));
        let view = state.view();
        assert_eq!(view.job.phase, JobPhase::Running);
        assert_eq!(render_job(&view.job), "job: compressing... 3/1234 [pause, cancel]");
    }

    #[test]
    fn exit_prompt_is_shown() {
        let (state, _) = update(loaded(), Msg::CompressClicked);
        let (state, _) = update(state, Msg::CloseRequested);
        assert!(render(&state.view()).contains("(yes/no)"));
    }

    #[test]
    fn byte_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_signed_bytes(-2048), "-2.0 KB");
        assert_eq!(format_with_commas(1_000_000), "1,000,000");
    }

    #[test]
    fn notification_line() {
        let line = notification(&Notification {
            level: NotificationLevel::Error,
            title: "import failed".into(),
            body: "no such folder".into(),
        });
        assert!(line.ends_with("] error: import failed: no such folder"));
    }
}
