use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::BookRecord;
use crate::pipeline::{Feedback, Outcome, ScanOutcome};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Footer colour for a pipeline feedback category.
pub(crate) fn feedback_color(feedback: Feedback) -> Color {
    match feedback {
        Feedback::Success => Color::Green,
        Feedback::Warning => Color::Yellow,
        Feedback::Error => Color::Red,
    }
}

/// Footer text for a finished pipeline run.
pub(crate) fn outcome_message(result: &ScanOutcome) -> String {
    match &result.outcome {
        Outcome::Stored { entry } => {
            format!("Book added successfully: {}", entry.record.title)
        }
        Outcome::Duplicate { isbn } => format!("Entry already exists: {isbn}"),
        Outcome::NotFound { isbn } => format!("No book found for ISBN {isbn}"),
        Outcome::Invalid { error, .. } => format!("Invalid ISBN: {error}"),
    }
}

/// `SOURCE: isbn - title` line for the process log.
pub(crate) fn process_log_line(result: &ScanOutcome) -> Option<String> {
    match &result.outcome {
        Outcome::Stored { entry } => Some(format!(
            "{}: {} - {}",
            result.source.label(),
            entry.isbn(),
            entry.record.title
        )),
        _ => None,
    }
}

/// Label/value lines for the detail panel.
pub(crate) fn detail_lines(record: &BookRecord) -> Vec<Line<'static>> {
    let label_style = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::styled("ISBN: ", label_style),
        Span::raw(record.isbn.to_string()),
    ])];
    lines.extend(record.fields().into_iter().map(|(label, value)| {
        Line::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::raw(value),
        ])
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IsbnError;
    use crate::isbn::Isbn13;
    use crate::models::CatalogEntry;
    use crate::pipeline::EntrySource;

    fn stored(source: EntrySource) -> ScanOutcome {
        let mut record = BookRecord::empty(Isbn13::parse("9780306406157").unwrap());
        record.title = "Mathematical Methods".to_string();
        ScanOutcome {
            source,
            outcome: Outcome::Stored {
                entry: CatalogEntry::acquired_now(record),
            },
        }
    }

    #[test]
    fn process_log_records_source_and_title() {
        assert_eq!(
            process_log_line(&stored(EntrySource::Manual)).as_deref(),
            Some("MANUAL ENTRY: 9780306406157 - Mathematical Methods")
        );
        assert_eq!(
            process_log_line(&stored(EntrySource::Scanned)).as_deref(),
            Some("SCANNED: 9780306406157 - Mathematical Methods")
        );
    }

    #[test]
    fn only_stored_outcomes_are_logged() {
        let duplicate = ScanOutcome {
            source: EntrySource::Scanned,
            outcome: Outcome::Duplicate {
                isbn: Isbn13::parse("9780306406157").unwrap(),
            },
        };
        assert_eq!(process_log_line(&duplicate), None);
        assert_eq!(
            outcome_message(&duplicate),
            "Entry already exists: 9780306406157"
        );
    }

    #[test]
    fn invalid_message_carries_codec_reason() {
        let invalid = ScanOutcome {
            source: EntrySource::Manual,
            outcome: Outcome::Invalid {
                raw: "12".to_string(),
                error: IsbnError::InvalidPrefix("9791098765438".to_string()),
            },
        };
        assert!(outcome_message(&invalid).starts_with("Invalid ISBN: "));
        assert_eq!(feedback_color(invalid.outcome.feedback()), Color::Red);
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = anyhow::anyhow!("disk full").context("failed to save catalog");
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn detail_panel_lists_every_field() {
        let record = BookRecord::empty(Isbn13::parse("9780306406157").unwrap());
        let lines = detail_lines(&record);
        assert_eq!(lines.len(), 1 + record.fields().len());
    }
}
