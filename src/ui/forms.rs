use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::isbn::{self, ISBN10_LEN};
use crate::models::CatalogEntry;

/// Characters accepted while typing an identifier. Anything else is refused
/// at the keyboard so the pipeline only sees plausible input.
fn is_isbn_char(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, 'x' | 'X' | '-' | ' ')
}

/// Manual ISBN entry row: the typed text plus its last error.
#[derive(Default, Clone)]
pub(crate) struct IsbnEntryForm {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl IsbnEntryForm {
    /// Append a character, refusing anything that can never be part of an ISBN.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if is_isbn_char(ch) {
            self.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    pub(crate) fn clear(&mut self) {
        self.value.clear();
        self.error = None;
    }

    /// Character count shown beside the input, separators included.
    pub(crate) fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Type hint derived from the length: anything longer than ten characters
    /// is treated as an ISBN-13.
    pub(crate) fn detected_type(&self) -> &'static str {
        if self.char_count() > ISBN10_LEN {
            "ISBN-13"
        } else {
            "ISBN-10"
        }
    }

    /// The trimmed input, or an error when nothing was typed.
    pub(crate) fn submission(&self) -> Result<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Please enter an ISBN"));
        }
        Ok(trimmed.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let display = if self.value.is_empty() {
            Span::styled("<ISBN-10 or ISBN-13>", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.value.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw("ISBN: "), display])
    }

    pub(crate) fn info_line(&self) -> Line<'static> {
        Line::from(Span::styled(
            format!("{} characters • {}", self.char_count(), self.detected_type()),
            Style::default().fg(Color::Gray),
        ))
    }
}

/// Standalone ISBN-10/ISBN-13 converter dialog.
#[derive(Default, Clone)]
pub(crate) struct ConverterForm {
    pub(crate) input: String,
    pub(crate) result: Option<Result<String, String>>,
}

impl ConverterForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if is_isbn_char(ch) {
            self.input.push(ch);
            self.result = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
        self.result = None;
    }

    /// Convert the input to the other ISBN form and keep the result for
    /// display.
    pub(crate) fn convert(&mut self) {
        self.result = Some(isbn::convert(&self.input).map_err(|err| err.to_string()));
    }

    /// The last successful conversion, if the input has not changed since.
    pub(crate) fn converted(&self) -> Option<&str> {
        match &self.result {
            Some(Ok(converted)) => Some(converted.as_str()),
            _ => None,
        }
    }

    pub(crate) fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            Span::raw("ISBN: "),
            Span::styled(self.input.clone(), Style::default().fg(Color::Yellow)),
        ])];
        match &self.result {
            Some(Ok(converted)) => lines.push(Line::from(vec![
                Span::raw("Converted: "),
                Span::styled(converted.clone(), Style::default().fg(Color::Green)),
            ])),
            Some(Err(reason)) => lines.push(Line::from(Span::styled(
                reason.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from("")),
        }
        lines
    }
}

/// What a path prompt is collecting a path for.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum PathAction {
    Import,
    Export,
}

impl PathAction {
    pub(crate) fn title(self) -> &'static str {
        match self {
            PathAction::Import => "Import Catalog",
            PathAction::Export => "Export Catalog",
        }
    }
}

#[derive(Clone)]
pub(crate) struct PathPrompt {
    pub(crate) action: PathAction,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl PathPrompt {
    pub(crate) fn new(action: PathAction) -> Self {
        Self {
            action,
            value: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Validate the typed path; a leading `~/` expands to the home directory.
    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let raw = self.value.trim();
        if raw.is_empty() {
            return Err(anyhow!("A file path is required."));
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(base_dirs) = directories::BaseDirs::new() {
                return Ok(base_dirs.home_dir().join(rest));
            }
        }
        Ok(PathBuf::from(raw))
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        let display = if self.value.is_empty() {
            Span::styled("<path to .csv>", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.value.clone(), Style::default().fg(Color::Yellow))
        };
        Line::from(vec![Span::raw("File: "), display])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// State for confirming the removal of one book.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) entry: CatalogEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_form_filters_keys_and_detects_type() {
        let mut form = IsbnEntryForm::default();
        for ch in "0-306-40615-2".chars() {
            assert!(form.push_char(ch));
        }
        assert!(!form.push_char('a'));
        assert_eq!(form.char_count(), 13);
        assert_eq!(form.detected_type(), "ISBN-13");

        form.clear();
        for ch in "0306406152".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.detected_type(), "ISBN-10");
    }

    #[test]
    fn empty_entry_asks_for_an_isbn() {
        let mut form = IsbnEntryForm::default();
        form.push_char(' ');
        assert_eq!(
            form.submission().unwrap_err().to_string(),
            "Please enter an ISBN"
        );
    }

    #[test]
    fn converter_shows_result_or_reason() {
        let mut form = ConverterForm::default();
        for ch in "080442957X".chars() {
            form.push_char(ch);
        }
        form.convert();
        assert_eq!(form.result, Some(Ok("9780804429573".to_string())));
        assert_eq!(form.converted(), Some("9780804429573"));

        form.backspace();
        assert_eq!(form.result, None);
        assert_eq!(form.converted(), None);
        form.convert();
        assert!(matches!(form.result, Some(Err(_))));
        assert_eq!(form.converted(), None);
    }

    #[test]
    fn path_prompt_requires_a_value() {
        let mut prompt = PathPrompt::new(PathAction::Export);
        assert!(prompt.parse_path().is_err());
        for ch in "/tmp/books.csv".chars() {
            prompt.push_char(ch);
        }
        assert_eq!(prompt.parse_path().unwrap(), PathBuf::from("/tmp/books.csv"));
    }
}
