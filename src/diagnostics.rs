//! User-facing rendering of compile errors.

use crate::error::Error;
use ariadne::{Config, Label, Report, ReportKind, Source};

/// Render `err` for display. Errors that carry a position get an annotated
/// excerpt of `source`; everything else is a single `error: ...` line.
pub fn error_message(name: &str, source: &str, err: &Error) -> String {
    let plain = format!("error: {}", err);
    let Some(at) = err
        .position()
        .and_then(|(line, column)| char_offset(source, line, column))
    else {
        return plain;
    };

    let span = at..at + 1;
    let mut bytes = Vec::new();
    let written = Report::build(ReportKind::Error, (name, span.clone()))
        .with_config(Config::default().with_color(false))
        .with_message(err.to_string())
        .with_label(Label::new((name, span)).with_message(label(err)))
        .finish()
        .write((name, Source::from(source)), &mut bytes);

    match written {
        Ok(()) => String::from_utf8(bytes).unwrap_or(plain),
        Err(_) => plain,
    }
}

fn label(err: &Error) -> String {
    match err.root_cause() {
        Error::Parse { message, .. } | Error::Semantic { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Char offset of a 1-based line and column, clamped to the end of the line.
fn char_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    let mut offset = 0;
    for (i, text) in source.split('\n').enumerate() {
        let len = text.chars().count();
        if i + 1 == line {
            return Some(offset + column.saturating_sub(1).min(len));
        }
        offset += len + 1;
    }
    None
}
