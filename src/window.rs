use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::EditError;

/// Wrap a line with its 1-based position, e.g. `<line-3>text</line-3>`.
pub fn format_tagged_line(lineno: usize, text: &str) -> String {
    format!("<line-{lineno}>{text}</line-{lineno}>")
}

/// Convert caller-supplied signed line numbers; negatives are an invalid argument.
pub(crate) fn window_bounds(start_line: i64, end_line: i64) -> Result<(usize, usize), EditError> {
    match (usize::try_from(start_line), usize::try_from(end_line)) {
        (Ok(start), Ok(end)) => Ok((start, end)),
        _ => Err(EditError::InvalidArgument(format!(
            "invalid line numbers: start_line {start_line}, end_line {end_line}"
        ))),
    }
}

/// Read lines `[start_line, end_line)` (1-based, half-open) from `path`, each
/// tagged with its position in the file.
///
/// The file is streamed, never loaded whole. Range checks against the file
/// length happen after the full scan, so an `end_line` past EOF is reported even
/// when some requested lines exist. `start_line == end_line` returns an empty
/// window without opening the file.
pub fn read_window(path: impl AsRef<Path>, start_line: usize, end_line: usize) -> Result<Vec<String>, EditError> {
    let path = path.as_ref();
    if start_line < 1 || end_line < start_line {
        return Err(EditError::InvalidArgument(format!(
            "invalid line numbers: start_line {start_line}, end_line {end_line}"
        )));
    }
    if start_line == end_line {
        return Ok(Vec::new());
    }

    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            EditError::NotFound(format!("{}: {e}", path.display()))
        } else {
            EditError::io(format!("failed to open {}", path.display()), e)
        }
    })?;

    let mut window = Vec::new();
    let mut total = 0usize;
    for chunk in BufReader::new(file).split(b'\n') {
        let mut bytes =
            chunk.map_err(|e| EditError::io(format!("failed to read {}", path.display()), e))?;
        total += 1;
        if total >= start_line && total < end_line {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            window.push(format_tagged_line(total, &String::from_utf8_lossy(&bytes)));
        }
    }

    if total < start_line {
        return Err(EditError::OutOfRange(format!(
            "start line beyond file length: {start_line} > {total}"
        )));
    }
    if total < end_line - 1 {
        return Err(EditError::OutOfRange(format!(
            "end line beyond file length: {} > {total}",
            end_line - 1
        )));
    }

    tracing::debug!(path = %path.display(), start_line, end_line, returned = window.len(), "read window");
    Ok(window)
}
