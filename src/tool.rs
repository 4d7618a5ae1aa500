//! JSON entry points for agent tool calls.
//!
//! An agent loop hands over the raw tool input and forwards either the returned
//! text or the error's display text back to the model.

use serde::Deserialize;

use crate::batch::apply_batch;
use crate::ops::{EditOperation, RawEdit};
use crate::window::{read_window, window_bounds};
use crate::EditError;

/// Name and description an agent registers for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
}

pub const EDIT_FILE_TOOL: ToolInfo = ToolInfo {
    name: "edit_file",
    description: "Perform precise, line-based edits on a file. Accepts a list of edit \
operations (replace_line, insert_line_before, insert_line_after, delete_line, \
replace_string_in_line, append_to_file) applied in order as a single atomic transaction; \
each line number refers to the file as changed by the previous edits. All line numbers \
are 1-based. To create a new file, use append_to_file (or create_file) as the first \
edit; its content becomes the new file.",
};

pub const READ_LINES_TOOL: ToolInfo = ToolInfo {
    name: "read_lines",
    description: "Read lines from a file, from start_line (inclusive) to end_line \
(exclusive), both 1-based. Each line is returned as <line-N>text</line-N>. Fails if \
start_line > end_line, if either line is beyond the end of the file, or if the file \
does not exist.",
};

#[derive(Debug, Clone, Deserialize)]
pub struct EditFileInput {
    pub path: String,
    #[serde(default)]
    pub edits: Vec<RawEdit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadLinesInput {
    pub path: String,
    pub start_line: i64,
    pub end_line: i64,
}

/// Run an `edit_file` tool call. Returns `"OK"` once the file is written.
pub fn edit_file(input: &str) -> Result<String, EditError> {
    let input: EditFileInput = serde_json::from_str(input)
        .map_err(|e| EditError::InvalidArgument(format!("malformed edit_file input: {e}")))?;
    let operations = input
        .edits
        .into_iter()
        .map(EditOperation::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    apply_batch(&input.path, &operations).map(str::to_string)
}

/// Run a `read_lines` tool call. Returns the tagged lines as a JSON array.
pub fn read_lines(input: &str) -> Result<String, EditError> {
    let input: ReadLinesInput = serde_json::from_str(input)
        .map_err(|e| EditError::InvalidArgument(format!("malformed read_lines input: {e}")))?;
    let (start, end) = window_bounds(input.start_line, input.end_line)?;
    let window = read_window(&input.path, start, end)?;
    serde_json::to_string(&window)
        .map_err(|e| EditError::InvalidArgument(format!("failed to encode lines: {e}")))
}
