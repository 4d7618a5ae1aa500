use crate::ops::{EditOperation, Lines};
use crate::EditError;

/// In-memory lines of one file, between load and save.
///
/// Lines are split on `\n` without dropping a trailing empty line, so
/// `Document::parse(s).serialize() == s` for every input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(|l| l.to_string()).collect(),
        }
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the lines back into the exact text to persist.
    pub fn serialize(&self) -> String {
        self.lines.join("\n")
    }

    /// Apply one edit. On error the document is left untouched.
    pub fn apply(&mut self, op: &EditOperation) -> Result<(), EditError> {
        match op {
            EditOperation::ReplaceLine { line, content } => self.replace_line(*line, content),
            EditOperation::InsertBefore { line, content } => self.insert_before(*line, content),
            EditOperation::InsertAfter { line, content } => self.insert_after(*line, content),
            EditOperation::DeleteLine { line } => self.delete_line(*line),
            EditOperation::ReplaceSubstring {
                line,
                old,
                new,
                count,
            } => self.replace_substring(*line, old, new, *count),
            EditOperation::AppendLines { content } => {
                self.append_lines(content);
                Ok(())
            }
            EditOperation::CreateFile { .. } => Err(EditError::InvalidOperation(
                "create_file is only valid as the first edit on a missing file".into(),
            )),
        }
    }

    fn resolve_line(&self, line: usize) -> Result<usize, EditError> {
        if line == 0 || line > self.lines.len() {
            return Err(EditError::OutOfRange(format!(
                "line number {line} out of bounds (document has {} line(s))",
                self.lines.len()
            )));
        }
        Ok(line - 1)
    }

    pub fn replace_line(&mut self, line: usize, content: &Lines) -> Result<(), EditError> {
        let idx = self.resolve_line(line)?;
        self.lines
            .splice(idx..=idx, content.as_slice().iter().cloned());
        Ok(())
    }

    /// Insert `content` so that its first line takes position `line`.
    pub fn insert_before(&mut self, line: usize, content: &Lines) -> Result<(), EditError> {
        let idx = self.resolve_line(line)?;
        self.lines
            .splice(idx..idx, content.as_slice().iter().cloned());
        Ok(())
    }

    pub fn insert_after(&mut self, line: usize, content: &Lines) -> Result<(), EditError> {
        let idx = self.resolve_line(line)? + 1;
        self.lines
            .splice(idx..idx, content.as_slice().iter().cloned());
        Ok(())
    }

    pub fn delete_line(&mut self, line: usize) -> Result<(), EditError> {
        let idx = self.resolve_line(line)?;
        self.lines.remove(idx);
        Ok(())
    }

    /// Replace up to `count` literal occurrences of `old` in one line, left to right.
    /// A negative count replaces every occurrence; zero is rejected.
    pub fn replace_substring(
        &mut self,
        line: usize,
        old: &str,
        new: &str,
        count: i64,
    ) -> Result<(), EditError> {
        let idx = self.resolve_line(line)?;
        if count == 0 {
            return Err(EditError::InvalidArgument(
                "count must be -1 (all) or greater than 0".into(),
            ));
        }
        let replaced = match usize::try_from(count) {
            Ok(limit) => self.lines[idx].replacen(old, new, limit),
            Err(_) => self.lines[idx].replace(old, new),
        };
        self.lines[idx] = replaced;
        Ok(())
    }

    pub fn append_lines(&mut self, content: &Lines) {
        self.lines.extend(content.as_slice().iter().cloned());
    }
}
