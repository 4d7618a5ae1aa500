use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use crate::document::Document;
use crate::ops::EditOperation;
use crate::EditError;

/// A batch applied in memory, ready to be written.
struct Staged {
    doc: Document,
    existed: bool,
}

/// Apply `operations` to the file at `path` as one all-or-nothing edit.
///
/// Each edit sees the document as left by the previous one. The file is only
/// written after every edit succeeded; on error it is left exactly as it was.
/// A missing file is created when the first edit is [`EditOperation::CreateFile`]
/// or [`EditOperation::AppendLines`]; that edit supplies the initial content.
pub fn apply_batch(path: impl AsRef<Path>, operations: &[EditOperation]) -> Result<&'static str, EditError> {
    let path = path.as_ref();
    let staged = stage(path, operations)?;
    let text = staged.doc.serialize();

    if !staged.existed {
        create_parent_dirs(path)?;
    }
    write_atomic(path, &text)
        .map_err(|e| EditError::io(format!("failed to write {}", path.display()), e))?;

    tracing::info!(
        path = %path.display(),
        edits = operations.len(),
        lines = staged.doc.len(),
        created = !staged.existed,
        "committed edit batch"
    );
    Ok("OK")
}

/// Run a batch against the file at `path` without writing, returning the content
/// that [`apply_batch`] would persist.
pub fn preview_batch(path: impl AsRef<Path>, operations: &[EditOperation]) -> Result<String, EditError> {
    let staged = stage(path.as_ref(), operations)?;
    Ok(staged.doc.serialize())
}

/// Apply `operations` to in-memory `text`. There is no file to bootstrap, so
/// `create_file` is rejected like any other misplaced edit.
pub fn edit_text(text: &str, operations: &[EditOperation]) -> Result<Document, EditError> {
    let mut doc = Document::parse(text);
    apply_all(&mut doc, operations, 0)?;
    Ok(doc)
}

fn stage(path: &Path, operations: &[EditOperation]) -> Result<Staged, EditError> {
    if path.as_os_str().is_empty() {
        return Err(EditError::InvalidArgument("path must not be empty".into()));
    }
    let Some(first) = operations.first() else {
        return Err(EditError::InvalidArgument("no edits provided".into()));
    };

    let (mut doc, rest, existed) = match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8(bytes).map_err(|_| {
                EditError::InvalidArgument(format!("{}: non-UTF8 file rejected", path.display()))
            })?;
            (Document::parse(&text), operations, true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let seed = match first {
                EditOperation::CreateFile { content } => content.clone(),
                EditOperation::AppendLines { content } => content.as_slice().join("\n"),
                other => {
                    return Err(EditError::NotFound(format!(
                        "{} does not exist (first edit is {}, expected create_file or append_to_file)",
                        path.display(),
                        other.name()
                    )))
                }
            };
            if seed.is_empty() {
                return Err(EditError::InvalidArgument(format!(
                    "{} on a missing file requires non-empty initial content",
                    first.name()
                )));
            }
            tracing::debug!(path = %path.display(), op = first.name(), "bootstrapping new file");
            (Document::parse(&seed), &operations[1..], false)
        }
        Err(e) => {
            return Err(EditError::io(format!("failed to read {}", path.display()), e));
        }
    };

    let offset = operations.len() - rest.len();
    if let Err(e) = apply_all(&mut doc, rest, offset) {
        tracing::warn!(path = %path.display(), error = %e, "edit batch rejected; file left unchanged");
        return Err(e);
    }
    Ok(Staged { doc, existed })
}

fn apply_all(doc: &mut Document, operations: &[EditOperation], offset: usize) -> Result<(), EditError> {
    for (i, op) in operations.iter().enumerate() {
        tracing::debug!(index = i + offset, op = op.name(), lines = doc.len(), "applying edit");
        doc.apply(op)?;
    }
    Ok(())
}

fn create_parent_dirs(path: &Path) -> Result<(), EditError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .map_err(|e| EditError::io(format!("failed to create directory {}", dir.display()), e)),
        _ => Ok(()),
    }
}

/// Write `content` to a fresh temporary file beside `path`, then rename it over `path`.
/// A symlinked `path` is resolved first so the link keeps pointing at the edited file.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let path = resolved.as_path();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let pid = process::id();
    let mut attempt: u64 = 0;
    let tmp_path: PathBuf;
    loop {
        let candidate = dir.join(format!(".{file_name}.lnedit.tmp.{pid}.{attempt}"));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut f) => {
                if let Err(e) = f.write_all(content.as_bytes()).and_then(|_| f.sync_all()) {
                    let _ = fs::remove_file(&candidate);
                    return Err(e);
                }
                if let Some(p) = perms.clone() {
                    let _ = fs::set_permissions(&candidate, p);
                }
                tmp_path = candidate;
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Lines;
    use crate::ErrorKind;

    fn replace(line: usize, text: &str) -> EditOperation {
        EditOperation::ReplaceLine {
            line,
            content: text.into(),
        }
    }

    fn delete(line: usize) -> EditOperation {
        EditOperation::DeleteLine { line }
    }

    #[test]
    fn replace_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb\nc").unwrap();

        let ops = vec![
            replace(2, "B"),
            EditOperation::AppendLines {
                content: Lines::one("d"),
            },
        ];
        assert_eq!(apply_batch(&file, &ops).unwrap(), "OK");
        assert_eq!(fs::read_to_string(&file).unwrap(), "a\nB\nc\nd");
    }

    #[test]
    fn repeated_delete_removes_successive_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb\nc\nd").unwrap();

        apply_batch(&file, &[delete(2), delete(2)]).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "a\nd");
    }

    #[test]
    fn line_numbers_follow_earlier_edits() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb\nc").unwrap();

        let ops = vec![
            EditOperation::InsertBefore {
                line: 1,
                content: Lines::new(vec!["x".into(), "y".into()]).unwrap(),
            },
            replace(3, "A"),
        ];
        apply_batch(&file, &ops).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "x\ny\nA\nb\nc");
    }

    #[test]
    fn failing_last_edit_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb\nc\n").unwrap();

        let err = apply_batch(&file, &[replace(1, "A"), delete(1), delete(9)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(fs::read(&file).unwrap(), b"a\nb\nc\n");
    }

    #[test]
    fn trailing_newline_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb\n").unwrap();

        apply_batch(&file, &[replace(1, "A")]).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "A\nb\n");
    }

    #[test]
    fn create_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x").join("y.txt");

        let ops = vec![EditOperation::CreateFile {
            content: "hello".into(),
        }];
        apply_batch(&file, &ops).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello");
    }

    #[test]
    fn create_then_edit_in_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("new.txt");

        let ops = vec![
            EditOperation::CreateFile {
                content: "first".into(),
            },
            EditOperation::AppendLines {
                content: Lines::new(vec!["second".into(), "third".into()]).unwrap(),
            },
            EditOperation::ReplaceSubstring {
                line: 1,
                old: "first".into(),
                new: "1st".into(),
                count: -1,
            },
        ];
        apply_batch(&file, &ops).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "1st\nsecond\nthird");
    }

    #[test]
    fn failed_create_batch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("deep");
        let file = sub.join("new.txt");

        let ops = vec![
            EditOperation::CreateFile {
                content: "first".into(),
            },
            delete(5),
        ];
        assert!(apply_batch(&file, &ops).is_err());
        assert!(!file.exists());
        assert!(!sub.exists());
    }

    #[test]
    fn append_bootstraps_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a").join("new.txt");

        let ops = vec![
            EditOperation::AppendLines {
                content: Lines::new(vec!["hello".into(), "world".into()]).unwrap(),
            },
            EditOperation::AppendLines {
                content: Lines::one("!"),
            },
        ];
        apply_batch(&file, &ops).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello\nworld\n!");
    }

    #[test]
    fn append_with_empty_line_on_missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("new.txt");

        let ops = vec![EditOperation::AppendLines {
            content: Lines::one(""),
        }];
        let err = apply_batch(&file, &ops).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!file.exists());
    }

    #[test]
    fn missing_file_without_create_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.txt");

        let err = apply_batch(&file, &[replace(1, "x")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!file.exists());
    }

    #[test]
    fn empty_create_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.txt");

        let ops = vec![EditOperation::CreateFile {
            content: String::new(),
        }];
        let err = apply_batch(&file, &ops).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn create_on_existing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a").unwrap();

        let ops = vec![EditOperation::CreateFile {
            content: "b".into(),
        }];
        let err = apply_batch(&file, &ops).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(fs::read_to_string(&file).unwrap(), "a");
    }

    #[test]
    fn rejects_empty_path_and_empty_batch() {
        assert_eq!(
            apply_batch("", &[delete(1)]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a").unwrap();
        assert_eq!(
            apply_batch(&file, &[]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn rejects_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.bin");
        fs::write(&file, [0xff, 0xfe, b'\n']).unwrap();

        let err = apply_batch(&file, &[delete(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(fs::read(&file).unwrap(), [0xff, 0xfe, b'\n']);
    }

    #[test]
    fn preview_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a\nb").unwrap();

        let out = preview_batch(&file, &[delete(1)]).unwrap();
        assert_eq!(out, "b");
        assert_eq!(fs::read_to_string(&file).unwrap(), "a\nb");
    }

    #[test]
    fn no_temp_files_left_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "a").unwrap();

        apply_batch(&file, &[replace(1, "b")]).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("f.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn commit_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("run.sh");
        fs::write(&file, "echo a").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();

        apply_batch(&file, &[replace(1, "echo b")]).unwrap();
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn commit_writes_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.txt");
        let link = dir.path().join("link.txt");
        fs::write(&target, "a\nb").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        apply_batch(&link, &[replace(2, "B")]).unwrap();
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nB");
    }

    #[test]
    fn edit_text_rejects_create() {
        let err = edit_text(
            "a",
            &[EditOperation::CreateFile {
                content: "x".into(),
            }],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }
}
