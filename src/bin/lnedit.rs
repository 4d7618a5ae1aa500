use std::env;
use std::io::{self, Read};
use std::process;

use lnedit::{apply_batch, parse_operations_from_json, preview_batch, EditError, ErrorKind};
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!(
        "Usage: lnedit [--dry-run] <file> [edits-json]\n\n\
         Applies a JSON array of line edits to <file> as one atomic write.\n\
         - If edits-json is omitted, the array is read from stdin.\n\
         - Each edit is an object with operation_type (replace_line, insert_line_before,\n\
           insert_line_after, delete_line, replace_string_in_line, append_to_file,\n\
           create_file), line_number, new_content, old_string, new_string, count.\n\
         - Line numbers are 1-based and refer to the file as changed by earlier edits.\n\n\
         With --dry-run, no file is written; stdout shows the edited content.\n\
         Set RUST_LOG=debug to trace each applied edit on stderr.\n"
    );
}

fn exit_code(e: &EditError) -> i32 {
    match e.kind() {
        ErrorKind::Io => 1,
        _ => 2,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut dry_run = false;

    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--dry-run" => {
                dry_run = true;
                idx += 1;
            }
            "--help" | "-h" => {
                usage();
                return;
            }
            s if s.starts_with('-') && s.len() > 1 => {
                eprintln!("error: unknown flag {s}");
                usage();
                process::exit(2);
            }
            _ => break,
        }
    }

    if idx >= args.len() || args.len() > idx + 2 {
        usage();
        process::exit(2);
    }

    let file = args[idx].clone();

    let edits_json = match args.get(idx + 1) {
        Some(json) => json.clone(),
        None => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                eprintln!("error: failed to read stdin: {e}");
                process::exit(1);
            }
            input
        }
    };

    let operations = match parse_operations_from_json(&edits_json) {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    if dry_run {
        match preview_batch(&file, &operations) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(exit_code(&e));
            }
        }
        return;
    }

    match apply_batch(&file, &operations) {
        Ok(status) => println!("{status}"),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(exit_code(&e));
        }
    }
}
