use std::env;
use std::io;
use std::process;

use lnedit::read_window;
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!(
        "Usage: readlines [--json] <file> <start_line> <end_line>\n\n\
         Prints lines as: <line-N>content</line-N>\n\
         start_line/end_line are 1-based; start_line is inclusive, end_line exclusive.\n\
         With --json, prints the lines as a JSON array."
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return;
    }

    let json = match args.iter().position(|a| a == "--json") {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    };

    if args.len() != 3 {
        usage();
        process::exit(2);
    }

    let file = &args[0];
    let start_line = match args[1].parse::<usize>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: start_line must be a non-negative integer");
            process::exit(2);
        }
    };
    let end_line = match args[2].parse::<usize>() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: end_line must be a non-negative integer");
            process::exit(2);
        }
    };

    let lines = match read_window(file, start_line, end_line) {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    if json {
        match serde_json::to_string(&lines) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode lines: {e}");
                process::exit(1);
            }
        }
        return;
    }

    for line in &lines {
        println!("{line}");
    }
}
