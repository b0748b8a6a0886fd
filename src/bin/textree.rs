//! Command-line interface for textree.
//! Converts TeX text to a JSON tree (default direction) or a JSON tree back
//! to TeX text.
//!
//! Usage:
//!   textree [--to-tree] [-i <input>] [-o <output>]   - TeX -> JSON tree
//!   textree --to-tex [-i <input>] [-o <output>]      - JSON tree -> TeX

use std::{
    fs,
    io::{Read, Write},
    process,
};

use clap::{Arg, ArgAction, Command};

use textree::{parse_tex, write_tex, Node, SyntaxTable};

fn main() {
    let matches = Command::new("textree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bidirectional TeX <-> structured tree converter")
        .arg(
            Arg::new("to-tree")
                .long("to-tree")
                .short('x')
                .help("Direction: tree from TeX (default)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("to-tex")
                .long("to-tex")
                .short('t')
                .help("Direction: TeX from tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .help("Input file (default stdin)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file (default stdout)"),
        )
        .get_matches();

    let input = read_input(matches.get_one::<String>("input"));
    let syntax = SyntaxTable::builtin();

    let output = if matches.get_flag("to-tex") {
        let root: Node = serde_json::from_str(&input).unwrap_or_else(|e| {
            eprintln!("Invalid tree input: {}", e);
            process::exit(1);
        });
        write_tex(&root, syntax)
    } else {
        let conversion = parse_tex(&input, syntax);
        if let Some(failure) = &conversion.failure {
            // Diagnostic on stderr; the partial tree is still printed
            eprintln!("{}", failure);
        }
        let mut json = serde_json::to_string_pretty(&conversion.root).unwrap_or_else(|e| {
            eprintln!("Error formatting tree: {}", e);
            process::exit(1);
        });
        json.push('\n');
        json
    };

    write_output(matches.get_one::<String>("output"), &output);
}

fn read_input(path: Option<&String>) -> String {
    match path {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Cannot read {}: {}", path, e);
            process::exit(1);
        }),
        None => {
            let mut input = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut input) {
                eprintln!("Cannot read stdin: {}", e);
                process::exit(1);
            }
            input
        }
    }
}

fn write_output(path: Option<&String>, output: &str) {
    match path {
        Some(path) => {
            if let Err(e) = fs::write(path, output) {
                eprintln!("Cannot write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => {
            let stdout = std::io::stdout();
            if let Err(e) = stdout.lock().write_all(output.as_bytes()) {
                eprintln!("Cannot write stdout: {}", e);
                process::exit(1);
            }
        }
    }
}
