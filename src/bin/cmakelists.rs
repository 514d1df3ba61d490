//! Command-line interface for cmakelists
//! Inspects, checks and edits CMake listfiles without disturbing their formatting.
//!
//! Usage:
//!   cmakelists inspect `<path>` [--format `<format>`]                 - Dump a parsed listfile
//!   cmakelists check `<path>`...                                      - Verify files round-trip unchanged
//!   cmakelists insert `<path>` --command `<snippet>` [--test] [--write] - Place a command at its canonical position
//!   cmakelists targets `<path>`                                       - Build targets and their sources as JSON
//!   cmakelists formats                                              - List output formats
//!
//! Every subcommand accepts `--config <file>` to layer settings over the built-in defaults.

use clap::{Arg, ArgAction, ArgMatches, Command};
use cmakelists::cmake::formats::{tokens_to_json, FormatRegistry};
use cmakelists::cmake::lexing::tokenize;
use cmakelists::cmake::ordering::{InsertionTrace, NoTrace, TraceEvent};
use cmakelists::cmake::{self, Document, Profile};
use cmakelists::config::{Loader, Settings};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

fn main() {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .global(true)
        .help("TOML file layered over the built-in defaults");

    let matches = Command::new("cmakelists")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting and editing CMake listfiles")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(config_arg)
        .subcommand(
            Command::new("inspect")
                .about("Parse a listfile and print it in the given format")
                .arg(
                    Arg::new("path")
                        .help("Path to the listfile")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'treeviz', 'json', 'yaml', 'text', 'tokens')"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Verify that each listfile parses and serializes back unchanged")
                .arg(
                    Arg::new("paths")
                        .help("Listfiles to check")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("insert")
                .about("Insert a command at its canonical position")
                .arg(
                    Arg::new("path")
                        .help("Path to the listfile")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("command")
                        .long("command")
                        .help("The command to insert, e.g. 'find_package(roscpp REQUIRED)'")
                        .required(true),
                )
                .arg(
                    Arg::new("test")
                        .long("test")
                        .help("Insert into the test-only section, creating it if needed")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .help("Print each placement step as a JSON line on stderr")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .help("Overwrite the file instead of printing the result")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("targets")
                .about("Print build targets, their sources and links as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the listfile")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("formats").about("List all available output formats"))
        .get_matches();

    let settings = load_settings(&matches);

    match matches.subcommand() {
        Some(("inspect", inspect_matches)) => {
            let path = inspect_matches.get_one::<String>("path").unwrap();
            let format = inspect_matches
                .get_one::<String>("format")
                .cloned()
                .unwrap_or_else(|| settings.inspect.format.clone());
            handle_inspect_command(&settings, path, &format);
        }
        Some(("check", check_matches)) => {
            let paths: Vec<&String> = check_matches.get_many::<String>("paths").unwrap().collect();
            handle_check_command(&settings, &paths);
        }
        Some(("insert", insert_matches)) => {
            let path = insert_matches.get_one::<String>("path").unwrap();
            let snippet = insert_matches.get_one::<String>("command").unwrap();
            let options = InsertOptions {
                into_tests: insert_matches.get_flag("test"),
                trace: insert_matches.get_flag("trace") || settings.insertion.trace,
                write: insert_matches.get_flag("write"),
            };
            handle_insert_command(&settings, path, snippet, options);
        }
        Some(("targets", targets_matches)) => {
            let path = targets_matches.get_one::<String>("path").unwrap();
            handle_targets_command(&settings, path);
        }
        Some(("formats", _)) => {
            handle_formats_command();
        }
        _ => unreachable!(),
    }
}

fn load_settings(matches: &ArgMatches) -> Settings {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

fn read_source(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    })
}

fn parse_file(settings: &Settings, path: &str, source: &str) -> Document {
    let profile = Arc::new(Profile::from_settings(settings));
    cmake::parse_with(source, profile).unwrap_or_else(|e| {
        eprintln!("{}: {}", path, e);
        std::process::exit(1);
    })
}

/// Handle the inspect command
fn handle_inspect_command(settings: &Settings, path: &str, format: &str) {
    let source = read_source(path);

    if format == "tokens" {
        let tokens = tokenize(&source).unwrap_or_else(|e| {
            eprintln!("{}: {}", path, e);
            std::process::exit(1);
        });
        let output = tokens_to_json(&source, &tokens).unwrap_or_else(|e| {
            eprintln!("Error formatting tokens: {}", e);
            std::process::exit(1);
        });
        println!("{}", output);
        return;
    }

    let doc = parse_file(settings, path, &source);
    let registry = FormatRegistry::default();
    let output = registry.serialize(&doc, format).unwrap_or_else(|e| {
        eprintln!("{}", e);
        eprintln!("Available formats: tokens, {}", registry.list_formats().join(", "));
        std::process::exit(1);
    });
    print!("{}", output);
}

/// Handle the check command. Keeps going after a failing file and exits non-zero at the end.
fn handle_check_command(settings: &Settings, paths: &[&String]) {
    let profile = Arc::new(Profile::from_settings(settings));
    let mut failures = 0;

    for path in paths {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                failures += 1;
                continue;
            }
        };
        match cmake::parse_with(&source, profile.clone()) {
            Ok(doc) if cmake::serialize(&doc) == source && doc.is_index_consistent() => {
                println!("ok {}", path);
            }
            Ok(_) => {
                eprintln!("{}: serialization differs from the source", path);
                failures += 1;
            }
            Err(e) => {
                eprintln!("{}: {}", path, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

struct InsertOptions {
    into_tests: bool,
    trace: bool,
    write: bool,
}

/// Writes trace events to stderr, one JSON object per line
struct JsonLinesTrace;

impl InsertionTrace for JsonLinesTrace {
    fn event(&mut self, event: &TraceEvent) {
        match serde_json::to_string(event) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => eprintln!("Error formatting trace event: {}", e),
        }
    }
}

/// Handle the insert command
fn handle_insert_command(settings: &Settings, path: &str, snippet: &str, options: InsertOptions) {
    let source = read_source(path);
    let mut doc = parse_file(settings, path, &source);

    let command: cmake::Command = snippet.parse().unwrap_or_else(|e| {
        eprintln!("Invalid command {:?}: {}", snippet, e);
        std::process::exit(1);
    });

    let mut json_trace = JsonLinesTrace;
    let mut no_trace = NoTrace;
    let trace: &mut dyn InsertionTrace = if options.trace {
        &mut json_trace
    } else {
        &mut no_trace
    };

    let target = if options.into_tests {
        match doc.test_section_mut(true) {
            Some(section) => section,
            None => {
                eprintln!("{}: could not create the test section", path);
                std::process::exit(1);
            }
        }
    } else {
        &mut doc
    };
    target.add_command_traced(command, trace);

    let output = cmake::serialize(&doc);
    if options.write {
        std::fs::write(path, output).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", path, e);
            std::process::exit(1);
        });
    } else {
        print!("{}", output);
    }
}

#[derive(Serialize)]
struct TargetsReport {
    project: String,
    libraries: BTreeMap<String, Vec<String>>,
    executables: BTreeMap<String, Vec<String>>,
    links: BTreeMap<String, Vec<String>>,
    test_sources: BTreeSet<String>,
}

/// Handle the targets command
fn handle_targets_command(settings: &Settings, path: &str) {
    let source = read_source(path);
    let doc = parse_file(settings, path, &source);

    let report = TargetsReport {
        project: doc.project_name(),
        libraries: doc.source_build_rules("add_library"),
        executables: doc.source_build_rules("add_executable"),
        links: doc.link_rules(),
        test_sources: doc.test_sources(),
    };
    let output = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        eprintln!("Error formatting targets: {}", e);
        std::process::exit(1);
    });
    println!("{}", output);
}

/// Handle the formats command
fn handle_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available output formats:\n");
    for name in registry.list_formats() {
        let description = registry
            .get(&name)
            .map(|formatter| formatter.description())
            .unwrap_or_default();
        println!("  {}", name);
        println!("    {}", description);
        println!();
    }
    println!("  tokens");
    println!("    Token stream as JSON");
}
