//! Test driver for the velab front end.
//!
//! Since lexing and parsing live outside the library, designs arrive as
//! JSON fixtures that deserialize straight into the parse-tree data
//! model (`velab::pt::PtSource`). The driver loads one or more
//! fixtures, runs the requested stage, and optionally dumps the
//! elaborated database as JSON.

use std::{fs, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use velab::{
    ClibCell, ClibPin, Diagnostic, DiagSink, Direction, ElabOptions, Severity, SimpleCellLibrary,
    SimpleSystfRegistry, StderrSink, elaborate,
    pt::PtSource,
    vl::dump_design,
};

#[derive(Debug, Parser)]
#[command(name = "velab", about = "Verilog-HDL front-end test driver", version)]
struct Args {
    /// Raw-lexer mode (not available: lexing is outside this front
    /// end).
    #[arg(short = '1', long)]
    rawlex: bool,

    /// Lexer mode (not available: lexing is outside this front end).
    #[arg(short = '2', long)]
    lex: bool,

    /// Parse-only mode: load the fixtures, report, stop.
    #[arg(short = '3', long)]
    yacc: bool,

    /// Elaborate mode (the default).
    #[arg(short = '4', long)]
    elaborate: bool,

    /// Verbose mode: narrate what the driver is doing.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Dump the elaborated database as JSON.
    #[arg(short = 'd', long)]
    dump: bool,

    /// Display all kinds of messages, including Info.
    #[arg(short = 'a', long = "all-msg")]
    all_msg: bool,

    /// Colon-separated list of directories searched for fixture files.
    #[arg(short = 'p', long = "search-path")]
    search_path: Option<String>,

    /// Repeat the selected stage N times (throughput testing).
    #[arg(short = 'l', long = "loop", value_name = "N")]
    loop_count: Option<u32>,

    /// Report diagnostics landing on this source line.
    #[arg(short = 'w', long = "watch-line", value_name = "LINE")]
    watch_line: Option<u32>,

    /// Show a profile of the elaborated database.
    #[arg(short = 'q', long)]
    profile: bool,

    /// Cell library (JSON cell list) for celldefine primitives.
    #[arg(long, value_name = "FILE")]
    liberty: Option<PathBuf>,

    /// Cell library in the same format, loaded via the mislib flag.
    #[arg(long, value_name = "FILE")]
    mislib: Option<PathBuf>,

    /// Fixture files.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

/// Sink wrapper that forwards to stderr and counts errors, watching one
/// line when asked.
struct DriverSink {
    inner: StderrSink,
    watch_line: Option<u32>,
    errors: usize,
}

impl DiagSink for DriverSink {
    fn diag(&mut self, diag: &Diagnostic) {
        if diag.severity >= Severity::Error {
            self.errors += 1;
        }
        if let Some(line) = self.watch_line
            && diag.region.line == line
        {
            eprintln!("[watch] {diag}");
        }
        self.inner.diag(diag);
    }
}

fn main() -> ExitCode {
    // Exit 1 on option errors (help/version still exit 0).
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    if args.rawlex || args.lex {
        eprintln!("velab: lexer modes are not available; this driver starts from parse-tree fixtures.");
        return ExitCode::FAILURE;
    }

    let cell_lib = match load_cell_library(&args) {
        Ok(lib) => lib,
        Err(msg) => {
            eprintln!("velab: {msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut source = PtSource::new();
    for file in &args.files {
        let path = match resolve_path(file, args.search_path.as_deref()) {
            Some(p) => p,
            None => {
                eprintln!("velab: {}: not found.", file.display());
                return ExitCode::FAILURE;
            }
        };
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(err) => {
                eprintln!("velab: {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        };
        if args.verbose {
            eprintln!("velab: reading {}", path.display());
        }
        let mut part: PtSource = match serde_json::from_str(&text) {
            Ok(p) => p,
            Err(err) => {
                eprintln!("velab: {}: fixture parse error: {err}", path.display());
                return ExitCode::FAILURE;
            }
        };
        part.reindex();
        merge_sources(&mut source, part);
    }

    if args.yacc {
        let modules: Vec<&str> = source.modules().map(|m| m.name.as_str()).collect();
        println!("loaded {} module(s): {}", modules.len(), modules.join(", "));
        return ExitCode::SUCCESS;
    }

    let loops = args.loop_count.unwrap_or(1).max(1);
    let opts = ElabOptions::default();
    let systf = SimpleSystfRegistry::new();

    let mut exit = ExitCode::SUCCESS;
    let start = Instant::now();
    for i in 0..loops {
        let mut sink = DriverSink {
            inner: StderrSink { all_msg: args.all_msg },
            watch_line: args.watch_line,
            errors: 0,
        };
        let db = elaborate(
            &source,
            &opts,
            cell_lib.as_ref().map(|l| l as &dyn velab::CellLibrary),
            &systf,
            &mut sink,
        );

        if i == 0 {
            if args.dump {
                let tree = dump_design(&db);
                match serde_json::to_string_pretty(&tree) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("velab: dump failed: {err}"),
                }
            }
            if args.profile {
                let top = db.topmodule_list().len();
                println!("top modules: {top}");
                for &module in db.topmodule_list() {
                    let scope = db.module(module).scope;
                    println!("  {}", db.full_name(scope));
                }
            }
        }
        if sink.errors > 0 {
            exit = ExitCode::FAILURE;
        }
    }
    if args.profile {
        println!("elaboration time ({loops} run(s)): {:?}", start.elapsed());
    }

    exit
}

fn resolve_path(file: &PathBuf, search_path: Option<&str>) -> Option<PathBuf> {
    if file.exists() {
        return Some(file.clone());
    }
    for dir in search_path.unwrap_or_default().split(':').filter(|d| !d.is_empty()) {
        let candidate = PathBuf::from(dir).join(file);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Loads a JSON cell list: `[{"name": "AND2", "pins": [{"name": "o",
/// "dir": "Output"}, ...]}, ...]`.
fn load_cell_library(args: &Args) -> Result<Option<SimpleCellLibrary>, String> {
    let path = match (&args.liberty, &args.mislib) {
        (Some(p), _) | (None, Some(p)) => p,
        (None, None) => return Ok(None),
    };
    let text = fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let cells: Vec<CellFixture> =
        serde_json::from_str(&text).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut lib = SimpleCellLibrary::default();
    for cell in cells {
        let pins = cell
            .pins
            .into_iter()
            .map(|p| {
                let dir = p.dir.parse().unwrap_or(Direction::Input);
                ClibPin { name: p.name, dir }
            })
            .collect();
        lib.push(ClibCell { name: cell.name, pins });
    }
    Ok(Some(lib))
}

#[derive(serde::Deserialize)]
struct CellFixture {
    name: String,
    #[serde(default)]
    pins: Vec<PinFixture>,
}

#[derive(serde::Deserialize)]
struct PinFixture {
    name: String,
    #[serde(default)]
    dir: String,
}

/// Folds a deserialized fixture into the accumulated source.
fn merge_sources(into: &mut PtSource, part: PtSource) {
    let (files, modules, udps) = part.into_parts();
    for file in files {
        into.add_file(file);
    }
    for module in modules {
        into.add_module(module);
    }
    for udp in udps {
        into.add_udp(udp);
    }
}
