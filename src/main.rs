//! spanlight - print a source file with syntax highlighting
//!
//! Runs the incremental highlighter over a file, one line at a time, and
//! writes the styled text to the terminal.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use spanlight::{
    Color, Config, DocumentHighlighter, GrammarRegistry, HighlightError, Result, StringDocument,
    StyleAttributes, StyledRun, TextSource,
};

/// Parsed command line
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    language: Option<String>,
    list: bool,
    file: Option<PathBuf>,
}

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr. `SPANLIGHT_LOG` takes a level for this crate or a full
/// filter; `RUST_LOG` is used as-is; the default is `warn`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(create_filter())
        .with_writer(io::stderr)
        .init();
}

fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var("SPANLIGHT_LOG") {
        return EnvFilter::new(expand_spanlight_log(&level));
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new("warn")
}

fn expand_spanlight_log(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    format!("warn,spanlight={level}")
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    // Handle --help and --version
    if let Some(first) = args.first() {
        match first.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-V" => {
                print_version();
                return Ok(());
            }
            _ => {}
        }
    }

    let args = parse_args(&args)?;
    let config = Config::load();
    let registry = GrammarRegistry::with_styles(&config.styles)?;

    if args.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(path) = args.file else {
        print_usage();
        process::exit(2);
    };

    let text = fs::read_to_string(&path)?;
    let grammar = match &args.language {
        Some(name) => Some(
            registry
                .find(name)
                .ok_or_else(|| HighlightError::Config(format!("unknown language: {name}")))?,
        ),
        None => registry.detect(&path),
    };

    let document = StringDocument::new(&text);
    let mut out = io::stdout().lock();

    let grammar = match grammar {
        Some(grammar) if config.enabled => grammar,
        _ => {
            debug!(path = %path.display(), "printing without highlighting");
            out.write_all(document.text().as_bytes())?;
            out.flush()?;
            return Ok(());
        }
    };
    info!(path = %path.display(), grammar = %grammar.name, lines = document.line_count(), "highlighting");

    let highlighter = DocumentHighlighter::new(document, grammar);
    highlighter.begin_batch()?;
    for line in 1..=highlighter.document().line_count() {
        let highlighted = highlighter.highlight_line(line)?;
        let text = highlighter.document().line_text(line);
        print_line(&mut out, &text, highlighted.offset, &highlighted.runs())?;
        if line < highlighter.document().line_count() {
            queue!(out, Print("\n"))?;
        }
    }
    highlighter.end_batch()?;
    out.flush()?;

    Ok(())
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--lang" | "-l" => {
                let name = iter
                    .next()
                    .ok_or_else(|| HighlightError::Config("--lang needs a language name".into()))?;
                parsed.language = Some(name.clone());
            }
            "--list" => parsed.list = true,
            other if other.starts_with('-') => {
                return Err(HighlightError::Config(format!("unknown option: {other}")));
            }
            file => {
                if parsed.file.is_some() {
                    return Err(HighlightError::Config("only one FILE may be given".into()));
                }
                parsed.file = Some(PathBuf::from(file));
            }
        }
    }
    Ok(parsed)
}

/// Write one line, styling each run. `line_offset` is the absolute offset
/// of the line start; run offsets are absolute too.
fn print_line(out: &mut impl Write, text: &str, line_offset: usize, runs: &[StyledRun]) -> Result<()> {
    let mut cursor = 0;
    for run in runs {
        let start = run.offset - line_offset;
        let end = start + run.length;
        queue!(out, Print(text.get(cursor..start).unwrap_or("")))?;
        apply_style(out, &run.style)?;
        queue!(
            out,
            Print(text.get(start..end).unwrap_or("")),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        cursor = end;
    }
    queue!(out, Print(text.get(cursor..).unwrap_or("")))?;
    Ok(())
}

fn apply_style(out: &mut impl Write, style: &StyleAttributes) -> io::Result<()> {
    if let Some(color) = style.foreground {
        queue!(out, SetForegroundColor(term_color(color)))?;
    }
    if let Some(color) = style.background {
        queue!(out, SetBackgroundColor(term_color(color)))?;
    }
    if style.weight.is_some_and(|w| w.is_bold()) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.italic == Some(true) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if style.underline == Some(true) {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if style.strikethrough == Some(true) {
        queue!(out, SetAttribute(Attribute::CrossedOut))?;
    }
    Ok(())
}

/// Map a style color onto the terminal palette
fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
    }
}

fn print_usage() {
    println!("spanlight {} - incremental syntax highlighter", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: spanlight [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -l, --lang NAME  Highlight as NAME instead of detecting from the extension");
    println!("      --list       List available languages");
    println!("  -h, --help       Show this help message");
    println!("  -V, --version    Show version information");
    println!();
    println!("Styles are read from ~/.spanlight.toml.");
    println!("Set SPANLIGHT_LOG=debug to trace invalidation and replay.");
}

fn print_version() {
    println!("spanlight {}", env!("CARGO_PKG_VERSION"));
}
