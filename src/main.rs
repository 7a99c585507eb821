//! pagewise - read plain-text books in the terminal

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pagewise::{
    ByteSource, FileSource, GridMeasurer, JsonFileStore, MemoryStore, ReadingSession, RecordStore,
    TextLoader, Viewport, search,
};

#[derive(Parser)]
#[command(name = "pagewise")]
#[command(version, about = "Plain-text book reader engine", long_about = None)]
#[command(after_help = "EXAMPLES:
    pagewise info novel.txt                     Show detected encoding and size
    pagewise toc novel.txt                      List detected chapters
    pagewise search novel.txt 第二章            Find a phrase
    pagewise page novel.txt --store state.json --next")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show encoding, length and structure of a file
    Info {
        #[arg(value_name = "FILE")]
        file: String,
    },
    /// Print the detected table of contents
    Toc {
        #[arg(value_name = "FILE")]
        file: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive search
    Search {
        #[arg(value_name = "FILE")]
        file: String,
        #[arg(value_name = "QUERY")]
        query: String,
        /// Characters of context around each hit
        #[arg(short, long, default_value_t = 12)]
        context: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print one page laid out for a terminal-sized viewport
    Page {
        #[arg(value_name = "FILE")]
        file: String,
        /// Zero-based page to show
        #[arg(short, long, conflicts_with_all = ["offset", "next", "prev"])]
        page: Option<usize>,
        /// Show the page containing this character offset
        #[arg(short, long, conflicts_with_all = ["next", "prev"])]
        offset: Option<usize>,
        /// Advance from the saved position
        #[arg(long, conflicts_with = "prev")]
        next: bool,
        /// Go back from the saved position
        #[arg(long)]
        prev: bool,
        /// Columns per line
        #[arg(long, default_value_t = 80)]
        cols: u16,
        /// Lines per page
        #[arg(long, default_value_t = 24)]
        rows: u16,
        /// JSON file that remembers reading positions
        #[arg(long, value_name = "PATH")]
        store: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Info { file } => show_info(&file),
        Command::Toc { file, json } => show_toc(&file, json),
        Command::Search {
            file,
            query,
            context,
            json,
        } => show_search(&file, &query, context, json),
        Command::Page {
            file,
            page,
            offset,
            next,
            prev,
            cols,
            rows,
            store,
        } => {
            let nav = if let Some(page) = page {
                Nav::Page(page)
            } else if let Some(offset) = offset {
                Nav::Offset(offset)
            } else if next {
                Nav::Next
            } else if prev {
                Nav::Prev
            } else {
                Nav::Stay
            };
            let viewport = terminal_viewport(cols, rows);
            match store {
                Some(path) => JsonFileStore::open(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|store| show_page(&file, store, viewport, nav)),
                None => show_page(&file, MemoryStore::new(), viewport, nav),
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

enum Nav {
    Stay,
    Page(usize),
    Offset(usize),
    Next,
    Prev,
}

/// One terminal cell per narrow character and one row per line.
///
/// With a 2px font the grid measurer advances a narrow character by 1px, and
/// a 0.5 line spacing makes every line 1px tall.
fn terminal_viewport(cols: u16, rows: u16) -> Viewport {
    Viewport::new(f32::from(cols), f32::from(rows), 2.0, 0.5)
}

fn open_source(path: &str) -> Result<Arc<dyn ByteSource>, String> {
    let source = FileSource::open(path).map_err(|e| format!("{path}: {e}"))?;
    Ok(Arc::new(source))
}

fn show_info(path: &str) -> Result<(), String> {
    let source = open_source(path)?;
    let bytes = source.len();
    let loaded = TextLoader::new().load(source, None).map_err(|e| e.to_string())?;
    let outline = pagewise::extract(loaded.text.as_str());

    println!("File: {path}");
    println!("Encoding: {}", loaded.encoding_name());
    if loaded.guess.bom_length > 0 {
        println!("BOM: {} bytes", loaded.guess.bom_length);
    }
    println!("Bytes: {bytes}");
    println!("Characters: {}", loaded.text.len());
    println!("TOC entries: {}", outline.len());

    Ok(())
}

fn show_toc(path: &str, json: bool) -> Result<(), String> {
    let loaded = TextLoader::new()
        .load(open_source(path)?, None)
        .map_err(|e| e.to_string())?;
    let outline = pagewise::extract(loaded.text.as_str());

    if json {
        let out = serde_json::to_string_pretty(outline.entries()).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if outline.is_empty() {
        println!("No chapters detected.");
    }
    for entry in &outline {
        let indent = if entry.level > 1 { "  " } else { "" };
        println!("{indent}{} [{}]", entry.title, entry.char_offset);
    }
    Ok(())
}

fn show_search(path: &str, query: &str, context: usize, json: bool) -> Result<(), String> {
    let loaded = TextLoader::new()
        .load(open_source(path)?, None)
        .map_err(|e| e.to_string())?;
    let hits = search::search(loaded.text.as_str(), query);

    if json {
        let out = serde_json::to_string_pretty(&hits).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for hit in &hits {
        let excerpt = search::snippet(&loaded.text, *hit, context).replace('\n', " ");
        println!("{:>8}: {excerpt}", hit.offset);
    }
    println!("{} matches", hits.len());
    Ok(())
}

fn show_page<S: RecordStore>(
    path: &str,
    store: S,
    viewport: Viewport,
    nav: Nav,
) -> Result<(), String> {
    let key = Path::new(path)
        .canonicalize()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.to_string());

    let mut session = ReadingSession::new(store, GridMeasurer::new());
    session.set_viewport(viewport, &mut |_, _| {});
    session
        .open(&key, open_source(path)?, &mut |_, _| {})
        .map_err(|e| e.to_string())?;

    match nav {
        // Record the position even when only viewing.
        Nav::Stay => {
            let page = session.current_page();
            session.goto_page(page);
        }
        Nav::Page(page) => session.goto_page(page),
        Nav::Offset(offset) => session.goto_offset(offset),
        Nav::Next => session.next_page(),
        Nav::Prev => session.previous_page(),
    }

    println!("{}", session.current_page_text().trim_end_matches('\n'));
    let chapter = session
        .current_chapter()
        .and_then(|i| session.outline()?.get(i))
        .map(|entry| format!(" · {}", entry.title))
        .unwrap_or_default();
    println!(
        "-- page {}/{}{chapter} --",
        session.current_page() + 1,
        session.page_count()
    );
    Ok(())
}
