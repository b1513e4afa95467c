//! CLI entry point for `chatcell`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use ratatui::layout::Rect;

use chatcell::cell::{estimated_row_height, CellLayout, CellOptions, MessageCell};
use chatcell::config::Config;
use chatcell::store::{load_conversation, sample_conversation, Conversation};
use chatcell::timer::{Clock, RunLoop, SystemClock};

/// Terminal preview of conversation rows with attachment bubbles and
/// disappearing-message countdowns.
#[derive(Parser)]
#[command(name = "chatcell", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Conversation file to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a conversation file in the terminal preview
    Open { path: PathBuf },
    /// Open the built-in demo conversation
    Demo,
    /// Print the computed row layout of a conversation
    Layout {
        path: PathBuf,
        /// Row width in terminal cells
        #[arg(short, long, default_value_t = 80)]
        width: u16,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = chatcell::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // The terminal preview owns the screen, so it logs to file only
    let interactive = matches!(
        cli.command,
        None | Some(Commands::Open { .. }) | Some(Commands::Demo)
    );
    setup_logging(log_level, &config, !interactive);

    match cli.command {
        Some(Commands::Open { path }) => cmd_open(&path, &config),
        Some(Commands::Demo) => cmd_demo(&config),
        Some(Commands::Layout { path, width, json }) => cmd_layout(&path, width, json, &config),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => match cli.file {
            Some(path) => cmd_open(&path, &config),
            None => {
                eprintln!("No conversation file given. Try `chatcell demo` or `chatcell --help`.");
                Ok(())
            }
        },
    }
}

/// Set up tracing with optional stderr output and file logging.
fn setup_logging(level: &str, config: &Config, to_stderr: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer =
        to_stderr.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    let log_dir = chatcell::config::cache_dir(config);
    let file_layer = std::fs::create_dir_all(&log_dir).is_ok().then(|| {
        let file_appender = tracing_appender::rolling::never(&log_dir, "chatcell.log");
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "chatcell", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn cmd_open(path: &Path, config: &Config) -> anyhow::Result<()> {
    let conversation = load_conversation(path, SystemClock.now_seconds())?;
    chatcell::tui::run_tui(conversation, config)
}

fn cmd_demo(config: &Config) -> anyhow::Result<()> {
    let conversation = sample_conversation(SystemClock.now_seconds())?;
    chatcell::tui::run_tui(conversation, config)
}

/// One laid-out row of `chatcell layout`.
struct RowReport {
    id: u64,
    direction: &'static str,
    estimated_height: u16,
    layout: CellLayout,
    remaining: Option<f64>,
}

/// Lay out every message at `width` and print the frames.
fn cmd_layout(path: &Path, width: u16, json: bool, config: &Config) -> anyhow::Result<()> {
    let now = SystemClock.now_seconds();
    let conversation = load_conversation(path, now)?;
    let rows = layout_rows(&conversation, width, config, now)?;

    if json {
        print_layout_json(&conversation, width, &rows)?;
    } else {
        print_layout_table(&conversation, width, &rows);
    }
    Ok(())
}

fn layout_rows(
    conversation: &Conversation,
    width: u16,
    config: &Config,
    now: f64,
) -> anyhow::Result<Vec<RowReport>> {
    let mut run_loop = RunLoop::new();
    let mut cell = MessageCell::new(CellOptions::from_config(config));
    let mut rows = Vec::with_capacity(conversation.messages.len());

    for message in &conversation.messages {
        cell.configure(message, &mut run_loop, now)?;
        let height = estimated_row_height(message);
        let layout = cell.layout(Rect::new(0, 0, width, height));
        let remaining = cell
            .expiration()
            .and_then(|c| c.view().fraction());
        rows.push(RowReport {
            id: message.id,
            direction: if message.direction.is_incoming() {
                "incoming"
            } else {
                "outgoing"
            },
            estimated_height: height,
            layout,
            remaining,
        });
    }

    cell.prepare_for_reuse(&mut run_loop);
    Ok(rows)
}

fn rect_json(rect: Rect) -> serde_json::Value {
    serde_json::json!({
        "x": rect.x,
        "y": rect.y,
        "width": rect.width,
        "height": rect.height,
    })
}

fn print_layout_json(conversation: &Conversation, width: u16, rows: &[RowReport]) -> anyhow::Result<()> {
    let rows_json: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let bubble = row.layout.bubble.as_ref().map(|b| {
                serde_json::json!({
                    "frame": rect_json(b.frame),
                    "icon": rect_json(b.icon),
                    "filename": rect_json(b.filename),
                    "size_label": rect_json(b.size_label),
                    "icon_text": b.icon_text,
                    "filename_text": b.filename_text,
                    "size_text": b.size_text,
                })
            });
            serde_json::json!({
                "id": row.id,
                "direction": row.direction,
                "estimated_height": row.estimated_height,
                "bubble": bubble,
                "text": row.layout.text.map(rect_json),
                "caption": row.layout.caption.map(rect_json),
                "timer": row.layout.timer.map(rect_json),
                "remaining_fraction": row.remaining,
            })
        })
        .collect();

    let report = serde_json::json!({
        "title": conversation.title,
        "width": width,
        "rows": rows_json,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_layout_table(conversation: &Conversation, width: u16, rows: &[RowReport]) {
    let fmt_rect = |r: Rect| format!("{}x{}@{},{}", r.width, r.height, r.x, r.y);

    println!("{} ({} messages, width {width})", conversation.title, rows.len());
    println!();
    println!(
        "{:>5}  {:<8}  {:>6}  {:<16}  {:<14}  {}",
        "ID", "DIR", "HEIGHT", "BUBBLE", "TIMER", "CONTENT"
    );
    println!("{}", "\u{2500}".repeat(72));

    for row in rows {
        let frame = row
            .layout
            .bubble
            .as_ref()
            .map(|b| b.frame)
            .or(row.layout.text)
            .map_or_else(|| "-".to_string(), fmt_rect);
        let timer = match (row.layout.timer, row.remaining) {
            (Some(t), Some(f)) => format!("{} {:>3.0}%", fmt_rect(t), f * 100.0),
            _ => "-".to_string(),
        };
        let content = match &row.layout.bubble {
            Some(b) => format!("[{}] {} ({})", b.icon_text, b.filename_text, b.size_text),
            None => "text".to_string(),
        };
        println!(
            "{:>5}  {:<8}  {:>6}  {:<16}  {:<14}  {}",
            row.id, row.direction, row.estimated_height, frame, timer, content
        );
    }
}
