//! Cadenza: a terminal client for a music playback daemon.
//!
//! The binary wires the toolkit together: it loads the color scheme, owns
//! the terminal session, builds the screen layout and runs the dispatcher.
//! Daemon connectivity plugs into the same event loop through callbacks;
//! the demo layout below runs against a local playlist model.

mod app;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use cadenza_tui::{
    KeyCode, KeyEvent, ListView, PaintError, Rect, Scheme, SchemeError, Size, StackPanel,
    TextMode, TextView, TuiError, VecModel, Widget, WindowBase,
};

use app::App;
use terminal::TerminalSession;

/// The smallest terminal the layout can work with.
const MIN_COLS: u16 = 20;
const MIN_LINES: u16 = 4;

/// Fatal-tier errors: printed to stderr by `main`, process exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Terminal I/O failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The toolkit reported an unrecoverable condition.
    #[error(transparent)]
    Toolkit(#[from] TuiError),

    /// Painting failed (color-pair pool exhausted, painter conflict).
    #[error(transparent)]
    Paint(#[from] PaintError),

    /// The color scheme could not be loaded.
    #[error(transparent)]
    Scheme(#[from] SchemeError),

    /// The terminal is smaller than the minimum layout.
    #[error("terminal too small: {cols}x{lines}, need at least {MIN_COLS}x{MIN_LINES}")]
    TerminalTooSmall { cols: u16, lines: u16 },

    /// Command-line usage error.
    #[error("{0}")]
    Usage(String),
}

/// Parsed command line.
struct Options {
    scheme: Option<PathBuf>,
}

fn parse_args() -> Result<Options, Error> {
    let mut scheme = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scheme" | "-s" => {
                let path = args
                    .next()
                    .ok_or_else(|| Error::Usage("--scheme requires a file path".into()))?;
                scheme = Some(PathBuf::from(path));
            }
            "--help" | "-h" => {
                println!("usage: cadenza [--scheme <file>]");
                std::process::exit(0);
            }
            other => {
                return Err(Error::Usage(format!("unknown argument '{other}'")));
            }
        }
    }
    Ok(Options { scheme })
}

fn init_logging() {
    // The terminal belongs to the UI; logs go to a file next to the state.
    let path = std::env::temp_dir().join("cadenza.log");
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Top-level widget: screens in a stack, switched with F-keys before the
/// focus chain sees anything.
struct Screens {
    stack: StackPanel,
}

impl Widget for Screens {
    fn window_base(&self) -> &WindowBase {
        self.stack.window_base()
    }

    fn window_base_mut(&mut self) -> &mut WindowBase {
        self.stack.window_base_mut()
    }

    fn child_count(&self) -> usize {
        self.stack.child_count()
    }

    fn child(&self, index: usize) -> Option<&dyn Widget> {
        self.stack.child(index)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut dyn Widget> {
        self.stack.child_mut(index)
    }

    fn focused_child_index(&self) -> Option<usize> {
        self.stack.focused_child_index()
    }

    fn set_focused_child_index(&mut self, index: Option<usize>) {
        self.stack.set_focused_child_index(index);
    }

    fn resize_children(&mut self) {
        let size = self.stack.window_base().size();
        for index in 0..self.stack.child_count() {
            if let Some(child) = self.stack.child_mut(index) {
                if let Err(err) = child.resize_cascaded(size) {
                    tracing::warn!(target: "cadenza::app", %err, "screen resize failed");
                }
            }
        }
    }

    fn key_press_event(&mut self, event: &KeyEvent) -> bool {
        match event.code {
            KeyCode::F(1) => {
                self.stack.set_active(0);
                true
            }
            KeyCode::F(2) => {
                self.stack.set_active(1);
                true
            }
            _ => self.stack.key_press_event(event),
        }
    }

    fn show(&mut self) {
        self.stack.show();
    }
}

const HELP_TEXT: &str = "<h1>Cadenza</h1>\
<p>A terminal client for your music daemon.</p>\
<li><b>F1</b> playlist</li>\
<li><b>F2</b> this help</li>\
<li><b>Up/Down</b> move the cursor</li>\
<li><b>Enter</b> play the highlighted song</li>\
<li><b>q</b> quit</li>";

fn build_ui(app: &mut App, cols: u16, lines: u16) {
    let pool = app.pool();
    let rect = Rect::new(0, 0, cols, lines);

    let playlist_model = VecModel::new(vec![
        "The Ink Spots - We Three".to_string(),
        "Billie Holiday - Solitude".to_string(),
        "Nat King Cole - Nature Boy".to_string(),
        "Chet Baker - Almost Blue".to_string(),
    ]);
    let mut playlist = ListView::new(rect, pool.clone(), playlist_model);
    playlist.window_base_mut().set_palette(app.palettes().palette_for_class(
        "ListView",
        None,
        &[],
    ));
    playlist.set_highlight_timeout(Some(Duration::from_secs(5)));
    playlist.attach_timers(app.timers());
    playlist
        .activated
        .connect(|&index| {
            tracing::info!(target: "cadenza::app", index, "song activated");
        })
        .detach();

    let mut help = TextView::new(rect, pool.clone());
    help.window_base_mut()
        .set_palette(app.palettes().palette_for_class("TextView", None, &[]));
    help.set_mode(TextMode::Rich);
    help.set_text(HELP_TEXT);

    let mut stack = StackPanel::new(rect, pool);
    stack.window_base_mut().set_min_size(Size::new(MIN_COLS, MIN_LINES));
    stack.add_child(Box::new(playlist));
    stack.add_child(Box::new(help));

    app.set_root(Box::new(Screens { stack }));
}

fn run() -> Result<(), Error> {
    let options = parse_args()?;
    init_logging();

    // Never partially apply a malformed scheme: load fails the startup.
    let scheme = match &options.scheme {
        Some(path) => Scheme::load(path)?,
        None => Scheme::empty(),
    };

    let (cols, lines) = TerminalSession::size()?;
    if cols < MIN_COLS || lines < MIN_LINES {
        return Err(Error::TerminalTooSmall { cols, lines });
    }

    let session = TerminalSession::begin()?;
    let mut app = App::new(scheme);
    build_ui(&mut app, cols, lines);
    let result = app.run();
    drop(session);
    result
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cadenza: {err}");
            ExitCode::FAILURE
        }
    }
}
