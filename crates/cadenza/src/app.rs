//! The application context and dispatcher loop.
//!
//! [`App`] is built once in `main` and owns everything with process
//! lifetime: the top-level widget, the timer manager, the palette cache and
//! the dispatcher. There are no global singletons; components that need the
//! context receive it explicitly.
//!
//! One external event source (the terminal) feeds the dispatcher. Each key
//! event goes either to the *grabbed* window — a temporary override used
//! for modal line input — or to the top-level widget, which recurses
//! through its focus chain. Timers fire on the same thread between input
//! events; no widget state is ever touched concurrently.

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cadenza_core::TimerManager;
use cadenza_tui::event::{key_event_from_backend, mouse_event_from_backend};
use cadenza_tui::{
    flush_tree, paint_tree, ColorPairPool, KeyCode, KeyEvent, MouseEvent, MouseEventKind,
    PaletteCache, Point, Scheme, Size, Widget,
};
use parking_lot::Mutex;

/// Two presses at the same spot within this interval make a double-click.
const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);

/// The application context.
pub struct App {
    /// The top-level widget covering the whole terminal.
    root: Box<dyn Widget>,

    /// A window temporarily receiving all keyboard input, bypassing the
    /// focus chain (modal line input).
    grabbed: Option<Box<dyn Widget>>,

    /// Shared timer source; widgets arm their own timers through this.
    timers: Arc<Mutex<TimerManager>>,

    /// Per-class palette resolution.
    palettes: PaletteCache,

    /// The color-pair pool every surface allocates from.
    pool: Arc<ColorPairPool>,

    /// Set when the user asked to quit.
    quit: bool,

    /// Double-click detection state.
    last_click: Option<(Instant, Point)>,
}

impl App {
    /// Create the context. The widget tree is attached afterwards with
    /// [`App::set_root`].
    pub fn new(scheme: Scheme) -> Self {
        Self {
            root: Box::new(cadenza_tui::Panel::new(
                cadenza_tui::Rect::new(0, 0, 1, 1),
                ColorPairPool::new(),
            )),
            grabbed: None,
            timers: Arc::new(Mutex::new(TimerManager::new())),
            palettes: PaletteCache::new(scheme),
            pool: ColorPairPool::new(),
            quit: false,
            last_click: None,
        }
    }

    /// The shared color-pair pool.
    pub fn pool(&self) -> Arc<ColorPairPool> {
        self.pool.clone()
    }

    /// The shared timer manager.
    pub fn timers(&self) -> Arc<Mutex<TimerManager>> {
        self.timers.clone()
    }

    /// The palette cache.
    pub fn palettes(&self) -> &PaletteCache {
        &self.palettes
    }

    /// Install the top-level widget and mark it focused.
    pub fn set_root(&mut self, mut root: Box<dyn Widget>) {
        root.window_base_mut().set_focused(true);
        root.reposition(Point::ZERO);
        self.root = root;
    }

    /// Access the top-level widget.
    pub fn root_mut(&mut self) -> &mut dyn Widget {
        self.root.as_mut()
    }

    /// Route all keyboard input to `window` until [`App::release_grab`].
    pub fn grab_focus(&mut self, mut window: Box<dyn Widget>) {
        window.window_base_mut().set_focused(true);
        self.grabbed = Some(window);
    }

    /// End a grab, returning the grabbed window.
    pub fn release_grab(&mut self) -> Option<Box<dyn Widget>> {
        self.grabbed.take()
    }

    /// Ask the dispatcher to stop after the current iteration.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Dispatch one key event: grabbed window first, then the focus chain.
    /// `q` and Ctrl-C quit when nothing below consumed them.
    pub fn dispatch_key(&mut self, event: &KeyEvent) {
        if self.grabbed.is_some() {
            if event.code == KeyCode::Escape {
                self.release_grab();
                self.root.window_base_mut().update();
                return;
            }
            if let Some(grabbed) = &mut self.grabbed {
                grabbed.key_press_event(event);
            }
            return;
        }
        if self.root.key_press_event(event) {
            return;
        }
        match event.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('c') if event.ctrl => self.quit(),
            _ => {}
        }
    }

    /// Dispatch one mouse event, synthesizing double-clicks from press
    /// pairs that land on the same cell within the interval.
    pub fn dispatch_mouse(&mut self, event: &MouseEvent) {
        let mut event = *event;
        if event.kind == MouseEventKind::Press {
            let now = Instant::now();
            if let Some((at, pos)) = self.last_click {
                if pos == event.pos && now.duration_since(at) <= DOUBLE_CLICK_INTERVAL {
                    event.kind = MouseEventKind::DoubleClick;
                }
            }
            self.last_click = match event.kind {
                MouseEventKind::DoubleClick => None,
                _ => Some((now, event.pos)),
            };
        }
        self.root.mouse_event(&event);
    }

    /// The terminal was resized.
    pub fn dispatch_resize(&mut self, cols: u16, lines: u16) {
        if let Err(err) = self.root.resize(Size::new(cols, lines)) {
            // The window manager can hand us sizes below the layout's
            // minimum; keep the old layout and wait for a usable size.
            tracing::warn!(target: "cadenza::app", %err, "ignoring resize");
        }
    }

    /// Fire due timers into the widget tree.
    fn dispatch_timers(&mut self) {
        let fired = self.timers.lock().poll(Instant::now());
        for id in fired {
            if let Some(grabbed) = &mut self.grabbed {
                if grabbed.timer_event(id) {
                    continue;
                }
            }
            self.root.timer_event(id);
        }
    }

    /// Paint pending windows and push the result to the terminal.
    pub fn render(&mut self) -> Result<(), crate::Error> {
        paint_tree(self.root.as_mut())?;
        if let Some(grabbed) = &mut self.grabbed {
            paint_tree(grabbed.as_mut())?;
        }
        let mut out = stdout();
        flush_tree(self.root.as_ref(), &mut out).map_err(crate::Error::Terminal)?;
        if let Some(grabbed) = &self.grabbed {
            flush_tree(grabbed.as_ref(), &mut out).map_err(crate::Error::Terminal)?;
        }
        Ok(())
    }

    /// Run the dispatcher until [`App::quit`].
    pub fn run(&mut self) -> Result<(), crate::Error> {
        self.render()?;
        while !self.quit {
            let timeout = self
                .timers
                .lock()
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_millis(250));

            if crossterm::event::poll(timeout).map_err(crate::Error::Terminal)? {
                match crossterm::event::read().map_err(crate::Error::Terminal)? {
                    crossterm::event::Event::Key(key) => {
                        if let Some(event) = key_event_from_backend(&key) {
                            self.dispatch_key(&event);
                        }
                    }
                    crossterm::event::Event::Mouse(mouse) => {
                        if let Some(event) = mouse_event_from_backend(&mouse) {
                            self.dispatch_mouse(&event);
                        }
                    }
                    crossterm::event::Event::Resize(cols, lines) => {
                        self.dispatch_resize(cols, lines);
                    }
                    _ => {}
                }
            }
            self.dispatch_timers();
            self.render()?;
        }
        Ok(())
    }
}

