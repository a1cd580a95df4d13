//! Terminal session for podium.
//!
//! [`Tui`] owns the crossterm backend and a reader task that turns terminal
//! input, the animation tick and the redraw clock into one [`Event`] stream.

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, terminal};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// After this the reader task is aborted instead of awaited.
const ABORT_AFTER: Duration = Duration::from_millis(500);
/// After this the reader task is reported as stuck.
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

type Backend = CrosstermBackend<Stdout>;

/// Everything the app loop reacts to.
#[derive(Clone, Debug)]
pub enum Event {
    /// ctrl+c or SIGTERM.
    Quit,
    /// Advance spinners and expire toasts.
    Tick,
    /// Time to draw a frame.
    Render,
    Paste(String),
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Map one crossterm event onto podium's events. `None` means skip it.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Press => None,
        CrosstermEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Event::Quit)
        }
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::FocusGained | CrosstermEvent::FocusLost => None,
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    reader: Option<JoinHandle<()>>,
    stop: CancellationToken,
    event_tx: UnboundedSender<Event>,
    event_rx: UnboundedReceiver<Event>,
    tick: Duration,
    frame: Duration,
}

impl Tui {
    /// `tick` paces animations, `frame` paces redraws.
    pub fn new(tick: Duration, frame: Duration) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(stdout()))?,
            reader: None,
            stop: CancellationToken::new(),
            event_tx,
            event_rx,
            tick,
            frame,
        })
    }

    /// Switch to raw mode on the alternate screen and start reading input.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        self.spawn_reader();
        Ok(())
    }

    /// Stop reading input and give the terminal back to the shell.
    pub fn exit(&mut self) -> Result<()> {
        self.stop_reader()?;
        if terminal::is_raw_mode_enabled()? {
            self.terminal.flush()?;
            execute!(
                stdout(),
                DisableBracketedPaste,
                DisableMouseCapture,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Restore the shell and stop the process until it is resumed with `fg`.
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    /// Back from a suspend: read input again and repaint from scratch.
    pub fn resume(&mut self) -> Result<()> {
        self.enter()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.terminal.resize(Rect::new(0, 0, width, height))?;
        Ok(())
    }

    fn spawn_reader(&mut self) {
        self.stop.cancel();
        self.stop = CancellationToken::new();
        self.reader = Some(tokio::spawn(read_events(
            self.event_tx.clone(),
            self.stop.clone(),
            self.tick,
            self.frame,
        )));
    }

    fn stop_reader(&mut self) -> Result<()> {
        self.stop.cancel();
        let Some(reader) = self.reader.take() else {
            return Ok(());
        };

        let started = Instant::now();
        while !reader.is_finished() {
            let waited = started.elapsed();
            if waited >= GIVE_UP_AFTER {
                return Err(eyre!("Terminal reader did not stop"));
            }
            if waited >= ABORT_AFTER {
                reader.abort();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(error) = self.exit() {
            tracing::error!(error = %format!("{error:#}"), "Failed to restore terminal");
        }
    }
}

#[cfg(unix)]
fn forward_sigterm(event_tx: UnboundedSender<Event>) {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::spawn(async move {
                if sigterm.recv().await.is_some() {
                    let _ = event_tx.send(Event::Quit);
                }
            });
        }
        Err(error) => tracing::warn!(%error, "Failed to install SIGTERM handler"),
    }
}

async fn read_events(
    event_tx: UnboundedSender<Event>,
    stop: CancellationToken,
    tick: Duration,
    frame: Duration,
) {
    let mut input = EventStream::new();
    let mut ticks = interval(tick);
    let mut frames = interval(frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    #[cfg(unix)]
    forward_sigterm(event_tx.clone());

    loop {
        let event = tokio::select! {
            () = stop.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(error)) => {
                    tracing::warn!(%error, "Terminal event error");
                    continue;
                }
                None => break,
            },
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
    stop.cancel();
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEventKind};

    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        assert!(matches!(
            translate(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        ));
        assert!(matches!(
            translate(press(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Event::Key(_))
        ));
    }

    #[test]
    fn test_only_key_presses_are_forwarded() {
        let release = KeyEvent {
            code: KeyCode::Char('b'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(translate(CrosstermEvent::Key(release)).is_none());
        assert!(translate(CrosstermEvent::FocusLost).is_none());
    }

    #[test]
    fn test_mouse_paste_and_resize_pass_through() {
        let mouse = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(translate(CrosstermEvent::Mouse(mouse)), Some(Event::Mouse(m)) if m.row == 4));
        assert!(matches!(
            translate(CrosstermEvent::Paste("hi".to_string())),
            Some(Event::Paste(text)) if text == "hi"
        ));
        assert!(matches!(
            translate(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));
    }
}
