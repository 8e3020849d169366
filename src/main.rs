//! Terminal chat widget
//!
//! Opens a floating chat panel in the terminal and relays the conversation
//! to the configured agent endpoint.

use chat_widget::config::WidgetConfig;
use chat_widget::runtime::{build_widget, ExchangeOutcome, ProductionWidget};
use chat_widget::ui::{self, Intent};
use crossterm::event::{Event as TermEvent, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::error::Error;
use std::fs::File;
use std::io::{self, Stdout};
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = WidgetConfig::from_env();
    init_logging(&config);

    let mut widget = build_widget(&config)?;
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut widget).await;
    restore_terminal(&mut terminal)?;

    tracing::info!("Chat widget closed");
    result
}

/// JSON logs to the configured file. Stdout belongs to the panel, so with no
/// usable file nothing is installed.
fn init_logging(config: &WidgetConfig) {
    let Some(file) = config.log_file.as_deref().and_then(open_log_file) else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_widget=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}

/// Opens `path` for appending. A failure is reported on stderr and logging
/// stays off.
fn open_log_file(path: &Path) -> Option<File> {
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!(
                "warning: cannot open log file {}: {e}; continuing without logs",
                path.display()
            );
            None
        }
    }
}

/// Leave raw mode before the default hook prints the panic
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

async fn run(terminal: &mut Tui, widget: &mut ProductionWidget) -> Result<(), Box<dyn Error>> {
    let mut events = EventStream::new();
    let mut snapshots = widget.subscribe();
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<ExchangeOutcome>(1);
    let mut redraw = true;

    loop {
        if redraw {
            let snapshot = snapshots.borrow_and_update();
            terminal.draw(|frame| ui::render(frame, &snapshot))?;
            redraw = false;
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                redraw = true;
            }
            Some(outcome) = outcome_rx.recv() => {
                widget.complete(outcome);
            }
            event = events.next() => match event {
                Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                    match ui::handle_key(widget.state(), key) {
                        Intent::Quit => return Ok(()),
                        Intent::TogglePanel => widget.toggle_open(),
                        Intent::ClosePanel => widget.set_open(false),
                        Intent::EditDraft(text) => widget.set_draft(text),
                        Intent::Submit => {
                            let draft = widget.state().draft.clone();
                            if let Some(pending) = widget.begin_submit(&draft) {
                                let tx = outcome_tx.clone();
                                tokio::spawn(async move {
                                    // Receiver is gone only when the app is shutting down
                                    let _ = tx.send(pending.run().await).await;
                                });
                            }
                        }
                        Intent::Ignore => {}
                    }
                }
                Some(Ok(TermEvent::Resize(..))) => redraw = true,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}
