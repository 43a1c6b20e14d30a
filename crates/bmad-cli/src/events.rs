use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use futures_util::StreamExt;
use tokio::sync::mpsc;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick,
}

/// Terminal input and a redraw tick, merged onto one channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            while let Some(event) = reader.next().await {
                let app_event = match event {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Ok(Event::Paste(text)) => AppEvent::Paste(text),
                    Ok(Event::Resize(_, _)) => AppEvent::Resize,
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::warn!(error = %err, "terminal event stream failed");
                        break;
                    }
                };
                if tx_events.send(app_event).is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}
