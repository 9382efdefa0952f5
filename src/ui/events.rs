use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize,
}

/// Funnels terminal input and periodic ticks into one channel so the app
/// loop handles exactly one event at a time.
pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Read crossterm events on a blocking thread. A tick is sent whenever
    /// `tick_rate` passes without input. The reader exits once the receiving
    /// side is gone.
    pub fn spawn_input_reader(&self, tick_rate: Duration) -> JoinHandle<()> {
        let sender = self.sender();

        tokio::task::spawn_blocking(move || loop {
            let event = match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Ok(Event::Resize(_, _)) => AppEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Failed to read terminal event: {}", e);
                        continue;
                    }
                },
                Ok(false) => AppEvent::Tick,
                Err(e) => {
                    warn!("Terminal poll failed: {}", e);
                    std::thread::sleep(tick_rate);
                    AppEvent::Tick
                }
            };

            if sender.send(event).is_err() {
                debug!("Event receiver closed, stopping input reader");
                break;
            }
        })
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
