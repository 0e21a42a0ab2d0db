use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    /// Emitted whenever the poll window lapses, stamped with the emission
    /// time so deadline checks see when the tick actually fired.
    Tick(Instant),
    Resize,
}

/// Input thread: forwards key and resize events, and emits a tick whenever
/// the poll window lapses. Ticks drive fetch polling and the fade and
/// auto-advance deadlines.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(_, _)) => {
                            if tx.send(AppEvent::Resize).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if tx.send(AppEvent::Tick(Instant::now())).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_stamped_with_its_emission_instant() {
        let before = Instant::now();
        let handler = EventHandler::new(Duration::from_millis(5));
        for _ in 0..100 {
            if let AppEvent::Tick(at) = handler.next().unwrap() {
                assert!(at >= before);
                assert!(at <= Instant::now());
                return;
            }
        }
        panic!("no tick observed");
    }
}
