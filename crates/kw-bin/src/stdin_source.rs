//! Keys from standard input, one notation string per line.
//!
//! `!reload` re-reads the configuration, `!quit` (or end of input) shuts the
//! runtime down. Blank lines are ignored.

use core_events::{AsyncEventSource, Event, InputEvent};
use core_keymap::parse_key_notation;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Keys(Vec<String>),
    Reload,
    Quit,
    Blank,
}

fn classify(line: &str) -> Line {
    match line.trim_end_matches(['\r', '\n']) {
        "" => Line::Blank,
        "!reload" => Line::Reload,
        "!quit" => Line::Quit,
        keys => Line::Keys(parse_key_notation(keys)),
    }
}

pub struct LineKeySource<R> {
    reader: R,
}

impl<R> LineKeySource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineKeySource<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncEventSource for LineKeySource<R> {
    fn name(&self) -> &'static str {
        "line_keys"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(self.reader).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(target: "runtime.events", error = %e, "line_source_read_failed");
                        break;
                    }
                };
                let events = match classify(&line) {
                    Line::Blank => continue,
                    Line::Quit => break,
                    Line::Reload => vec![Event::ConfigChanged],
                    Line::Keys(keys) => keys
                        .into_iter()
                        .map(|k| Event::Input(InputEvent::Key(k)))
                        .collect(),
                };
                debug!(target: "runtime.events", events = events.len(), "line_source_events");
                for ev in events {
                    if tx.send(ev).await.is_err() {
                        return;
                    }
                }
            }
            let _ = tx.send(Event::Shutdown).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::EventSourceRegistry;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    #[test]
    fn lines_classify() {
        assert_eq!(classify(""), Line::Blank);
        assert_eq!(classify("!reload"), Line::Reload);
        assert_eq!(classify("!quit\r"), Line::Quit);
        assert_eq!(
            classify("i<esc>"),
            Line::Keys(vec!["i".to_string(), "<esc>".to_string()])
        );
    }

    #[tokio::test]
    async fn reader_lines_become_ordered_events() {
        let input: &[u8] = b"ij\n\n!reload\nk\n!quit\nnever\n";
        let (tx, mut rx) = mpsc::channel::<Event>(16);
        let mut reg = EventSourceRegistry::new();
        reg.register(LineKeySource::new(input));
        let handles = reg.spawn_all(&tx);
        drop(tx);
        let mut got = Vec::new();
        while let Some(ev) = rx.recv().await {
            got.push(ev);
        }
        let key = |k: &str| Event::Input(InputEvent::Key(k.to_string()));
        assert_eq!(
            got,
            vec![
                key("i"),
                key("j"),
                Event::ConfigChanged,
                key("k"),
                Event::Shutdown
            ]
        );
        for h in handles {
            h.await.expect("source exits cleanly");
        }
    }
}
