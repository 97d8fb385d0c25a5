use std::time::Duration;

use tokio::sync::watch;

/// Default quiet period before a search term is acted on.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Raw search keystrokes. Each call to [`SearchInput::set`] replaces the
/// current term; consumers read a [`Debounced`] stream instead of the raw
/// channel.
#[derive(Debug)]
pub struct SearchInput {
    tx: watch::Sender<String>,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchInput {
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(String::new()),
        }
    }

    pub fn set(&self, term: impl Into<String>) {
        self.tx.send_replace(term.into());
    }

    pub fn clear(&self) {
        self.set("");
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn debounced(&self, quiet: Duration) -> Debounced {
        Debounced {
            rx: self.tx.subscribe(),
            quiet,
            last: None,
        }
    }
}

/// Emits the latest term once input has been quiet for `quiet`, skipping
/// a term equal to the one emitted before it.
#[derive(Debug)]
pub struct Debounced {
    rx: watch::Receiver<String>,
    quiet: Duration,
    last: Option<String>,
}

impl Debounced {
    /// Wait for the next settled term. Returns `None` once the input is
    /// dropped and nothing is left to emit.
    pub async fn next(&mut self) -> Option<String> {
        loop {
            self.rx.changed().await.ok()?;

            loop {
                match tokio::time::timeout(self.quiet, self.rx.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) | Err(_) => break,
                }
            }

            let term = self.rx.borrow_and_update().trim().to_string();
            if self.last.as_deref() == Some(term.as_str()) {
                continue;
            }
            self.last = Some(term.clone());
            return Some(term);
        }
    }
}
