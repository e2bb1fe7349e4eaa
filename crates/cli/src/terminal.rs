//! Interactive overwrite confirmation on the controlling terminal.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use pipeline::Confirmer;

/// Asks on stderr and reads one line from stdin. Only `y`/`yes` confirm; EOF,
/// read errors, and anything else decline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .unwrap_or(false)
    }
}

fn ask(prompt: &str) -> bool {
    let mut stderr = std::io::stderr().lock();
    if write!(stderr, "{prompt} (y/N) ").and_then(|()| stderr.flush()).is_err() {
        return false;
    }

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_affirmative(&line),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
