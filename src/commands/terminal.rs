use std::io;

use tokio::io::{BufReader, Stdin, Stdout};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::common::prompt::Prompter;
use crate::hub::{HubError, HubResult};

/// Interactive prompts on the process stdin and stdout
///
/// A single buffered reader is kept for the whole process so piped answers
/// are not lost between prompts.
pub struct Terminal {
    prompter: Mutex<Prompter<BufReader<Stdin>, Stdout>>,
    cancel: CancellationToken,
}

impl Terminal {
    pub fn new(cancel: CancellationToken) -> Self {
        let prompter = Prompter::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), cancel.clone());
        Self {
            prompter: Mutex::new(prompter),
            cancel,
        }
    }

    pub async fn read_line(&self, prompt: &str) -> HubResult<String> {
        self.prompter.lock().await.read_line(prompt).await
    }

    pub async fn confirm(&self, prompt: &str) -> HubResult<bool> {
        self.prompter.lock().await.confirm(prompt).await
    }

    /// Read a password without echo
    ///
    /// The terminal read blocks a worker thread; cancellation abandons it.
    pub async fn read_password(&self, prompt: &str) -> HubResult<String> {
        let prompt = prompt.to_string();
        let read = tokio::task::spawn_blocking(move || {
            dialoguer::Password::new()
                .with_prompt(prompt)
                .allow_empty_password(false)
                .interact()
                .map_err(|e| io::Error::other(e.to_string()))
        });

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(HubError::Cancelled),
            joined = read => {
                let password = joined.map_err(io::Error::other)??;
                Ok(password)
            }
        }
    }
}
