//! Interactive prompts
//!
//! Every read races the user's answer against the process cancellation token.
//! When cancellation wins the pending read is dropped; an answer typed after
//! that point is discarded.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::hub::errors::{HubError, HubResult};

/// Prompt shown when the login endpoint asks for a second factor
pub const TWO_FACTOR_PROMPT: &str = "2FA required, please provide the 6 digit code: ";

/// Line based prompt over an input and an output stream
pub struct Prompter<R, W> {
    input: R,
    output: W,
    cancel: CancellationToken,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W, cancel: CancellationToken) -> Self {
        Self {
            input,
            output,
            cancel,
        }
    }

    /// Print `prompt` and read one trimmed line
    pub async fn read_line(&mut self, prompt: &str) -> HubResult<String> {
        self.write_prompt(prompt).await?;

        let mut line = String::new();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Prompt cancelled");
                Err(HubError::Cancelled)
            }
            read = self.input.read_line(&mut line) => {
                read?;
                Ok(line.trim().to_string())
            }
        }
    }

    /// Ask a yes/no question; only `y` or `yes` confirm
    pub async fn confirm(&mut self, prompt: &str) -> HubResult<bool> {
        let answer = self.read_line(prompt).await?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    async fn write_prompt(&mut self, prompt: &str) -> HubResult<()> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_read_line_trims_input() {
        let input: &[u8] = b"  123456 \nignored\n";
        let mut output = Vec::new();
        let mut prompter = Prompter::new(input, &mut output, CancellationToken::new());

        let code = prompter.read_line(TWO_FACTOR_PROMPT).await.unwrap();
        assert_eq!(code, "123456");
        drop(prompter);
        assert_eq!(String::from_utf8(output).unwrap(), TWO_FACTOR_PROMPT);
    }

    #[tokio::test]
    async fn test_confirm_accepts_only_yes() {
        for (answer, expected) in [("y\n", true), ("YES\n", true), ("n\n", false), ("\n", false)] {
            let mut prompter =
                Prompter::new(answer.as_bytes(), Vec::new(), CancellationToken::new());
            assert_eq!(prompter.confirm("Are you sure? [y/N] ").await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_pending_input() {
        // The writer half stays open, so the read never completes on its own.
        let (reader, _writer) = tokio::io::duplex(64);
        let cancel = CancellationToken::new();
        let mut prompter = Prompter::new(BufReader::new(reader), Vec::new(), cancel.clone());

        let pending = tokio::spawn(async move { prompter.read_line("code: ").await });
        cancel.cancel();

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }
}
