//! Stdin directive source for interactive mode.

use async_trait::async_trait;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::errors::{OrchestratorError, OrchestratorResult};
use crate::domain::models::Directive;
use crate::domain::ports::DirectiveSource;

/// Reads directives from stdin while the orchestrator is suspended.
#[derive(Debug, Default)]
pub struct StdinDirectiveSource;

impl StdinDirectiveSource {
    /// Create a stdin directive source.
    pub fn new() -> Self {
        Self
    }

    fn parse(line: &str) -> Option<Directive> {
        match line.trim().to_lowercase().as_str() {
            "c" | "continue" => Some(Directive::Continue),
            "u" | "unattended" => Some(Directive::SwitchToUnattended),
            "s" | "stop" => Some(Directive::Stop),
            _ => None,
        }
    }
}

#[async_trait]
impl DirectiveSource for StdinDirectiveSource {
    async fn next_directive(
        &self,
        attempt: u32,
        still_failing: usize,
    ) -> OrchestratorResult<Directive> {
        println!(
            "\n{} attempt {attempt} done, {still_failing} still failing",
            style("paused:").yellow().bold()
        );
        println!("  [c]ontinue, [u]nattended, [s]top?");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = lines.next_line().await?.ok_or_else(|| {
                OrchestratorError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "stdin closed while waiting for a directive",
                ))
            })?;

            match Self::parse(&line) {
                Some(directive) => return Ok(directive),
                None => println!("  unrecognized; [c]ontinue, [u]nattended, [s]top?"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_short_and_long_forms() {
        assert_eq!(
            StdinDirectiveSource::parse("c"),
            Some(Directive::Continue)
        );
        assert_eq!(
            StdinDirectiveSource::parse("  CONTINUE "),
            Some(Directive::Continue)
        );
        assert_eq!(
            StdinDirectiveSource::parse("u"),
            Some(Directive::SwitchToUnattended)
        );
        assert_eq!(StdinDirectiveSource::parse("stop"), Some(Directive::Stop));
        assert_eq!(StdinDirectiveSource::parse("yes"), None);
    }
}
