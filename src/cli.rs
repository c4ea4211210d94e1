//! Terminal host: drives an `OnboardingPage` over stdin/stdout.
//!
//! Each data step prompts field by field; an empty answer keeps the value
//! shown in brackets. `:back`, `:jump <n>` and `:quit` work at any prompt.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::business::page::{OnboardingPage, PAGE_SUBTITLE, PAGE_TITLE};
use crate::wizard::GateOutcome;

/// How a terminal session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Quit,
}

enum Command {
    Back,
    Jump(usize),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let rest = line.strip_prefix(':')?;
    let mut parts = rest.split_whitespace();
    Some(match (parts.next(), parts.next()) {
        (Some("back"), None) => Command::Back,
        (Some("quit"), None) => Command::Quit,
        (Some("jump"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Jump(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        _ => Command::Unknown(line.to_string()),
    })
}

pub struct Cli<'a, R, W> {
    page: &'a OnboardingPage,
    lines: tokio::io::Lines<R>,
    out: W,
}

impl<'a, R, W> Cli<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(page: &'a OnboardingPage, input: R, out: W) -> Self {
        Self {
            page,
            lines: input.lines(),
            out,
        }
    }

    /// Consume the host and return the writer.
    pub fn into_output(self) -> W {
        self.out
    }

    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }

    /// Trimmed next line, or `None` at end of input.
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    /// Run a command. Returns true when the session should end.
    async fn run_command(&mut self, command: Command) -> std::io::Result<bool> {
        match command {
            Command::Back => {
                if !self.page.back().await {
                    self.write("Can't go back from here.\n").await?;
                }
            }
            Command::Jump(index) => {
                if !self.page.indicator().click(index).await {
                    self.write("That step isn't reachable yet.\n").await?;
                }
            }
            Command::Quit => return Ok(true),
            Command::Unknown(line) => {
                self.write(&format!("Unknown command {line}. Try :back, :jump <n>, :quit\n"))
                    .await?;
            }
        }
        Ok(false)
    }

    async fn render_header(&mut self) -> std::io::Result<()> {
        let page = self.page;
        let indicator = page.indicator().view().await.render_text();
        self.write(&format!("\n{indicator}\n")).await?;
        if let Some(gate) = page.active_gate().await {
            if let Some(view) = gate.view().await {
                self.write(&format!("\n== {} ==\n{}\n\n", view.title, view.description))
                    .await?;
            }
        }
        Ok(())
    }

    /// Drive the page until the final step is confirmed or the user quits.
    pub async fn run(&mut self) -> std::io::Result<SessionEnd> {
        self.write(&format!("{PAGE_TITLE}\n{PAGE_SUBTITLE}\n")).await?;

        let page = self.page;
        'steps: loop {
            self.render_header().await?;
            let step = page.wizard().current_step().await;

            let Some(form) = page.form(&step.id) else {
                if let Some(summary) = page.summary().await {
                    self.write(&summary.render()).await?;
                }
                self.write("\nPress Enter to finish.\n").await?;
                // The record is already saved here, so end of input finishes too.
                let line = self.read_line().await?.unwrap_or_default();
                if let Some(command) = parse_command(&line) {
                    if self.run_command(command).await? {
                        return Ok(SessionEnd::Quit);
                    }
                    continue 'steps;
                }
                page.submit_current().await;
                return Ok(SessionEnd::Completed);
            };

            let values = form.values().await;
            for field in form.fields() {
                self.write(&format!("{} [{}]: ", field.label, values.get(field.key)))
                    .await?;
                let Some(line) = self.read_line().await? else {
                    return Ok(SessionEnd::Quit);
                };
                if let Some(command) = parse_command(&line) {
                    if self.run_command(command).await? {
                        return Ok(SessionEnd::Quit);
                    }
                    continue 'steps;
                }
                if !line.is_empty() {
                    form.set_field(field.key, &line).await;
                }
            }

            match page.submit_current().await {
                GateOutcome::Advanced => debug!(step = %step.id, "Advanced"),
                GateOutcome::Rejected => {
                    let errors = form.errors().await;
                    for (field, message) in errors.iter() {
                        self.write(&format!("  {field}: {message}\n")).await?;
                    }
                }
                GateOutcome::Failed(reason) => {
                    self.write(&format!("Could not save this step: {reason}\n"))
                        .await?;
                }
                GateOutcome::Inactive => {}
            }
        }
    }
}
