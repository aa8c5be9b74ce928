//! Interactive chat loop

use application::{AssistantEngine, ModelStatus};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// What a line of input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    /// Leave the loop
    Exit,
    /// Forget the conversation
    Clear,
    /// Nothing to do
    Skip,
    /// Send to the assistant
    Message(&'a str),
}

/// Interpret one input line
pub fn parse_line(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplCommand::Skip;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "exit" | "quit" | "bye" => ReplCommand::Exit,
        "clear" => ReplCommand::Clear,
        _ => ReplCommand::Message(trimmed),
    }
}

/// Read lines from `input` and answer on `output` until exit or end of input
pub async fn run_repl<R, W>(
    engine: &mut AssistantEngine,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_banner(engine, output).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"\nYou: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("Input closed");
            break;
        };

        match parse_line(&line) {
            ReplCommand::Exit => break,
            ReplCommand::Skip => {},
            ReplCommand::Clear => {
                engine.clear();
                output.write_all(b"Conversation history cleared.\n").await?;
            },
            ReplCommand::Message(message) => {
                let text = match engine.chat(message).await {
                    Ok(reply) => format!("AI: {}\n", reply.text()),
                    Err(e) => {
                        warn!(error = %e, "Chat request rejected");
                        format!("Error: {e}\n")
                    },
                };
                output.write_all(text.as_bytes()).await?;
            },
        }
    }

    output.write_all(b"\nGoodbye!\n").await?;
    output.flush().await
}

async fn write_banner<W: AsyncWrite + Unpin>(
    engine: &AssistantEngine,
    output: &mut W,
) -> std::io::Result<()> {
    let info = engine.model_info();
    let status = match info.status {
        ModelStatus::Loaded => format!(
            "Model: {} on {}",
            info.model_name,
            info.device.map_or_else(|| "unknown device".to_string(), |d| d.to_string())
        ),
        ModelStatus::Fallback => "Running with built-in responses (no model loaded)".to_string(),
    };

    let banner = format!(
        "Personal AI Assistant\n{status}\nType 'exit' to quit or 'clear' to reset the conversation.\n"
    );
    output.write_all(banner.as_bytes()).await
}
