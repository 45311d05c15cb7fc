use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::error;
use uuid::Uuid;

use athena_core::{Content, Memory, Runtime};
use athena_runtime::AgentRuntime;

pub(super) async fn cmd_chat(runtime: &AgentRuntime) -> athena_core::Result<()> {
    println!("Athena interactive chat");
    println!("   Type 'exit' or Ctrl+D to quit");
    println!();

    let room_id = Uuid::new_v4();
    let agent = runtime.agent_name().to_string();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "exit" | "quit") {
            break;
        }

        let chosen = match runtime.select_action(text, room_id).await {
            Ok(action) => action.map(|a| a.name().to_string()),
            Err(e) => {
                error!(error = %e, "action selection failed");
                None
            }
        };

        match chosen {
            Some(name) => match runtime.invoke(&name, text, room_id).await {
                Ok((_, delivered)) if delivered.is_empty() => {
                    println!("{agent}> {name} is not available with the current settings.");
                }
                Ok((_, delivered)) => {
                    for content in delivered {
                        println!("{agent}> {}", content.text);
                    }
                }
                Err(e) => println!("{agent}> {e}"),
            },
            None => {
                runtime.record(Memory::user_text(runtime.agent_id(), Uuid::new_v4(), room_id, text));
                runtime.record(Memory::agent_reply(
                    runtime.agent_id(),
                    room_id,
                    Content::text(text),
                ));
                println!("{agent}> {text}");
            }
        }
        println!();
    }
    Ok(())
}
