//! The interactive `run` front-end, spec.md §6: a line-oriented REPL
//! with `/exit`, `/help`, `/status` built on top of one [`AgentLoop`].

use boxedin_agent::AgentLoop;
use boxedin_memory::Memory;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP_TEXT: &str = "\
Commands:
  /help    show this message
  /status  print conversations/tools/lastRun as JSON
  /exit    leave the REPL
Anything else is sent to the agent as a goal.";

/// Run the interactive loop against stdin/stdout until `/exit` or EOF.
pub async fn run(agent: &AgentLoop, memory: &Memory) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("boxedin> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        let goal = line.trim();
        if goal.is_empty() {
            continue;
        }

        match goal {
            "/exit" => break,
            "/help" => println!("{HELP_TEXT}"),
            "/status" => {
                let snapshot = memory.snapshot().await;
                let status = crate::status::build(&snapshot);
                match serde_json::to_string_pretty(&status) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("error serializing status: {e}"),
                }
            }
            goal => {
                let result = agent.run(goal, memory).await;
                if let Some(answer) = result.answer {
                    println!("{answer}");
                } else {
                    println!("(no answer produced; {} run(s) recorded)", result.results.len());
                }
            }
        }
    }
}

/// Run exactly one goal read from the first line of stdin, then return.
/// Used by `run --no-interactive` with no `--goal`.
pub async fn run_one_from_stdin(agent: &AgentLoop, memory: &Memory) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let goal = match lines.next_line().await {
        Ok(Some(line)) => line,
        _ => return,
    };
    let goal = goal.trim();
    if goal.is_empty() {
        return;
    }
    let result = agent.run(goal, memory).await;
    if let Some(answer) = result.answer {
        println!("{answer}");
    }
}
