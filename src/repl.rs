//! Interactive REPL.

use crate::commands;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tinykv_client::Session;
use tinykv_protocol::ValueKind;

const HELP_TEXT: &str = r#"
Available commands:
  help                            Show this help
  ping                            Ping the server

  get <key> [type]                Get a value (type: string, number, bool)
  set <key> <value> [type]        Store a value (type: string, number, bool)
  exists <key>                    Check whether a key exists
  delete <key>                    Delete a key

  quit, exit                      Exit the REPL
"#;

pub async fn run(session: Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "tinykv CLI".bold().cyan());
    println!("Connecting to {}...", session.config().addr());

    session.connect().await?;
    println!("{}", "Connected!".green());

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    let history_path = home::home_dir()
        .map(|h| h.join(".tinykv_history"))
        .unwrap_or_else(|| ".tinykv_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for available commands.\n");

    loop {
        let prompt = format!("{} ", "tinykv>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&session, line).await {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }

                // A timeout or a dropped connection ends the session.
                if !session.is_connected() {
                    println!("{}", "Session closed.".red());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);

    let _ = session.close().await;
    println!("{}", "Disconnected.".dimmed());

    Ok(())
}

async fn execute_repl_command(
    session: &Session,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(Some(String::new()));
    }

    let cmd = parts[0].to_lowercase();
    let args = &parts[1..];

    match cmd.as_str() {
        "help" | "?" => Ok(Some(HELP_TEXT.to_string())),

        "quit" | "exit" | "q" => Ok(None),

        "ping" => commands::ping(session).await.map(Some),

        "get" | "g" => {
            if args.is_empty() {
                return Ok(Some("Usage: get <key> [type]".to_string()));
            }
            let kind = parse_kind(args.get(1))?;
            commands::get(session, args[0], kind).await.map(Some)
        }

        "set" | "s" => {
            if args.len() < 2 {
                return Ok(Some("Usage: set <key> <value> [type]".to_string()));
            }
            let kind = parse_kind(args.get(2))?;
            let value = kind.parse_value(args[1])?;
            commands::set(session, args[0], value).await.map(Some)
        }

        "exists" | "e" => {
            if args.is_empty() {
                return Ok(Some("Usage: exists <key>".to_string()));
            }
            commands::exists(session, args[0]).await.map(Some)
        }

        "delete" | "del" | "d" => {
            if args.is_empty() {
                return Ok(Some("Usage: delete <key>".to_string()));
            }
            commands::delete(session, args[0]).await.map(Some)
        }

        _ => Ok(Some(format!(
            "Unknown command: {}. Type 'help' for help.",
            cmd
        ))),
    }
}

fn parse_kind(arg: Option<&&str>) -> Result<ValueKind, String> {
    arg.map_or(Ok(ValueKind::Text), |s| s.parse())
}
