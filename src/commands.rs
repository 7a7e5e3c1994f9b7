//! Command execution.

use crate::Commands;
use colored::Colorize;
use tinykv_client::Session;
use tinykv_protocol::{Value, ValueKind};

/// Executes a command and returns the formatted output.
pub async fn execute(
    session: &Session,
    cmd: Commands,
) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl => unreachable!(),

        Commands::Ping => ping(session).await,

        Commands::Get { key, kind } => get(session, &key, kind).await,

        Commands::Set { key, value, kind } => {
            let value = kind.parse_value(&value)?;
            set(session, &key, value).await
        }

        Commands::Exists { key } => exists(session, &key).await,

        Commands::Delete { key } => delete(session, &key).await,
    }
}

pub async fn ping(session: &Session) -> Result<String, Box<dyn std::error::Error>> {
    session.ping().await?;
    Ok("PONG".green().to_string())
}

pub async fn get(
    session: &Session,
    key: &str,
    kind: ValueKind,
) -> Result<String, Box<dyn std::error::Error>> {
    match session.get_as(key, kind).await? {
        Some(value) => Ok(format_value(&value)),
        None => Ok("(nil)".dimmed().to_string()),
    }
}

pub async fn set(
    session: &Session,
    key: &str,
    value: Value,
) -> Result<String, Box<dyn std::error::Error>> {
    if session.set(key, value).await? {
        Ok("OK".green().to_string())
    } else {
        Ok(format!("{} {}", "Not stored".yellow(), key.cyan()))
    }
}

pub async fn exists(session: &Session, key: &str) -> Result<String, Box<dyn std::error::Error>> {
    if session.exists(key).await? {
        Ok(format!("{} {}", key.cyan(), "exists".green()))
    } else {
        Ok(format!("{} {}", key.cyan(), "does not exist".yellow()))
    }
}

pub async fn delete(session: &Session, key: &str) -> Result<String, Box<dyn std::error::Error>> {
    if session.delete(key).await? {
        Ok(format!("{} {}", "Deleted".green(), key.cyan()))
    } else {
        Ok(format!("{} {}", "Not found".yellow(), key.cyan()))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("{:?}", s),
        Value::Number(n) => n.to_string().cyan().to_string(),
        Value::Bool(b) => b.to_string().magenta().to_string(),
    }
}
