//! # Scan Console
//!
//! Line-oriented stand-in for the scanner screen. Staff type commands; a
//! `decode <payload>` line plays the part of a camera callback, so a
//! burst of identical `decode` lines behaves like a camera firing several
//! times for one code.
//!
//! ```text
//! scan | another        open the scanner (discards the current member)
//! decode <payload>      feed a decoded code
//! cancel                close the scanner
//! add | remove          adjust the member's stamps by one
//! show                  print the current state
//! logout                end the session and leave the console
//! help | quit
//! ```

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use stampdesk_core::MemberRecord;
use stampdesk_state::{AdjustOutcome, DecodeOutcome, FlowError, FlowSnapshot, ScanFlow};

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Open the scanner.
    Scan,
    /// A decoded payload from the "camera".
    Decode(String),
    /// Close the scanner.
    Cancel,
    /// Add one stamp.
    Add,
    /// Remove one stamp.
    Remove,
    /// Print the current state.
    Show,
    /// Log out and leave.
    Logout,
    /// Print usage.
    Help,
    /// Leave without logging out.
    Quit,
}

const HELP: &str = "commands: scan | another | decode <payload> | cancel | add | remove | show | logout | help | quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "scan" | "another" => ConsoleCommand::Scan,
        "decode" => {
            if rest.is_empty() {
                return Err("decode needs a payload".into());
            }
            ConsoleCommand::Decode(rest.to_string())
        }
        "cancel" | "close" => ConsoleCommand::Cancel,
        "add" | "+" => ConsoleCommand::Add,
        "remove" | "-" => ConsoleCommand::Remove,
        "show" | "status" => ConsoleCommand::Show,
        "logout" => ConsoleCommand::Logout,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command {other:?}; type help")),
    };
    if !rest.is_empty() && !matches!(cmd, ConsoleCommand::Decode(_)) {
        return Err(format!("{word} takes no arguments"));
    }
    Ok(Some(cmd))
}

/// Run the console until `quit`, `logout` or end of input.
pub async fn run_console<R, W>(flow: &ScanFlow, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if !flow.snapshot().authenticated {
        writeln!(out, "warning: not logged in; the service will likely refuse requests")?;
    }
    writeln!(out, "{HELP}")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };
        if !execute(flow, cmd, out).await? {
            break;
        }
    }
    Ok(())
}

/// Run one command. Returns `false` when the console should exit.
pub async fn execute<W: Write>(flow: &ScanFlow, cmd: ConsoleCommand, out: &mut W) -> Result<bool> {
    tracing::debug!(?cmd, "console command");
    match cmd {
        ConsoleCommand::Scan => match flow.scan_another().await {
            Ok(()) => writeln!(out, "scanner open; present a member code")?,
            Err(e) => report(out, &e)?,
        },
        ConsoleCommand::Decode(payload) => match flow.on_decoded(&payload).await {
            Ok(DecodeOutcome::Loaded(record)) => writeln!(out, "{}", render_member(&record))?,
            Ok(DecodeOutcome::Ignored) => writeln!(out, "scanner not open; code ignored")?,
            Ok(DecodeOutcome::Stale) => writeln!(out, "lookup result discarded")?,
            Err(e) => report(out, &e)?,
        },
        ConsoleCommand::Cancel => {
            if flow.cancel_scan() {
                writeln!(out, "scanner closed")?;
            } else {
                writeln!(out, "scanner was not open")?;
            }
        }
        ConsoleCommand::Add => report_adjust(out, flow.add_stamp().await)?,
        ConsoleCommand::Remove => report_adjust(out, flow.remove_stamp().await)?,
        ConsoleCommand::Show => writeln!(out, "{}", render_snapshot(&flow.snapshot()))?,
        ConsoleCommand::Logout => {
            flow.logout().await;
            writeln!(out, "logged out")?;
            return Ok(false);
        }
        ConsoleCommand::Help => writeln!(out, "{HELP}")?,
        ConsoleCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn report_adjust<W: Write>(
    out: &mut W,
    result: Result<AdjustOutcome, FlowError>,
) -> std::io::Result<()> {
    match result {
        Ok(AdjustOutcome::Applied(record)) => writeln!(out, "{}", render_member(&record)),
        Ok(AdjustOutcome::Stale) => writeln!(out, "member changed; update discarded"),
        Err(e) => report(out, &e),
    }
}

fn report<W: Write>(out: &mut W, err: &FlowError) -> std::io::Result<()> {
    writeln!(out, "error [{}]: {}", err.kind(), err.user_message())
}

/// One-line description of a member.
pub fn render_member(record: &MemberRecord) -> String {
    format!(
        "member {} (program {}): {} stamps",
        record.member_id, record.program_id, record.points
    )
}

/// One-line description of the whole flow.
pub fn render_snapshot(snap: &FlowSnapshot) -> String {
    let member = snap
        .member
        .as_ref()
        .map(render_member)
        .unwrap_or_else(|| "no member".to_string());
    format!(
        "scanner {} | session {} | {} | {}",
        snap.scan_state,
        snap.member_state,
        member,
        if snap.authenticated { "logged in" } else { "logged out" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(parse_command("scan").unwrap(), Some(ConsoleCommand::Scan));
        assert_eq!(parse_command(" Another ").unwrap(), Some(ConsoleCommand::Scan));
        assert_eq!(parse_command("+").unwrap(), Some(ConsoleCommand::Add));
        assert_eq!(parse_command("-").unwrap(), Some(ConsoleCommand::Remove));
        assert_eq!(parse_command("q").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn decode_keeps_payload_verbatim() {
        assert_eq!(
            parse_command("decode  {\"id\": \"customer-1\"} ").unwrap(),
            Some(ConsoleCommand::Decode("{\"id\": \"customer-1\"}".into()))
        );
        assert!(parse_command("decode").is_err());
    }

    #[test]
    fn rejects_unknown_and_extra_arguments() {
        assert!(parse_command("stamp").unwrap_err().contains("unknown command"));
        assert!(parse_command("add 5").unwrap_err().contains("no arguments"));
    }

    #[test]
    fn renders_snapshot_without_member() {
        let snap = FlowSnapshot {
            scan_state: stampdesk_state::ScanState::Idle,
            member_state: stampdesk_state::MemberState::NoMember,
            member: None,
            authenticated: false,
        };
        assert_eq!(
            render_snapshot(&snap),
            "scanner IDLE | session NO_MEMBER | no member | logged out"
        );
    }
}
