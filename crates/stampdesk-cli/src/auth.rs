//! # Session Subcommands
//!
//! - `login` — authenticate staff and persist the token.
//! - `logout` — clear the in-memory and persisted token.
//! - `status` — show whether a saved session exists.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use stampdesk_state::ErrorKind;

use crate::context::AppContext;

/// Arguments for `stampdesk login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email or username.
    pub identifier: String,

    /// Password. Prefer the environment variable over the flag so it stays
    /// out of shell history.
    #[arg(long, env = "STAMPDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `stampdesk status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Log in. Returns the process exit code.
pub async fn run_login<W: Write>(ctx: &AppContext, args: &LoginArgs, out: &mut W) -> Result<u8> {
    match ctx.flow.login(&args.identifier, &args.password).await {
        Ok(Some(staff)) => {
            let name = if staff.name.is_empty() { staff.id.as_str() } else { staff.name.as_str() };
            writeln!(out, "logged in as {name}")?;
            if !staff.business_name.is_empty() {
                writeln!(out, "business: {}", staff.business_name)?;
            }
            Ok(0)
        }
        Ok(None) => {
            writeln!(out, "logged in")?;
            Ok(0)
        }
        Err(e) => {
            writeln!(out, "login failed: {}", e.user_message())?;
            Ok(match e.kind() {
                ErrorKind::Transport => 3,
                _ => 2,
            })
        }
    }
}

/// Log out.
pub async fn run_logout<W: Write>(ctx: &AppContext, out: &mut W) -> Result<u8> {
    let was_authenticated = ctx.flow.snapshot().authenticated;
    ctx.flow.logout().await;
    if was_authenticated {
        writeln!(out, "logged out")?;
    } else {
        writeln!(out, "no session to log out of")?;
    }
    Ok(0)
}

/// Report the saved session.
pub fn run_status<W: Write>(ctx: &AppContext, args: &StatusArgs, out: &mut W) -> Result<u8> {
    let snap = ctx.flow.snapshot();
    if args.json {
        let report = serde_json::json!({
            "authenticated": snap.authenticated,
            "restored": ctx.restored,
            "store": ctx.store_path.display().to_string(),
            "scan_state": snap.scan_state,
            "member_state": snap.member_state,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if snap.authenticated {
        writeln!(out, "logged in (session restored from {})", ctx.store_path.display())?;
    } else {
        writeln!(out, "not logged in")?;
    }
    Ok(if snap.authenticated { 0 } else { 1 })
}
