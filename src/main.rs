//! Stdio driver loop: reads line-delimited JSON commands from stdin,
//! dispatches them against a single long-lived [`Session`], and writes a
//! line-delimited JSON response for every `{"solve": true}` / `{"reset":
//! true}` control line (§6). Plain constraint commands produce no
//! response line; only the driver's explicit solve/reset requests do.

use std::io::{self, BufRead, Write};

use concolic_smt_backend::dispatch;
use concolic_smt_backend::session::{Session, SessionConfig};
use concolic_smt_backend::wire::{Command, ErrorResponse, SolveResponse};
use z3::{Config, Context};

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Line {
    Solve { solve: bool },
    Reset { reset: bool },
    Command(Command),
}

fn main() {
    env_logger::init();

    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let mut session = Session::new(&ctx, SessionConfig::default());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) if l.trim().is_empty() => continue,
            Ok(l) => l,
            Err(e) => {
                log::error!("failed to read stdin: {e}");
                break;
            }
        };

        if let Err(e) = handle_line(&mut session, &line, &mut out) {
            log::warn!("command failed: {e}");
        }
    }
}

fn handle_line(session: &mut Session, line: &str, out: &mut impl Write) -> io::Result<()> {
    let parsed: Result<Line, _> = serde_json::from_str(line);
    match parsed {
        Ok(Line::Solve { .. }) => {
            let resp = solve_response(session);
            writeln!(out, "{}", serde_json::to_string(&resp).unwrap())?;
            out.flush()?;
        }
        Ok(Line::Reset { .. }) => {
            session.reset();
        }
        Ok(Line::Command(cmd)) => {
            if session.is_poisoned() {
                write_error(out, "session is poisoned; send {\"reset\": true} first")?;
                return Ok(());
            }
            if let Err(e) = dispatch::dispatch(session, &cmd) {
                write_error(out, &e.to_string())?;
            }
        }
        Err(e) => {
            write_error(out, &format!("malformed line: {e}"))?;
        }
    }
    Ok(())
}

fn solve_response(session: &mut Session) -> SolveResponse {
    match session.solve() {
        Ok(true) => match session.solution() {
            Ok(solution) => SolveResponse::sat(solution),
            Err(e) => {
                log::error!("failed to extract solution: {e}");
                SolveResponse::unsat()
            }
        },
        Ok(false) => SolveResponse::unsat(),
        Err(e) => {
            if e.poisons_session() {
                session.poison();
            }
            SolveResponse::unknown()
        }
    }
}

fn write_error(out: &mut impl Write, message: &str) -> io::Result<()> {
    let resp = ErrorResponse {
        error: message.to_string(),
    };
    writeln!(out, "{}", serde_json::to_string(&resp).unwrap())?;
    out.flush()
}
