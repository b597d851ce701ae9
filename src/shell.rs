//! Interactive command loop.
//!
//! Each line is parsed with the same grammar as the one-shot subcommands, so
//! `switch-root` persists for the rest of the session.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::commands::{Command, Session, render_error};

const PROMPT: &str = "projscope> ";

#[derive(Parser)]
#[command(name = "projscope", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Run the shell until `exit`, `quit` or end of input.
///
/// Command failures are printed and the loop carries on. Only I/O errors on
/// the shell's own streams end it early.
pub fn run<R: BufRead, W: Write>(session: &Session, input: R, mut out: W) -> io::Result<()> {
    writeln!(
        out,
        "projscope shell. Project root: {}",
        session.root().display()
    )?;
    writeln!(out, "Type `help` for commands, `exit` to leave.")?;

    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.first().copied() {
            None => {}
            Some("exit" | "quit") => break,
            Some(_) => match ShellLine::try_parse_from(&words) {
                Ok(ShellLine {
                    command: Command::Shell,
                }) => writeln!(out, "Already in the shell.")?,
                Ok(ShellLine { command }) => {
                    let action = command.action();
                    match session.execute(command) {
                        Ok(output) => write!(out, "{output}")?,
                        Err(e) => {
                            tracing::debug!("Command failed: {e}");
                            writeln!(out, "{}", render_error(action, &e))?;
                        }
                    }
                }
                // Covers `help` and `--help` as well as usage errors.
                Err(e) => write!(out, "{}", e.render())?,
            },
        }

        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}
