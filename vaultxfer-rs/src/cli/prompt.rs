//! Interactive destination choice.

use crate::error::{Result, TransferError};
use crate::transfer::selector::{DestinationEntry, DestinationSelector};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Ask the user to pick one of several destinations.
///
/// Without a terminal on stdin the choice is an error listing the options.
/// An empty answer cancels.
pub fn choose_destination(selector: &DestinationSelector<'_>, action: &str) -> Result<PathBuf> {
    let entries = selector.list_destinations();

    if atty::isnt(atty::Stream::Stdin) {
        return Err(TransferError::DestinationRequired(
            entries.into_iter().map(|e| e.path).collect(),
        ));
    }

    let stdin = std::io::stdin();
    let answer = ask(&entries, action, &mut stdin.lock(), &mut std::io::stderr())?;
    parse_answer(selector, &answer)
}

fn ask<R: BufRead, W: Write>(
    entries: &[DestinationEntry],
    action: &str,
    input: &mut R,
    prompt: &mut W,
) -> Result<String> {
    writeln!(prompt, "Choose a vault to {} to:", action)?;
    for entry in entries {
        writeln!(prompt, "  [{}] {} ({})", entry.index, entry.name, entry.path.display())?;
    }
    write!(prompt, "Vault (empty to cancel): ")?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn parse_answer(selector: &DestinationSelector<'_>, answer: &str) -> Result<PathBuf> {
    if answer.is_empty() {
        return Err(TransferError::Cancelled);
    }
    selector.lookup(answer)
}

// Check if stdin is a terminal
mod atty {
    pub enum Stream {
        Stdin,
    }

    pub fn isnt(stream: Stream) -> bool {
        match stream {
            Stream::Stdin => {
                #[cfg(unix)]
                {
                    use std::os::unix::io::AsRawFd;
                    unsafe { libc::isatty(std::io::stdin().as_raw_fd()) == 0 }
                }
                #[cfg(not(unix))]
                {
                    use std::io::IsTerminal;
                    !std::io::stdin().is_terminal()
                }
            }
        }
    }
}
