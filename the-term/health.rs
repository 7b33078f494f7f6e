//! Startup checks run before the terminal is taken over.

use std::io;

use crossterm::tty::IsTty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthIssue {
  StdinNotTty,
  StdoutNotTty,
}

impl HealthIssue {
  pub fn message(self) -> &'static str {
    match self {
      Self::StdinNotTty => "stdin is not a terminal",
      Self::StdoutNotTty => "stdout is not a terminal",
    }
  }
}

pub fn check_terminal() -> Result<(), HealthIssue> {
  check(io::stdin().is_tty(), io::stdout().is_tty())
}

fn check(stdin_tty: bool, stdout_tty: bool) -> Result<(), HealthIssue> {
  if !stdin_tty {
    return Err(HealthIssue::StdinNotTty);
  }
  if !stdout_tty {
    return Err(HealthIssue::StdoutNotTty);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn both_streams_must_be_terminals() {
    assert_eq!(check(true, true), Ok(()));
    assert_eq!(check(false, true), Err(HealthIssue::StdinNotTty));
    assert_eq!(check(true, false), Err(HealthIssue::StdoutNotTty));
  }
}
