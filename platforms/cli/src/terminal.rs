//! Terminal collaborators of the run loop: a renderer drawing the tape around the head and
//! an input hook reading commands from stdin.

use crossterm::{
    cursor::MoveTo,
    execute,
    style::{StyledContent, Stylize},
    terminal::{self, Clear, ClearType},
};
use log::debug;
use std::io::{self, BufRead, Write};
use turscript::machine::{Input, Renderer, Snapshot};
use turscript::types::Step;

/// Width of one drawn cell, borders included.
const CELL_WIDTH: u16 = 4;
/// Terminal width assumed when it cannot be queried.
const FALLBACK_WIDTH: u16 = 80;

pub fn warning_label() -> StyledContent<&'static str> {
    "warning:".yellow().bold()
}

pub fn error_label() -> StyledContent<&'static str> {
    "error:".red().bold()
}

/// Draws every snapshot on a cleared screen when stdout is a terminal, and appends plain
/// frames otherwise.
pub struct TerminalRenderer {
    interactive: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            interactive: atty::is(atty::Stream::Stdout),
        }
    }

    /// Number of cells drawn on each side of the head.
    fn radius(&self) -> usize {
        let width = terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(FALLBACK_WIDTH);
        let cells = (width / CELL_WIDTH).max(3) as usize;

        (cells - 1) / 2
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        let mut stdout = io::stdout();
        if self.interactive {
            if let Err(e) = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)) {
                debug!("failed to clear the screen: {e}");
            }
        }

        let radius = self.radius();
        let cells = snapshot.tape.window(radius);
        let border = |left: &str, middle: &str, right: &str| {
            format!("{left}{}{right}", vec!["───"; cells.len()].join(middle))
        };

        let mut row = String::from("│");
        for (i, c) in cells.iter().enumerate() {
            let cell = format!(" {c} ");
            if i == radius {
                row.push_str(&cell.reverse().bold().to_string());
            } else {
                row.push_str(&cell);
            }
            row.push('│');
        }

        let heading = |text: &'static str| text.green().bold();

        println!("{} {}", heading("Step"), snapshot.step);
        println!("{}", heading("Tape"));
        println!("{}", border("┌", "┬", "┐"));
        println!("{row}");
        println!("{}", border("└", "┴", "┘"));
        println!(
            "{}{}",
            " ".repeat(radius * CELL_WIDTH as usize + 2),
            "^".bold()
        );

        let state = if snapshot.halted {
            format!("{} (halting)", snapshot.state)
        } else {
            snapshot.state.to_string()
        };
        println!(
            "{} {state}, reading '{}'",
            heading("State"),
            snapshot.tape.peek()
        );

        match snapshot.last {
            Some(Step::Applied(transition)) => {
                println!("{}\n    {transition}", heading("Transition"))
            }
            Some(Step::NoTransition { state, symbol }) => {
                println!("{}\n    {state}:{symbol} -> ?", heading("Transition"))
            }
            None => {}
        }
    }

    fn status(&mut self, message: &str) {
        println!("{}", message.italic());
    }
}

/// Reads one command per line from stdin. End of input quits the run loop.
#[derive(Default)]
pub struct StdinInput;

impl Input for StdinInput {
    fn ask(&mut self, prompt: &str) -> String {
        print!("{prompt} ");
        if let Err(e) = io::stdout().flush() {
            debug!("failed to flush stdout: {e}");
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => "q".to_string(),
            Err(e) => {
                debug!("failed to read a command: {e}");
                "q".to_string()
            }
            Ok(_) => line.trim_end_matches(['\r', '\n']).to_string(),
        }
    }
}
