//! This module defines the `TuringMachine` struct, which executes a compiled program on a
//! single tape. It owns the tape and the current state, borrows the transition table, and
//! drives the interactive run loop through the [`Input`] and [`Renderer`] hooks.

use log::{debug, trace};
use std::fmt;
use std::thread;
use std::time::Duration;

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{
    Direction, Program, Step, Symbol, TuringMachineError, BLANK_SYMBOL, DEFAULT_BATCH_DELAY_MS,
};

/// Prompt passed to [`Input::ask`] between two commands.
pub const PROMPT: &str =
    "(step: <enter> | skip: <int> | move: r/l | state: $<state> | write: +<symbol> | quit: q)";

/// Supplies the next command of the run loop. The call blocks until a line is available.
pub trait Input {
    fn ask(&mut self, prompt: &str) -> String;
}

impl<F> Input for F
where
    F: FnMut(&str) -> String,
{
    fn ask(&mut self, prompt: &str) -> String {
        self(prompt)
    }
}

/// Presents the machine to the user.
pub trait Renderer {
    /// Called after every attempted step and every manual command.
    fn render(&mut self, snapshot: &Snapshot<'_>);

    /// Called with the status line of the command that was just executed.
    fn status(&mut self, _message: &str) {}
}

/// A read-only view of the machine handed to [`Renderer::render`].
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'s> {
    pub state: &'s str,
    pub tape: &'s Tape,
    pub head: usize,
    /// The last attempted step, `None` after a manual command.
    pub last: Option<&'s Step>,
    pub step: usize,
    pub halted: bool,
}

/// Run-time settings of the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Pause between two steps of a batch.
    pub batch_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }
}

/// What the run loop reports once it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub halted: bool,
    pub state: String,
}

/// A command of the interactive run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Perform up to `n` steps.
    Step(usize),
    Move(Direction),
    SetState(String),
    Write(char),
    Quit,
    Invalid(String),
}

impl Command {
    /// Parses one input line. Anything unrecognized becomes [`Command::Invalid`].
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut chars = line.chars();

        match (chars.next(), chars.as_str()) {
            (None, _) => Command::Step(1),
            (Some('q'), "") => Command::Quit,
            (Some('r'), "") => Command::Move(Direction::Right),
            (Some('l'), "") => Command::Move(Direction::Left),
            (Some('$'), name) if !name.is_empty() => Command::SetState(name.to_string()),
            (Some('+'), symbol) if symbol.chars().count() == 1 => match symbol.chars().next() {
                Some(c) => Command::Write(c),
                None => Command::Invalid(line.to_string()),
            },
            _ if line.chars().all(|c| c.is_ascii_digit()) => match line.parse() {
                Ok(n) => Command::Step(n),
                Err(_) => Command::Invalid(line.to_string()),
            },
            _ => Command::Invalid(line.to_string()),
        }
    }
}

/// The result of executing one [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Steps were attempted. `last` is the final step of the batch.
    Stepped {
        requested: usize,
        performed: usize,
        last: Option<Step>,
        halted: bool,
    },
    /// A step command was given while the machine is in a halting state.
    Halted { step: usize },
    Moved(Direction),
    StateSet(String),
    Written(char),
    Invalid(String),
    Quit,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Stepped {
                requested,
                performed,
                last,
                halted,
            } => match last {
                Some(Step::NoTransition { state, symbol }) => write!(
                    f,
                    "No transition for state '{state}' reading '{symbol}' after {performed} of {requested} steps"
                ),
                _ if *halted => write!(f, "Halted after {performed} steps"),
                _ if *requested == 1 => write!(f, "Stepped one step"),
                _ => write!(f, "Skipped forward {performed} steps"),
            },
            Outcome::Halted { step } => write!(f, "HALTED at step {step}"),
            Outcome::Moved(Direction::Left) => write!(f, "Moving head left"),
            Outcome::Moved(_) => write!(f, "Moving head right"),
            Outcome::StateSet(state) => write!(f, "Changing state to '{state}'"),
            Outcome::Written(c) => write!(f, "Writing '{c}' to tape"),
            Outcome::Invalid(input) => write!(f, "Invalid input '{input}'"),
            Outcome::Quit => write!(f, "Quit"),
        }
    }
}

/// Executes a program on a single tape.
///
/// The machine borrows the transition table of a [`Program`] and owns its own copy of the
/// tape, so several machines can run the same program independently.
pub struct TuringMachine<'a> {
    table: &'a TransitionTable,
    tape: Tape,
    state: String,
    halt_states: Vec<String>,
    alphabet: Vec<char>,
    step_count: usize,
}

impl<'a> TuringMachine<'a> {
    /// Creates a machine in the initial configuration of `program`.
    pub fn new(program: &'a Program) -> Self {
        Self {
            table: &program.table,
            tape: program.tape.clone(),
            state: program.initial_state.clone(),
            halt_states: program.halt_states.clone(),
            alphabet: program.alphabet.clone(),
            step_count: 0,
        }
    }

    /// Executes a single step.
    ///
    /// The current state's transitions are scanned in declaration order and the first one
    /// whose read symbol accepts the symbol under the head is applied. Without a match
    /// nothing is mutated.
    pub fn step(&mut self) -> Step {
        let table = self.table;
        let symbol = self.tape.read();

        let Some(transition) = table.lookup(&self.state, symbol) else {
            trace!("no transition for {}:{symbol}", self.state);
            return Step::NoTransition {
                state: self.state.clone(),
                symbol,
            };
        };

        self.tape.write(transition.write);
        self.state = transition.target.clone();
        self.tape.move_head(transition.direction);
        self.step_count += 1;
        trace!("step {}: {transition}", self.step_count);

        Step::Applied(transition.clone())
    }

    /// Runs the interactive loop until the input asks to quit.
    ///
    /// The first iteration performs one step without asking. Afterwards every line from
    /// `input` is parsed as a [`Command`] and executed. `renderer` sees a snapshot after every
    /// attempted step and every manual command, followed by the command's status line.
    pub fn run<I, R>(&mut self, input: &mut I, renderer: &mut R, config: &RunConfig) -> RunSummary
    where
        I: Input + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut command = Command::Step(1);

        loop {
            let outcome = self.execute(&command, config, renderer);
            if outcome == Outcome::Quit {
                break;
            }

            renderer.status(&outcome.to_string());
            command = Command::parse(&input.ask(PROMPT));
        }

        debug!("run ended at step {} in state '{}'", self.step_count, self.state);

        RunSummary {
            steps: self.step_count,
            halted: self.is_halted(),
            state: self.state.clone(),
        }
    }

    /// Executes one command of the run loop and renders its effect.
    pub fn execute<R>(&mut self, command: &Command, config: &RunConfig, renderer: &mut R) -> Outcome
    where
        R: Renderer + ?Sized,
    {
        let outcome = match command {
            Command::Step(n) => return self.advance(*n, config.batch_delay, renderer),
            Command::Quit => return Outcome::Quit,
            Command::Move(direction) => {
                self.move_head(*direction);
                Outcome::Moved(*direction)
            }
            Command::SetState(state) => {
                self.set_state(state.as_str());
                Outcome::StateSet(state.clone())
            }
            Command::Write(c) => match self.write_symbol(*c) {
                Ok(()) => Outcome::Written(*c),
                Err(_) => Outcome::Invalid(format!("+{c}")),
            },
            Command::Invalid(input) => Outcome::Invalid(input.clone()),
        };

        renderer.render(&self.snapshot(None));
        outcome
    }

    /// Performs up to `n` steps, rendering each attempt. Stops early when no transition
    /// matches or a halting state is entered.
    fn advance<R>(&mut self, n: usize, delay: Duration, renderer: &mut R) -> Outcome
    where
        R: Renderer + ?Sized,
    {
        if self.is_halted() {
            renderer.render(&self.snapshot(None));
            return Outcome::Halted {
                step: self.step_count,
            };
        }

        let mut performed = 0;
        let mut last = None;

        for i in 0..n {
            let step = self.step();
            renderer.render(&self.snapshot(Some(&step)));

            let applied = step.is_applied();
            last = Some(step);

            if !applied {
                break;
            }
            performed += 1;

            if self.is_halted() {
                break;
            }
            if i + 1 < n && !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        Outcome::Stepped {
            requested: n,
            performed,
            last,
            halted: self.is_halted(),
        }
    }

    /// A read-only view of the current configuration.
    pub fn snapshot<'s>(&'s self, last: Option<&'s Step>) -> Snapshot<'s> {
        Snapshot {
            state: &self.state,
            tape: &self.tape,
            head: self.tape.head(),
            last,
            step: self.step_count,
            halted: self.is_halted(),
        }
    }

    /// Returns the current state of the Turing Machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Forces the current state. The state does not need to exist in the table.
    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
    }

    /// Returns the total number of steps executed by the Turing Machine.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Checks if the current state is a halting state.
    pub fn is_halted(&self) -> bool {
        self.halt_states.iter().any(|s| *s == self.state)
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Moves the head one cell without consuming a transition.
    pub fn move_head(&mut self, direction: Direction) {
        self.tape.move_head(direction);
    }

    /// Writes `c` under the head.
    ///
    /// # Errors
    ///
    /// Returns `TuringMachineError::ValidationError` if `c` is not part of the alphabet.
    pub fn write_symbol(&mut self, c: char) -> Result<(), TuringMachineError> {
        if !self.alphabet.contains(&c) {
            return Err(TuringMachineError::ValidationError(format!(
                "Symbol '{c}' is not part of the alphabet"
            )));
        }

        self.tape.write(Symbol::Char(c));
        Ok(())
    }

    /// Replaces the tape content and puts the head on the first cell.
    ///
    /// # Errors
    ///
    /// Returns `TuringMachineError::ValidationError` if `content` holds symbols outside the
    /// alphabet. The blank symbol is always allowed.
    pub fn set_tape_content(&mut self, content: &str) -> Result<(), TuringMachineError> {
        if let Some(c) = content
            .chars()
            .find(|c| *c != BLANK_SYMBOL && !self.alphabet.contains(c))
        {
            return Err(TuringMachineError::ValidationError(format!(
                "Tape content contains symbol '{c}' outside the alphabet"
            )));
        }

        self.tape = Tape::new(content);
        Ok(())
    }
}
