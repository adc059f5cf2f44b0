//! This module provides the single-pass scanner that turns program source into a `Program`.
//!
//! The scanner reads the source one character at a time. The top of an explicit [`Scopes`]
//! stack and the class of the character select what happens next; there is no separate
//! tokenizing pass. Malformed directives are reported and skipped, so one scan reports every
//! problem of the source.
//!
//! ```text
//! &<tape-string>;                              initial tape
//! @<c>:<c>:...;                                alphabet
//! $<state>:<read> -> <target>:<write>:<dir>;   transition
//! !<state>;                                    initial state
//! ~<state>:<state>:...;                        halt states
//! *<state>:<state>:...;                        states
//! # ...                                        comment
//! :<namespace> { ... }                         namespace block
//! ```

use log::{debug, trace};

use crate::analyzer::{self, AnalysisError};
use crate::charset::{is_state_name, is_tape_char, NAME_SEPARATOR};
use crate::diagnostic::{Diagnostic, Diagnostics, Severity};
use crate::scope::{Scope, Scopes};
use crate::table::{TransitionTable, ANONYMOUS_STATE};
use crate::tape::Tape;
use crate::types::{
    Direction, Program, Symbol, Transition, TuringMachineError, ANY_SYMBOL, BLANK_SYMBOL,
    HALT_STATE,
};

/// Parses `input` into a `Program`.
///
/// Warnings are dropped; use [`Parser`] to inspect them.
///
/// # Returns
///
/// * `Ok(Program)` if the source has no errors.
/// * `Err(TuringMachineError::ParseError)` carrying every diagnostic otherwise.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    Parser::new(input).parse().into_result()
}

/// The result of a scan: the program if the source had no errors, and every diagnostic.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub program: Option<Program>,
    pub diagnostics: Diagnostics,
}

impl Parsed {
    /// Number of errors found. Zero exactly when `program` is present.
    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn into_result(self) -> Result<Program, TuringMachineError> {
        self.program
            .ok_or(TuringMachineError::ParseError(self.diagnostics))
    }
}

/// A character as seen by the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    /// Space, tab or carriage return.
    Blank,
    Newline,
    /// `;`
    Terminator,
    /// `:`
    Separator,
    /// `-` or `>`.
    Arrow(char),
    /// `{`
    Open,
    /// `}`
    Close,
    Other(char),
}

impl From<char> for CharClass {
    fn from(c: char) -> Self {
        match c {
            ' ' | '\t' | '\r' => CharClass::Blank,
            '\n' => CharClass::Newline,
            ';' => CharClass::Terminator,
            ':' => CharClass::Separator,
            '-' | '>' => CharClass::Arrow(c),
            '{' => CharClass::Open,
            '}' => CharClass::Close,
            _ => CharClass::Other(c),
        }
    }
}

/// A point in the source.
#[derive(Debug, Clone, Copy, Default)]
struct Mark {
    offset: usize,
    line: usize,
    column: usize,
}

/// The fields collected for the directive being scanned.
#[derive(Debug, Default)]
struct Item {
    fields: Vec<String>,
    current: String,
    /// Set once the directive produced an error; the rest of it is skipped.
    poisoned: bool,
    start: Mark,
}

impl Item {
    fn separate(&mut self) {
        self.fields.push(std::mem::take(&mut self.current));
    }

    fn into_fields(mut self) -> Vec<String> {
        self.separate();
        self.fields
    }
}

/// The initial state as declared, with where it was declared.
#[derive(Debug, Clone)]
struct Declared {
    name: String,
    at: Mark,
}

/// The single-pass scanner.
///
/// All intermediate state lives here and is threaded through each character step.
pub struct Parser<'a> {
    input: &'a str,
    scopes: Scopes,
    item: Item,
    position: Mark,
    table: TransitionTable,
    alphabet: Vec<char>,
    tape: Option<String>,
    initial_state: Option<Declared>,
    halt_states: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            scopes: Scopes::new(),
            item: Item::default(),
            position: Mark {
                offset: 0,
                line: 1,
                column: 0,
            },
            table: TransitionTable::new(),
            alphabet: Vec::new(),
            tape: None,
            initial_state: None,
            halt_states: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Scans the whole input, validates the result and builds the program if no error
    /// was found.
    pub fn parse(mut self) -> Parsed {
        self.scan();
        self.close_all();
        self.validate();
        self.finish()
    }

    /// Feeds every character of the input through the dispatch table.
    fn scan(&mut self) {
        for (offset, c) in self.input.char_indices() {
            self.position.offset = offset;
            self.position.column += 1;

            self.dispatch(c);

            if c == '\n' {
                self.position.line += 1;
                self.position.column = 0;
            }
        }

        self.position.offset = self.input.len();
    }

    /// The dispatch table: (active scope, character class) to action.
    fn dispatch(&mut self, c: char) {
        let scope = self.scopes.top();

        match (scope, CharClass::from(c)) {
            (_, CharClass::Blank) => {}
            (Scope::Comment, CharClass::Newline) => self.exit(Scope::Comment),
            (Scope::Comment, _) => {}
            (_, CharClass::Newline) => {}

            (Scope::Namespace, CharClass::Close) => self.exit(Scope::Namespace),
            (Scope::Namespace, CharClass::Separator) => self.enter(Scope::NamespaceName),
            (Scope::Namespace, CharClass::Terminator) => {
                self.error("Unexpected ';': no open directive to close")
            }
            (Scope::Namespace, CharClass::Other(c)) => match Scope::opened_by(c) {
                Some(scope) => self.enter(scope),
                None => self.error(format!("Invalid character '{c}'")),
            },
            (Scope::Namespace, _) => self.error(format!("Invalid character '{c}'")),

            (Scope::NamespaceName, CharClass::Open) => self.open_namespace(),
            (Scope::NamespaceName, CharClass::Terminator) => self.abandon_namespace(),
            (scope, CharClass::Close) if scope.is_item() || scope == Scope::NamespaceName => {
                self.interrupt(scope)
            }

            (scope, CharClass::Terminator) if scope.is_item() => self.commit(scope),
            (_, _) if self.item.poisoned => {}

            (Scope::Transition, CharClass::Arrow('-')) => {}
            (Scope::Transition, CharClass::Arrow(_)) => self.item.separate(),
            (scope, CharClass::Separator) if scope.has_fields() => self.item.separate(),
            (scope, CharClass::Separator) => self.reject(format!("Separator ':' in {scope}")),
            (scope, CharClass::Other(c)) if scope.accepts(c) => self.item.current.push(c),
            (scope, _) => self.reject(format!("Invalid character '{c}' in {scope}")),
        }
    }

    /// Opens `scope` and starts a fresh item.
    fn enter(&mut self, scope: Scope) {
        debug!(
            "entering {scope} at {}:{}",
            self.position.line, self.position.column
        );
        self.scopes.enter(scope, None);
        self.item = Item {
            start: self.position,
            ..Item::default()
        };
    }

    /// Closes the top scope, reporting a mismatch if it is not `scope`.
    fn exit(&mut self, scope: Scope) {
        match self.scopes.exit(scope) {
            Ok(_) => debug!("leaving {scope}"),
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Reports an error at the current character and skips the rest of the item.
    fn reject(&mut self, message: String) {
        self.error(message);
        self.item.poisoned = true;
    }

    fn error(&mut self, message: impl Into<String>) {
        self.report(Severity::Error, message.into(), self.position);
    }

    fn report(&mut self, severity: Severity, message: String, at: Mark) {
        trace!("{severity} at {}:{}: {message}", at.line, at.column);
        self.diagnostics.push(Diagnostic::at(
            severity,
            message,
            self.input,
            at.offset,
            (at.line, at.column),
            self.scopes.top(),
        ));
    }

    /// `{` after a namespace name: opens the namespace and registers its own state.
    fn open_namespace(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.exit(Scope::NamespaceName);

        let name = if item.poisoned {
            None
        } else if item.current.is_empty() {
            self.error("Invalid namespace: empty name");
            None
        } else {
            Some(item.current)
        };

        // The block is opened even without a valid name so that its `}` still matches.
        let named = name.is_some();
        self.scopes.enter(Scope::Namespace, name);

        if named {
            let state = self.scopes.qualify("");
            debug!("opened namespace '{state}'");
            if !self.table.insert(&state) {
                self.report(
                    Severity::Warning,
                    format!("State '{state}' already defined"),
                    self.position,
                );
            }
        }
    }

    /// `;` after a namespace name.
    fn abandon_namespace(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.exit(Scope::NamespaceName);

        if !item.poisoned {
            self.error(format!(
                "Invalid namespace '{}': expected '{{'",
                item.current
            ));
        }
    }

    /// `}` while `scope` is still open: reports the mismatch, drops the unfinished item and
    /// closes the enclosing namespace, if any.
    fn interrupt(&mut self, scope: Scope) {
        let item = std::mem::take(&mut self.item);

        if let Err(e) = self.scopes.exit(Scope::Namespace) {
            if !item.poisoned {
                self.error(e.to_string());
            }
        }

        self.exit(scope);
        if !self.scopes.path().is_empty() {
            self.exit(Scope::Namespace);
        }
    }

    /// `;` in a directive: closes it and applies it unless it already failed.
    fn commit(&mut self, scope: Scope) {
        let item = std::mem::take(&mut self.item);
        self.exit(scope);

        if item.poisoned {
            return;
        }

        let start = item.start;
        let fields = item.into_fields();
        let result = match scope {
            Scope::TapeString => self.apply_tape(fields, start),
            Scope::Alphabet => self.apply_alphabet(fields, start),
            Scope::Transition => self.apply_transition(fields, start),
            Scope::InitialState => self.apply_initial_state(fields, start),
            Scope::HaltStates => self.apply_halt_states(fields),
            Scope::States => self.apply_states(fields, start),
            _ => Ok(()),
        };

        if let Err(message) = result {
            self.report(Severity::Error, message, start);
        }
    }

    fn warn(&mut self, message: String, at: Mark) {
        self.report(Severity::Warning, message, at);
    }

    fn apply_tape(&mut self, fields: Vec<String>, at: Mark) -> Result<(), String> {
        let content = fields.concat();
        if content.is_empty() {
            return Err("Invalid tape string: empty".into());
        }

        if let Some(c) = content
            .chars()
            .find(|c| *c != BLANK_SYMBOL && !self.alphabet.contains(c))
        {
            return Err(format!("Character not in alphabet '{c}'"));
        }

        if self.tape.is_some() {
            self.warn(
                "Multiple tape strings defined! Overwriting previous definition".into(),
                at,
            );
        }

        self.tape = Some(content);
        Ok(())
    }

    fn apply_alphabet(&mut self, fields: Vec<String>, at: Mark) -> Result<(), String> {
        let mut symbols = Vec::with_capacity(fields.len());
        for field in &fields {
            symbols.push(single_char(field).ok_or_else(|| {
                format!("Invalid alphabet symbol '{field}': expected a single character")
            })?);
        }

        // Each directive replaces the alphabet.
        let previous = std::mem::take(&mut self.alphabet);
        for symbol in symbols {
            if previous.contains(&symbol) {
                self.warn(format!("Character '{symbol}' already defined in alphabet"), at);
            }
            if !self.alphabet.contains(&symbol) {
                self.alphabet.push(symbol);
            }
        }

        if !self.alphabet.contains(&BLANK_SYMBOL) {
            self.alphabet.push(BLANK_SYMBOL);
        }

        Ok(())
    }

    fn apply_transition(&mut self, fields: Vec<String>, at: Mark) -> Result<(), String> {
        let [state, read, target, write, direction]: [String; 5] =
            fields.try_into().map_err(|fields: Vec<String>| {
                format!(
                    "Invalid transition: expected <state>:<read> -> <target>:<write>:<dir>, found {} field(s)",
                    fields.len()
                )
            })?;

        let state = if state.is_empty() || state == ANY_SYMBOL.to_string() {
            self.scopes.qualify(ANONYMOUS_STATE)
        } else if state.starts_with(NAME_SEPARATOR) || !is_state_name(&state) {
            return Err(format!("Invalid source state '{state}'"));
        } else {
            self.scopes.qualify(&state)
        };

        let read = transition_symbol(&read, "read")?;
        let target = self.resolve(&target, "target")?;
        let write = transition_symbol(&write, "write")?;
        let direction = single_char(&direction)
            .and_then(Direction::from_symbol)
            .ok_or_else(|| format!("Invalid direction '{direction}': expected L, R or *"))?;

        let transition = Transition::new(state, read, target, write, direction);
        trace!("transition {transition}");

        let appended = self.table.append(transition.clone());
        for name in appended.created {
            if name != ANONYMOUS_STATE {
                self.warn(
                    format!("State '{name}' not found in transition table! Adding it now"),
                    at,
                );
            }
        }

        if appended.replaced {
            self.warn(
                format!(
                    "Transition for state '{}' reading '{}' redefined",
                    transition.state, transition.read
                ),
                at,
            );
        }

        Ok(())
    }

    fn apply_initial_state(&mut self, fields: Vec<String>, at: Mark) -> Result<(), String> {
        let name = self.resolve(&fields.concat(), "initial")?;

        if let Some(previous) = &self.initial_state {
            let message = format!(
                "Initial state redefined: '{}' replaced by '{name}'",
                previous.name
            );
            self.warn(message, at);
        }

        self.initial_state = Some(Declared { name, at });
        Ok(())
    }

    fn apply_halt_states(&mut self, fields: Vec<String>) -> Result<(), String> {
        let mut states = Vec::with_capacity(fields.len());
        for field in &fields {
            let state = self.resolve(field, "halt")?;
            if !self.table.contains(&state) {
                return Err(format!("Invalid halt state '{state}': not in transition table"));
            }
            states.push(state);
        }

        for state in states {
            if state != HALT_STATE && !self.halt_states.contains(&state) {
                self.halt_states.push(state);
            }
        }

        Ok(())
    }

    fn apply_states(&mut self, fields: Vec<String>, at: Mark) -> Result<(), String> {
        if let Some(field) = fields
            .iter()
            .find(|f| f.is_empty() || f.starts_with(NAME_SEPARATOR))
        {
            return Err(format!("Invalid state '{field}'"));
        }

        for field in fields {
            let state = self.scopes.qualify(&field);
            if !self.table.insert(&state) {
                self.warn(format!("State '{state}' already defined"), at);
            }
        }

        Ok(())
    }

    /// Resolves a state reference. A leading `.` names an existing state by its full name;
    /// anything else is qualified with the active namespace.
    fn resolve(&self, name: &str, role: &str) -> Result<String, String> {
        if name.is_empty() {
            return Err(format!("Missing {role} state"));
        }

        if let Some(absolute) = name.strip_prefix(NAME_SEPARATOR) {
            if !self.table.contains(absolute) {
                return Err(format!("Unknown {role} state '{name}': not in transition table"));
            }
            return Ok(absolute.to_string());
        }

        if !is_state_name(name) {
            return Err(format!("Invalid {role} state '{name}'"));
        }

        Ok(self.scopes.qualify(name))
    }

    /// Reports every scope still open at the end of the input.
    fn close_all(&mut self) {
        let poisoned = self.item.poisoned;
        let frames: Vec<_> = self.scopes.drain().collect();

        for frame in frames {
            let message = match frame.scope {
                Scope::Comment => continue,
                Scope::Namespace => format!(
                    "Unclosed namespace '{}': missing '}}'",
                    frame.name.unwrap_or_default()
                ),
                Scope::NamespaceName if !poisoned => "Unterminated namespace name".to_string(),
                scope if scope.is_item() && !poisoned => {
                    format!("Unterminated {scope}: missing ';'")
                }
                _ => continue,
            };
            self.error(message);
        }
    }

    /// Post-scan checks over the collected table.
    fn validate(&mut self) {
        let initial = self.initial_state.clone();
        let errors = analyzer::check(&self.table, initial.as_ref().map(|d| d.name.as_str()));

        for error in errors {
            let severity = if error.is_fatal() {
                Severity::Error
            } else {
                Severity::Warning
            };

            match (&error, &initial) {
                (AnalysisError::InvalidStartState(_), Some(declared)) => {
                    self.report(severity, error.to_string(), declared.at)
                }
                _ => self
                    .diagnostics
                    .push(Diagnostic::global(severity, error.to_string())),
            }
        }
    }

    fn finish(self) -> Parsed {
        let errors = self.diagnostics.error_count();
        debug!(
            "scan finished: {} state(s), {errors} error(s)",
            self.table.len()
        );

        let program = match self.initial_state {
            Some(initial) if errors == 0 => {
                let mut alphabet = self.alphabet;
                if !alphabet.contains(&BLANK_SYMBOL) {
                    alphabet.push(BLANK_SYMBOL);
                }

                let mut halt_states = vec![HALT_STATE.to_string()];
                halt_states.extend(self.halt_states);

                Some(Program {
                    table: self.table,
                    initial_state: initial.name,
                    halt_states,
                    alphabet,
                    tape: Tape::new(self.tape.as_deref().unwrap_or_default()),
                })
            }
            _ => None,
        };

        Parsed {
            program,
            diagnostics: self.diagnostics,
        }
    }
}

/// Returns the only character of `s`.
fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Parses a read or write symbol: one tape character or the wildcard.
fn transition_symbol(field: &str, role: &str) -> Result<Symbol, String> {
    match single_char(field) {
        Some(c) if c == ANY_SYMBOL || is_tape_char(c) => Ok(Symbol::from(c)),
        _ => Err(format!(
            "Invalid {role} symbol '{field}': expected a single character or '{ANY_SYMBOL}'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "@0:1;\n*q0:q1;\n!q0;\n~q1;\n$q0:0 -> q1:1:R;\n&00;";

    fn errors(input: &str) -> Vec<String> {
        Parser::new(input)
            .parse()
            .diagnostics
            .errors()
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn test_parse_example() {
        let program = parse(EXAMPLE).unwrap();

        let mut alphabet = program.alphabet.clone();
        alphabet.sort();
        assert_eq!(alphabet, vec!['0', '1', '_']);
        assert_eq!(program.state_names(), vec!["q0", "q1"]);
        assert_eq!(program.initial_state, "q0");
        assert_eq!(program.halt_states, vec!["HALT", "q1"]);
        assert_eq!(program.tape.to_string(), "00");

        let transition = &program.table.get("q0").unwrap().transitions()[0];
        assert_eq!(
            *transition,
            Transition::new("q0", Symbol::Char('0'), "q1", Symbol::Char('1'), Direction::Right)
        );
    }

    #[test]
    fn test_parse_example_has_no_warnings() {
        let parsed = Parser::new(EXAMPLE).parse();
        assert!(parsed.diagnostics.is_empty(), "{}", parsed.diagnostics);
    }

    #[test]
    fn test_namespace_qualification() {
        let input = r#"
            :foo {
                :bar {
                    *a;
                    $a:0 -> a:*:R;
                }
            }
            $start:* -> .foo.bar.a:*:*;
            !start;
        "#;

        let program = parse(input).unwrap();
        assert!(program.table.contains("foo"));
        assert!(program.table.contains("foo.bar"));
        assert!(program.table.contains("foo.bar.a"));

        let inner = &program.table.get("foo.bar.a").unwrap().transitions()[0];
        assert_eq!(inner.target, "foo.bar.a");

        let outer = &program.table.get("start").unwrap().transitions()[0];
        assert_eq!(outer.target, "foo.bar.a");
        assert_eq!(outer.direction, Direction::Stay);
    }

    #[test]
    fn test_absolute_target_must_exist() {
        let input = "*q0;\n!q0;\n$q0:0 -> .nowhere:1:R;";
        let errors = errors(input);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'.nowhere'"));
    }

    #[test]
    fn test_forward_reference_is_auto_created() {
        let parsed = Parser::new("!q0;\n$q0:0 -> q1:1:R;").parse();
        assert_eq!(parsed.error_count(), 0);

        let program = parsed.program.unwrap();
        assert!(program.table.contains("q1"));
        assert_eq!(parsed.diagnostics.warnings().count(), 2);
    }

    #[test]
    fn test_any_state_transition() {
        let program = parse("*q0;\n!q0;\n$*:1 -> HALT:1:*;\n$:0 -> q0:1:R;").unwrap();
        let any = program.table.get(ANONYMOUS_STATE).unwrap();
        assert_eq!(any.transitions().len(), 2);
        assert!(!program.state_names().contains(&""));
    }

    #[test]
    fn test_any_state_in_namespace_is_namespace_state() {
        let program = parse(":inc {\n$:1 -> .inc:0:L;\n}\n!inc;").unwrap();
        let state = program.table.get("inc").unwrap();
        assert_eq!(state.transitions()[0].target, "inc");
    }

    #[test]
    fn test_error_accumulation() {
        let input = "@0:1;\n*q0:q1;\n&0%1;\n!q0;\n$q0:0 -> q1:1:X;\n*q2:q_3;\n~q1;\n$q0:1 -> q0:0:R;";
        let parsed = Parser::new(input).parse();

        assert_eq!(parsed.error_count(), 3, "{}", parsed.diagnostics);
        assert!(parsed.program.is_none());
        let lines: Vec<Option<usize>> = parsed.diagnostics.errors().map(|d| d.line()).collect();
        assert_eq!(lines, vec![Some(3), Some(5), Some(6)]);
    }

    #[test]
    fn test_malformed_directives_have_no_effect() {
        let input = "@0:1;\n*q0:q1;\n!q0;\n&0%1;\n$q0:0 -> q1:1:X;\n*q2:q_3;\n$q0:1 -> q0:0:R;";
        let mut parser = Parser::new(input);
        parser.scan();

        assert_eq!(parser.diagnostics.error_count(), 3);
        assert!(parser.tape.is_none());
        assert!(!parser.table.contains("q2"));
        let q0 = parser.table.get("q0").unwrap();
        assert_eq!(q0.transitions().len(), 1);
        assert_eq!(q0.transitions()[0].read, Symbol::Char('1'));
    }

    #[test]
    fn test_missing_initial_state() {
        let errors = errors("*q0;");
        assert_eq!(errors, vec!["No initial state declared".to_string()]);
    }

    #[test]
    fn test_unresolved_initial_state() {
        let parsed = Parser::new("*q0;\n!q9;").parse();
        let error = parsed.diagnostics.errors().next().unwrap();
        assert!(error.message.contains("'q9'"));
        assert_eq!(error.line(), Some(2));
    }

    #[test]
    fn test_halt_state_must_exist() {
        let errors = errors("*q0;\n!q0;\n~q0:nope;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'nope'"));
    }

    #[test]
    fn test_tape_char_must_be_in_alphabet() {
        let errors = errors("@0;\n*q0;\n!q0;\n&01;");
        assert_eq!(errors, vec!["Character not in alphabet '1'".to_string()]);
    }

    #[test]
    fn test_tape_string_overwrite_warns() {
        let parsed = Parser::new("@a:b;\n*q0;\n!q0;\n&aa;\n&bb;").parse();
        assert_eq!(parsed.error_count(), 0);
        assert_eq!(parsed.diagnostics.warnings().count(), 1);
        assert_eq!(parsed.program.unwrap().tape.to_string(), "bb");
    }

    #[test]
    fn test_alphabet_duplicates_warn() {
        let parsed = Parser::new("@0:1:0;\n@1;\n*q0;\n!q0;").parse();
        assert_eq!(parsed.error_count(), 0);
        let warnings: Vec<_> = parsed.diagnostics.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "Character '1' already defined in alphabet");
        assert_eq!(warnings[0].line(), Some(2));
        assert_eq!(parsed.program.unwrap().alphabet, vec!['1', '_']);
    }

    #[test]
    fn test_alphabet_is_replaced() {
        let errors = errors("@0:1;\n@a;\n!s;\n*s;\n&0a;");
        assert_eq!(errors, vec!["Character not in alphabet '0'".to_string()]);

        let program = parse("@0:1;\n@a;\n!s;\n*s;\n&a_a;").unwrap();
        assert_eq!(program.alphabet, vec!['a', '_']);
    }

    #[test]
    fn test_alphabet_symbols_are_single_characters() {
        let errors = errors("@0:12;\n*q0;\n!q0;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'12'"));
    }

    #[test]
    fn test_states_redeclaration_warns() {
        let parsed = Parser::new("*q0:q1;\n*q1;\n!q0;").parse();
        assert_eq!(parsed.error_count(), 0);
        assert_eq!(parsed.diagnostics.warnings().count(), 1);
    }

    #[test]
    fn test_comments_are_ignored() {
        let input = "# alphabet\n@0:1; # trailing ; and $ are ignored\n*q0; !q0;\n# $broken\n";
        let program = parse(input).unwrap();
        assert_eq!(program.state_names(), vec!["q0"]);
    }

    #[test]
    fn test_separator_in_initial_state() {
        let errors = errors("*q0;\n!q0:q1;\n!q0;");
        assert_eq!(errors, vec!["Separator ':' in initial state".to_string()]);
    }

    #[test]
    fn test_scope_mismatch() {
        let errors = errors("*q0;\n!q0;\n}\n;");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Cannot exit namespace. At root level!");
        assert!(errors[1].starts_with("Unexpected ';'"));
    }

    #[test]
    fn test_close_inside_directive() {
        let errors = errors("*a\n}\n*q0;\n!q0;");
        assert_eq!(errors, vec!["Tried to exit namespace but found states".to_string()]);

        let parsed = Parser::new(":ns {\n*a\n}\n*q0;\n!q0;").parse();
        assert_eq!(parsed.error_count(), 1, "{}", parsed.diagnostics);
        let error = parsed.diagnostics.errors().next().unwrap();
        assert_eq!(error.message, "Tried to exit namespace but found states");
        assert_eq!(error.line(), Some(3));
    }

    #[test]
    fn test_close_inside_namespace_name() {
        let errors = errors(":a {\n:b }\n*q0;\n!q0;");
        assert_eq!(
            errors,
            vec!["Tried to exit namespace but found namespace name".to_string()]
        );
    }

    #[test]
    fn test_unterminated_directives() {
        let errors = errors("*q0;\n!q0;\n:ns {\n$q0:0 -> q0:0:R");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Unterminated transition"));
        assert!(errors[1].contains("Unclosed namespace 'ns'"));
    }

    #[test]
    fn test_invalid_namespace_name() {
        let errors = errors(":fo.o {\n*a;\n}\n*q0;\n!q0;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid character '.' in namespace name"));
    }

    #[test]
    fn test_empty_namespace_name() {
        let errors = errors(": {\n}\n*q0;\n!q0;");
        assert_eq!(errors, vec!["Invalid namespace: empty name".to_string()]);
    }

    #[test]
    fn test_invalid_direction() {
        let errors = errors("*q0;\n!q0;\n$q0:0 -> q0:0:U;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid direction 'U'"));
    }

    #[test]
    fn test_wrong_field_count() {
        let errors = errors("*q0;\n!q0;\n$q0:0 -> q0:R;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("found 4 field(s)"));
    }

    #[test]
    fn test_redefined_transition_replaces_in_place() {
        let parsed = Parser::new("!q0;\n$q0:0 -> a:0:R;\n$q0:1 -> b:1:R;\n$q0:0 -> c:0:L;").parse();
        assert_eq!(parsed.error_count(), 0);

        let program = parsed.program.unwrap();
        let targets: Vec<&str> = program
            .table
            .get("q0")
            .unwrap()
            .transitions()
            .iter()
            .map(|t| t.target.as_str())
            .collect();
        assert_eq!(targets, vec!["c", "b"]);
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let input = ":ns {\n*a:b;\n$a:* -> b:*:R;\n$a:0 -> a:1:L;\n}\n@0:1;\n!ns.a;\n&0101;";
        let first = parse(input).unwrap();
        let second = parse(input).unwrap();

        assert_eq!(first.table, second.table);
        assert_eq!(first.tape, second.tape);
    }

    #[test]
    fn test_error_display_lists_diagnostics() {
        let error = parse("*q0;\n!q0;\n&x;").unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Character not in alphabet 'x'"));
        assert!(message.contains("3:1"));
        assert!(message.ends_with("1 error(s) found!"));
    }
}
