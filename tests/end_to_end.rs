use std::collections::VecDeque;
use std::time::Duration;

use turscript::{
    parse, Parser, Renderer, RunConfig, Severity, Snapshot, Step, TuringMachine,
    TuringMachineError, BLANK_SYMBOL,
};

struct Recorder {
    tapes: Vec<String>,
    transitions: Vec<Option<String>>,
    messages: Vec<String>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            tapes: Vec::new(),
            transitions: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl Renderer for Recorder {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        self.tapes.push(snapshot.tape.to_string());
        self.transitions.push(match snapshot.last {
            Some(Step::Applied(t)) => Some(t.to_string()),
            _ => None,
        });
    }

    fn status(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn scripted(lines: &[&str]) -> impl FnMut(&str) -> String {
    let mut lines: VecDeque<String> = lines.iter().map(|s| s.to_string()).collect();
    move |_: &str| lines.pop_front().unwrap_or_else(|| "q".to_string())
}

fn config() -> RunConfig {
    RunConfig {
        batch_delay: Duration::ZERO,
    }
}

#[test]
fn compiles_and_runs_the_reference_program() {
    let source = "@0:1;\n*q0:q1;\n!q0;\n~q1;\n$q0:0 -> q1:1:R;\n&00;";
    let program = parse(source).unwrap();

    assert_eq!(program.halt_states, vec!["HALT", "q1"]);
    assert_eq!(program.tape.to_string(), "00");

    let mut machine = TuringMachine::new(&program);
    let mut renderer = Recorder::new();
    let summary = machine.run(&mut scripted(&[]), &mut renderer, &config());

    assert_eq!(summary.steps, 1);
    assert!(summary.halted);
    assert_eq!(machine.tape().to_string(), "10");
    assert_eq!(machine.tape().head(), 1);
    assert_eq!(renderer.transitions, vec![Some("q0:0 -> q1:1:R".to_string())]);
}

#[test]
fn namespaced_counter_runs_to_halt() {
    let source = "\
# Counts the ones on the tape into a blank-separated unary block.
@1:x;
*done;
~done;
&111;

:scan {
    :mark {
        $*:1 -> .scan.mark:x:R;
        $*:_ -> .done:*:*;
    }
}

!scan.mark;
";
    let parsed = Parser::new(source).parse();
    assert_eq!(parsed.error_count(), 0, "{}", parsed.diagnostics);

    let program = parsed.program.unwrap();
    assert!(program.table.contains("scan"));
    assert!(program.table.contains("scan.mark"));

    let mut machine = TuringMachine::new(&program);
    let mut renderer = Recorder::new();
    let summary = machine.run(&mut scripted(&["10", ""]), &mut renderer, &config());

    assert_eq!(summary.state, "done");
    assert_eq!(summary.steps, 4);
    assert_eq!(machine.tape().to_string(), "xxx_");
    assert_eq!(
        renderer.messages,
        vec!["Stepped one step", "Halted after 3 steps", "HALTED at step 4"]
    );
}

#[test]
fn root_wildcard_state_is_a_fallback() {
    let source = "@0:1;\n!a;\n*b;\n~b;\n$a:0 -> a:1:R;\n$*:1 -> b:*:*;\n&01;";
    let program = parse(source).unwrap();
    let mut machine = TuringMachine::new(&program);

    assert!(machine.step().is_applied());
    assert_eq!(machine.state(), "a");

    // `a` has no transition for `1`; the root wildcard state takes over.
    assert!(machine.step().is_applied());
    assert_eq!(machine.state(), "b");
    assert!(machine.is_halted());
}

#[test]
fn malformed_directives_are_all_reported() {
    let source = "\
@0:1;
!q0;
$q0:0 -> q1:%:R;
$q0:1 -> q0:1:R;
&0x1;
~nowhere;
";
    let parsed = Parser::new(source).parse();
    let errors: Vec<_> = parsed.diagnostics.errors().collect();

    assert_eq!(errors.len(), 3, "{}", parsed.diagnostics);
    assert_eq!(
        errors.iter().map(|d| d.line()).collect::<Vec<_>>(),
        vec![Some(3), Some(5), Some(6)]
    );
    assert!(parsed.program.is_none());

    match parse(source) {
        Err(TuringMachineError::ParseError(diagnostics)) => {
            assert_eq!(diagnostics.error_count(), 3);
            assert!(diagnostics.to_string().ends_with("3 error(s) found!"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn warnings_do_not_block_compilation() {
    let source = "@0:0;\n!a;\n$a:0 -> b:*:R;\n&0;";
    let parsed = Parser::new(source).parse();

    assert!(parsed.program.is_some());
    assert!(parsed
        .diagnostics
        .iter()
        .all(|d| d.severity == Severity::Warning));
    assert!(parsed.diagnostics.len() >= 2);
}

#[test]
fn reparse_is_idempotent() {
    let source = ":a { *s; $s:* -> s:*:L; }\n!a.s;";
    assert_eq!(parse(source).unwrap(), parse(source).unwrap());
}

#[test]
fn head_may_wander_off_both_ends() {
    let program = parse("@1;\n!s;\n$s:_ -> s:1:L;\n&_;").unwrap();
    let mut machine = TuringMachine::new(&program);

    for _ in 0..3 {
        machine.step();
    }

    assert_eq!(machine.tape().to_string(), "_111");
    assert_eq!(machine.tape().head(), 0);
    assert_eq!(machine.tape().peek(), BLANK_SYMBOL);
}
