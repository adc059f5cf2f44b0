mod terminal;

use clap::Parser as _;
use log::{debug, info};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use terminal::{StdinInput, TerminalRenderer};
use turscript::loader::ProgramLoader;
use turscript::machine::{Input, RunConfig, TuringMachine};
use turscript::types::{Program, DEFAULT_BATCH_DELAY_MS};
use turscript::{Parser, ProgramManager, Severity};

/// Compiles and runs a .tur machine description step by step.
#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turscript demos/binary-increment.tur
  turscript --check program.tur
  turscript --check demos/
  turscript --demo bit-flipper --delay 100
  turscript --list")]
struct Cli {
    /// Path to the program file (.tur).
    #[clap(required_unless_present_any = ["demo", "list"])]
    file: Option<PathBuf>,

    /// Run one of the bundled programs, by name or index, instead of a file.
    #[clap(long, conflicts_with = "file")]
    demo: Option<String>,

    /// List the bundled programs and exit.
    #[clap(long, conflicts_with_all = ["file", "demo"])]
    list: bool,

    /// Compile the program, report diagnostics and exit. A directory checks every .tur
    /// file in it.
    #[clap(long)]
    check: bool,

    /// Print the compiled program as JSON and exit.
    #[clap(long)]
    dump: bool,

    /// Pause between two steps of a batch, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_BATCH_DELAY_MS)]
    delay: u64,

    /// Replace the initial tape.
    #[clap(long)]
    tape: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    if cli.list {
        list_demos()?;
        return Ok(());
    }

    if let Some(dir) = cli.file.as_deref().filter(|path| cli.check && path.is_dir()) {
        if !check_directory(dir) {
            process::exit(1);
        }
        return Ok(());
    }

    // Load the program before touching the terminal, so that failures end up on stderr
    // as plain text.
    let program = match load_program(&cli) {
        Ok(Some(program)) => program,
        Ok(None) => return Ok(()),
        Err(e) => {
            eprintln!("{} {e}", terminal::error_label());
            process::exit(1);
        }
    };

    if cli.check {
        println!(
            "OK: {} state(s), {} transition(s)",
            program.state_names().len(),
            program.transition_count()
        );
        return Ok(());
    }

    if cli.dump {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    let mut machine = TuringMachine::new(&program);
    if let Some(tape) = &cli.tape {
        machine.set_tape_content(tape)?;
    }

    let config = RunConfig {
        batch_delay: Duration::from_millis(cli.delay),
    };
    debug!("running with {config:?}");

    let summary = machine.run(
        &mut StdinInput::default(),
        &mut TerminalRenderer::new(),
        &config,
    );
    info!("{summary:?}");

    println!(
        "Finished after {} step(s) in state '{}'{}",
        summary.steps,
        summary.state,
        if summary.halted { " (halted)" } else { "" }
    );

    Ok(())
}

/// Loads the program named by the CLI arguments, from the bundled demos or from a file.
fn load_program(cli: &Cli) -> Result<Option<Program>, Box<dyn Error>> {
    match (&cli.demo, &cli.file) {
        (Some(name), _) => load_demo(name).map(Some),
        (None, Some(path)) => load_file(path, cli.check),
        (None, None) => Err("No program file given".into()),
    }
}

/// Compiles every program of `dir`, one line per file. Returns `false` if any failed.
fn check_directory(dir: &Path) -> bool {
    let mut ok = true;

    for result in ProgramLoader::load_programs(dir) {
        match result {
            Ok((path, program)) => println!(
                "OK: {}: {} state(s), {} transition(s)",
                path.display(),
                program.state_names().len(),
                program.transition_count()
            ),
            Err(e) => {
                ok = false;
                eprintln!("{} {e}", terminal::error_label());
            }
        }
    }

    ok
}

/// Prints one line per bundled program.
fn list_demos() -> Result<(), Box<dyn Error>> {
    for index in 0..ProgramManager::get_program_count() {
        let info = ProgramManager::get_program_info(index)?;
        println!(
            "{:>2}  {:<20} start '{}', tape '{}', {} state(s), {} transition(s)",
            info.index,
            info.name,
            info.initial_state,
            info.initial_tape,
            info.state_count,
            info.transition_count
        );
    }

    Ok(())
}

/// Looks up a bundled program by index or name.
fn load_demo(name: &str) -> Result<Program, Box<dyn Error>> {
    let program = match name.parse::<usize>() {
        Ok(index) => ProgramManager::get_program_by_index(index),
        Err(_) => ProgramManager::get_program_by_name(name),
    };

    program.map_err(|e| {
        format!(
            "{e}. Available programs: {}",
            ProgramManager::list_program_names().join(", ")
        )
        .into()
    })
}

/// Reads and compiles a program file, reporting every diagnostic on stderr.
///
/// Returns `Ok(None)` if the user declined to run a file without the `.tur` extension.
fn load_file(path: &Path, check: bool) -> Result<Option<Program>, Box<dyn Error>> {
    if !ProgramLoader::has_program_extension(path) && !check {
        let question = format!(
            "'{}' does not have a .tur extension. Continue? [y/N] ",
            path.display()
        );
        if !confirm(&mut StdinInput::default(), &question) {
            return Ok(None);
        }
    }

    let source = ProgramLoader::read_source(path)?;
    let parsed = Parser::new(&source).parse();

    for diagnostic in &parsed.diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => terminal::warning_label(),
            Severity::Error => terminal::error_label(),
        };
        eprintln!("{label} {}", diagnostic.message);
        if let Some(excerpt) = diagnostic.excerpt() {
            eprintln!("{excerpt}");
        }
    }

    match parsed.program {
        Some(program) => Ok(Some(program)),
        None => Err(format!("{} error(s) found!", parsed.error_count()).into()),
    }
}

/// Asks a yes/no question. Anything but `y` counts as no.
fn confirm(input: &mut impl Input, question: &str) -> bool {
    input.ask(question).trim().eq_ignore_ascii_case("y")
}
