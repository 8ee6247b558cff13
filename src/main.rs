//! `stride` CLI entry point.

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use stride::cli::{commands, Cli, Commands};
use stride::config;
use stride::engine::{KeywordSuggester, TaskEngine};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    stride::logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    // Commands that work without a workspace.
    match &cli.command {
        Commands::Init => {
            let dir = config::init_stride_dir(&std::env::current_dir()?)?;
            // Opening once applies the schema so the first real command is fast.
            config::open_storage(&dir)?;
            println!("initialized stride workspace at {}", dir.display());
            return Ok(());
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "stride", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let stride_dir = config::discover_stride_dir(None)?;
    let settings = config::Settings::load(&stride_dir)?;
    let storage = config::open_storage(&stride_dir)?;

    let mut engine = if settings.suggestions {
        TaskEngine::with_suggester(storage, Box::new(KeywordSuggester))
    } else {
        TaskEngine::new(storage)
    };

    let json = cli.json;
    match &cli.command {
        Commands::Init | Commands::Completions { .. } => unreachable!("handled above"),
        Commands::Add(args) => commands::task::add(&mut engine, args, json)?,
        Commands::Ls(args) => commands::task::ls(&mut engine, args, json)?,
        Commands::Show { id } => commands::task::show(&engine, *id, json)?,
        Commands::Edit(args) => commands::task::edit(&mut engine, args, json)?,
        Commands::Done { id } => commands::task::toggle(&mut engine, *id, true, json)?,
        Commands::Undone { id } => commands::task::toggle(&mut engine, *id, false, json)?,
        Commands::Rm { id } => commands::task::rm(&mut engine, *id)?,
        Commands::Subtask { parent, title } => {
            commands::task::subtask(&mut engine, *parent, title, json)?;
        }
        Commands::Lists(command) => commands::list::execute(&mut engine, command, json)?,
        Commands::Labels(command) => commands::label::execute(&mut engine, command, json)?,
        Commands::Dep(command) => commands::dep::execute(&mut engine, command, json)?,
        Commands::Remind(command) => commands::remind::execute(&mut engine, command, json)?,
        Commands::Template(command) => commands::template::execute(&mut engine, command, json)?,
        Commands::Stats => commands::stats::execute(&engine, json)?,
        Commands::Activity(args) => commands::activity::execute(&engine, args, json)?,
    }

    Ok(())
}
