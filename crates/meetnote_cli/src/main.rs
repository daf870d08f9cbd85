//! Command-line entry point over `meetnote_core`.
//!
//! # Responsibility
//! - Expose the smoke probe plus the "new collection" and "render meeting"
//!   flows without a UI shell.
//! - Map every failure to `error: <message>` on stderr and exit code 1.

use log::info;
use meetnote_core::{
    init_logging_from_config, render_meeting_by_name, AppContext, CoreConfig, ProjectDocument,
};
use std::error::Error;
use std::fs;
use std::process::ExitCode;

const USAGE: &str = "usage:
  meetnote ping
  meetnote version
  meetnote new <name>
  meetnote render <collection-dir> <meeting-id>
  meetnote render-project <project.json> <meeting-name>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let argv: Vec<&str> = args.iter().map(String::as_str).collect();
    match argv.as_slice() {
        ["ping"] => println!("meetnote_core ping={}", meetnote_core::ping()),
        ["version"] => println!("meetnote_core version={}", meetnote_core::core_version()),
        ["new", name] => {
            let mut context = open_context()?;
            context.new_collection(*name);
            let summary = context.save_as(None)?;
            println!("{}", summary.directory.display());
        }
        ["render", directory, meeting_id] => {
            let mut context = open_context()?;
            for skipped in context.open_collection(directory)? {
                eprintln!("warning: skipped {} ({})", skipped.filename, skipped.reason);
            }
            println!("{}", context.render(meeting_id)?);
        }
        ["render-project", path, meeting_name] => {
            let raw = fs::read_to_string(path).map_err(|err| format!("cannot read {path}: {err}"))?;
            let document = ProjectDocument::from_json_str(&raw)?;
            println!("{}", render_meeting_by_name(&document, meeting_name)?);
        }
        _ => return Err(USAGE.into()),
    }
    Ok(())
}

fn open_context() -> Result<AppContext, Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if init_logging_from_config(&config)? {
        info!(
            "event=cli_start module=cli status=ok data_root={}",
            config.data_root.display()
        );
    }
    Ok(AppContext::new(config))
}
