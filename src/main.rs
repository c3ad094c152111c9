use log::{error, info, LevelFilter};
use particle_field::{create_clap_command, driver, handle_clap_matches, FieldError, RunOptions};
use simplelog::{Config, WriteLogger};
use std::{fs::OpenOptions, process::ExitCode};

// The terminal driver owns stdout, so logs always go to a file.
fn init_logging(options: &RunOptions) -> Result<(), FieldError> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.log_file)?;
    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(level, Config::default(), log_file)?;
    Ok(())
}

fn main() -> ExitCode {
    let matches = create_clap_command().get_matches();
    let options = handle_clap_matches(&matches);

    if let Err(e) = init_logging(&options) {
        eprintln!(
            "particle_field: logging to {} disabled: {}",
            options.log_file.display(),
            e
        );
    }
    info!("starting {:?} target", options.target);

    match driver::run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("particle_field: {}", e);
            ExitCode::FAILURE
        }
    }
}
