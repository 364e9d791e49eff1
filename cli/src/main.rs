mod commands;
mod terminal;

use std::process::ExitCode;

use commands::CommandLine;
use guestmig_common::error;
use terminal::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    match commands::run(commands).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
