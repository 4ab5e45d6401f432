use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{clean::clean, extract::extract, init::init, merge::merge},
    exit_status::ExitStatus,
};

/// Dispatch to the command handler. Prints help when no command was given.
pub async fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(Arguments {
        command: Some(command),
    }) = args.with_command_or_help()
    else {
        return Ok(ExitStatus::Success);
    };

    match command {
        Command::Extract(cmd) => extract(cmd),
        Command::Clean(cmd) => clean(cmd).await,
        Command::Merge(cmd) => merge(cmd).await,
        Command::Init => init(),
    }
}
