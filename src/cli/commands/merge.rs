use anyhow::Result;

use super::super::{args::MergeCommand, exit_status::ExitStatus, report::print_merge};
use super::helper::ProjectContext;

pub async fn merge(cmd: MergeCommand) -> Result<ExitStatus> {
    let ctx = ProjectContext::load(&cmd.common)?;
    let store = ctx.open_store();

    let merged = store.merge_from(&cmd.file).await?;
    print_merge(&cmd.file, merged);

    Ok(ExitStatus::Success)
}
