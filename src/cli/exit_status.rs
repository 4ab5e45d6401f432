use std::process::ExitCode;

/// Exit status of an rpgtl command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Command completed.
    Success,
    /// Command completed, but some files could not be read or parsed, or the
    /// requested change was refused.
    Failure,
    /// Command failed (bad config, unreadable store, I/O error).
    Error,
}

impl ExitStatus {
    pub fn from_skipped(skipped: usize) -> Self {
        if skipped > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
