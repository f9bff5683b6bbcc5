//! Compression job lifecycle.
//!
//! Pause and cancel are requests: the engine stops on its own schedule and
//! confirms through events, so the requested phases only exist until then.

use std::fmt;

use shell_logging::{shell_debug, shell_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    Running,
    PauseRequested,
    Paused,
    CancelRequested,
}

impl JobPhase {
    pub fn is_active(self) -> bool {
        self != JobPhase::Idle
    }

    /// Phases waiting on engine confirmation.
    pub fn is_indeterminate(self) -> bool {
        matches!(self, JobPhase::PauseRequested | JobPhase::CancelRequested)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPhase::Idle => write!(f, "idle"),
            JobPhase::Running => write!(f, "compressing..."),
            JobPhase::PauseRequested => write!(f, "pausing..."),
            JobPhase::Paused => write!(f, "paused"),
            JobPhase::CancelRequested => write!(f, "finishing..."),
        }
    }
}

/// Aggregate counters reported when a job ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobSummary {
    pub total_images: u64,
    pub success: u64,
    pub skipped: u64,
    pub errors: u64,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed_ms: u64,
}

impl JobSummary {
    pub fn saved_bytes(&self) -> i64 {
        self.original_bytes as i64 - self.compressed_bytes as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    Start,
    Pause,
    Resume,
    Cancel,
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobCommand::Start => write!(f, "compress"),
            JobCommand::Pause => write!(f, "pause"),
            JobCommand::Resume => write!(f, "resume"),
            JobCommand::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStartRejection {
    AlreadyActive(JobPhase),
    EmptyList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    Applied,
    /// Value above the announced total; progress was capped.
    Clamped,
    /// Value lower than what was already seen.
    Regressed,
    /// Progress while no job is running.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    phase: JobPhase,
    progress: u64,
    total: u64,
    phase_before_cancel: JobPhase,
    last_summary: Option<JobSummary>,
}

impl Job {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn progress(&self) -> u64 {
        self.progress
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn last_summary(&self) -> Option<&JobSummary> {
        self.last_summary.as_ref()
    }

    /// Checked before any command leaves the client.
    pub fn start(&mut self, total: u64) -> Result<(), JobStartRejection> {
        if self.phase.is_active() {
            return Err(JobStartRejection::AlreadyActive(self.phase));
        }
        if total == 0 {
            return Err(JobStartRejection::EmptyList);
        }
        self.phase = JobPhase::Running;
        self.progress = 0;
        self.total = total;
        Ok(())
    }

    /// Returns true when a pause command must be sent.
    pub fn request_pause(&mut self) -> bool {
        match self.phase {
            JobPhase::Running => {
                self.phase = JobPhase::PauseRequested;
                true
            }
            other => {
                shell_debug!("Ignoring pause request in phase {:?}", other);
                false
            }
        }
    }

    pub fn confirm_paused(&mut self) -> bool {
        match self.phase {
            JobPhase::PauseRequested => {
                self.phase = JobPhase::Paused;
                true
            }
            other => {
                shell_debug!("Ignoring paused event in phase {:?}", other);
                false
            }
        }
    }

    /// Returns true when a resume command must be sent.
    pub fn resume(&mut self) -> bool {
        match self.phase {
            JobPhase::Paused | JobPhase::PauseRequested => {
                self.phase = JobPhase::Running;
                true
            }
            other => {
                shell_debug!("Ignoring resume request in phase {:?}", other);
                false
            }
        }
    }

    /// Returns true when a cancel command must be sent.
    pub fn request_cancel(&mut self) -> bool {
        match self.phase {
            JobPhase::Running | JobPhase::PauseRequested | JobPhase::Paused => {
                self.phase_before_cancel = self.phase;
                self.phase = JobPhase::CancelRequested;
                true
            }
            other => {
                shell_debug!("Ignoring cancel request in phase {:?}", other);
                false
            }
        }
    }

    pub fn record_progress(&mut self, count: u64) -> ProgressUpdate {
        if !self.phase.is_active() {
            return ProgressUpdate::Ignored;
        }
        if count < self.progress {
            shell_warn!(
                "Progress went backwards ({} -> {}), keeping {}",
                self.progress,
                count,
                self.progress
            );
            return ProgressUpdate::Regressed;
        }
        if count > self.total {
            shell_warn!(
                "Progress {} exceeds announced total {}",
                count,
                self.total
            );
            self.progress = self.total;
            return ProgressUpdate::Clamped;
        }
        self.progress = count;
        ProgressUpdate::Applied
    }

    /// Ends the job. Returns false when no job was active, so completion side
    /// effects run once per job.
    pub fn finish(&mut self, summary: JobSummary) -> bool {
        if !self.phase.is_active() {
            shell_debug!("Ignoring finished event while idle");
            return false;
        }
        self.phase = JobPhase::Idle;
        self.last_summary = Some(summary);
        true
    }

    /// Rolls back the optimistic transition of a command the engine refused.
    pub fn command_failed(&mut self, command: JobCommand) {
        self.phase = match (command, self.phase) {
            // A refused compress command means no job exists engine-side.
            (JobCommand::Start, _) => JobPhase::Idle,
            (JobCommand::Pause, JobPhase::PauseRequested) => JobPhase::Running,
            (JobCommand::Resume, JobPhase::Running) => JobPhase::Paused,
            (JobCommand::Cancel, JobPhase::CancelRequested) => self.phase_before_cancel,
            (_, phase) => phase,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_from_paused_rolls_back_to_paused() {
        let mut job = Job::new();
        job.start(3).unwrap();
        assert!(job.request_pause());
        assert!(job.confirm_paused());
        assert!(job.request_cancel());
        job.command_failed(JobCommand::Cancel);
        assert_eq!(job.phase(), JobPhase::Paused);
    }

    #[test]
    fn progress_outside_a_job_is_ignored() {
        let mut job = Job::new();
        assert_eq!(job.record_progress(4), ProgressUpdate::Ignored);
        assert_eq!(job.progress(), 0);
    }

    #[test]
    fn summary_reports_saved_bytes() {
        let summary = JobSummary {
            original_bytes: 1_000,
            compressed_bytes: 400,
            ..JobSummary::default()
        };
        assert_eq!(summary.saved_bytes(), 600);
    }
}
