//! Builder helpers for the job lifecycle events pushed by in-process producers.

use chrono::Utc;
use serde_json::json;

use pulse_core::result::AppResult;
use pulse_core::types::JobId;

use super::envelope::Envelope;

/// Event type for incremental job progress.
pub const JOB_PROGRESS: &str = "job_progress";
/// Event type for a finished job.
pub const JOB_COMPLETED: &str = "job_completed";
/// Event type for a failed job.
pub const JOB_FAILED: &str = "job_failed";

/// Build a job progress event; `percent` is clamped to 100.
pub fn job_progress(job_id: JobId, percent: u8, stage: &str) -> AppResult<Envelope> {
    Envelope::new(
        JOB_PROGRESS,
        json!({
            "job_id": job_id,
            "percent": percent.min(100),
            "stage": stage,
            "timestamp": Utc::now(),
        }),
    )
}

/// Build a job completed event
pub fn job_completed(job_id: JobId, result: serde_json::Value) -> AppResult<Envelope> {
    Envelope::new(
        JOB_COMPLETED,
        json!({
            "job_id": job_id,
            "result": result,
            "timestamp": Utc::now(),
        }),
    )
}

/// Build a job failed event
pub fn job_failed(job_id: JobId, error: &str) -> AppResult<Envelope> {
    Envelope::new(
        JOB_FAILED,
        json!({
            "job_id": job_id,
            "error": error,
            "timestamp": Utc::now(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps_percent() {
        let job = JobId::new();
        let envelope = job_progress(job, 250, "rendering").unwrap();

        assert_eq!(envelope.kind, JOB_PROGRESS);
        assert_eq!(envelope.payload["percent"], 100);
        assert_eq!(envelope.payload["stage"], "rendering");
        assert_eq!(envelope.payload["job_id"], job.to_string());
    }

    #[test]
    fn test_failed_carries_error() {
        let envelope = job_failed(JobId::new(), "disk full").unwrap();
        assert_eq!(envelope.kind, JOB_FAILED);
        assert_eq!(envelope.payload["error"], "disk full");
    }
}
