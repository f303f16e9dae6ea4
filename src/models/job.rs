//! Processing jobs submitted to the backend queue.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Priority used when the caller does not choose one
pub const DEFAULT_JOB_PRIORITY: i64 = 100;

/// Pipeline stage a job runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "L0_harvest")]
    Harvest,
    #[serde(rename = "L1_cluster")]
    Cluster,
    #[serde(rename = "L2_extract")]
    Extract,
    #[serde(rename = "L3_synthesize")]
    Synthesize,
    #[serde(rename = "L4_expand")]
    Expand,
    #[serde(untagged)]
    Other(String),
}

impl JobType {
    /// Wire name (`L0_harvest`, ...)
    pub fn as_str(&self) -> &str {
        match self {
            JobType::Harvest => "L0_harvest",
            JobType::Cluster => "L1_cluster",
            JobType::Extract => "L2_extract",
            JobType::Synthesize => "L3_synthesize",
            JobType::Expand => "L4_expand",
            JobType::Other(s) => s,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = std::convert::Infallible;

    /// Accepts the wire name or the bare stage name (`harvest`, `l2`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "l0_harvest" | "l0" | "harvest" => JobType::Harvest,
            "l1_cluster" | "l1" | "cluster" => JobType::Cluster,
            "l2_extract" | "l2" | "extract" => JobType::Extract,
            "l3_synthesize" | "l3" | "synthesize" => JobType::Synthesize,
            "l4_expand" | "l4" | "expand" => JobType::Expand,
            _ => JobType::Other(s.to_string()),
        })
    }
}

/// Queue status used to filter job listings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "complete" | "completed" => JobStatus::Complete,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Other(s.to_string()),
        })
    }
}

/// Body of `POST /jobs/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub job_type: JobType,
    pub params: Value,
    pub priority: i64,
}

impl JobSubmission {
    pub fn new(job_type: JobType, params: Value) -> Self {
        Self {
            job_type,
            params,
            priority: DEFAULT_JOB_PRIORITY,
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_submission_wire_format() {
        let submission = JobSubmission::new(JobType::Harvest, json!({"query": "daylight"}));
        let value = serde_json::to_value(&submission).unwrap();

        assert_eq!(
            value,
            json!({
                "job_type": "L0_harvest",
                "params": {"query": "daylight"},
                "priority": 100
            })
        );
    }

    #[test]
    fn test_unknown_job_type_passes_through() {
        let job_type: JobType = "L9_custom".parse().unwrap();
        assert_eq!(job_type, JobType::Other("L9_custom".to_string()));
        assert_eq!(
            serde_json::to_value(&job_type).unwrap(),
            json!("L9_custom")
        );
    }

    #[test]
    fn test_job_type_aliases() {
        assert_eq!("harvest".parse::<JobType>().unwrap(), JobType::Harvest);
        assert_eq!("L3".parse::<JobType>().unwrap(), JobType::Synthesize);
        assert_eq!(JobType::Expand.to_string(), "L4_expand");
    }

    #[test]
    fn test_job_status_parse() {
        assert_eq!("Pending".parse::<JobStatus>().unwrap(), JobStatus::Pending);
        assert_eq!("completed".parse::<JobStatus>().unwrap(), JobStatus::Complete);
        assert_eq!(JobStatus::Failed.as_str(), "failed");
    }
}
