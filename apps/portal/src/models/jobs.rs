use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional overrides for a match query; the backend otherwise infers role
/// and location from the latest CV.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobMatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_location: Option<String>,
    /// LinkedIn `li_at` session cookie; improves results for some accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

/// One matched posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: String,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub url: String,
    #[serde(default)]
    pub via: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Match results plus the query metadata that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatchResponse {
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub jobs: Vec<JobMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_only_set_overrides() {
        let empty = serde_json::to_value(JobMatchRequest::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));

        let request = JobMatchRequest {
            override_role: Some("Data Engineer".to_owned()),
            override_location: None,
            cookie: None,
        };
        assert_eq!(
            serde_json::to_value(request).unwrap(),
            serde_json::json!({ "override_role": "Data Engineer" })
        );
    }

    #[test]
    fn test_response_tolerates_blank_company() {
        let response: JobMatchResponse = serde_json::from_value(serde_json::json!({
            "role": "Backend Engineer",
            "location": "Remote",
            "created_at": "2025-06-01T09:30:00Z",
            "jobs": [
                { "job_id": "a1", "title": "Engineer", "company": "",
                  "location": "Remote", "url": "https://jobs/a1",
                  "via": "linkedin", "created_at": "2025-06-01T09:30:00Z" }
            ]
        }))
        .unwrap();
        assert_eq!(response.jobs[0].company.as_deref(), Some(""));
        assert!(response.created_at.is_some());
    }

    #[test]
    fn test_response_without_jobs_field() {
        let response: JobMatchResponse = serde_json::from_value(serde_json::json!({
            "role": "Backend Engineer",
            "location": "Remote",
        }))
        .unwrap();
        assert!(response.jobs.is_empty());
        assert!(response.created_at.is_none());
    }
}
