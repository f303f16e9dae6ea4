//! Endpoint calls. Each one fixes a path, method and body and defers to the pipeline.

use serde_json::Value;

use super::{ApiError, ArticleEaterClient, RequestOptions};
use crate::models::{ApiKeyRequest, JobStatus, JobSubmission, JobType, Provider};

impl ArticleEaterClient {
    // ========== HEALTH ==========

    pub async fn health_check(&self) -> Result<Value, ApiError> {
        self.request("/healthz", RequestOptions::get()).await
    }

    // ========== JOBS ==========

    /// Queue a job; `priority` defaults to 100 on the backend's scale
    pub async fn submit_job(
        &self,
        job_type: JobType,
        params: Value,
        priority: Option<i64>,
    ) -> Result<Value, ApiError> {
        let mut submission = JobSubmission::new(job_type, params);
        if let Some(priority) = priority {
            submission = submission.priority(priority);
        }
        let body = serde_json::to_value(&submission)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        self.request("/jobs/", RequestOptions::post(body)).await
    }

    pub async fn get_job_status(&self, job_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/jobs/{}", encode(job_id)), RequestOptions::get())
            .await
    }

    /// List jobs, optionally filtered by status (default limit 100)
    pub async fn list_jobs(
        &self,
        status: Option<&JobStatus>,
        limit: Option<usize>,
    ) -> Result<Value, ApiError> {
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(format!("status={}", encode(status.as_str())));
        }
        params.push(format!("limit={}", limit.unwrap_or(100)));

        self.request(&format!("/jobs/?{}", params.join("&")), RequestOptions::get())
            .await
    }

    // ========== LIBRARY ==========

    /// Page through the article library (defaults: 50 per page from offset 0)
    pub async fn list_articles(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Value, ApiError> {
        let endpoint = format!(
            "/library/?limit={}&offset={}",
            limit.unwrap_or(50),
            offset.unwrap_or(0)
        );
        self.request(&endpoint, RequestOptions::get()).await
    }

    pub async fn get_article(&self, article_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/library/{}", encode(article_id)), RequestOptions::get())
            .await
    }

    pub async fn search_articles(&self, query: &str) -> Result<Value, ApiError> {
        self.request(&format!("/library/search?q={}", encode(query)), RequestOptions::get())
            .await
    }

    // ========== FINDINGS ==========

    pub async fn get_findings(&self, article_id: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/findings?article_id={}", encode(article_id)),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_all_findings(&self, limit: Option<usize>) -> Result<Value, ApiError> {
        self.request(
            &format!("/findings?limit={}", limit.unwrap_or(100)),
            RequestOptions::get(),
        )
        .await
    }

    // ========== RULES ==========

    pub async fn list_rules(&self, limit: Option<usize>) -> Result<Value, ApiError> {
        self.request(
            &format!("/rules?limit={}", limit.unwrap_or(50)),
            RequestOptions::get(),
        )
        .await
    }

    pub async fn get_rule(&self, rule_id: &str) -> Result<Value, ApiError> {
        self.request(&format!("/rules/{}", encode(rule_id)), RequestOptions::get())
            .await
    }

    pub async fn get_rule_evidence(&self, rule_id: &str) -> Result<Value, ApiError> {
        self.request(
            &format!("/rules/{}/evidence", encode(rule_id)),
            RequestOptions::get(),
        )
        .await
    }

    // ========== USAGE ==========

    pub async fn get_usage(&self) -> Result<Value, ApiError> {
        self.request("/usage/me", RequestOptions::get()).await
    }

    pub async fn get_usage_admin(&self) -> Result<Value, ApiError> {
        self.request("/usage/admin", RequestOptions::get()).await
    }

    // ========== PROFILE ==========

    pub async fn get_profile(&self) -> Result<Value, ApiError> {
        self.request("/profile", RequestOptions::get()).await
    }

    pub async fn update_profile(&self, data: Value) -> Result<Value, ApiError> {
        self.request("/profile", RequestOptions::patch(data)).await
    }

    // ========== API KEYS ==========

    pub async fn list_api_keys(&self) -> Result<Value, ApiError> {
        self.request("/profile/api-keys", RequestOptions::get()).await
    }

    pub async fn add_api_key(&self, provider: Provider, key: &str) -> Result<Value, ApiError> {
        if !provider.is_known() {
            tracing::warn!("Unknown provider: {}", provider);
        }
        let body = serde_json::to_value(ApiKeyRequest {
            provider,
            key: key.to_string(),
        })
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        self.request("/profile/api-keys", RequestOptions::post(body))
            .await
    }

    pub async fn delete_api_key(&self, provider: &Provider) -> Result<Value, ApiError> {
        self.request(
            &format!("/profile/api-keys/{}", encode(provider.as_str())),
            RequestOptions::delete(),
        )
        .await
    }
}

fn encode(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}
