//! Thin REST client over the coordinator's HTTP surface. No retries, no
//! connection pooling beyond what `reqwest` does by default — a wrapper,
//! not a second implementation of the dispatch fabric.

use rcd_wire::api::{
    AgentView, BulkSubmitRequest, BulkSubmitResult, CleanupRequest, CleanupResponse,
    CommandFilter, CommandView, HealthSnapshot, QueueSummary, StatisticsResponse, SubmitRequest,
    SubmitResponse,
};

pub struct CoordinatorClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api { status: reqwest::StatusCode, message: String },
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), http: reqwest::Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<T>().await?)
        } else {
            let message = resp
                .json::<rcd_wire::api::ErrorBody>()
                .await
                .map(|b| b.reason.unwrap_or(b.error))
                .unwrap_or_else(|_| status.to_string());
            Err(ClientError::Api { status, message })
        }
    }

    pub async fn health(&self) -> Result<HealthSnapshot, ClientError> {
        let resp = self.http.get(self.url("/")).send().await?;
        Self::check(resp).await
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentView>, ClientError> {
        let resp = self.http.get(self.url("/agents")).send().await?;
        Self::check(resp).await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<AgentView, ClientError> {
        let resp = self.http.get(self.url(&format!("/agents/{agent_id}"))).send().await?;
        Self::check(resp).await
    }

    pub async fn agent_queue(&self, agent_id: &str) -> Result<QueueSummary, ClientError> {
        let resp = self.http.get(self.url(&format!("/agents/{agent_id}/queue"))).send().await?;
        Self::check(resp).await
    }

    pub async fn submit(
        &self,
        agent_id: &str,
        req: &SubmitRequest,
    ) -> Result<SubmitResponse, ClientError> {
        let resp = self.http.post(self.url(&format!("/agents/{agent_id}/commands"))).json(req).send().await?;
        Self::check(resp).await
    }

    pub async fn bulk_submit(
        &self,
        req: &BulkSubmitRequest,
    ) -> Result<Vec<BulkSubmitResult>, ClientError> {
        let resp = self.http.post(self.url("/commands/bulk")).json(req).send().await?;
        Self::check(resp).await
    }

    pub async fn list_commands(&self, filter: &CommandFilter) -> Result<Vec<CommandView>, ClientError> {
        let resp = self.http.get(self.url("/commands")).query(filter).send().await?;
        Self::check(resp).await
    }

    pub async fn agent_history(
        &self,
        agent_id: &str,
        filter: &CommandFilter,
    ) -> Result<Vec<CommandView>, ClientError> {
        let resp =
            self.http.get(self.url(&format!("/agents/{agent_id}/commands"))).query(filter).send().await?;
        Self::check(resp).await
    }

    pub async fn get_command(&self, command_id: &str) -> Result<CommandView, ClientError> {
        let resp = self.http.get(self.url(&format!("/commands/{command_id}"))).send().await?;
        Self::check(resp).await
    }

    pub async fn cancel_command(&self, command_id: &str) -> Result<(), ClientError> {
        let resp = self.http.delete(self.url(&format!("/commands/{command_id}"))).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = resp
                .json::<rcd_wire::api::ErrorBody>()
                .await
                .map(|b| b.reason.unwrap_or(b.error))
                .unwrap_or_else(|_| status.to_string());
            Err(ClientError::Api { status, message })
        }
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse, ClientError> {
        let resp = self.http.get(self.url("/statistics")).send().await?;
        Self::check(resp).await
    }

    pub async fn cleanup(&self, older_than_days: u32) -> Result<CleanupResponse, ClientError> {
        let resp =
            self.http.post(self.url("/history/cleanup")).json(&CleanupRequest { older_than_days }).send().await?;
        Self::check(resp).await
    }

    pub async fn export(&self, format: &str) -> Result<String, ClientError> {
        let resp = self.http.get(self.url(&format!("/history/export?format={format}"))).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            Err(ClientError::Api { status, message: status.to_string() })
        }
    }
}
