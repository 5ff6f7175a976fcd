//! HTTP provider adapter.
//!
//! Cloud-SDK wrappers proper are out of scope for the core; this adapter
//! implements both provider traits against a JSON REST gateway that fronts
//! the actual cloud APIs. Account and region ride along as headers on every
//! request. Timeouts and retries are the gateway's concern — a failed call
//! here simply aborts the current command.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    CloneClusterParams, CreateInstanceParams, ProviderError, ProvisioningApi, RecordSet,
    ResourceApi, RestoreClusterParams,
};
use crate::model::{ManagedResource, Tag};

/// A [`ResourceApi`] + [`ProvisioningApi`] implementation speaking JSON
/// over HTTP to a provider gateway.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    base_url: String,
    account: String,
    region: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: String,
}

#[derive(Debug, Deserialize)]
struct ClusterResponse {
    cluster_id: String,
}

#[derive(Debug, Deserialize)]
struct ClusterStatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
struct AddRoleRequest<'a> {
    role_arn: &'a str,
}

impl HttpProvider {
    /// Creates a new provider client for the given gateway and scope.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        account: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account: account.into(),
            region: region.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("x-account", &self.account)
            .header("x-region", &self.region)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = checked(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::new(format!("invalid gateway response: {e}")))
    }

    async fn send_optional_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Option<T>, ProviderError> {
        let response = builder.send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = require_success(response).await?;
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ProviderError::new(format!("invalid gateway response: {e}")))
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ProviderError> {
        checked(builder).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::new(format!("gateway request failed: {err}"))
}

async fn require_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::new(format!(
        "gateway returned {status}: {body}"
    )))
}

async fn checked(builder: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
    let response = builder.send().await.map_err(transport_error)?;
    require_success(response).await
}

#[async_trait]
impl ResourceApi for HttpProvider {
    async fn list_resources(&self) -> Result<Vec<ManagedResource>, ProviderError> {
        self.send_json(self.request(Method::GET, "/v1/resources"))
            .await
    }

    async fn list_tags(&self, resource_id: &str) -> Result<Vec<Tag>, ProviderError> {
        self.send_json(self.request(Method::GET, &format!("/v1/resources/{resource_id}/tags")))
            .await
    }

    async fn add_or_update_tag(&self, resource_id: &str, tag: Tag) -> Result<(), ProviderError> {
        self.send_unit(
            self.request(Method::PUT, &format!("/v1/resources/{resource_id}/tags"))
                .json(&tag),
        )
        .await
    }

    async fn delete_resource(&self, resource_id: &str) -> Result<(), ProviderError> {
        self.send_unit(self.request(Method::DELETE, &format!("/v1/resources/{resource_id}")))
            .await
    }

    async fn describe_resource(&self, resource_id: &str) -> Result<ManagedResource, ProviderError> {
        self.send_json(self.request(Method::GET, &format!("/v1/resources/{resource_id}")))
            .await
    }
}

#[async_trait]
impl ProvisioningApi for HttpProvider {
    async fn latest_snapshot(&self, cluster_id: &str) -> Result<Option<String>, ProviderError> {
        let found: Option<SnapshotResponse> = self
            .send_optional_json(self.request(
                Method::GET,
                &format!("/v1/clusters/{cluster_id}/snapshots/latest"),
            ))
            .await?;
        Ok(found.map(|s| s.snapshot_id))
    }

    async fn restore_cluster(
        &self,
        params: &RestoreClusterParams,
    ) -> Result<String, ProviderError> {
        let created: ClusterResponse = self
            .send_json(
                self.request(Method::POST, "/v1/clusters/restore")
                    .json(params),
            )
            .await?;
        Ok(created.cluster_id)
    }

    async fn clone_cluster(&self, params: &CloneClusterParams) -> Result<String, ProviderError> {
        let created: ClusterResponse = self
            .send_json(
                self.request(Method::POST, "/v1/clusters/clone")
                    .json(params),
            )
            .await?;
        Ok(created.cluster_id)
    }

    async fn create_instance(&self, params: &CreateInstanceParams) -> Result<(), ProviderError> {
        self.send_unit(self.request(Method::POST, "/v1/instances").json(params))
            .await
    }

    async fn cluster_status(&self, cluster_id: &str) -> Result<String, ProviderError> {
        let status: ClusterStatusResponse = self
            .send_json(self.request(Method::GET, &format!("/v1/clusters/{cluster_id}")))
            .await?;
        Ok(status.status)
    }

    async fn add_cluster_role(
        &self,
        cluster_id: &str,
        role_arn: &str,
    ) -> Result<(), ProviderError> {
        self.send_unit(
            self.request(Method::POST, &format!("/v1/clusters/{cluster_id}/roles"))
                .json(&AddRoleRequest { role_arn }),
        )
        .await
    }

    async fn find_record_set(
        &self,
        zone_id: &str,
        name: &str,
    ) -> Result<Option<RecordSet>, ProviderError> {
        self.send_optional_json(
            self.request(Method::GET, &format!("/v1/zones/{zone_id}/records"))
                .query(&[("name", name)]),
        )
        .await
    }

    async fn upsert_record_set(
        &self,
        zone_id: &str,
        record: &RecordSet,
    ) -> Result<(), ProviderError> {
        self.send_unit(
            self.request(Method::PUT, &format!("/v1/zones/{zone_id}/records"))
                .json(record),
        )
        .await
    }

    async fn delete_instance(&self, instance_id: &str) -> Result<(), ProviderError> {
        self.send_unit(self.request(Method::DELETE, &format!("/v1/instances/{instance_id}")))
            .await
    }

    async fn delete_cluster(&self, cluster_id: &str) -> Result<(), ProviderError> {
        self.send_unit(self.request(Method::DELETE, &format!("/v1/clusters/{cluster_id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let provider = HttpProvider::new("http://gateway:8080/", "123", "us-east-1");
        assert_eq!(provider.base_url, "http://gateway:8080");
    }
}
