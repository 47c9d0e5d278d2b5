use crate::auth::Credential;
use crate::error::RpcError;
use crate::rpc::envelope::{RpcRequest, RpcResponse, SyncStatus};

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;
use std::time::Duration;

use log::info;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

const SYNC_STATUS_REQUEST_ID: u64 = 1;
const JSON_CONTENT_TYPE: &str = "application/json";

/// JSON-RPC over HTTP POST, used only for the pre-flight sync check.
#[derive(Clone)]
pub struct HttpRpcClient {
    endpoint: Url,
    bearer: String,
    client: Client,
}

impl HttpRpcClient {
    pub fn new(
        endpoint: Url,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            bearer: credential.bearer(),
            client,
        })
    }

    pub async fn call(&self, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        let body = request.to_json()?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, &self.bearer)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status_code: HttpStatusCode(status.as_u16()),
                message: response.text().await.unwrap_or_default(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let bytes = response.bytes().await?;
        RpcResponse::from_slice(&bytes)?.into_result()
    }

    /// `eth_syncing` with no params.
    pub async fn check_sync_status(&self) -> Result<SyncStatus, RpcError> {
        let request = RpcRequest::syncing(SYNC_STATUS_REQUEST_ID);
        info!("Sending sync status request to {}", self.endpoint);

        let response = self.call(&request).await?;
        let status = SyncStatus::from_response(&response);
        info!("Received sync status: {status}");

        Ok(status)
    }
}
