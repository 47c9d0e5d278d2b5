//! The full subscriber pipeline: token, connect, optional sync check, subscribe.
//!
//! Each phase runs once, in order, on the caller's task. The connection is
//! borrowed by the subscribe handshake and then moved into the returned
//! [`NotificationStream`].

use crate::auth::{Credential, issue_token};
use crate::config::{SECRET_KEY_VAR, SubscriberConfig};
use crate::connection::{WsConnection, connect, endpoint_url, http_endpoint_url};
use crate::error::{ConfigError, CoreError};
use crate::notifications::NotificationStream;
use crate::rpc::{HttpRpcClient, Subscription, SyncStatus, subscribe};

use log::info;

pub struct Subscriber {
    config: SubscriberConfig,
}

impl Subscriber {
    pub fn new(config: SubscriberConfig) -> Self {
        Self { config }
    }

    pub fn issue_credential(&self) -> Result<Credential, CoreError> {
        if self.config.secret.is_empty() {
            return Err(ConfigError::missing(SECRET_KEY_VAR).into());
        }

        let credential = issue_token(self.config.secret.expose())?;
        info!("Issued {credential}");
        Ok(credential)
    }

    /// Open the authenticated WebSocket to the configured node.
    pub async fn connect(&self, credential: &Credential) -> Result<WsConnection, CoreError> {
        let endpoint = endpoint_url(&self.config.host, self.config.ws_port)?;
        Ok(connect(&endpoint, credential, self.config.request_timeout).await?)
    }

    /// `eth_syncing` over HTTP, when an RPC port is configured.
    pub async fn check_sync_status(
        &self,
        credential: &Credential,
    ) -> Result<Option<SyncStatus>, CoreError> {
        let Some(rpc_port) = self.config.rpc_port else {
            return Ok(None);
        };

        let endpoint = http_endpoint_url(&self.config.host, rpc_port)?;
        let client = HttpRpcClient::new(endpoint, credential, self.config.request_timeout)?;
        Ok(Some(client.check_sync_status().await?))
    }

    /// Complete the subscribe handshake for the configured topic.
    pub async fn subscribe(&self, conn: &mut WsConnection) -> Result<Subscription, CoreError> {
        let subscription =
            subscribe(conn, &self.config.topic, self.config.request_timeout).await?;
        info!("Subscribed to '{}' as {subscription}", self.config.topic);

        Ok(subscription)
    }

    /// Run every phase up to the notification loop and hand back the stream.
    ///
    /// # Errors
    ///
    /// Any phase failure is fatal and returned as [`CoreError`].
    pub async fn listen(
        &self,
    ) -> Result<(Subscription, NotificationStream<WsConnection>), CoreError> {
        let credential = self.issue_credential()?;
        let mut conn = self.connect(&credential).await?;
        self.check_sync_status(&credential).await?;

        let subscription = self.subscribe(&mut conn).await?;
        info!("Listening for '{}' notifications", self.config.topic);

        let stream = NotificationStream::with_subscription(conn, subscription.clone());
        Ok((subscription, stream))
    }
}
