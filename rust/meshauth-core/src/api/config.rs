use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{api::LogicalService, data::ServiceMetadata, error::PeerError};

/// The identity a client stamps on every outbound request
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccess {
    pub name: String,
    pub signature: String,
}

impl std::fmt::Debug for ServiceAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccess")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Process-wide configuration shared by every [crate::api::ServiceClient].
///
/// Build one at process start (in code, or from the `[client]` table of a
/// TOML file) and hand it to clients behind an `Arc`; it is never mutated
/// afterwards. Either half may be missing, in which case clients refuse to be
/// built instead of sending unsigned requests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientConfiguration {
    /// Base endpoint of the proxy that routes to every logical service
    #[serde(default)]
    pub proxy_endpoint: Option<Url>,
    /// The identity of this process within the mesh
    #[serde(default)]
    pub metadata: Option<ServiceMetadata>,
}

#[derive(Deserialize)]
struct ClientConfigurationFile {
    #[serde(default)]
    client: ClientConfiguration,
}

impl ClientConfiguration {
    pub fn new(proxy_endpoint: Url, metadata: ServiceMetadata) -> Self {
        ClientConfiguration {
            proxy_endpoint: Some(proxy_endpoint),
            metadata: Some(metadata),
        }
    }

    /// Read the `[client]` table of a TOML document, e.g.:
    ///
    /// ```toml
    /// [client]
    /// proxy_endpoint = "http://proxy.internal:8080"
    ///
    /// [client.metadata]
    /// name = "tickets"
    /// signature = "..."
    /// host = "tickets.internal"
    /// port = 7100
    /// ```
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ClientConfigurationFile = toml::from_str(contents)?;
        debug!(
            "Loaded client configuration (endpoint configured: {}, metadata configured: {})",
            file.client.proxy_endpoint.is_some(),
            file.client.metadata.is_some()
        );
        Ok(file.client)
    }

    /// The name and signature to stamp on outbound requests
    pub fn service_access(&self) -> Result<ServiceAccess, PeerError> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or(PeerError::UnconfiguredClient("No service metadata configured"))?;

        if !metadata.is_configured() {
            return Err(PeerError::UnconfiguredClient(
                "Service metadata is missing a name or signature",
            ));
        }

        Ok(ServiceAccess {
            name: metadata.name.clone(),
            signature: metadata.signature.clone(),
        })
    }

    /// The base [Url] of `service` behind the configured proxy
    pub fn endpoint_for(&self, service: LogicalService) -> Result<Url, PeerError> {
        self.proxy_endpoint
            .as_ref()
            .map(|proxy_endpoint| service.base_url(proxy_endpoint))
            .ok_or(PeerError::UnconfiguredClient("No proxy endpoint configured"))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{api::LogicalService, error::PeerError};

    use super::ClientConfiguration;

    #[test]
    fn it_reads_the_client_table_from_toml() -> Result<()> {
        let configuration = ClientConfiguration::from_toml(
            r#"
            [client]
            proxy_endpoint = "http://proxy.internal:8080"

            [client.metadata]
            name = "tickets"
            signature = "tickets-signature"
            host = "tickets.internal"
            port = 7100
            "#,
        )?;

        let access = configuration.service_access()?;
        assert_eq!(access.name, "tickets");
        assert_eq!(access.signature, "tickets-signature");
        assert_eq!(
            configuration.endpoint_for(LogicalService::Wallets)?.as_str(),
            "http://proxy.internal:8080/wallets"
        );

        Ok(())
    }

    #[test]
    fn it_fails_closed_when_metadata_is_missing_or_empty() -> Result<()> {
        let missing = ClientConfiguration::from_toml("")?;

        assert!(matches!(
            missing.service_access(),
            Err(PeerError::UnconfiguredClient(_))
        ));
        assert!(matches!(
            missing.endpoint_for(LogicalService::Users),
            Err(PeerError::UnconfiguredClient(_))
        ));

        let empty_signature = ClientConfiguration::from_toml(
            r#"
            [client.metadata]
            name = "tickets"
            signature = ""
            host = "tickets.internal"
            port = 7100
            "#,
        )?;

        assert!(matches!(
            empty_signature.service_access(),
            Err(PeerError::UnconfiguredClient(_))
        ));

        Ok(())
    }
}
