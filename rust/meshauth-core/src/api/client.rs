use std::sync::Arc;

use anyhow::Result;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::{
    api::{
        ClientConfiguration, LogicalService, ServiceAccess, SERVICE_NAME_HEADER,
        SERVICE_SIGNATURE_HEADER,
    },
    error::PeerError,
};

/// The body shape every mesh service answers with
#[derive(Debug, Deserialize)]
pub struct ServiceEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
}

/// A [ServiceClient] is an HTTP client for one logical service behind the
/// mesh proxy. Every request it builds is stamped with the calling service's
/// name and signature, so the receiving node can identify the caller as a
/// service peer.
///
/// A client can only be constructed from a [ClientConfiguration] that holds
/// both a proxy endpoint and complete service metadata; otherwise
/// construction fails with [PeerError::UnconfiguredClient] and no request is
/// ever sent.
#[derive(Clone)]
pub struct ServiceClient {
    /// The logical service this client talks to
    pub service: LogicalService,

    /// The base [Url] of that service behind the proxy
    pub url: Url,

    configuration: Arc<ClientConfiguration>,
    access: ServiceAccess,
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(
        configuration: &Arc<ClientConfiguration>,
        service: LogicalService,
    ) -> Result<Self, PeerError> {
        ServiceClient::with_client(configuration, service, reqwest::Client::new())
    }

    /// As [ServiceClient::new], sharing an existing connection pool
    pub fn with_client(
        configuration: &Arc<ClientConfiguration>,
        service: LogicalService,
        client: reqwest::Client,
    ) -> Result<Self, PeerError> {
        let access = configuration.service_access()?;
        let url = configuration.endpoint_for(service)?;

        debug!("Service {} targetting {} at {}", access.name, service, url);

        Ok(ServiceClient {
            service,
            url,
            configuration: configuration.clone(),
            access,
            client,
        })
    }

    pub fn access(&self) -> &ServiceAccess {
        &self.access
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    /// The [Url] of `path` relative to this service's base [Url]
    pub fn url_for(&self, path: &str) -> Url {
        let mut url = self.url.clone();
        let joined = format!(
            "{}/{}",
            self.url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(joined.trim_end_matches('/'));
        url
    }

    /// Attach this service's name and signature to `request`
    pub fn sign(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(SERVICE_NAME_HEADER, self.access.name.as_str())
            .header(SERVICE_SIGNATURE_HEADER, self.access.signature.as_str())
    }

    /// Start a signed request to `path` on this service
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.sign(self.client.request(method, self.url_for(path)))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// Fetch `path` and unwrap the [ServiceEnvelope]. Answers that are not a
    /// successful `200` are reported as `None`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.get(path).send().await?;

        if response.status() != StatusCode::OK {
            debug!(
                "{} answered {} for {}",
                self.service,
                response.status(),
                path
            );
            return Ok(None);
        }

        let envelope: ServiceEnvelope<T> = response.json().await?;

        Ok(match envelope {
            ServiceEnvelope {
                success: true,
                data,
            } => data,
            _ => None,
        })
    }
}
