use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;

/// The logical services reachable behind the mesh proxy. Each one is routed
/// under its own path fragment of the proxy endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalService {
    Admins,
    Assets,
    Business,
    Rates,
    Issuer,
    Properties,
    Users,
    Wallets,
}

impl LogicalService {
    pub const ALL: [LogicalService; 8] = [
        LogicalService::Admins,
        LogicalService::Assets,
        LogicalService::Business,
        LogicalService::Rates,
        LogicalService::Issuer,
        LogicalService::Properties,
        LogicalService::Users,
        LogicalService::Wallets,
    ];

    /// Produces the path fragment for the service
    pub fn to_fragment(&self) -> &'static str {
        match self {
            LogicalService::Admins => "admins",
            LogicalService::Assets => "assets",
            LogicalService::Business => "business",
            LogicalService::Rates => "rates",
            LogicalService::Issuer => "issuer",
            LogicalService::Properties => "system/properties",
            LogicalService::Users => "users",
            LogicalService::Wallets => "wallets",
        }
    }

    /// The base [Url] of the service behind `proxy_endpoint`
    pub fn base_url(&self, proxy_endpoint: &Url) -> Url {
        let mut url = proxy_endpoint.clone();
        let path = format!(
            "{}/{}",
            proxy_endpoint.path().trim_end_matches('/'),
            self.to_fragment()
        );
        url.set_path(&path);
        url.set_query(None);
        url
    }
}

impl Display for LogicalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.to_fragment())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use url::Url;

    use super::LogicalService;

    #[test]
    fn it_routes_each_service_under_the_proxy_endpoint() -> Result<()> {
        let proxy = Url::parse("http://proxy.internal:8080/api/")?;

        assert_eq!(
            LogicalService::Assets.base_url(&proxy).as_str(),
            "http://proxy.internal:8080/api/assets"
        );
        assert_eq!(
            LogicalService::Properties.base_url(&proxy).as_str(),
            "http://proxy.internal:8080/api/system/properties"
        );
        assert_eq!(
            LogicalService::Rates.base_url(&Url::parse("http://proxy")?).as_str(),
            "http://proxy/rates"
        );

        Ok(())
    }
}
