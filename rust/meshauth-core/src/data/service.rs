use serde::{Deserialize, Serialize};

/// Identity and pre-shared signature of a service participating in the mesh.
/// A service holds one of these for its own identity for the lifetime of its
/// process; a receiving node compares an inbound name and signature pair
/// against the copy held by its service registry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub name: String,
    pub signature: String,
    pub host: String,
    pub port: u16,
}

impl ServiceMetadata {
    /// A service may only stamp outbound requests once it has both a name and
    /// a signature to stamp them with
    pub fn is_configured(&self) -> bool {
        !self.name.trim().is_empty() && !self.signature.trim().is_empty()
    }
}

impl std::fmt::Debug for ServiceMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMetadata")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
