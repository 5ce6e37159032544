//! Key -> backend routing seam.
//!
//! No sharding or failover logic exists yet; this is a placeholder the
//! framer or driver can call in the future to pick a backend per key. Today
//! it must not alter byte flow: it always resolves to the single configured
//! backend address.
use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ProxyRepository {
    backend_addr: SocketAddr,
}

impl ProxyRepository {
    pub fn new(backend_addr: SocketAddr) -> Self {
        Self { backend_addr }
    }

    pub fn proxy_for_key(&self, key: &str) -> Proxy {
        Proxy { key: key.to_string() }
    }

    /// Resolve the backend to dial for a given key. Single-endpoint today;
    /// the seam for future sharding/failover.
    pub fn pick_backend(&self, _key: &str) -> SocketAddr {
        self.backend_addr
    }
}
