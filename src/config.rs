use std::net::{SocketAddr, ToSocketAddrs};

/// Which framer the driver should run for every accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    Binary,
    Text,
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen_addr: SocketAddr,
    pub backend_addr: SocketAddr,
    pub protocol: ProtocolKind,
}

/// The default backend memcached listens on when none is configured
/// (hard-coded in the source this proxy is modeled on).
pub const DEFAULT_BACKEND_ADDR: &str = "127.0.0.1:11211";

impl ProxyConfig {
    pub fn new(address: &str, port: u16, protocol: ProtocolKind) -> std::io::Result<Self> {
        let listen_addr = resolve(address, port)?;
        let backend_addr = DEFAULT_BACKEND_ADDR
            .parse()
            .expect("default backend address is valid");
        Ok(Self {
            listen_addr,
            backend_addr,
            protocol,
        })
    }
}

fn resolve(address: &str, port: u16) -> std::io::Result<SocketAddr> {
    (address, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_localhost() {
        let config = ProxyConfig::new("localhost", 22322, ProtocolKind::Binary).unwrap();
        assert_eq!(config.listen_addr.port(), 22322);
        assert_eq!(config.protocol, ProtocolKind::Binary);
        assert_eq!(config.backend_addr.to_string(), "127.0.0.1:11211");
    }
}
