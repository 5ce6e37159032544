//! Connection driver and accept loop.
//!
//! For each accepted client, a dedicated backend connection is dialed
//! (§5: per-client pooling, to avoid the request/response interleaving
//! hazard a single shared backend connection would have) and a task loops
//! `relay_cycle` until the client disconnects or a cycle fails. One
//! connection's failure never affects another, or the accept loop itself.
use crate::config::{ProtocolKind, ProxyConfig};
use crate::framer::{binary, text};
use crate::proxy::ProxyRepository;
use async_net::{TcpListener, TcpStream};
use futures_lite::StreamExt;
use tracing::{info, warn};

/// Bind the listener and serve connections until the process is stopped.
pub async fn run(config: ProxyConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, protocol = ?config.protocol, "listening");

    let repository = ProxyRepository::new(config.backend_addr);
    let mut incoming = listener.incoming();

    while let Some(client) = incoming.next().await {
        let client = match client {
            Ok(client) => client,
            Err(err) => {
                warn!(%err, "failed to accept connection");
                continue;
            }
        };
        let backend_addr = repository.pick_backend("");
        let protocol = config.protocol;
        smol::spawn(async move {
            if let Err(err) = serve_client(client, backend_addr, protocol).await {
                warn!(%err, "connection cycle aborted");
            }
        })
        .detach();
    }

    Ok(())
}

async fn serve_client(
    client: TcpStream,
    backend_addr: std::net::SocketAddr,
    protocol: ProtocolKind,
) -> std::io::Result<()> {
    let peer = client.peer_addr().ok();
    info!(?peer, "client connected");

    let mut client = client;
    let mut backend = TcpStream::connect(backend_addr).await?;

    loop {
        let result = match protocol {
            ProtocolKind::Binary => binary::relay_cycle(&mut client, &mut backend).await,
            ProtocolKind::Text => text::relay_cycle(&mut client, &mut backend).await,
        };
        match result {
            Ok(()) => continue,
            Err(crate::error::ProxyError::Io(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                info!(?peer, "client disconnected");
                return Ok(());
            }
            Err(err) => {
                warn!(?peer, %err, "closing connection after framer error");
                return Ok(());
            }
        }
    }
}
