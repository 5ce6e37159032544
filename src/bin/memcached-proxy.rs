use clap::Parser;
use memcached_proxy::config::{ProtocolKind, ProxyConfig};
use memcached_proxy::driver;

/// Transparent TCP proxy between memcached clients and one memcached backend.
#[derive(Parser, Debug)]
#[clap(name = "memcached-proxy")]
struct Cli {
    /// Listen port
    #[clap(short, long, default_value = "22322")]
    port: u16,

    /// Bind address
    #[clap(short, long, default_value = "localhost")]
    address: String,

    /// Speak the text protocol instead of the binary protocol
    #[clap(short, long)]
    text_protocol: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let protocol = if cli.text_protocol {
        ProtocolKind::Text
    } else {
        ProtocolKind::Binary
    };
    let config = ProxyConfig::new(&cli.address, cli.port, protocol)?;

    smol::block_on(driver::run(config))?;
    Ok(())
}
