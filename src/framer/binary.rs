//! Binary protocol framer.
//!
//! A request unit is either a single non-quiet command, or a burst of
//! "quiet" commands terminated by an explicit [`NO_OP`](crate::binary::NO_OP).
//! The loop always stops on the first non-quiet opcode observed, which is
//! correct in both directions.
use crate::binary::{self, HEADER_LEN};
use crate::error::Result;
use futures_lite::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one request unit from `stream`: repeatedly read a 24-byte header
/// plus its declared body, stopping at the first header whose opcode is
/// not in the quiet set.
async fn read_request_unit<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>> {
    read_unit(stream, binary::decode_request).await
}

/// Read one response unit from `stream`, identical framing to a request
/// unit modulo the header's `vbucket_id`/`status` semantic.
async fn read_response_unit<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>> {
    read_unit(stream, binary::decode_response).await
}

async fn read_unit<R: AsyncRead + Unpin>(
    stream: &mut R,
    decode: fn(&[u8]) -> Result<binary::Header>,
) -> Result<Vec<u8>> {
    let mut unit = Vec::new();
    loop {
        let mut header_bytes = [0u8; HEADER_LEN];
        stream.read_exact(&mut header_bytes).await?;
        let header = decode(&header_bytes)?;
        unit.extend_from_slice(&header_bytes);

        if header.total_body_length > 0 {
            let mut body = vec![0u8; header.total_body_length as usize];
            stream.read_exact(&mut body).await?;
            unit.extend_from_slice(&body);
        }

        if !binary::is_quiet(header.opcode) {
            break;
        }
    }
    Ok(unit)
}

/// Relay one full request/response cycle: client -> backend, then
/// backend -> client.
pub async fn relay_cycle<C, B>(client: &mut C, backend: &mut B) -> Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let request = read_request_unit(client).await?;
    backend.write_all(&request).await?;
    backend.flush().await?;

    let response = read_response_unit(backend).await?;
    client.write_all(&response).await?;
    client.flush().await?;

    Ok(())
}
