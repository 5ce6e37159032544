//! Text protocol framer.
//!
//! A request unit is one command line, plus a payload block when the
//! command is a storage command. A response unit is either a single line,
//! or, for retrieval commands, a run of `VALUE` header/payload pairs
//! terminated by the literal line `END\r\n`. `noreply` storage commands
//! get no response at all; the framer must not try to read one.
use crate::error::Result;
use crate::text::{self, TextRequest, END_LINE, EOL};
use futures_lite::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

async fn read_line<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        stream.read_exact(&mut byte).await?;
        line.push(byte[0]);
        if line.ends_with(EOL) {
            break;
        }
    }
    Ok(line)
}

async fn read_exact_bytes<R: AsyncRead + Unpin>(stream: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read the request side: header line, plus payload block for storage
/// commands. Returns the verbatim bytes to forward and the parsed request
/// (the driver needs it to decide how to frame the response).
async fn read_request<R: AsyncRead + Unpin>(stream: &mut R) -> Result<(Vec<u8>, TextRequest)> {
    let mut unit = read_line(stream).await?;
    let request = text::parse_request_line(&unit)?;

    if let TextRequest::Storage { bytes, .. } = &request {
        let payload = read_exact_bytes(stream, *bytes as usize + EOL.len()).await?;
        unit.extend_from_slice(&payload);
    }

    Ok((unit, request))
}

/// Read the response side for a retrieval command: zero or more
/// `VALUE ... \r\n<payload>\r\n` pairs, ending with the literal `END\r\n`.
async fn read_retrieval_response<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>> {
    let mut unit = Vec::new();
    loop {
        let line = read_line(stream).await?;
        let is_end = line == END_LINE;
        unit.extend_from_slice(&line);
        if is_end {
            break;
        }
        let value_bytes = text::value_line_bytes(&line)?;
        let payload = read_exact_bytes(stream, value_bytes as usize + EOL.len()).await?;
        unit.extend_from_slice(&payload);
    }
    Ok(unit)
}

/// Relay one full request/response cycle: client -> backend, then
/// backend -> client (skipped for `noreply` storage commands).
pub async fn relay_cycle<C, B>(client: &mut C, backend: &mut B) -> Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (request, parsed) = read_request(client).await?;
    backend.write_all(&request).await?;
    backend.flush().await?;

    if !parsed.expects_response() {
        return Ok(());
    }

    let response = if parsed.is_retrieval() {
        read_retrieval_response(backend).await?
    } else {
        read_line(backend).await?
    };
    client.write_all(&response).await?;
    client.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::io::Cursor;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// A duplex test double: reads come from a canned buffer, writes land
    /// in a separate buffer that the test can inspect (unlike a bare
    /// `Cursor`, where read and write share one position).
    struct Mock {
        read: Cursor<Vec<u8>>,
        pub written: Vec<u8>,
    }

    impl Mock {
        fn new(canned_read: &[u8]) -> Self {
            Self {
                read: Cursor::new(canned_read.to_vec()),
                written: Vec::new(),
            }
        }
    }

    impl AsyncRead for Mock {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut [u8],
        ) -> Poll<std::io::Result<usize>> {
            Pin::new(&mut self.read).poll_read(cx, buf)
        }
    }

    impl AsyncWrite for Mock {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            self.written.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }
        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn storage_reads_payload_and_forwards() {
        smol::block_on(async {
            let mut client = Mock::new(b"set foo 0 0 3\r\nbar\r\n");
            let mut backend = Mock::new(b"STORED\r\n");
            relay_cycle(&mut client, &mut backend).await.unwrap();
            assert_eq!(backend.written, b"set foo 0 0 3\r\nbar\r\n");
        });
    }

    #[test]
    fn storage_payload_with_embedded_crlf_reads_exact_count() {
        smol::block_on(async {
            // bytes=8, payload is "bar\r\nbaz" (8 bytes) + trailing CRLF.
            let input = b"set foo 0 0 8\r\nbar\r\nbaz\r\n".to_vec();
            let mut client = Mock::new(&input);
            let mut backend = Mock::new(b"STORED\r\n");
            relay_cycle(&mut client, &mut backend).await.unwrap();
            assert_eq!(backend.written, input);
        });
    }

    #[test]
    fn noreply_storage_skips_response_phase() {
        smol::block_on(async {
            let mut client = Mock::new(b"set foo 0 0 3 noreply\r\nbar\r\n");
            // empty backend read buffer: reading a response line would error
            let mut backend = Mock::new(b"");
            relay_cycle(&mut client, &mut backend).await.unwrap();
        });
    }

    #[test]
    fn retrieval_multi_value_reads_until_end() {
        smol::block_on(async {
            let mut client = Mock::new(b"get foo foo2\r\n");
            let resp = b"VALUE foo 0 3\r\nbar\r\nVALUE foo2 0 4\r\nbar2\r\nEND\r\n".to_vec();
            let mut backend = Mock::new(&resp);
            relay_cycle(&mut client, &mut backend).await.unwrap();
            assert_eq!(backend.written, b"get foo foo2\r\n");
        });
    }

    #[test]
    fn retrieval_zero_hits_returns_just_end() {
        smol::block_on(async {
            let mut backend_read = Cursor::new(b"END\r\n".to_vec());
            let unit = read_retrieval_response(&mut backend_read).await.unwrap();
            assert_eq!(unit, b"END\r\n");
        });
    }
}
