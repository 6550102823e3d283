//! HTTP/1.1 chunked transfer-encoding: reading the final (offset-less)
//! encapsulated body entity off the wire, and encoding a response body.

use tokio::io::{AsyncBufReadExt, AsyncReadExt};

use crate::error::{IcapError, IcapResult};

/// Chunk sizes above this are treated as a protocol error rather than an
/// attempt to allocate an unbounded buffer.
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Reads a chunked body to completion, concatenating every chunk's payload.
/// Trailers, if any, are consumed and discarded.
pub async fn read_chunked<R>(reader: &mut R) -> IcapResult<Vec<u8>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut out = Vec::new();
    loop {
        let mut size_line = String::new();
        let n = reader.read_line(&mut size_line).await?;
        if n == 0 {
            return Err(IcapError::UnexpectedEof("chunk size line"));
        }
        let size_token = size_line.trim_end_matches(['\r', '\n']);
        let size_token = size_token.split(';').next().unwrap_or(size_token).trim();
        let size = usize::from_str_radix(size_token, 16)
            .map_err(|_| IcapError::MalformedChunkSize(size_token.to_string()))?;
        if size > MAX_CHUNK_SIZE {
            return Err(IcapError::ChunkTooLarge { limit: MAX_CHUNK_SIZE });
        }
        if size == 0 {
            // Trailer section: read header lines until the blank line.
            loop {
                let mut trailer = String::new();
                let n = reader.read_line(&mut trailer).await?;
                if n == 0 || trailer == "\r\n" || trailer == "\n" {
                    break;
                }
            }
            break;
        }
        let mut chunk = vec![0u8; size];
        reader.read_exact(&mut chunk).await?;
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf).await?;
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

/// Wraps `data` as a single HTTP chunk terminated by the zero-length chunk,
/// matching the encoding the response builder needs (component 4.D).
pub fn encode_single_chunk(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return b"0\r\n\r\n".to_vec();
    }
    let mut out = Vec::with_capacity(data.len() + 16);
    out.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n0\r\n\r\n");
    out
}
