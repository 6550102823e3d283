//! Request line, header block, and the assembled `IcapRequest` (component
//! 4.C: reading an ICAP request off an async byte stream).

use tokio::io::{AsyncBufReadExt, AsyncReadExt};

use crate::error::{IcapError, IcapResult};
use crate::protocol::chunked::read_chunked;
use crate::protocol::encapsulated::{EncapsulatedLayout, EntityName};
use crate::protocol::headers::HeaderMap;
use crate::protocol::method::IcapMethod;

/// Caps against a misbehaving or hostile peer sending unbounded lines.
const MAX_LINE_LEN: usize = 8 * 1024;
const MAX_HEADER_BLOCK_LEN: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct IcapRequestLine {
    pub method: IcapMethod,
    pub uri: String,
    pub service_name: String,
    pub version: (u16, u16),
}

#[derive(Debug, Clone, Default)]
pub struct EncapsulatedData {
    pub request_header: Option<Vec<u8>>,
    pub response_header: Option<Vec<u8>>,
    pub request_body: Option<Vec<u8>>,
    pub response_body: Option<Vec<u8>>,
    pub options_body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct IcapRequest {
    pub request_line: IcapRequestLine,
    pub headers: HeaderMap,
    pub body: EncapsulatedData,
}

/// The first path segment of an `icap://host[:port]/path` URI, used as the
/// service dispatch key.
fn service_name_from_uri(uri: &str) -> String {
    let after_scheme = uri.strip_prefix("icap://").unwrap_or(uri);
    let path = match after_scheme.find('/') {
        Some(idx) => &after_scheme[idx + 1..],
        None => "",
    };
    path.split('/').next().unwrap_or("").to_string()
}

fn parse_request_line(line: &str) -> IcapResult<IcapRequestLine> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != 3 {
        return Err(IcapError::MalformedRequestLine(line.to_string()));
    }
    let method = tokens[0].parse()?;
    let uri = tokens[1];
    if !uri.starts_with("icap://") {
        return Err(IcapError::MalformedRequestLine(line.to_string()));
    }
    let version_token = tokens[2]
        .strip_prefix("ICAP/")
        .ok_or_else(|| IcapError::MalformedRequestLine(line.to_string()))?;
    let (major, minor) = version_token
        .split_once('.')
        .ok_or_else(|| IcapError::MalformedRequestLine(line.to_string()))?;
    let major: u16 = major
        .parse()
        .map_err(|_| IcapError::MalformedRequestLine(line.to_string()))?;
    let minor: u16 = minor
        .parse()
        .map_err(|_| IcapError::MalformedRequestLine(line.to_string()))?;
    Ok(IcapRequestLine {
        method,
        uri: uri.to_string(),
        service_name: service_name_from_uri(uri),
        version: (major, minor),
    })
}

async fn read_capped_line<R>(reader: &mut R) -> IcapResult<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    if line.len() > MAX_LINE_LEN {
        return Err(IcapError::LineTooLong { limit: MAX_LINE_LEN });
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

async fn read_headers<R>(reader: &mut R) -> IcapResult<HeaderMap>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut headers = HeaderMap::new();
    let mut total = 0usize;
    loop {
        let line = match read_capped_line(reader).await? {
            Some(l) => l,
            None => return Err(IcapError::UnexpectedEof("header block")),
        };
        total += line.len() + 2;
        if total > MAX_HEADER_BLOCK_LEN {
            return Err(IcapError::HeaderBlockTooLarge { limit: MAX_HEADER_BLOCK_LEN });
        }
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| IcapError::MalformedHeaderLine(line.clone()))?;
        headers.append(name, value.as_bytes().to_vec());
    }
    Ok(headers)
}

/// Reads one ICAP request from `reader`. Returns `Ok(None)` on a clean EOF
/// before any bytes were read (orderly end of the keep-alive loop).
pub async fn read_request<R>(reader: &mut R) -> IcapResult<Option<IcapRequest>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let line = match read_capped_line(reader).await? {
        Some(l) => l,
        None => return Ok(None),
    };
    let request_line = parse_request_line(&line)?;
    let headers = read_headers(reader).await?;
    let layout = EncapsulatedLayout::parse(headers.get_all("encapsulated"), request_line.method)?;
    let body = read_encapsulated_body(reader, &layout).await?;
    Ok(Some(IcapRequest {
        request_line,
        headers,
        body,
    }))
}

async fn read_encapsulated_body<R>(
    reader: &mut R,
    layout: &EncapsulatedLayout,
) -> IcapResult<EncapsulatedData>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut data = EncapsulatedData::default();
    let mut cursor: u64 = 0;
    let entries = &layout.entries;
    for (idx, (name, offset)) in entries.iter().enumerate() {
        if *name == EntityName::NullBody {
            continue;
        }
        let is_last = idx + 1 == entries.len();
        let bytes = if is_last {
            // The final entity's length is not given by an offset; it's
            // framed as a chunked stream (the body entities) or, for a
            // header-only final entity, by its own terminating CRLF CRLF.
            if name.is_body() {
                read_chunked(reader).await?
            } else {
                read_header_block_to_double_crlf(reader).await?
            }
        } else {
            let next_offset = entries[idx + 1].1;
            let len = next_offset
                .checked_sub(*offset)
                .ok_or(IcapError::NonIncreasingEncapsulatedOffset {
                    previous: *offset,
                    next: next_offset,
                })?;
            let mut buf = vec![0u8; len as usize];
            reader.read_exact(&mut buf).await?;
            cursor = next_offset;
            buf
        };
        let _ = cursor;
        match name {
            EntityName::ReqHdr => data.request_header = Some(bytes),
            EntityName::ResHdr => data.response_header = Some(bytes),
            EntityName::ReqBody => data.request_body = Some(bytes),
            EntityName::ResBody => data.response_body = Some(bytes),
            EntityName::OptBody => data.options_body = Some(bytes),
            EntityName::NullBody => {}
        }
    }
    Ok(data)
}

/// Reads a raw HTTP header block (request-line + headers) up to and
/// including the terminating blank line, used when a header entity is the
/// last (and therefore offset-less) entity in the layout.
async fn read_header_block_to_double_crlf<R>(reader: &mut R) -> IcapResult<Vec<u8>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut out = Vec::new();
    loop {
        let mut line = Vec::new();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            return Err(IcapError::UnexpectedEof("encapsulated header block"));
        }
        let blank = line == b"\r\n" || line == b"\n";
        out.extend_from_slice(&line);
        if blank {
            break;
        }
        if out.len() > MAX_HEADER_BLOCK_LEN {
            return Err(IcapError::HeaderBlockTooLarge { limit: MAX_HEADER_BLOCK_LEN });
        }
    }
    Ok(out)
}
