//! Assembling a wire-formatted ICAP response from a handler's result
//! (component 4.D).

use crate::error::IcapResult;
use crate::protocol::chunked::encode_single_chunk;
use crate::protocol::encapsulated::{EncapsulatedLayout, EntityName};
use crate::protocol::headers::HeaderMap;
use crate::protocol::method::IcapMethod;
use crate::protocol::request::EncapsulatedData;
use crate::protocol::status::status_line;

/// What a handler hands back after adapting (or declining to adapt) a
/// request.
#[derive(Debug, Clone, Default)]
pub struct AdaptationResult {
    pub content: EncapsulatedData,
    pub status_code: u16,
    pub headers: HeaderMap,
    pub content_was_altered: bool,
}

impl AdaptationResult {
    /// An unmodified echo of `content`, suitable for the 204 shortcut.
    pub fn unmodified(content: EncapsulatedData) -> Self {
        AdaptationResult {
            content,
            status_code: 200,
            headers: HeaderMap::new(),
            content_was_altered: false,
        }
    }
}

fn random_istag() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    (0..30)
        .map(|_| ALPHABET[fastrand::usize(0..ALPHABET.len())] as char)
        .collect()
}

/// Builds the complete wire bytes of a response for `method`, given the
/// handler's result. When `add_required_headers` is set (the default), a
/// missing `ISTag` and `Encapsulated` are synthesised.
pub fn build_response(
    method: IcapMethod,
    result: &AdaptationResult,
    add_required_headers: bool,
) -> IcapResult<Vec<u8>> {
    let mut headers = result.headers.clone();
    if add_required_headers && !headers.contains("istag") {
        headers.set("istag", format!("\"{}\"", random_istag()).into_bytes());
    }

    let mut out = status_line(result.status_code, None)?.into_bytes();

    if result.status_code == 204 {
        if add_required_headers && !headers.contains("encapsulated") {
            headers.set(
                "encapsulated",
                EncapsulatedLayout::emit(None, None, 0).into_bytes(),
            );
        }
        write_headers(&mut out, &headers);
        return Ok(out);
    }

    let (header_entity, header_bytes, body_entity, body_bytes): (
        Option<EntityName>,
        Option<&Vec<u8>>,
        EntityName,
        Option<&Vec<u8>>,
    ) = match method {
        IcapMethod::Reqmod => (
            Some(EntityName::ReqHdr),
            result.content.request_header.as_ref(),
            EntityName::ReqBody,
            result.content.request_body.as_ref(),
        ),
        IcapMethod::Respmod => (
            Some(EntityName::ResHdr),
            result.content.response_header.as_ref(),
            EntityName::ResBody,
            result.content.response_body.as_ref(),
        ),
        IcapMethod::Options => (
            None,
            None,
            EntityName::OptBody,
            result.content.options_body.as_ref(),
        ),
    };

    let header_len = header_bytes.map(|b| b.len() as u64).unwrap_or(0);
    let body_name = body_bytes.map(|_| body_entity);

    if add_required_headers && !headers.contains("encapsulated") {
        headers.set(
            "encapsulated",
            EncapsulatedLayout::emit(header_entity, body_name, header_len).into_bytes(),
        );
    }

    write_headers(&mut out, &headers);

    if let Some(h) = header_bytes {
        out.extend_from_slice(h);
    }
    if let Some(b) = body_bytes {
        out.extend_from_slice(&encode_single_chunk(b));
    }

    Ok(out)
}

fn write_headers(out: &mut Vec<u8>, headers: &HeaderMap) {
    for (name, value) in headers.iter() {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
}
