//! The `Encapsulated` header: names and byte offsets of the sub-entities
//! packed into an ICAP request or response body (component 4.B).

use crate::error::IcapError;
use crate::protocol::method::IcapMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityName {
    ReqHdr,
    ResHdr,
    ReqBody,
    ResBody,
    OptBody,
    NullBody,
}

impl EntityName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityName::ReqHdr => "req-hdr",
            EntityName::ResHdr => "res-hdr",
            EntityName::ReqBody => "req-body",
            EntityName::ResBody => "res-body",
            EntityName::OptBody => "opt-body",
            EntityName::NullBody => "null-body",
        }
    }

    fn parse(s: &str) -> Result<Self, IcapError> {
        Ok(match s {
            "req-hdr" => EntityName::ReqHdr,
            "res-hdr" => EntityName::ResHdr,
            "req-body" => EntityName::ReqBody,
            "res-body" => EntityName::ResBody,
            "opt-body" => EntityName::OptBody,
            "null-body" => EntityName::NullBody,
            other => return Err(IcapError::BadEncapsulatedEntityName(other.to_string())),
        })
    }

    pub fn is_body(&self) -> bool {
        matches!(
            self,
            EntityName::ReqBody | EntityName::ResBody | EntityName::OptBody
        )
    }
}

/// A parsed `Encapsulated` entity list, offsets in listed (increasing) order.
#[derive(Debug, Clone)]
pub struct EncapsulatedLayout {
    pub entries: Vec<(EntityName, u64)>,
}

impl EncapsulatedLayout {
    /// Parses the single `Encapsulated` header value. `values` is every
    /// occurrence of the header seen on the message; exactly one is valid.
    pub fn parse(values: &[Vec<u8>], method: IcapMethod) -> Result<Self, IcapError> {
        if values.is_empty() {
            if method.requires_encapsulated_header() {
                return Err(IcapError::MissingEncapsulatedHeader);
            }
            return Ok(EncapsulatedLayout { entries: Vec::new() });
        }
        if values.len() > 1 {
            return Err(IcapError::MultipleEncapsulatedHeaders);
        }
        let raw = std::str::from_utf8(&values[0])
            .map_err(|_| IcapError::BadEncapsulatedEntityName(String::from_utf8_lossy(&values[0]).into_owned()))?;

        let mut entries = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let mut previous: Option<u64> = None;
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, offset) = part
                .split_once('=')
                .ok_or_else(|| IcapError::BadEncapsulatedEntityName(part.to_string()))?;
            let name = EntityName::parse(name.trim())?;
            if !seen.insert(name.as_str()) {
                return Err(IcapError::DuplicateEncapsulatedEntityName(name.as_str().to_string()));
            }
            let offset_raw = offset.trim();
            let signed: i64 = offset_raw
                .parse()
                .map_err(|_| IcapError::EncapsulatedOffsetNotInteger(offset_raw.to_string()))?;
            if signed < 0 {
                return Err(IcapError::NegativeEncapsulatedOffset(signed));
            }
            let value = signed as u64;
            if let Some(prev) = previous {
                if value <= prev {
                    return Err(IcapError::NonIncreasingEncapsulatedOffset {
                        previous: prev,
                        next: value,
                    });
                }
            }
            previous = Some(value);
            entries.push((name, value));
        }
        Ok(EncapsulatedLayout { entries })
    }

    /// Emits `"name=offset, name=offset"` for a response carrying `header`
    /// (if any) followed by `body_name` (or `null-body` if there is none).
    pub fn emit(header: Option<EntityName>, body_name: Option<EntityName>, header_len: u64) -> String {
        let mut parts = Vec::new();
        if let Some(h) = header {
            parts.push(format!("{}=0", h.as_str()));
        }
        match body_name {
            Some(b) => parts.push(format!("{}={}", b.as_str(), header_len)),
            None => parts.push(format!("{}={}", EntityName::NullBody.as_str(), header_len)),
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_increasing_offsets() {
        let values = vec![b"req-hdr=0, req-body=137".to_vec()];
        let layout = EncapsulatedLayout::parse(&values, IcapMethod::Reqmod).unwrap();
        assert_eq!(layout.entries, vec![(EntityName::ReqHdr, 0), (EntityName::ReqBody, 137)]);
    }

    #[test]
    fn rejects_non_increasing_offsets() {
        let values = vec![b"req-hdr=0, req-body=0".to_vec()];
        let err = EncapsulatedLayout::parse(&values, IcapMethod::Reqmod).unwrap_err();
        assert!(matches!(err, IcapError::NonIncreasingEncapsulatedOffset { .. }));
    }

    #[test]
    fn missing_header_required_for_reqmod() {
        let err = EncapsulatedLayout::parse(&[], IcapMethod::Reqmod).unwrap_err();
        assert!(matches!(err, IcapError::MissingEncapsulatedHeader));
    }

    #[test]
    fn missing_header_optional_for_options() {
        let layout = EncapsulatedLayout::parse(&[], IcapMethod::Options).unwrap();
        assert!(layout.entries.is_empty());
    }

    #[test]
    fn rejects_unknown_entity_name() {
        let values = vec![b"bogus=0".to_vec()];
        let err = EncapsulatedLayout::parse(&values, IcapMethod::Options).unwrap_err();
        assert!(matches!(err, IcapError::BadEncapsulatedEntityName(_)));
    }

    #[test]
    fn rejects_duplicate_entity_name() {
        let values = vec![b"req-hdr=0, req-hdr=10".to_vec()];
        let err = EncapsulatedLayout::parse(&values, IcapMethod::Reqmod).unwrap_err();
        assert!(matches!(err, IcapError::DuplicateEncapsulatedEntityName(_)));
    }

    #[test]
    fn emit_round_trips_through_parse() {
        let text = EncapsulatedLayout::emit(Some(EntityName::ReqHdr), Some(EntityName::ReqBody), 42);
        assert_eq!(text, "req-hdr=0, req-body=42");
        let layout = EncapsulatedLayout::parse(&[text.into_bytes()], IcapMethod::Reqmod).unwrap();
        assert_eq!(layout.entries, vec![(EntityName::ReqHdr, 0), (EntityName::ReqBody, 42)]);
    }
}
