//! ICAP wire protocol: methods, status table, the `Encapsulated` header,
//! chunked transfer coding, and request/response codecs.

pub mod chunked;
pub mod encapsulated;
pub mod headers;
pub mod method;
pub mod request;
pub mod response;
pub mod status;

pub use encapsulated::{EncapsulatedLayout, EntityName};
pub use headers::HeaderMap;
pub use method::IcapMethod;
pub use request::{read_request, EncapsulatedData, IcapRequest, IcapRequestLine};
pub use response::{build_response, AdaptationResult};
