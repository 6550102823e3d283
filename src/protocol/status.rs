//! ICAP/HTTP status code table (component 4.A).
//!
//! Mirrors the code/reason pairs RFC 3507 borrows from HTTP plus the two
//! ICAP-specific codes (100 Continue, 204 No Content).

use crate::error::IcapError;

pub fn reason_phrase(code: u16) -> Option<&'static str> {
    Some(match code {
        100 => "Continue",
        200 => "OK",
        204 => "No Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        417 => "Expectation Failed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        505 => "ICAP Version Not Supported",
        _ => return None,
    })
}

/// Serialises an ICAP status line: `ICAP/1.0 <code> <reason>\r\n`.
///
/// `reason` overrides the table lookup when given; otherwise the code must
/// be present in [`reason_phrase`].
pub fn status_line(code: u16, reason: Option<&str>) -> Result<String, IcapError> {
    let reason = match reason {
        Some(r) => r,
        None => reason_phrase(code).ok_or(IcapError::UnknownStatusCode(code))?,
    };
    Ok(format!("ICAP/1.0 {code} {reason}\r\n"))
}
