//! ICAP request methods.

use std::fmt;
use std::str::FromStr;

use crate::error::IcapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcapMethod {
    Options,
    Reqmod,
    Respmod,
}

impl IcapMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcapMethod::Options => "OPTIONS",
            IcapMethod::Reqmod => "REQMOD",
            IcapMethod::Respmod => "RESPMOD",
        }
    }

    /// Whether an `Encapsulated` header is mandatory on a request of this method.
    pub fn requires_encapsulated_header(&self) -> bool {
        matches!(self, IcapMethod::Reqmod | IcapMethod::Respmod)
    }
}

impl fmt::Display for IcapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IcapMethod {
    type Err = IcapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPTIONS" => Ok(IcapMethod::Options),
            "REQMOD" => Ok(IcapMethod::Reqmod),
            "RESPMOD" => Ok(IcapMethod::Respmod),
            _ => Err(IcapError::BadIcapMethod(s.to_string())),
        }
    }
}
