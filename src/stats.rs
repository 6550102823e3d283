//! Connection and request counters (component 4.K).
//!
//! Atomic, lock-free counters; no StatsD/daemon-supervisor emission path —
//! callers read a snapshot via [`IcapStats::snapshot`] for logs or an admin
//! hook.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct IcapStats {
    pub total_requests: AtomicU64,
    pub options_requests: AtomicU64,
    pub reqmod_requests: AtomicU64,
    pub respmod_requests: AtomicU64,
    pub successful_responses: AtomicU64,
    pub error_responses: AtomicU64,
    pub active_connections: AtomicU64,
    pub total_connections: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub options_requests: u64,
    pub reqmod_requests: u64,
    pub respmod_requests: u64,
    pub successful_responses: u64,
    pub error_responses: u64,
    pub active_connections: u64,
    pub total_connections: u64,
}

impl IcapStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_started(&self, method: crate::protocol::IcapMethod) {
        use crate::protocol::IcapMethod;
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match method {
            IcapMethod::Options => self.options_requests.fetch_add(1, Ordering::Relaxed),
            IcapMethod::Reqmod => self.reqmod_requests.fetch_add(1, Ordering::Relaxed),
            IcapMethod::Respmod => self.respmod_requests.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn response_sent(&self, status_code: u16) {
        if (200..400).contains(&status_code) {
            self.successful_responses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.error_responses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            options_requests: self.options_requests.load(Ordering::Relaxed),
            reqmod_requests: self.reqmod_requests.load(Ordering::Relaxed),
            respmod_requests: self.respmod_requests.load(Ordering::Relaxed),
            successful_responses: self.successful_responses.load(Ordering::Relaxed),
            error_responses: self.error_responses.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            total_connections: self.total_connections.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} (options={}, reqmod={}, respmod={}) responses_ok={} responses_err={} connections={}/{} active/total",
            self.total_requests,
            self.options_requests,
            self.reqmod_requests,
            self.respmod_requests,
            self.successful_responses,
            self.error_responses,
            self.active_connections,
            self.total_connections,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::IcapMethod;

    #[test]
    fn counts_requests_by_method() {
        let stats = IcapStats::new();
        stats.request_started(IcapMethod::Reqmod);
        stats.request_started(IcapMethod::Options);
        let snap = stats.snapshot();
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.reqmod_requests, 1);
        assert_eq!(snap.options_requests, 1);
    }

    #[test]
    fn response_sent_buckets_by_status() {
        let stats = IcapStats::new();
        stats.response_sent(204);
        stats.response_sent(500);
        let snap = stats.snapshot();
        assert_eq!(snap.successful_responses, 1);
        assert_eq!(snap.error_responses, 1);
    }
}
