//! Contract Test: Directory Call Sequencing
//!
//! Constraints verified:
//! - One request never has two directory calls in flight
//! - Requests for different hostnames proceed independently
//!
//! If this test fails, a request is pipelining provider calls.

mod common;

use common::*;
use dyndns_core::directory::MemoryDirectory;
use dyndns_core::{RecordType, UpdateConfig, UpdateService};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn single_request_issues_calls_one_at_a_time() {
    let memory = MemoryDirectory::new(ZONE);
    memory.seed(RecordType::A, HOST, "198.51.100.1").await;
    memory.seed(RecordType::Aaaa, HOST, "2001:db8::1").await;

    let tracking = Arc::new(TrackingDirectory::new(memory.clone(), Duration::from_millis(5)));
    let service = UpdateService::new(tracking.clone(), UpdateConfig::new(ZONE)).unwrap();

    service.update(HOST, "198.51.100.2").await.unwrap();

    // resolve, list, update A, delete AAAA
    assert_eq!(memory.call_count().await, 4);
    assert_eq!(tracking.peak_in_flight(), 1);
}

#[tokio::test]
async fn concurrent_requests_for_different_hosts_both_apply() {
    let memory = MemoryDirectory::new(ZONE);
    let tracking = Arc::new(TrackingDirectory::new(memory.clone(), Duration::from_millis(10)));
    let service = UpdateService::new(tracking.clone(), UpdateConfig::new(ZONE)).unwrap();

    let a = {
        let service = service.clone();
        tokio::spawn(async move { service.update("home.example.com", "192.0.2.1").await })
    };
    let b = {
        let service = service.clone();
        tokio::spawn(async move { service.update("nas.example.com", "192.0.2.2").await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(contents(&memory, "home.example.com", RecordType::A).await, vec!["192.0.2.1"]);
    assert_eq!(contents(&memory, "nas.example.com", RecordType::A).await, vec!["192.0.2.2"]);
}
