//! Process-wide client against a debug server on a fixed port.
//!
//! Kept in its own test binary since it reconfigures the global client.

use std::time::Duration;

use debug_dump::{ConfigUpdate, Delivery};
use serde_json::json;

mod common;

use common::MockDumpServer;

#[tokio::test]
async fn test_global_dump_reaches_configured_server() {
    let server = MockDumpServer::start("127.0.0.1:9999".parse().unwrap()).await;

    debug_dump::configure(ConfigUpdate::new().host("127.0.0.1").port(9999).enabled(true));
    assert!(debug_dump::is_enabled());
    assert_eq!(debug_dump::config().port, 9999);

    let delivery = debug_dump::dump(json!({ "a": 1 })).wait().await;
    assert_eq!(delivery, Delivery::Delivered { status: 200 });

    let received = server.wait_for(1, Duration::from_secs(2)).await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/dump");

    let body = &received[0].body;
    assert_eq!(body["type"], "dump");
    assert_eq!(body["content"], json!({ "a": 1 }));
    assert_eq!(body["language"], "rust");
    assert!(body.get("label").is_none());
    assert!(body["file"].as_str().unwrap().ends_with("end_to_end.rs"));

    debug_dump::configure(ConfigUpdate::new().enabled(false));
    assert!(!debug_dump::is_enabled());
    assert_eq!(
        debug_dump::log_warning("ignored", None).wait().await,
        Delivery::Disabled
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received().len(), 1);
}
