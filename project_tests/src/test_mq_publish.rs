//! # Capture Stream Publisher Test
//!
//! Manual integration runner for the ingest pipeline. It stands in for the
//! sniffer daemon: binds a PUB socket at the capture endpoint and publishes
//! a handful of MessagePack encoded ARP observations. With a console server
//! running against the same endpoint, every published event must show up as
//! exactly one document in the `arp_req` collection.
//!
//! Usage:
//! 1. Start `server_console` (it subscribes to `tcp://localhost:3000`).
//! 2. Run this binary.
//! 3. Verify the inserts, e.g. `db.arp_req.find()` in a mongo shell.

use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use zeromq::{PubSocket, Socket, SocketSend, ZmqMessage};

/// Endpoint the publisher binds. Matches the console's default subscription.
const BIND_ENDPOINT: &str = "tcp://0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("--- Starting Capture Publisher Test ---");

    // 1. Bind the PUB side of the capture stream.
    let mut socket = PubSocket::new();
    socket.bind(BIND_ENDPOINT).await?;
    println!("Publisher bound at {}", BIND_ENDPOINT);

    // 2. Give subscribers a moment to (re)connect. ZeroMQ drops messages
    //    published before the subscription handshake completes.
    tokio::time::sleep(Duration::from_secs(2)).await;

    // 3. Publish a few observations shaped like the sniffer's output.
    let now = chrono::Utc::now().timestamp();
    let events = vec![
        json!({
            "tag": "lurker.arp-req",
            "ts": now,
            "src_addr": "192.168.0.23",
            "dst_addr": "192.168.0.1",
            "src_hw": "52:54:00:12:34:56",
            "dst_hw": "ff:ff:ff:ff:ff:ff",
            "replied": false,
        }),
        json!({
            "tag": "lurker.arp-req",
            "ts": now + 1,
            "src_addr": "192.168.0.42",
            "dst_addr": "192.168.0.9",
            "src_hw": "52:54:00:ab:cd:ef",
            "dst_hw": "ff:ff:ff:ff:ff:ff",
            "replied": true,
        }),
        // A non-map payload: the console must wrap it instead of dropping it.
        json!("bare scalar payload"),
    ];

    for (i, event) in events.iter().enumerate() {
        let frame = Bytes::from(rmp_serde::to_vec(event)?);
        socket.send(ZmqMessage::from(frame)).await?;
        println!("[{}] published: {}", i + 1, event);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    // 4. Let the transport flush before tearing the socket down.
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("--- Publisher done: {} events sent ---", events.len());
    Ok(())
}
