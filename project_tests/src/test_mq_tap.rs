//! # Capture Stream Tap
//!
//! Diagnostic runner that subscribes to the sniffer's capture stream and
//! prints every decoded event without persisting anything. Useful to check
//! that the daemon is publishing and that frames decode, independently of
//! the document store.

use zeromq::{Socket, SocketRecv, SubSocket};

use lib_common::ingestors::lurker_mq::decode_frame;

/// Endpoint the sniffer daemon publishes on.
const ENDPOINT: &str = "tcp://localhost:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut socket = SubSocket::new();
    socket.connect(ENDPOINT).await?;
    socket.subscribe("").await?;
    println!("Tapping capture stream at {} (Ctrl+C to stop)", ENDPOINT);

    loop {
        let message = socket.recv().await?;
        println!(": received data ");
        match decode_frame(&message) {
            Ok(event) => println!("{}", event),
            Err(e) => log::warn!("undecodable frame: {}", e),
        }
    }
}
