//! Runs the real TCP server on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use chat_relay::{ChatInstance, ChatLog, NamePolicy, Registry, Server, ServerError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_server() -> (std::net::SocketAddr, Arc<ChatInstance>) {
    let chat = Arc::new(ChatInstance::new(
        Registry::new(),
        ChatLog::discard(),
        NamePolicy::default(),
    ));
    let server = Server::bind("127.0.0.1:0", Arc::clone(&chat))
        .await
        .expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());
    (addr, chat)
}

async fn expect(reader: &mut BufReader<OwnedReadHalf>, needle: &str) -> String {
    let read = async {
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader.read_line(&mut line).await.expect("read");
            assert!(n > 0, "connection closed waiting for {needle:?}");
            if line.contains(needle) {
                return line;
            }
        }
    };
    timeout(READ_TIMEOUT, read).await.expect("timed out")
}

async fn join(
    addr: std::net::SocketAddr,
    name: &str,
) -> (BufReader<OwnedReadHalf>, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.expect("connect");
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(format!("{name}\n").as_bytes()).await.unwrap();
    expect(&mut reader, &format!("{name} has entered.")).await;
    (reader, writer)
}

#[tokio::test]
async fn test_clients_chat_over_tcp() {
    let (addr, chat) = spawn_server().await;

    let (mut bob_rx, _bob_tx) = join(addr, "Bob").await;
    let (mut ray_rx, mut ray_tx) = join(addr, "Ray").await;
    expect(&mut bob_rx, "Ray has entered.").await;
    assert_eq!(chat.registry().len().await, 2);

    ray_tx.write_all(b"hello\n").await.unwrap();
    expect(&mut bob_rx, "Ray: hello").await;
    expect(&mut ray_rx, "Ray: hello").await;

    ray_tx.write_all(b"-exit\n").await.unwrap();
    expect(&mut bob_rx, "Ray has left.").await;
    assert_eq!(chat.registry().len().await, 1);
}

#[tokio::test]
async fn test_dropped_connection_is_removed() {
    let (addr, chat) = spawn_server().await;

    let (mut bob_rx, _bob_tx) = join(addr, "Bob").await;
    let ray = join(addr, "Ray").await;
    expect(&mut bob_rx, "Ray has entered.").await;

    drop(ray);
    expect(&mut bob_rx, "Ray has left.").await;
    assert_eq!(chat.registry().len().await, 1);
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let (addr, chat) = spawn_server().await;

    let result = Server::bind(&addr.to_string(), chat).await;
    assert!(matches!(result, Err(ServerError::Bind { .. })));
}
