//! Helpers shared by the transport tests.

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server that accepts connections and never answers. Sockets stay open
/// until the test runtime shuts down.
pub async fn silent_server() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (format!("http://{addr}"), handle)
}
