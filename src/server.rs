//! HTTP server loop.
//!
//! Each accepted connection is served by its own task. A client has
//! `timeout` to send a complete request head, on the first request and
//! between keep-alive requests alike; past that the connection is closed.
//! Handlers themselves are never cut short.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Serve `app` on `listener` until `signal` resolves, then wait for open
/// connections to finish their current request.
pub async fn serve<F>(listener: TcpListener, app: Router, timeout: Duration, signal: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let mut builder = Builder::new(TokioExecutor::new());
    builder
        .http1()
        .timer(TokioTimer::new())
        .keep_alive(true)
        .header_read_timeout(timeout);

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::pin!(signal);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot accept connection");
                    continue;
                },
            },
            () = &mut signal => break,
        };

        let builder = builder.clone();
        let service = TowerToHyperService::new(app.clone());
        let mut shutdown_rx = shutdown_rx.clone();

        tokio::spawn(async move {
            let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let mut closing = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(err) = result {
                            tracing::debug!(error = %err, %peer, "connection closed");
                        }
                        break;
                    },
                    _ = shutdown_rx.changed(), if !closing => {
                        closing = true;
                        conn.as_mut().graceful_shutdown();
                    },
                }
            }
        });
    }

    drop(listener);
    drop(shutdown_rx);

    // Fails only when every connection is already gone.
    if shutdown_tx.send(()).is_err() {
        tracing::debug!("no open connection left");
    }
    shutdown_tx.closed().await;
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use super::*;
    use crate::router;

    /// Start the service on a free local port.
    async fn start(
        timeout: Duration,
    ) -> (std::net::SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(
            listener,
            crate::app(router::state()),
            timeout,
            async move {
                stop_rx.await.ok();
            },
        ));
        (addr, stop_tx, handle)
    }

    #[tokio::test]
    async fn test_serves_requests() {
        let (addr, stop, handle) = start(Duration::from_secs(5)).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("Welcome to the note-taking app!"));

        stop.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_slow_request_head_is_dropped() {
        let (addr, stop, _handle) = start(Duration::from_millis(200)).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET / HTTP/1.1\r\nHost: loc").await.unwrap();

        // The server closes the connection; a reset counts as closed too.
        let mut buf = Vec::new();
        let closed =
            tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await;
        assert!(closed.is_ok());
        assert!(!String::from_utf8_lossy(&buf).contains("200 OK"));

        stop.send(()).unwrap();
    }
}
