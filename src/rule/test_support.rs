//! 测试用本地 SOCKS5 代理，直接以固定的 HTTP 响应应答所有请求
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 本地 SOCKS5 + HTTP 桩服务
pub(crate) struct StubProxy {
    pub port: u16,
    requests: Arc<AtomicUsize>,
}

impl StubProxy {
    /// 启动桩服务，所有请求都返回 `status` 与 `body`
    pub async fn start(status: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    let _ = serve(socket, &counter, status, body).await;
                });
            }
        });

        Self { port, requests }
    }

    /// 已应答的 HTTP 请求数
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn serve(
    mut socket: TcpStream,
    counter: &AtomicUsize,
    status: &str,
    body: &str,
) -> std::io::Result<()> {
    // 握手：VER NMETHODS METHODS，回复无需认证
    let mut head = [0u8; 2];
    socket.read_exact(&mut head).await?;
    let mut methods = vec![0u8; head[1] as usize];
    socket.read_exact(&mut methods).await?;
    socket.write_all(&[0x05, 0x00]).await?;

    // 请求：VER CMD RSV ATYP DST.ADDR DST.PORT
    let mut request = [0u8; 4];
    socket.read_exact(&mut request).await?;
    let addr_len = match request[3] {
        0x01 => 4,
        0x04 => 16,
        _ => socket.read_u8().await? as usize,
    };
    let mut addr = vec![0u8; addr_len + 2];
    socket.read_exact(&mut addr).await?;
    socket
        .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .await?;

    // 读完请求头后返回固定响应
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    counter.fetch_add(1, Ordering::SeqCst);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}
