//! Scripted gateway for end-to-end tests
//!
//! Binds a WebSocket listener on an ephemeral local port and lets each test
//! script the server side of the protocol by hand.

use anyhow::{bail, ensure, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

/// A scripted gateway bound to a local port
pub struct MockGateway {
    listener: TcpListener,
    url: String,
}

impl MockGateway {
    /// Bind on an ephemeral local port
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);
        Ok(Self { listener, url })
    }

    /// The URL clients should connect to
    #[must_use]
    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Accept one client connection
    pub async fn accept(&self) -> Result<GatewayConn> {
        let (stream, _) = self.listener.accept().await?;
        let ws = accept_async(stream).await?;
        Ok(GatewayConn { ws })
    }
}

/// One accepted gateway-side connection
pub struct GatewayConn {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayConn {
    /// Send a raw JSON frame
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Send HELLO (op 1)
    pub async fn send_hello(&mut self) -> Result<()> {
        self.send(json!({"op": 1, "data": {}})).await
    }

    /// Send READY (op 3)
    pub async fn send_ready(&mut self) -> Result<()> {
        self.send(json!({"op": 3})).await
    }

    /// Send DISCONNECT (op 4) with a reason
    pub async fn send_disconnect(&mut self, reason: &str) -> Result<()> {
        self.send(json!({"op": 4, "data": reason})).await
    }

    /// Wait for the client's IDENTIFY and return its token
    pub async fn expect_identify(&mut self) -> Result<String> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                Message::Text(text) => {
                    let value: Value = serde_json::from_str(&text)?;
                    ensure!(value["op"] == 2, "expected identify, got {value}");
                    let token = value["data"]["token"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    return Ok(token);
                }
                Message::Close(_) => bail!("client closed before identify"),
                _ => {}
            }
        }
        bail!("connection ended before identify")
    }

    /// Run the full handshake: HELLO, expect IDENTIFY, READY
    pub async fn handshake(&mut self) -> Result<String> {
        self.send_hello().await?;
        let token = self.expect_identify().await?;
        self.send_ready().await?;
        Ok(token)
    }

    /// Close the connection with a normal close frame
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
