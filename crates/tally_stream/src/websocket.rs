//! WebSocket transport for the streaming API.

use async_trait::async_trait;
use futures::StreamExt;
use tally_error::{StreamError, StreamErrorKind};
use tally_interface::{MessageStream, StreamConnector};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, instrument, trace};
use url::Url;

/// Path of the streaming endpoint on a Mastodon-compatible server.
const STREAMING_PATH: &str = "/api/v1/streaming";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to a Mastodon-compatible streaming endpoint over WebSocket.
///
/// # Examples
///
/// ```
/// use tally_interface::StreamConnector;
/// use tally_stream::WebSocketConnector;
///
/// let connector = WebSocketConnector::new("https://example.social", "secret", "user").unwrap();
/// assert_eq!(connector.describe(), "wss://example.social/api/v1/streaming?stream=user");
/// ```
#[derive(Clone)]
pub struct WebSocketConnector {
    endpoint: Url,
    stream: String,
    access_token: String,
}

impl std::fmt::Debug for WebSocketConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketConnector")
            .field("endpoint", &self.endpoint.as_str())
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

impl WebSocketConnector {
    /// Build a connector from the server's web URL.
    ///
    /// `http://` becomes `ws://` and `https://` becomes `wss://`; a bare host is
    /// assumed to speak TLS. A path prefix on the server URL is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the server URL uses another scheme or has no host.
    pub fn new(
        server_url: impl AsRef<str>,
        access_token: impl Into<String>,
        stream: impl Into<String>,
    ) -> Result<Self, StreamError> {
        let server_url = server_url.as_ref().trim();
        let invalid = |reason: String| StreamError::new(StreamErrorKind::InvalidUrl(reason));

        let mut endpoint = if server_url.contains("://") {
            Url::parse(server_url)
        } else {
            Url::parse(&format!("https://{}", server_url))
        }
        .map_err(|e| invalid(format!("{}: {}", server_url, e)))?;

        let scheme = match endpoint.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => {
                return Err(invalid(format!(
                    "unsupported scheme {} in {}",
                    other, server_url
                )));
            }
        };
        if endpoint.host_str().is_none_or(str::is_empty) {
            return Err(invalid(format!("server URL {} has no host", server_url)));
        }
        endpoint
            .set_scheme(scheme)
            .map_err(|()| invalid(format!("cannot use {} for {}", scheme, server_url)))?;

        let path = format!("{}{}", endpoint.path().trim_end_matches('/'), STREAMING_PATH);
        endpoint.set_path(&path);
        endpoint.set_query(None);
        endpoint.set_fragment(None);

        Ok(Self {
            endpoint,
            stream: stream.into(),
            access_token: access_token.into(),
        })
    }

    fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("stream", &self.stream)
            .append_pair("access_token", &self.access_token);
        url
    }
}

/// Owns an open socket and sends a normal close frame if dropped while open.
struct ClosingSocket {
    socket: Option<Socket>,
}

impl ClosingSocket {
    async fn next(&mut self) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
        self.socket.as_mut()?.next().await
    }

    /// The peer closed or the transport failed; nothing left to close.
    fn finished(&mut self) {
        self.socket = None;
    }
}

impl Drop for ClosingSocket {
    fn drop(&mut self) {
        let Some(mut socket) = self.socket.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        runtime.spawn(async move {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: Utf8Bytes::from_static("Shutdown"),
            };
            match socket.close(Some(frame)).await {
                Ok(()) => debug!("Sent close frame"),
                Err(e) => debug!(error = %e, "Close frame not sent"),
            }
        });
    }
}

#[async_trait]
impl StreamConnector for WebSocketConnector {
    #[instrument(skip(self), fields(endpoint = %self.describe()))]
    async fn connect(&self) -> Result<MessageStream, StreamError> {
        let (ws, response) = connect_async(self.url().as_str())
            .await
            .map_err(|e| StreamError::new(StreamErrorKind::Connect(e.to_string())))?;
        debug!(status = %response.status(), "WebSocket handshake complete");

        let mut socket = ClosingSocket { socket: Some(ws) };
        let messages = async_stream::stream! {
            while let Some(frame) = socket.next().await {
                match frame {
                    Ok(Message::Text(text)) => yield Ok(text.as_str().to_owned()),
                    Ok(Message::Close(frame)) => {
                        debug!(?frame, "Server sent close frame");
                        break;
                    }
                    Ok(_) => trace!("Ignoring non-text frame"),
                    Err(e) => {
                        socket.finished();
                        yield Err(StreamError::new(StreamErrorKind::Read(e.to_string())));
                        break;
                    }
                }
            }
            socket.finished();
        };

        Ok(messages.boxed())
    }

    fn describe(&self) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("stream", &self.stream);
        url.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;
    use tokio::net::TcpListener;

    #[test]
    fn http_becomes_ws() {
        let connector = WebSocketConnector::new("http://localhost:3000/", "t", "user").unwrap();
        assert_eq!(
            connector.url().as_str(),
            "ws://localhost:3000/api/v1/streaming?stream=user&access_token=t"
        );
    }

    #[test]
    fn bare_host_uses_tls() {
        let connector = WebSocketConnector::new("example.social", "t", "public").unwrap();
        assert!(connector.url().as_str().starts_with("wss://example.social/"));
    }

    #[test]
    fn keeps_path_prefix() {
        let connector =
            WebSocketConnector::new("https://example.social/social/", "t", "user").unwrap();
        assert_eq!(
            connector.describe(),
            "wss://example.social/social/api/v1/streaming?stream=user"
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(WebSocketConnector::new("ftp://example.social", "t", "user").is_err());
        assert!(WebSocketConnector::new("https://", "t", "user").is_err());
        assert!(WebSocketConnector::new("http:///", "t", "user").is_err());
        assert!(WebSocketConnector::new("", "t", "user").is_err());
    }

    #[test]
    fn query_values_are_encoded() {
        let connector =
            WebSocketConnector::new("https://example.social", "a b&c=d", "hashtag&tag=x").unwrap();
        let url = connector.url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("stream".to_string(), "hashtag&tag=x".to_string()),
                ("access_token".to_string(), "a b&c=d".to_string()),
            ]
        );
        assert!(!url.as_str().contains("a b&c=d"));
    }

    #[test]
    fn debug_hides_token() {
        let connector = WebSocketConnector::new("https://example.social", "secret", "user").unwrap();
        assert!(!format!("{:?}", connector).contains("secret"));
        assert!(!connector.describe().contains("secret"));
    }

    #[tokio::test]
    async fn dropping_the_stream_sends_close_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::text("hello")).await.unwrap();
            while let Some(frame) = ws.next().await {
                if let Ok(Message::Close(frame)) = frame {
                    return frame;
                }
            }
            None
        });

        let connector = WebSocketConnector::new(format!("http://{}", addr), "t", "user").unwrap();
        let mut messages = connector.connect().await.unwrap();
        assert_eq!(messages.next().await.unwrap().unwrap(), "hello");
        drop(messages);

        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(frame.code, CloseCode::Normal);
        assert_eq!(frame.reason.as_str(), "Shutdown");
    }
}
