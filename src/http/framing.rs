use std::future::Future;
use std::io;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Default pause that ends a request.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(1);

const READ_CHUNK: usize = 1024;

/// Decides where one inbound request ends.
///
/// An empty frame means the peer sent nothing and the connection is closed
/// without a response.
pub trait FrameReader: Send + Sync + 'static {
    fn read_frame<S>(&self, stream: &mut S) -> impl Future<Output = io::Result<Bytes>> + Send
    where
        S: AsyncRead + Unpin + Send;
}

/// Treats a pause in the byte stream as the end of the request.
///
/// Each read attempt gets `idle` to produce data. A read that times out or
/// hits end of stream finishes the frame; any other I/O error is returned.
/// There is no overall deadline, so a client that keeps trickling bytes
/// faster than `idle` keeps the frame open. Requests split across pauses
/// longer than `idle` are cut short.
#[derive(Debug, Clone)]
pub struct IdleTimeoutFraming {
    idle: Duration,
    chunk: usize,
}

impl IdleTimeoutFraming {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            chunk: READ_CHUNK,
        }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }
}

impl Default for IdleTimeoutFraming {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl FrameReader for IdleTimeoutFraming {
    async fn read_frame<S>(&self, stream: &mut S) -> io::Result<Bytes>
    where
        S: AsyncRead + Unpin + Send,
    {
        let mut buffer = BytesMut::with_capacity(self.chunk);

        loop {
            buffer.reserve(self.chunk);

            match timeout(self.idle, stream.read_buf(&mut buffer)).await {
                // Deadline passed with nothing new
                Err(_) => break,
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {}
                Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => break,
                Ok(Err(e)) => return Err(e),
            }
        }

        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn stops_at_end_of_stream() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        drop(client);

        let frame = IdleTimeoutFraming::default()
            .read_frame(&mut server)
            .await
            .unwrap();

        assert_eq!(&frame[..], b"GET / HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn stops_when_peer_goes_quiet() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(b"partial").await.unwrap();

        let frame = IdleTimeoutFraming::new(Duration::from_millis(20))
            .read_frame(&mut server)
            .await
            .unwrap();

        assert_eq!(&frame[..], b"partial");
        drop(client);
    }
}
