use crate::config::TransportConfig;
use crate::transport::TransportError;
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// One TCP connection with an adaptive receive policy
///
/// Bytes that arrive on the socket are pulled into `pending` without
/// blocking; `await_bytes` reports how many are waiting and `take` hands
/// them to the caller.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: String,
    settings: TransportConfig,
    pending: Vec<u8>,
    peer_closed: bool,
}

/// Opens a connection to `address:port`
///
/// # Arguments
///
/// * `address` - Host name or IP address
/// * `port` - TCP port
/// * `settings` - Receive pacing and connect timeout
///
/// # Returns
///
/// * `Ok(Connection)` - Connected
/// * `Err(TransportError)` - Resolution or connection failed, or timed out
pub async fn connect(
    address: &str,
    port: u16,
    settings: &TransportConfig,
) -> Result<Connection, TransportError> {
    let peer = format!("{}:{}", address, port);
    tracing::debug!("Connecting to {}", peer);

    let stream = match tokio::time::timeout(
        settings.connect_timeout(),
        TcpStream::connect((address, port)),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(TransportError::Connect { peer, source }),
        Err(_) => return Err(TransportError::ConnectTimeout { peer }),
    };

    Ok(Connection {
        stream,
        peer,
        settings: settings.clone(),
        pending: Vec::new(),
        peer_closed: false,
    })
}

impl Connection {
    /// Writes the whole request
    pub async fn send(&mut self, request: &[u8]) -> Result<(), TransportError> {
        tracing::trace!("Sending {} bytes to {}", request.len(), self.peer);
        let result = async {
            self.stream.write_all(request).await?;
            self.stream.flush().await
        }
        .await;

        result.map_err(|source| TransportError::Send {
            peer: self.peer.clone(),
            source,
        })
    }

    /// Waits until bytes are available or the idle policy gives up
    ///
    /// Polls the waiting byte count every `poll_interval`. Returns the count
    /// after `idle_polls` consecutive polls without change, as soon as it
    /// reaches the receive buffer capacity, or once the peer has closed the
    /// stream. A return of zero means nothing more arrived for now.
    pub async fn await_bytes(&mut self) -> Result<usize, TransportError> {
        let capacity = self.settings.receive_buffer;

        self.pull()?;
        let mut size = self.pending.len();
        let mut previous = 0;
        let mut idle = 0;

        while idle < self.settings.idle_polls && size < capacity && !self.peer_closed {
            if previous == size {
                tokio::time::sleep(self.settings.poll_interval()).await;
                idle += 1;
            } else {
                idle = 0;
            }
            previous = size;

            self.pull()?;
            size = self.pending.len();
        }

        tracing::trace!("{} bytes waiting from {}", size, self.peer);
        Ok(size)
    }

    /// Hands over every byte received so far
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    /// One receive cycle: `await_bytes` followed by `take`
    ///
    /// An empty result means the peer made no forward progress.
    pub async fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        self.await_bytes().await?;
        Ok(self.take())
    }

    /// Returns true once the peer has closed its side of the stream
    pub fn is_closed(&self) -> bool {
        self.peer_closed
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Moves whatever the socket holds into `pending`, up to capacity
    fn pull(&mut self) -> Result<(), TransportError> {
        let capacity = self.settings.receive_buffer;

        while !self.peer_closed && self.pending.len() < capacity {
            let start = self.pending.len();
            self.pending.resize(capacity, 0);

            match self.stream.try_read(&mut self.pending[start..]) {
                Ok(0) => {
                    self.pending.truncate(start);
                    self.peer_closed = true;
                    tracing::debug!("{} closed the connection", self.peer);
                }
                Ok(n) => self.pending.truncate(start + n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.pending.truncate(start);
                    break;
                }
                Err(source) => {
                    self.pending.truncate(start);
                    return Err(TransportError::Receive {
                        peer: self.peer.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}
