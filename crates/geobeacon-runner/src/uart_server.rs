//! UART TCP Bridge Module
//!
//! This module exposes the beacon's GNSS UART as a TCP port. Whatever a
//! connected client writes is delivered to the location hub as received
//! serial bytes, and whatever the hub sends is written back to the client.
//!
//! Socket I/O runs on a small tokio runtime. The hub side is synchronous and
//! non-blocking: [`UartBridge`] implements [`Transport`] by draining a channel
//! filled by the connection task.

use geobeacon_hub::Transport;
use geobeacon_protocol::{CR, LF};
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

/// Depth of the channels between the socket task and the hub.
const CHANNEL_DEPTH: usize = 256;

// ============================================================================
// Sending half
// ============================================================================

/// Cloneable handle for writing lines to the connected client.
#[derive(Clone)]
pub struct UartSender {
    tx_sender: mpsc::Sender<Vec<u8>>,
    connected: Arc<AtomicBool>,
}

impl UartSender {
    /// Send `data` followed by CR LF.
    ///
    /// Only sends if a client is connected, otherwise silently drops data.
    pub fn send_line(&self, data: &[u8]) {
        if !self.is_client_connected() {
            return;
        }

        let mut line = Vec::with_capacity(data.len() + 2);
        line.extend_from_slice(data);
        line.extend_from_slice(&[CR, LF]);

        // Use try_send to avoid blocking - drop data if buffer is full
        if let Err(e) = self.tx_sender.try_send(line) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!("UART TX buffer full (client connected but slow), dropping line");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    tracing::warn!("UART TX channel closed");
                }
            }
        }
    }

    /// Check if a client is connected.
    pub fn is_client_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// A TCP port standing in for the GNSS UART.
pub struct UartBridge {
    /// Runtime driving the listener; dropping it stops the bridge.
    _runtime: Runtime,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Chunks received from the client.
    rx_receiver: mpsc::Receiver<Vec<u8>>,
    /// Bytes of the current chunk not yet handed to the hub.
    rx_pending: VecDeque<u8>,
    /// Outgoing half.
    sender: UartSender,
}

impl UartBridge {
    /// Bind the listener and start accepting clients.
    ///
    /// Port 0 picks a free port; see [`local_addr`](Self::local_addr).
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("uart-bridge")
            .enable_all()
            .build()?;

        let listener = runtime.block_on(TcpListener::bind(addr))?;
        let local_addr = listener.local_addr()?;

        let (tx_sender, tx_receiver) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);
        let (rx_sender, rx_receiver) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);
        let connected = Arc::new(AtomicBool::new(false));

        let task_connected = Arc::clone(&connected);
        runtime.spawn(async move {
            if let Err(e) = run_uart_listener(listener, tx_receiver, rx_sender, task_connected).await {
                tracing::error!("UART listener error on {}: {}", local_addr, e);
            }
        });

        Ok(UartBridge {
            _runtime: runtime,
            local_addr,
            rx_receiver,
            rx_pending: VecDeque::new(),
            sender: UartSender {
                tx_sender,
                connected,
            },
        })
    }

    /// Address the bridge listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A handle for sending lines from outside the hub.
    pub fn sender(&self) -> UartSender {
        self.sender.clone()
    }

    /// Check if a client is connected.
    pub fn is_client_connected(&self) -> bool {
        self.sender.is_client_connected()
    }
}

impl Transport for UartBridge {
    fn receive(&mut self) -> Option<u8> {
        if self.rx_pending.is_empty() {
            if let Ok(chunk) = self.rx_receiver.try_recv() {
                self.rx_pending.extend(chunk);
            }
        }
        self.rx_pending.pop_front()
    }

    fn send(&mut self, data: &[u8]) {
        self.sender.send_line(data);
    }
}

/// Accept clients one at a time for the lifetime of the bridge.
async fn run_uart_listener(
    listener: TcpListener,
    mut tx_receiver: mpsc::Receiver<Vec<u8>>,
    rx_sender: mpsc::Sender<Vec<u8>>,
    connected: Arc<AtomicBool>,
) -> io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        tracing::info!("UART client connected from {}", peer_addr);

        // Drop anything queued for a previous client.
        while tx_receiver.try_recv().is_ok() {}
        connected.store(true, Ordering::Release);

        let result = handle_uart_connection(stream, &mut tx_receiver, &rx_sender).await;

        connected.store(false, Ordering::Release);
        match result {
            Ok(()) => tracing::info!("UART client {} disconnected", peer_addr),
            Err(e) => tracing::warn!("UART connection error with {}: {}", peer_addr, e),
        }
    }
}

/// Handle a single UART TCP connection.
async fn handle_uart_connection(
    mut stream: TcpStream,
    tx_receiver: &mut mpsc::Receiver<Vec<u8>>,
    rx_sender: &mpsc::Sender<Vec<u8>>,
) -> io::Result<()> {
    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 1024];

    loop {
        tokio::select! {
            // Read from TCP client -> hub RX
            result = reader.read(&mut read_buf) => {
                match result {
                    Ok(0) => return Ok(()),
                    Ok(n) => {
                        if rx_sender.send(read_buf[..n].to_vec()).await.is_err() {
                            // Bridge dropped
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(e),
                }
            }

            // Hub TX -> TCP client
            Some(data) = tx_receiver.recv() => {
                writer.write_all(&data).await?;
                writer.flush().await?;
            }
        }
    }
}
