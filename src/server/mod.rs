//! Command server — accepts TLS connections and runs one session per
//! connection.
//!
//! ```text
//!            ┌──────────────┐   accept    ┌─────────────────────┐
//!  client ──▶│ TcpListener  │────────────▶│ session thread (1:N) │
//!            └──────────────┘             │  recv → decode →     │
//!                                         │  dispatch → respond  │
//!                                         └──────────┬───────────┘
//!                                                    ▼
//!                                             DeviceHandle
//! ```
//!
//! Sessions share nothing with each other; the device backend is reached
//! through the worker handle, which serialises hardware access.

pub mod session;

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::config::DaemonConfig;
use crate::device::DeviceHandle;
use crate::error::{ConfigError, TransportError};
use crate::transport::tls;

/// The accept loop and its per-deployment parameters.
pub struct CommandServer {
    config: DaemonConfig,
    tls: Arc<rustls::ServerConfig>,
    device: DeviceHandle,
}

impl CommandServer {
    /// Load TLS material and prepare the server. Certificate/key failures
    /// are fatal here, before any connection is accepted.
    pub fn new(config: DaemonConfig, device: DeviceHandle) -> Result<Self, ConfigError> {
        let tls = tls::server_config(&config.cert_file, &config.key_file)?;
        Ok(Self {
            config,
            tls,
            device,
        })
    }

    /// Bind and serve until the listener fails. Each accepted connection
    /// gets its own thread; faults on one session never touch another.
    pub fn run(&self) -> Result<(), TransportError> {
        let listener =
            TcpListener::bind((self.config.bind_addr.as_str(), self.config.port))?;
        info!(
            "listening on {}:{}",
            self.config.bind_addr, self.config.port
        );

        loop {
            let (tcp, peer) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };

            let tls = Arc::clone(&self.tls);
            let device = self.device.clone();
            let max_line = self.config.max_line;
            let builder = thread::Builder::new().name(format!("session-{peer}"));
            let spawned = builder.spawn(move || match tls::accept(tls, tcp) {
                Ok(channel) => session::run(channel, &device, max_line, &peer.to_string()),
                Err(e) => warn!("{peer}: TLS session setup failed: {e}"),
            });
            if let Err(e) = spawned {
                warn!("{peer}: could not spawn session thread: {e}");
            }
        }
    }
}
