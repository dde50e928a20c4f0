//! Sender configuration, read from JSON.

use crate::error::{Result, RtpError};
use crate::sender::{Destination, UnicastSender};
use logging::{LogLevel, Logger};
use serde::Deserialize;
use std::net::{SocketAddr, UdpSocket};
use std::path::Path;

/// Default file name looked up by [`SenderConfig::find_and_load`].
pub const DEFAULT_CONFIG_FILE: &str = "rtp-sender.json";

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file_path: String,
    pub log_level: String,
    pub enable_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_file_path: "rtp-sender.log".to_string(),
            log_level: "info".to_string(),
            enable_console: false,
        }
    }
}

impl LoggingConfig {
    pub fn build_logger(&self) -> Result<Logger> {
        let level: LogLevel = self.log_level.parse().unwrap_or(LogLevel::Info);
        Ok(Logger::with_console(
            &self.log_file_path,
            level,
            self.enable_console,
        )?)
    }
}

/// Where to send and which local ports to send from.
///
/// Every field is optional in the file; missing ones keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub destination: String,
    pub rtp_port: u16,
    pub rtcp_port: u16,
    pub bind_address: String,
    /// 0 lets the OS pick.
    pub local_rtp_port: u16,
    pub local_rtcp_port: u16,
    pub logging: LoggingConfig,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            destination: "127.0.0.1".to_string(),
            rtp_port: 5004,
            rtcp_port: 5005,
            bind_address: "0.0.0.0".to_string(),
            local_rtp_port: 0,
            local_rtcp_port: 0,
            logging: LoggingConfig::default(),
        }
    }
}

impl SenderConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| RtpError::Config(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = config_loader::load_config_file(path)?;
        Self::from_json(&content)
    }

    /// Searches the usual locations for [`DEFAULT_CONFIG_FILE`].
    pub fn find_and_load() -> Result<Self> {
        let content = config_loader::find_and_load(DEFAULT_CONFIG_FILE)?;
        Self::from_json(&content)
    }

    pub fn destination(&self) -> Result<Destination> {
        Destination::parse(&self.destination, self.rtp_port, self.rtcp_port)
    }

    /// Binds the local RTP and RTCP sockets.
    pub fn bind_sockets(&self) -> Result<(UdpSocket, UdpSocket)> {
        Ok((
            self.bind(self.local_rtp_port)?,
            self.bind(self.local_rtcp_port)?,
        ))
    }

    fn bind(&self, port: u16) -> Result<UdpSocket> {
        let address: SocketAddr = format!("{}:{}", self.bind_address, port)
            .parse::<SocketAddr>()
            .or_else(|_| format!("[{}]:{}", self.bind_address, port).parse::<SocketAddr>())
            .map_err(|e| {
                RtpError::Config(format!("invalid bind address '{}': {}", self.bind_address, e))
            })?;
        UdpSocket::bind(address).map_err(|e| RtpError::Io(format!("bind {}: {}", address, e)))
    }
}

impl UnicastSender {
    /// Builds a sender, its sockets and its logger from `config`.
    pub fn from_config(config: &SenderConfig) -> Result<Self> {
        let destination = config.destination()?;
        let logger = config.logging.build_logger()?;
        let (rtp_socket, rtcp_socket) = config.bind_sockets()?;
        UnicastSender::new(destination, rtp_socket, rtcp_socket, &logger)
    }
}
