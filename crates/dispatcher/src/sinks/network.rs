//! UdpSink - fire-and-forget datagrams

use std::net::UdpSocket;

use contracts::{Closable, ContractError, Sink};
use tracing::{debug, instrument, warn};

/// Largest payload sent in one datagram; longer lines are rejected
pub const MAX_DATAGRAM: usize = 65000;

/// Sink that sends each formatted line as one UDP datagram
pub struct UdpSink {
    name: String,
    addr: String,
    socket: Option<UdpSocket>,
}

impl UdpSink {
    /// Bind an ephemeral local port and connect it to `addr`
    #[instrument(name = "udp_sink_connect", skip(name))]
    pub fn connect(name: impl Into<String>, addr: &str) -> std::io::Result<Self> {
        let name = name.into();
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(addr)?;

        debug!(sink = %name, target = %addr, "UdpSink connected");

        Ok(Self {
            name,
            addr: addr.to_string(),
            socket: Some(socket),
        })
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket is closed"))
    }
}

impl Sink for UdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let bytes = text.as_bytes();
        if bytes.len() > MAX_DATAGRAM {
            warn!(
                sink = %self.name,
                len = bytes.len(),
                max = MAX_DATAGRAM,
                "Line too long for one datagram"
            );
            return Err(ContractError::sink_write(
                &self.name,
                format!("{} bytes exceed the {MAX_DATAGRAM} byte datagram limit", bytes.len()),
            ));
        }
        socket
            .send(bytes)
            .map(|_| ())
            .map_err(|e| ContractError::SinkConnection {
                sink_name: self.name.clone(),
                message: e.to_string(),
            })
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("udp {}", self.addr)
    }
}

impl Closable for UdpSink {
    fn close(&mut self) -> Result<(), ContractError> {
        if self.socket.take().is_some() {
            debug!(sink = %self.name, "UdpSink closed");
        }
        Ok(())
    }
}
