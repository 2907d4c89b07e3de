//! `ByteSource`/`ByteSink` adapters over `serialport` for the u-blox
//! receiver connection (spec.md §6.2).
//!
//! Grounded on `ublox-device::Device::read_port`: a serial read that folds a
//! `TimedOut` error into `Ok(0)` rather than propagating it, so the
//! ingestion actor's timeout-driven cancellation check (spec.md §5) never
//! mistakes a read timeout for a fatal byte-source error.

use std::io::{Read, Write};
use std::time::Duration;

use gateway_core::{ByteSink, ByteSource};

pub struct SerialByteSource {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialByteSource {
    pub fn open(path: &str, baud: u32, read_timeout: Duration) -> anyhow::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(read_timeout)
            .open()
            .map_err(|e| anyhow::anyhow!("failed to open receiver port {path}: {e}"))?;
        Ok(Self { port })
    }

    /// An independent handle to the same underlying port (spec.md §6.2
    /// "write(bytes)... for inbound RTCM injection"), so the inbound radio
    /// reader activity can write into the receiver from its own thread
    /// while the ingestion actor owns the read side.
    pub fn try_clone_sink(&self) -> anyhow::Result<SerialByteSink> {
        Ok(SerialByteSink {
            port: self.port.try_clone()?,
        })
    }
}

impl ByteSource for SerialByteSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct SerialByteSink {
    port: Box<dyn serialport::SerialPort>,
}

impl ByteSink for SerialByteSink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.port.write_all(bytes)
    }
}
