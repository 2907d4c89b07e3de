//! `RadioSink` adapter over `serialport` for the correction-radio link
//! (spec.md §6.3). Outbound writes go straight through; inbound bytes are
//! read on a dedicated background thread and handed to
//! `GatewayRuntime::run_radio_bridge` over a channel, matching spec.md §6.3's
//! `on_receive(callback(bytes))` event shape without blocking the bridge
//! thread on the radio read.

use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use gateway_core::RadioSink;
use tracing::warn;

pub struct SerialRadioSink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialRadioSink {
    pub fn open(path: &str, baud: u32) -> anyhow::Result<(Self, crossbeam_channel::Receiver<Vec<u8>>)> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(200))
            .open()
            .map_err(|e| anyhow::anyhow!("failed to open radio port {path}: {e}"))?;
        let mut reader = port.try_clone()?;
        let (tx, rx) = crossbeam_channel::bounded(256);
        thread::Builder::new()
            .name("gateway-radio-reader".into())
            .spawn(move || {
                let mut buf = [0u8; 1024];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => continue,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        },
                        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                        Err(e) => {
                            warn!(error = %e, "radio port read failed, stopping reader");
                            break;
                        },
                    }
                }
            })
            .expect("failed to spawn radio reader thread");
        Ok((Self { port }, rx))
    }
}

impl RadioSink for SerialRadioSink {
    fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.port.write_all(bytes)
    }
}
