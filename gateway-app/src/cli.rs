//! Command-line arguments (spec.md §6.5's tunables stay at their library
//! defaults here; this surface only covers what port to open).
//!
//! Grounded on the teacher's `ublox-device::cli` (serial port/baud/parity
//! arguments for its own example binaries), reworked from `clap::Command`'s
//! builder API into `clap::Parser` derive since this binary has no
//! configuration subcommand to justify the builder's extra flexibility.

use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gateway-app", about = "GNSS telemetry gateway over a u-blox receiver")]
pub struct Cli {
    /// Serial device connected to the u-blox receiver.
    #[arg(long)]
    pub port: String,

    /// Baud rate for the receiver's serial port.
    #[arg(long, default_value_t = 460_800)]
    pub baud: u32,

    /// Serial device for the correction radio link (SPARTN/RTCM inbound and
    /// outbound). Omit to run without a radio bridge.
    #[arg(long)]
    pub radio_port: Option<String>,

    /// Baud rate for the radio serial port.
    #[arg(long, default_value_t = 115_200)]
    pub radio_baud: u32,

    /// Serial read timeout (spec.md §5: "short timeout... only to permit
    /// cancellation checks").
    #[arg(long, default_value_t = 200)]
    pub read_timeout_ms: u64,
}

impl Cli {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
