//! Binary entry point: opens the receiver's serial port (and, optionally, a
//! correction-radio port), and runs the actor graph spec.md §5 describes.
//!
//! Grounded on `ublox-device`/`ublox-tui`'s `clap` + `serialport` +
//! `tracing`/`tracing-subscriber` pairing for CLI binaries in the teacher's
//! own `examples/` workspace.

mod cli;
mod radio_sink;
mod serial_source;

use std::thread;
use std::time::Duration;

use clap::Parser;
use gateway_core::{EventSink, GatewayConfig, GatewayRuntime, TypedEvent};
use tracing::{debug, error, info, trace};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use radio_sink::SerialRadioSink;
use serial_source::SerialByteSource;

/// Publishes every event as a structured log line. A deployment that needs
/// the telemetry elsewhere (a message bus, a dashboard) swaps this out for
/// its own `EventSink`; `gateway-core` has no opinion on the destination.
struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&mut self, event: TypedEvent) {
        match event {
            TypedEvent::CorrectionStatusUpdate(status, _) => info!(
                source = status.source.label(),
                label = status.status_label,
                valid = status.valid,
                stale = status.stale,
                age_ms = ?status.age_ms,
                "correction status"
            ),
            TypedEvent::PvtUpdate(fix) => info!(
                lat = fix.lat_deg,
                lon = fix.lon_deg,
                num_sv = fix.num_sv,
                label = fix.label,
                utc = format!(
                    "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                    fix.year, fix.month, fix.day, fix.hour, fix.min, fix.sec
                ),
                utc_resolved = fix.valid_date && fix.valid_time && fix.fully_resolved,
                "position fix"
            ),
            TypedEvent::ReferenceStationPosition(station) => info!(
                station_id = station.station_id,
                lat = station.lat_deg,
                lon = station.lon_deg,
                "reference station position"
            ),
            TypedEvent::MessageRatesUpdate(rates) => {
                for (key, rate) in &rates.rates {
                    debug!(key, rate, "message rate");
                }
            },
            TypedEvent::DataRatesUpdate(rates) => debug!(
                inbound_kbps = rates.inbound_kbps,
                outbound_kbps = rates.outbound_kbps,
                "data rate"
            ),
            other => trace!(?other, "event"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let runtime = GatewayRuntime::new(GatewayConfig::default());

    let receiver = SerialByteSource::open(&cli.port, cli.baud, cli.read_timeout())?;
    let receiver_sink = receiver.try_clone_sink()?;
    let radio = match &cli.radio_port {
        Some(path) => Some(SerialRadioSink::open(path, cli.radio_baud)?),
        None => {
            info!("no --radio-port given, running without an outbound correction radio");
            None
        },
    };

    thread::scope(|scope| {
        let rt = &runtime;

        scope.spawn(move || {
            if let Err(e) = rt.run_ingestion(receiver, TracingEventSink) {
                error!(error = %e, "ingestion actor stopped");
            }
            rt.cancellation().cancel();
        });

        scope.spawn(move || rt.run_rate_publisher(TracingEventSink));
        scope.spawn(move || rt.run_correction_timer(TracingEventSink, Duration::from_millis(500)));

        if let Some((radio_sink, inbound)) = radio {
            scope.spawn(move || rt.run_radio_bridge(radio_sink, receiver_sink, inbound));
        }
    });

    Ok(())
}
