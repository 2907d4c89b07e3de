//! C7 — RateMeter: rolling per-message-type frequency and byte-rate counters
//! (spec.md §4.7).
//!
//! Styled like the teacher's `UbxFletcher`/`UbxChecksumCalc`
//! small-owned-state-with-update-method shape, generalized to a map of
//! per-key timestamp queues plus a reset-on-read byte accumulator.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::events::{DataRates, EventTimestamp, MessageRates};

struct KeyCounter {
    timestamps: Vec<Instant>,
}

impl KeyCounter {
    fn new() -> Self {
        Self { timestamps: Vec::new() }
    }

    fn observe(&mut self, now: Instant) {
        self.timestamps.push(now);
    }

    fn evict_before(&mut self, cutoff: Instant) {
        self.timestamps.retain(|&t| t >= cutoff);
    }
}

struct Inner {
    counters: HashMap<String, KeyCounter>,
    inbound_bytes: u64,
    outbound_bytes: u64,
    last_byte_reset: Instant,
}

pub struct RateMeter {
    window: Duration,
    inner: Mutex<Inner>,
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inner: Mutex::new(Inner {
                counters: HashMap::new(),
                inbound_bytes: 0,
                outbound_bytes: 0,
                last_byte_reset: Instant::now(),
            }),
        }
    }

    /// Record one observation of `key` at `now` (spec.md §4.7).
    pub fn observe(&self, key: &str, now: Instant) {
        let mut inner = self.inner.lock();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        let counter = inner
            .counters
            .entry(key.to_string())
            .or_insert_with(KeyCounter::new);
        counter.observe(now);
        counter.evict_before(cutoff);
    }

    pub fn record_inbound_bytes(&self, n: u64) {
        self.inner.lock().inbound_bytes += n;
    }

    pub fn record_outbound_bytes(&self, n: u64) {
        self.inner.lock().outbound_bytes += n;
    }

    /// Snapshot current rates (count/window_seconds) for every observed key,
    /// evicting stale entries first.
    pub fn message_rates(&self, now: Instant) -> MessageRates {
        let mut inner = self.inner.lock();
        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        let window_s = self.window.as_secs_f64();
        let mut rates = Vec::with_capacity(inner.counters.len());
        for (key, counter) in inner.counters.iter_mut() {
            counter.evict_before(cutoff);
            rates.push((key.clone(), counter.timestamps.len() as f64 / window_s));
        }
        rates.sort_by(|a, b| a.0.cmp(&b.0));
        MessageRates {
            rates,
            timestamp: EventTimestamp::now(),
        }
    }

    /// Consume accumulated byte counts since the last call and report kbps,
    /// normalized by elapsed wall time (spec.md §4.7 "periodic (1 Hz) reset").
    pub fn data_rates(&self, now: Instant) -> DataRates {
        let mut inner = self.inner.lock();
        let elapsed = now.saturating_duration_since(inner.last_byte_reset).as_secs_f64();
        let elapsed = if elapsed > 0.0 { elapsed } else { 1.0 };
        let inbound_kbps = (inner.inbound_bytes as f64 * 8.0 / 1000.0) / elapsed;
        let outbound_kbps = (inner.outbound_bytes as f64 * 8.0 / 1000.0) / elapsed;
        inner.inbound_bytes = 0;
        inner.outbound_bytes = 0;
        inner.last_byte_reset = now;
        DataRates {
            inbound_kbps,
            outbound_kbps,
            timestamp: EventTimestamp::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rate_reflects_observation_count_within_window() {
        let meter = RateMeter::new(Duration::from_secs(5));
        let t0 = Instant::now();
        for i in 0..10 {
            meter.observe("UBX.NAV_PVT", t0 + Duration::from_millis(i * 100));
        }
        let rates = meter.message_rates(t0 + Duration::from_millis(900));
        let (_, rate) = rates.rates.iter().find(|(k, _)| k == "UBX.NAV_PVT").unwrap();
        assert_eq!(*rate, 10.0 / 5.0);
    }

    #[test]
    fn old_observations_are_evicted_outside_the_window() {
        let meter = RateMeter::new(Duration::from_secs(5));
        let t0 = Instant::now();
        meter.observe("NMEA.GPGGA", t0);
        let rates = meter.message_rates(t0 + Duration::from_secs(6));
        let (_, rate) = rates.rates.iter().find(|(k, _)| k == "NMEA.GPGGA").unwrap();
        assert_eq!(*rate, 0.0);
    }

    #[test]
    fn data_rate_resets_accumulator_each_call() {
        let meter = RateMeter::new(Duration::from_secs(5));
        let t0 = Instant::now();
        meter.record_inbound_bytes(1000);
        let rates = meter.data_rates(t0 + Duration::from_secs(1));
        assert!(rates.inbound_kbps > 0.0);
        let rates2 = meter.data_rates(t0 + Duration::from_secs(2));
        assert_eq!(rates2.inbound_kbps, 0.0);
    }

    #[test]
    fn distinct_keys_tracked_independently() {
        let meter = RateMeter::new(Duration::from_secs(5));
        let t0 = Instant::now();
        meter.observe("UBX.NAV_PVT", t0);
        meter.observe("RTCM3.1005", t0);
        meter.observe("RTCM3.1005", t0 + Duration::from_millis(10));
        let rates = meter.message_rates(t0 + Duration::from_millis(20));
        let pvt = rates.rates.iter().find(|(k, _)| k == "UBX.NAV_PVT").unwrap().1;
        let rtcm = rates.rates.iter().find(|(k, _)| k == "RTCM3.1005").unwrap().1;
        assert_eq!(pvt, 1.0 / 5.0);
        assert_eq!(rtcm, 2.0 / 5.0);
    }
}
