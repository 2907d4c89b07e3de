//! Deployment-tunable knobs (spec.md §6.5), collected into one struct so
//! `GatewayRuntime::new` takes a single value instead of a long parameter list.

use std::time::Duration;

use crate::constants::*;
use crate::correction_aggregator::AggregatorConfig;
use crate::frame_finder::FrameLimits;

#[derive(Debug, Clone, Copy)]
pub struct GatewayConfig {
    pub min_emit_interval_ms: u64,
    pub rxm_cor_stale_s: f64,
    pub nav_sat_stale_s: f64,
    pub nav_pvt_stale_s: f64,
    pub max_buffer_bytes: usize,
    pub max_frames_per_drain: usize,
    pub rate_window_s: f64,
    pub ubx_max_payload: u16,
    pub rtcm_max_payload: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            min_emit_interval_ms: MIN_EMIT_INTERVAL_MS_DEFAULT,
            rxm_cor_stale_s: RXM_COR_STALE_S_DEFAULT,
            nav_sat_stale_s: NAV_SAT_STALE_S_DEFAULT,
            nav_pvt_stale_s: NAV_PVT_STALE_S_DEFAULT,
            max_buffer_bytes: MAX_BUFFER_BYTES_DEFAULT,
            max_frames_per_drain: MAX_FRAMES_PER_DRAIN_DEFAULT,
            rate_window_s: RATE_WINDOW_S_DEFAULT,
            ubx_max_payload: UBX_MAX_PAYLOAD_DEFAULT,
            rtcm_max_payload: RTCM_MAX_PAYLOAD_DEFAULT,
        }
    }
}

impl GatewayConfig {
    pub fn frame_limits(&self) -> FrameLimits {
        FrameLimits {
            ubx_max_payload: self.ubx_max_payload,
            rtcm_max_payload: self.rtcm_max_payload,
        }
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            min_emit_interval: Duration::from_millis(self.min_emit_interval_ms),
            rxm_cor_stale: Duration::from_secs_f64(self.rxm_cor_stale_s),
            nav_sat_stale: Duration::from_secs_f64(self.nav_sat_stale_s),
            nav_pvt_stale: Duration::from_secs_f64(self.nav_pvt_stale_s),
        }
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs_f64(self.rate_window_s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.min_emit_interval_ms, 1000);
        assert_eq!(cfg.max_buffer_bytes, 1024 * 1024);
        assert_eq!(cfg.max_frames_per_drain, 50);
    }
}
