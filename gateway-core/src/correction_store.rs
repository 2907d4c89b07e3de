//! C4 — CorrectionStore: single-writer-per-slot last-value store for the
//! three correction-relevant message kinds (spec.md §3, §4.4).
//!
//! Grounded on the teacher's `Device` navpos/navvel/navstatus slot fields
//! (`ublox-device` example), generalized into one `parking_lot`-guarded
//! struct since the slots here are written from decoder call sites rather
//! than a single polling loop.

use parking_lot::Mutex;

use crate::decoders::rxm::{RxmCor, RxmCorSource};
use crate::events::{CarrierSolution, EventTimestamp, PositionFix, SatelliteSnapshot};

#[derive(Debug, Clone, Copy)]
pub struct RxmCorSnapshot {
    pub valid: bool,
    pub stale: bool,
    pub sbas: bool,
    pub rtcm: bool,
    pub spartn: bool,
    pub age_ms: u32,
    pub received_at: EventTimestamp,
}

impl RxmCorSnapshot {
    /// Priority among the bits this single message can carry: SPARTN > RTCM > SBAS.
    pub fn priority_source(&self) -> RxmCorSource {
        if self.spartn {
            RxmCorSource::Spartn
        } else if self.rtcm {
            RxmCorSource::Rtcm
        } else if self.sbas {
            RxmCorSource::Sbas
        } else {
            RxmCorSource::None
        }
    }
}

impl From<&RxmCor> for RxmCorSnapshot {
    fn from(cor: &RxmCor) -> Self {
        Self {
            valid: cor.valid,
            stale: cor.stale,
            sbas: cor.sbas,
            rtcm: cor.rtcm,
            spartn: cor.spartn,
            age_ms: cor.age_ms,
            received_at: cor.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NavSatDerivedSnapshot {
    pub sbas_in_use: bool,
    pub diff_corr_in_use: bool,
    pub diff_corr_satellites: u32,
    pub received_at: EventTimestamp,
}

impl From<&SatelliteSnapshot> for NavSatDerivedSnapshot {
    fn from(snap: &SatelliteSnapshot) -> Self {
        Self {
            sbas_in_use: snap.sbas_in_use,
            diff_corr_in_use: snap.diff_corr_in_use,
            diff_corr_satellites: snap.diff_corr_count,
            received_at: snap.timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NavPvtCorrSnapshot {
    pub diff_soln: bool,
    pub carrier_solution: CarrierSolution,
    pub diff_age_ms: Option<u16>,
    pub received_at: EventTimestamp,
}

impl From<&PositionFix> for NavPvtCorrSnapshot {
    fn from(fix: &PositionFix) -> Self {
        Self {
            diff_soln: fix.diff_soln,
            carrier_solution: fix.carr_soln,
            diff_age_ms: fix.diff_age_ms,
            received_at: fix.timestamp,
        }
    }
}

/// A consistent read of all three slots at once (spec.md §3 "no torn snapshot").
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionSnapshot {
    pub rxm_cor: Option<RxmCorSnapshot>,
    pub nav_sat: Option<NavSatDerivedSnapshot>,
    pub nav_pvt: Option<NavPvtCorrSnapshot>,
}

#[derive(Default)]
struct Slots {
    rxm_cor: Option<RxmCorSnapshot>,
    nav_sat: Option<NavSatDerivedSnapshot>,
    nav_pvt: Option<NavPvtCorrSnapshot>,
}

pub struct CorrectionStore {
    slots: Mutex<Slots>,
}

impl Default for CorrectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrectionStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn write_rxm_cor(&self, cor: &RxmCor) {
        self.slots.lock().rxm_cor = Some(RxmCorSnapshot::from(cor));
    }

    pub fn write_nav_sat(&self, snap: &SatelliteSnapshot) {
        self.slots.lock().nav_sat = Some(NavSatDerivedSnapshot::from(snap));
    }

    pub fn write_nav_pvt(&self, fix: &PositionFix) {
        self.slots.lock().nav_pvt = Some(NavPvtCorrSnapshot::from(fix));
    }

    /// Read all three slots under one lock acquisition so the result is a
    /// consistent triple rather than three independently-racing reads.
    pub fn snapshot(&self) -> CorrectionSnapshot {
        let slots = self.slots.lock();
        CorrectionSnapshot {
            rxm_cor: slots.rxm_cor,
            nav_sat: slots.nav_sat,
            nav_pvt: slots.nav_pvt,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::EventTimestamp;

    fn rxm_cor(spartn: bool) -> RxmCor {
        RxmCor {
            version: 0,
            valid: true,
            stale: false,
            sbas: false,
            rtcm: false,
            spartn,
            msg_type: 0,
            sub_type: 0,
            num_msgs: 1,
            age_ms: 1500,
            timestamp: EventTimestamp::now(),
        }
    }

    #[test]
    fn snapshot_is_empty_before_any_write() {
        let store = CorrectionStore::new();
        let snap = store.snapshot();
        assert!(snap.rxm_cor.is_none());
        assert!(snap.nav_sat.is_none());
        assert!(snap.nav_pvt.is_none());
    }

    #[test]
    fn each_slot_is_independently_writable() {
        let store = CorrectionStore::new();
        store.write_rxm_cor(&rxm_cor(true));
        let snap = store.snapshot();
        assert!(snap.rxm_cor.is_some());
        assert!(snap.nav_sat.is_none());
    }

    #[test]
    fn later_write_to_a_slot_replaces_the_earlier_one() {
        let store = CorrectionStore::new();
        store.write_rxm_cor(&rxm_cor(true));
        store.write_rxm_cor(&rxm_cor(false));
        let snap = store.snapshot().rxm_cor.unwrap();
        assert_eq!(snap.priority_source(), RxmCorSource::None);
    }
}
