//! IO buffer tests: stack drain order and telemetry freshness tracking.
use super::*;

fn tagged_frame(id: u32) -> Frame {
    Frame {
        id,
        len: 8,
        data: [0; 8],
    }
}

//==================================================================================TxStack

#[test]
fn stack_drains_in_reverse_push_order() {
    let mut tx = TxStack::new();
    tx.push(tagged_frame(0x42C));
    tx.push(tagged_frame(0x45C));
    tx.push(tagged_frame(0x368));

    assert_eq!(tx.len(), 3);
    assert_eq!(tx.pop().map(|f| f.id), Some(0x368));
    assert_eq!(tx.pop().map(|f| f.id), Some(0x45C));
    assert_eq!(tx.pop().map(|f| f.id), Some(0x42C));
    assert_eq!(tx.pop(), None);
}

#[test]
fn stack_clear_discards_pending_frames() {
    let mut tx = TxStack::new();
    tx.push(tagged_frame(0x42C));
    tx.push(tagged_frame(0x45C));

    tx.clear();

    assert!(tx.is_empty());
    assert_eq!(tx.pop(), None);
}

#[test]
fn stack_starts_broadcasting() {
    let tx = TxStack::new();
    assert!(tx.enable_broadcast);
    assert!(tx.is_empty());
}

//==================================================================================RxMonitor

#[test]
fn readiness_requires_every_group() {
    let mut rx = RxMonitor::new();
    rx.timer_ms = 500;

    let groups = [
        TelemetryGroup::AcFeedback,
        TelemetryGroup::Status,
        TelemetryGroup::DcFeedback,
        TelemetryGroup::Temperature,
    ];
    for group in groups {
        rx.note_frame(Some(group));
        assert!(!rx.has_frames());
    }
    // Partial telemetry does not rearm the timeout.
    assert_eq!(rx.timer_ms, 500);

    rx.note_frame(Some(TelemetryGroup::ThermalLimit));
    assert!(rx.has_frames());
    assert_eq!(rx.recv_flags(), TELEMETRY_COMPLETE_MASK);
    assert_eq!(rx.timer_ms, 0);
}

#[test]
fn auxiliary_frames_never_complete_the_mask() {
    let mut rx = RxMonitor::new();

    rx.note_frame(None);

    assert_eq!(rx.recv_flags(), 0);
    assert!(!rx.has_frames());
}

#[test]
fn auxiliary_frames_refresh_a_complete_set() {
    let mut rx = RxMonitor::new();
    let groups = [
        TelemetryGroup::AcFeedback,
        TelemetryGroup::Status,
        TelemetryGroup::DcFeedback,
        TelemetryGroup::Temperature,
        TelemetryGroup::ThermalLimit,
    ];
    for group in groups {
        rx.note_frame(Some(group));
    }

    rx.timer_ms = 800;
    rx.note_frame(None);

    assert_eq!(rx.timer_ms, 0);
    assert!(rx.has_frames());
}

#[test]
fn restart_keeps_the_observed_mask() {
    let mut rx = RxMonitor::new();
    rx.note_frame(Some(TelemetryGroup::Status));
    rx.timer_ms = 300;

    rx.restart();

    assert_eq!(rx.timer_ms, 0);
    assert!(!rx.has_frames());
    assert_eq!(rx.recv_flags(), 1 << TelemetryGroup::Status.bit());
}

#[test]
fn invalidate_clears_the_observed_mask() {
    let mut rx = RxMonitor::new();
    rx.note_frame(Some(TelemetryGroup::Status));

    rx.invalidate();

    assert_eq!(rx.recv_flags(), 0);
    assert!(!rx.has_frames());
}

#[test]
fn mark_stale_only_drops_freshness() {
    let mut rx = RxMonitor::new();
    let groups = [
        TelemetryGroup::AcFeedback,
        TelemetryGroup::Status,
        TelemetryGroup::DcFeedback,
        TelemetryGroup::Temperature,
        TelemetryGroup::ThermalLimit,
    ];
    for group in groups {
        rx.note_frame(Some(group));
    }

    rx.mark_stale();

    assert!(!rx.has_frames());
    assert_eq!(rx.recv_flags(), TELEMETRY_COMPLETE_MASK);
}
