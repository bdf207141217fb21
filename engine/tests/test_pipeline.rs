//! Pipeline Tests - Transit Delay Buffers
//!
//! Critical invariants tested:
//! - Round-trip: place(amount, delay) surfaces after exactly `delay` advances
//! - Conservation: no units appear or vanish across advance()
//! - Bounds: delays beyond capacity are rejected without mutation

use beergame_simulator_core_rs::models::pipeline::{Pipeline, PipelineError};
use proptest::prelude::*;

// ============================================================================
// Round-trip
// ============================================================================

#[test]
fn test_round_trip_delay_zero_through_four() {
    for delay in 0usize..=4 {
        let mut pipe = Pipeline::new(4);
        pipe.place(9, delay).expect("delay fits capacity");

        for prior in 0..delay {
            assert_eq!(
                pipe.advance(),
                0,
                "delay {}: advance {} should drain nothing",
                delay,
                prior
            );
        }
        assert_eq!(pipe.advance(), 9, "delay {}: amount due", delay);
        assert_eq!(pipe.in_transit(), 0);
    }
}

#[test]
fn test_take_due_drains_without_shifting() {
    let mut pipe = Pipeline::new(2);
    pipe.place(3, 0).unwrap();
    pipe.place(5, 1).unwrap();

    assert_eq!(pipe.take_due(), 3);
    assert_eq!(pipe.take_due(), 0, "bucket 0 drained exactly once");
    assert_eq!(pipe.advance(), 0);
    assert_eq!(pipe.take_due(), 5, "later buckets untouched by take_due");
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_overflowing_delay_rejected_without_mutation() {
    let mut pipe = Pipeline::new(2);
    assert_eq!(
        pipe.place(7, 9),
        Err(PipelineError::DelayOutOfRange {
            delay: 9,
            capacity: 3
        })
    );
    assert_eq!(pipe.in_transit(), 0);
}

#[test]
fn test_capacity_tolerates_one_week_of_delay_growth() {
    // A pipeline configured for delay D must accept delay D+1 so a mid-game
    // reconfiguration of one week cannot overflow.
    for configured in 0usize..=4 {
        let mut pipe = Pipeline::new(configured);
        pipe.place(1, configured.max(1)).expect("one extra week fits");
    }
}

// ============================================================================
// Conservation (property)
// ============================================================================

proptest! {
    #[test]
    fn prop_units_conserved_across_advances(
        placements in prop::collection::vec((0u32..1_000, 0usize..5), 0..20),
        advances in 0usize..12,
    ) {
        let mut pipe = Pipeline::new(4);
        let mut placed = 0u32;
        for (amount, delay) in placements {
            pipe.place(amount, delay).unwrap();
            placed += amount;
        }

        let mut drained = 0u32;
        for _ in 0..advances {
            let before = pipe.in_transit();
            let out = pipe.advance();
            prop_assert_eq!(pipe.in_transit(), before - out);
            drained += out;
        }
        prop_assert_eq!(placed, drained + pipe.in_transit());
    }
}
