//! Integration test: Transport stability under randomized operation streams
//!
//! Hammers the playback engine with long random sequences of transport
//! operations, clock movement and polls, checking after every single step
//! that the observable invariants still hold.

use looptone::playback::{ManualTicker, Note, PlaybackEngine, PlaybackStatus};
use looptone::synth::MockSynth;
use rand::Rng;

const TIMELINE: f64 = 4.0;

/// Random mix of every transport operation, with the clock and the
/// polling loop driven just as randomly
#[test]
fn test_random_operation_stream_preserves_invariants() {
    const OPERATIONS: usize = 20_000;

    let mut rng = rand::thread_rng();
    let mock = MockSynth::new();
    let ticker = ManualTicker::new();
    let handle = ticker.handle();
    let mut engine =
        PlaybackEngine::with_ticker(Box::new(mock.clone()), TIMELINE, Box::new(ticker));

    let mut next_note_id = 0usize;
    let mut live_ids: Vec<String> = Vec::new();
    let mut total_batches = 0usize;

    println!("\n=== Randomized transport stream ===");
    println!("Operations: {}", OPERATIONS);

    for step in 0..OPERATIONS {
        match rng.gen_range(0..=9) {
            0 => engine.play().expect("play with a healthy backend"),
            1 => engine.pause().expect("pause with a healthy backend"),
            2 => engine.stop(),
            3 => {
                // Mostly sane targets, occasionally far out of range
                let target = if rng.gen_bool(0.8) {
                    rng.gen_range(0.0..TIMELINE)
                } else {
                    rng.gen_range(-50.0..50.0)
                };
                engine.seek(target).expect("finite seek");
            }
            4 => {
                let _ = engine.seek(f64::NAN);
            }
            5 | 6 => {
                let id = format!("note-{}", next_note_id);
                next_note_id += 1;
                let time = rng.gen_range(0.0..TIMELINE);
                let duration = rng.gen_range(0.05..1.0);
                let frequency = rng.gen_range(55.0..1760.0);
                engine.add_note(Note::new(id.clone(), time, duration, frequency));
                live_ids.push(id);
            }
            7 => {
                if !live_ids.is_empty() {
                    let index = rng.gen_range(0..live_ids.len());
                    let id = live_ids.swap_remove(index);
                    engine.remove_note(&id);
                }
            }
            8 => mock.advance(rng.gen_range(0.0..2.0)),
            _ => {
                handle.tick();
            }
        }

        let position = engine.current_position();
        assert!(
            (0.0..TIMELINE).contains(&position),
            "position {} escaped the timeline at step {}",
            position,
            step
        );
        assert_eq!(
            engine.notes().len(),
            live_ids.len(),
            "note collection diverged at step {}",
            step
        );
        assert_eq!(
            handle.is_active(),
            engine.status().is_playing(),
            "polling loop out of sync with transport at step {}",
            step
        );

        // Keep the mock's recorded batches bounded over the long run
        if step % 1000 == 0 {
            total_batches += mock.batch_count();
            mock.clear_batches();
        }

        if step > 0 && step % 5000 == 0 {
            println!("Progress: {} / {} operations", step, OPERATIONS);
        }
    }

    total_batches += mock.batch_count();
    println!("Notes created: {}", next_note_id);
    println!("Batches scheduled: {}", total_batches);
    println!("Stream complete, all invariants held");
}

/// Continuous playback across many loop cycles with a realistic polling
/// cadence; every wrap must reschedule the complete note set
#[test]
fn test_long_session_survives_many_cycles() {
    const CYCLES: usize = 500;
    const POLL_STEP_SECONDS: f64 = 0.016;
    // 250 polls cover one 4s cycle; the budget leaves room for a wrap
    // detected one poll late
    const MAX_POLLS_PER_CYCLE: usize = 260;

    let mock = MockSynth::new();
    let ticker = ManualTicker::new();
    let handle = ticker.handle();
    let mut engine =
        PlaybackEngine::with_ticker(Box::new(mock.clone()), TIMELINE, Box::new(ticker));

    engine.add_note(Note::new("kick", 0.0, 0.2, 110.0));
    engine.add_note(Note::new("mid", 1.5, 0.5, 440.0));
    engine.add_note(Note::new("high", 3.0, 0.25, 880.0));

    engine.play().unwrap();

    println!("\n=== Long session ({} cycles) ===", CYCLES);

    let mut polls = 0usize;
    for cycle in 0..CYCLES {
        // Poll until this cycle's wrap lands as a fresh batch in the mock
        let batches_before = mock.batch_count();
        let mut cycle_polls = 0usize;
        while mock.batch_count() == batches_before {
            mock.advance(POLL_STEP_SECONDS);
            handle.tick();
            polls += 1;
            cycle_polls += 1;

            let position = engine.current_position();
            assert!(
                (0.0..TIMELINE).contains(&position),
                "position {} escaped the timeline in cycle {}",
                position,
                cycle
            );
            assert!(
                cycle_polls <= MAX_POLLS_PER_CYCLE,
                "cycle {} still had not wrapped after {} polls",
                cycle,
                cycle_polls
            );
        }
    }

    // One batch for play plus exactly one per wrap, each carrying the full set
    let batches = mock.batches();
    assert_eq!(
        batches.len(),
        CYCLES + 1,
        "wrap count drifted from the cycle count"
    );
    for (index, batch) in batches.iter().enumerate() {
        assert_eq!(
            batch.notes.len(),
            3,
            "batch {} did not carry the full note set",
            index
        );
    }

    assert_eq!(engine.status(), PlaybackStatus::Playing);
    println!("Survived {} wraps over {} polls of playback", CYCLES, polls);
}

/// Rapid add/remove churn mid-playback must leave the collection exact
/// and keep every reschedule consistent
#[test]
fn test_rapid_note_churn_while_playing() {
    const CHURNS: usize = 5_000;

    let mock = MockSynth::new();
    let ticker = ManualTicker::new();
    let mut engine =
        PlaybackEngine::with_ticker(Box::new(mock.clone()), TIMELINE, Box::new(ticker));

    engine.add_note(Note::new("base-low", 0.5, 0.5, 220.0));
    engine.add_note(Note::new("base-high", 2.5, 0.5, 660.0));
    engine.play().unwrap();

    println!("\n=== Rapid note churn ===");

    for churn in 0..CHURNS {
        let id = format!("churn-{}", churn);
        engine.add_note(Note::new(id.clone(), 1.0, 0.3, 330.0));
        assert_eq!(engine.notes().len(), 3, "add lost at churn {}", churn);

        engine.remove_note(&id);
        assert_eq!(engine.notes().len(), 2, "remove lost at churn {}", churn);

        let batch = mock.last_batch().expect("churn must reschedule");
        assert_eq!(
            batch.notes.len(),
            2,
            "reschedule at churn {} dropped the base notes",
            churn
        );
    }

    println!("Completed {} add/remove churns", CHURNS);
}
