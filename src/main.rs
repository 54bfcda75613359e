use looptone::{AudioEngine, Note, PlaybackEngine, PlaybackError};
use std::io::{self, Write};
use uuid::Uuid;

// The looping timeline is fixed at four seconds, one second per beat of
// the demo arpeggio
const TIMELINE_DURATION_SECONDS: f64 = 4.0;

fn main() {
    env_logger::init();

    println!("=== Looptone ===");
    println!("Looping timeline playback\n");

    println!("Audio engine initialisation...");
    let (audio_engine, controller) = match AudioEngine::new() {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return;
        }
    };
    println!("Backend running at {} Hz", audio_engine.sample_rate());

    let mut playback = PlaybackEngine::new(Box::new(controller), TIMELINE_DURATION_SECONDS);
    for note in demo_notes() {
        playback.add_note(note);
    }

    println!("\n=== Looptone started ! ===\n");
    print_help();

    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        line.clear();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "play" => report(playback.play()),
            "pause" => report(playback.pause()),
            "stop" => playback.stop(),
            "seek" => match parts.next().and_then(|arg| arg.parse::<f64>().ok()) {
                Some(seconds) => report(playback.seek(seconds)),
                None => println!("usage: seek <seconds>"),
            },
            "add" => {
                let args: Vec<f64> = parts.filter_map(|arg| arg.parse().ok()).collect();
                if args.len() < 3 {
                    println!("usage: add <freq-hz> <time-s> <duration-s> [velocity]");
                    continue;
                }
                let id = Uuid::new_v4().to_string();
                let mut note = Note::new(id.clone(), args[1], args[2], args[0] as f32);
                if let Some(&velocity) = args.get(3) {
                    note = note.with_velocity(velocity as f32);
                }
                playback.add_note(note);
                println!("Added note {}", id);
            }
            "remove" => match parts.next() {
                Some(id) => {
                    playback.remove_note(id);
                    println!("Removed {}", id);
                }
                None => println!("usage: remove <note-id>"),
            },
            "notes" => {
                let notes = playback.notes();
                if notes.is_empty() {
                    println!("(no notes)");
                }
                for note in &notes {
                    println!(
                        "  {}  t={:.2}s  dur={:.2}s  {:.2} Hz  vel={:.2}",
                        note.id,
                        note.time,
                        note.duration,
                        note.frequency,
                        note.velocity_or_default()
                    );
                }
            }
            "status" => println!(
                "{:?} at {:.3}s / {:.0}s, {} note(s)",
                playback.status(),
                playback.current_position(),
                playback.timeline_duration(),
                playback.notes().len()
            ),
            "help" => print_help(),
            "quit" | "exit" => break,
            other => println!("Unknown command: {} (try 'help')", other),
        }
    }

    playback.stop();
    println!("Bye !");
}

// Un petit arpège de do majeur pour avoir du son tout de suite
fn demo_notes() -> Vec<Note> {
    let beats: [(f32, f64); 4] = [
        (261.63, 0.0), // C4
        (329.63, 1.0), // E4
        (392.00, 2.0), // G4
        (523.25, 3.0), // C5
    ];

    beats
        .into_iter()
        .map(|(frequency, time)| Note::new(Uuid::new_v4().to_string(), time, 0.75, frequency))
        .collect()
}

fn print_help() {
    println!("Commands:");
    println!("  play                                 start or resume playback");
    println!("  pause                                freeze playback in place");
    println!("  stop                                 silence and rewind to zero");
    println!("  seek <seconds>                       jump inside the loop");
    println!("  add <freq-hz> <time-s> <dur-s> [vel] add a note to the timeline");
    println!("  remove <note-id>                     remove a note");
    println!("  notes                                list the timeline");
    println!("  status                               transport state and position");
    println!("  quit                                 leave\n");
}

fn report(result: Result<(), PlaybackError>) {
    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
    }
}
