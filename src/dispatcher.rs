//! Event dispatching
//!
//! Turns incoming MIDI messages into command launches: note-on looks up the
//! pad, resolves the platform command and spawns it fire-and-forget. Note-off
//! (including zero-velocity note-on) is reported only. Everything else is
//! ignored.

use colored::Colorize;
use tracing::{debug, warn};

use crate::launcher::CommandLauncher;
use crate::mapping::MappingTable;
use crate::midi::MidiMessage;
use crate::platform::Platform;

pub struct Dispatcher {
    table: MappingTable,
    platform: Platform,
    launcher: Box<dyn CommandLauncher>,
}

impl Dispatcher {
    pub fn new(table: MappingTable, platform: Platform, launcher: Box<dyn CommandLauncher>) -> Self {
        Self {
            table,
            platform,
            launcher,
        }
    }

    /// Process one inbound message.
    ///
    /// Never fails: per-event problems (unmapped note, missing command, spawn
    /// error) are reported and the loop keeps running.
    pub fn handle(&self, message: &MidiMessage) {
        match *message {
            MidiMessage::NoteOn { note, velocity, .. } if velocity > 0 => self.on_press(note),
            // Zero-velocity note-on is a release by MIDI convention; the
            // parser already folds it into NoteOff, this arm is the contract
            MidiMessage::NoteOn { note, .. } | MidiMessage::NoteOff { note, .. } => {
                self.on_release(note)
            }
            ref other => {
                debug!("Ignoring {}", other);
            }
        }
    }

    fn on_press(&self, note: u8) {
        let Some(pad) = self.table.lookup(note) else {
            println!("{} {}", "pressed:".green(), note_line("unknown", note));
            return;
        };

        println!("{} {}", "pressed:".green(), note_line(&pad.name, note));

        let Some(command) = pad.command.resolve(self.platform) else {
            warn!(
                "No command for platform '{}' on pad '{}' (note {})",
                self.platform, pad.name, note
            );
            return;
        };

        debug!("Launching on {}: {}", self.platform, command);
        if let Err(e) = self.launcher.spawn_detached(command) {
            warn!("Command failed for pad '{}': {}", pad.name, e);
        }
    }

    fn on_release(&self, note: u8) {
        let name = self.table.lookup(note).map(|p| p.name.as_str()).unwrap_or("unknown");
        println!("{} {}", "released:".dimmed(), note_line(name, note));
    }
}

/// Notification body shared by press and release lines
fn note_line(name: &str, note: u8) -> String {
    format!("{} (Note {})", name, note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::SpawnError;
    use crate::mapping::{CommandSet, PadMapping};
    use std::sync::{Arc, Mutex};

    /// Records spawned commands instead of touching the OS
    struct RecordingLauncher {
        spawned: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl CommandLauncher for RecordingLauncher {
        fn spawn_detached(&self, command: &str) -> Result<(), SpawnError> {
            if self.fail {
                return Err(SpawnError::Io {
                    command: command.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            self.spawned.lock().unwrap().push(command.to_string());
            Ok(())
        }
    }

    fn make_dispatcher(
        pads: Vec<PadMapping>,
        platform: Platform,
        fail: bool,
    ) -> (Dispatcher, Arc<Mutex<Vec<String>>>) {
        let spawned = Arc::new(Mutex::new(Vec::new()));
        let launcher = RecordingLauncher {
            spawned: spawned.clone(),
            fail,
        };
        let table = MappingTable::from_entries(pads).unwrap();
        (Dispatcher::new(table, platform, Box::new(launcher)), spawned)
    }

    fn gedit_pad() -> PadMapping {
        PadMapping {
            note: 36,
            name: "A-01".to_string(),
            command: CommandSet {
                linux: Some("gedit".to_string()),
                ..Default::default()
            },
        }
    }

    fn note_on(note: u8, velocity: u8) -> MidiMessage {
        MidiMessage::NoteOn {
            channel: 0,
            note,
            velocity,
        }
    }

    #[test]
    fn test_press_spawns_resolved_command() {
        let (dispatcher, spawned) = make_dispatcher(vec![gedit_pad()], Platform::Linux, false);

        dispatcher.handle(&note_on(36, 100));

        assert_eq!(*spawned.lock().unwrap(), vec!["gedit".to_string()]);
    }

    #[test]
    fn test_repeated_presses_spawn_each_time() {
        let (dispatcher, spawned) = make_dispatcher(vec![gedit_pad()], Platform::Linux, false);

        for _ in 0..3 {
            dispatcher.handle(&note_on(36, 100));
        }

        assert_eq!(spawned.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_unmapped_note_spawns_nothing() {
        let (dispatcher, spawned) = make_dispatcher(vec![gedit_pad()], Platform::Linux, false);

        dispatcher.handle(&note_on(100, 100));

        assert!(spawned.lock().unwrap().is_empty());
    }

    #[test]
    fn test_release_never_spawns() {
        let (dispatcher, spawned) = make_dispatcher(vec![gedit_pad()], Platform::Linux, false);

        dispatcher.handle(&MidiMessage::NoteOff {
            channel: 0,
            note: 36,
            velocity: 0,
        });
        // Zero-velocity note-on arrives as NoteOff from the parser
        dispatcher.handle(&MidiMessage::parse(&[0x90, 36, 0]).unwrap());
        // A hand-built zero-velocity NoteOn is treated as a release too
        dispatcher.handle(&note_on(36, 0));

        assert!(spawned.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_platform_without_default_spawns_nothing() {
        let pad = PadMapping {
            note: 40,
            name: "calc".to_string(),
            command: CommandSet {
                windows: Some("calc.exe".to_string()),
                ..Default::default()
            },
        };
        let (dispatcher, spawned) = make_dispatcher(vec![pad], Platform::Linux, false);

        dispatcher.handle(&note_on(40, 100));

        assert!(spawned.lock().unwrap().is_empty());
    }

    #[test]
    fn test_spawn_failure_does_not_stop_dispatch() {
        let (dispatcher, _) = make_dispatcher(vec![gedit_pad()], Platform::Linux, true);

        // Both calls must come back without panicking
        dispatcher.handle(&note_on(36, 100));
        dispatcher.handle(&note_on(36, 100));
    }

    #[test]
    fn test_other_messages_ignored() {
        let (dispatcher, spawned) = make_dispatcher(vec![gedit_pad()], Platform::Linux, false);

        dispatcher.handle(&MidiMessage::ControlChange {
            channel: 0,
            cc: 7,
            value: 100,
        });
        dispatcher.handle(&MidiMessage::Other { status: 0xF8 });

        assert!(spawned.lock().unwrap().is_empty());
    }

    #[test]
    fn test_notification_line_format() {
        assert_eq!(note_line("A-01", 36), "A-01 (Note 36)");
        assert_eq!(note_line("unknown", 100), "unknown (Note 100)");
    }
}
