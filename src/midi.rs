//! MIDI message types and parsing
//!
//! Decodes the raw bytes delivered by the input driver into the small set of
//! channel messages the dispatcher cares about.

use std::fmt;

/// Decoded MIDI message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },

    /// Pitch Bend: channel (0-15), value (0-16383, 14-bit)
    PitchBend { channel: u8, value: u16 },

    /// Anything else (aftertouch, sysex, clock, ...) - ignored by the dispatcher
    Other { status: u8 },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes.
    ///
    /// Note On with velocity 0 decodes as Note Off (MIDI convention for
    /// release). Truncated messages and running-status data bytes yield `None`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;

        // Running status (data byte first) is not supported
        if status < 0x80 {
            return None;
        }

        // System messages (0xF0-0xFF) carry no note information
        if status >= 0xF0 {
            return Some(MidiMessage::Other { status });
        }

        let message_type = status & 0xF0;
        let channel = status & 0x0F;

        match message_type {
            0x80 => {
                if data.len() < 3 {
                    return None;
                }
                Some(MidiMessage::NoteOff {
                    channel,
                    note: data[1] & 0x7F,
                    velocity: data[2] & 0x7F,
                })
            }
            0x90 => {
                if data.len() < 3 {
                    return None;
                }
                let note = data[1] & 0x7F;
                let velocity = data[2] & 0x7F;

                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note, velocity: 0 })
                } else {
                    Some(MidiMessage::NoteOn { channel, note, velocity })
                }
            }
            0xB0 => {
                if data.len() < 3 {
                    return None;
                }
                Some(MidiMessage::ControlChange {
                    channel,
                    cc: data[1] & 0x7F,
                    value: data[2] & 0x7F,
                })
            }
            0xC0 => {
                if data.len() < 2 {
                    return None;
                }
                Some(MidiMessage::ProgramChange {
                    channel,
                    program: data[1] & 0x7F,
                })
            }
            0xE0 => {
                if data.len() < 3 {
                    return None;
                }
                let lsb = (data[1] & 0x7F) as u16;
                let msb = (data[2] & 0x7F) as u16;
                Some(MidiMessage::PitchBend {
                    channel,
                    value: (msb << 7) | lsb,
                })
            }
            // Poly/channel pressure carry no actionable note press
            _ => Some(MidiMessage::Other { status }),
        }
    }

    /// Note number for note messages, None otherwise
    pub fn note(&self) -> Option<u8> {
        match *self {
            MidiMessage::NoteOff { note, .. } | MidiMessage::NoteOn { note, .. } => Some(note),
            _ => None,
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "ProgramChange ch:{} p:{}", channel + 1, program)
            }
            MidiMessage::PitchBend { channel, value } => {
                write!(f, "PitchBend ch:{} v:{}", channel + 1, value)
            }
            MidiMessage::Other { status } => write!(f, "Other 0x{:02X}", status),
        }
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_parsing() {
        let data = vec![0x90, 60, 100]; // Note On, ch 1, Middle C, velocity 100
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100,
        });
        assert_eq!(msg.note(), Some(60));
    }

    #[test]
    fn test_note_on_velocity_zero() {
        let data = vec![0x90, 60, 0]; // Note On with velocity 0 = Note Off
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::NoteOff {
            channel: 0,
            note: 60,
            velocity: 0,
        });
    }

    #[test]
    fn test_note_off_parsing() {
        let data = vec![0x83, 36, 64]; // Note Off, ch 4
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::NoteOff {
            channel: 3,
            note: 36,
            velocity: 64,
        });
    }

    #[test]
    fn test_control_change() {
        let data = vec![0xB2, 7, 100]; // CC ch 3, volume, value 100
        let msg = MidiMessage::parse(&data).unwrap();

        assert_eq!(msg, MidiMessage::ControlChange {
            channel: 2,
            cc: 7,
            value: 100,
        });
        assert_eq!(msg.note(), None);
    }

    #[test]
    fn test_system_message_is_other() {
        let msg = MidiMessage::parse(&[0xF8]).unwrap(); // Timing Clock
        assert_eq!(msg, MidiMessage::Other { status: 0xF8 });
    }

    #[test]
    fn test_truncated_message() {
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[]), None);
    }

    #[test]
    fn test_running_status_unsupported() {
        assert_eq!(MidiMessage::parse(&[0x3C, 0x40]), None);
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x90, 60, 100]), "90 3C 64");
    }
}
