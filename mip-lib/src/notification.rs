//! Latest-value cache for out-of-band notifications.
//!
//! The robot pushes radar, gesture, shake, status, weight and clap frames at
//! any time. [`NotificationCache::apply`] folds one frame into the cache;
//! the session drains the transport through it before every query so reads
//! always see the newest state.

use modular_bitfield::prelude::*;
use num_enum::TryFromPrimitive;
use strum_macros::Display;
use tracing::debug;

use crate::constants::*;
use crate::error::{MipError, Result};
use crate::response::{ByteFrameRaw, decode_status, decode_weight, parse_frame};
use crate::types::{Clap, Gesture, Position, Radar, Status, Timestamped, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NotificationKind {
    Radar,
    Gesture,
    Shake,
    Status,
    Weight,
    Clap,
}

/// One validity bit per notification kind.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotificationFlags {
    pub radar: bool,
    pub status: bool,
    pub gesture: bool,
    pub shake: bool,
    pub weight: bool,
    pub clap: bool,
    #[skip]
    unused: B2,
}

type StoreFn = fn(&mut NotificationCache, &[u8], u32) -> Result<()>;

struct NotificationDecoder {
    opcode: u8,
    kind: NotificationKind,
    store: StoreFn,
}

/// Opcode dispatch table for incoming notifications.
const DECODERS: &[NotificationDecoder] = &[
    NotificationDecoder {
        opcode: CMD_RADAR_NOTIFICATION,
        kind: NotificationKind::Radar,
        store: NotificationCache::store_radar,
    },
    NotificationDecoder {
        opcode: CMD_GESTURE_NOTIFICATION,
        kind: NotificationKind::Gesture,
        store: NotificationCache::store_gesture,
    },
    NotificationDecoder {
        opcode: CMD_SHAKE_NOTIFICATION,
        kind: NotificationKind::Shake,
        store: NotificationCache::store_shake,
    },
    NotificationDecoder {
        opcode: CMD_GET_STATUS,
        kind: NotificationKind::Status,
        store: NotificationCache::store_status,
    },
    NotificationDecoder {
        opcode: CMD_GET_WEIGHT,
        kind: NotificationKind::Weight,
        store: NotificationCache::store_weight,
    },
    NotificationDecoder {
        opcode: CMD_CLAP_NOTIFICATION,
        kind: NotificationKind::Clap,
        store: NotificationCache::store_clap,
    },
];

#[derive(Debug, Clone)]
pub struct NotificationCache {
    flags: NotificationFlags,
    // Radar and gesture keep the raw byte; it is validated when read.
    radar: Timestamped<u8>,
    gesture: Timestamped<u8>,
    status: Timestamped<Status>,
    weight: Timestamped<Weight>,
    clap: Timestamped<Clap>,
}

impl Default for NotificationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCache {
    pub fn new() -> Self {
        Self {
            flags: NotificationFlags::new(),
            radar: Timestamped::new(0, 0),
            gesture: Timestamped::new(0, 0),
            status: Timestamped::new(
                0,
                Status {
                    battery_volts: 0.0,
                    position: Position::OnBack,
                },
            ),
            weight: Timestamped::new(0, Weight { degrees: 0 }),
            clap: Timestamped::new(0, Clap { count: 0 }),
        }
    }

    pub fn flags(&self) -> NotificationFlags {
        self.flags
    }

    /// Decode one out-of-band frame into its slot, stamping it with `millis`.
    ///
    /// Returns the kind that was updated. Empty frames, unknown opcodes and
    /// frames that fail validation leave the cache untouched.
    pub fn apply(&mut self, frame: &[u8], millis: u32) -> Option<NotificationKind> {
        let Some(&opcode) = frame.first() else {
            debug!("Ignoring empty notification");
            return None;
        };

        let Some(decoder) = DECODERS.iter().find(|d| d.opcode == opcode) else {
            debug!(bytes = hex::encode(frame), "Ignoring unrecognized notification");
            return None;
        };

        match (decoder.store)(self, frame, millis) {
            Ok(()) => {
                debug!(kind = %decoder.kind, millis, "Notification cached");
                Some(decoder.kind)
            }
            Err(e) => {
                debug!(bytes = hex::encode(frame), error = %e, "Dropping malformed {} notification", decoder.kind);
                None
            }
        }
    }

    fn store_radar(&mut self, frame: &[u8], millis: u32) -> Result<()> {
        let raw: &ByteFrameRaw = parse_frame(frame, CMD_RADAR_NOTIFICATION, "radar notification")?;
        self.radar = Timestamped::new(millis, raw.value);
        self.flags.set_radar(true);
        Ok(())
    }

    fn store_gesture(&mut self, frame: &[u8], millis: u32) -> Result<()> {
        let raw: &ByteFrameRaw = parse_frame(frame, CMD_GESTURE_NOTIFICATION, "gesture notification")?;
        self.gesture = Timestamped::new(millis, raw.value);
        self.flags.set_gesture(true);
        Ok(())
    }

    fn store_shake(&mut self, frame: &[u8], _millis: u32) -> Result<()> {
        if frame.len() != 1 {
            return Err(MipError::BadResponse(format!(
                "shake notification must be 1 byte, got {}",
                frame.len()
            )));
        }
        self.flags.set_shake(true);
        Ok(())
    }

    fn store_status(&mut self, frame: &[u8], millis: u32) -> Result<()> {
        self.status = Timestamped::new(millis, decode_status(frame)?);
        self.flags.set_status(true);
        Ok(())
    }

    fn store_weight(&mut self, frame: &[u8], millis: u32) -> Result<()> {
        self.weight = Timestamped::new(millis, decode_weight(frame)?);
        self.flags.set_weight(true);
        Ok(())
    }

    fn store_clap(&mut self, frame: &[u8], millis: u32) -> Result<()> {
        let raw: &ByteFrameRaw = parse_frame(frame, CMD_CLAP_NOTIFICATION, "clap notification")?;
        self.clap = Timestamped::new(millis, Clap { count: raw.value });
        self.flags.set_clap(true);
        Ok(())
    }

    pub fn latest_radar(&self) -> Result<Timestamped<Radar>> {
        if !self.flags.radar() {
            return Err(MipError::Empty);
        }
        let radar = Radar::try_from_primitive(self.radar.value)
            .map_err(|_| MipError::BadResponse(format!("radar value out of range: {:#04x}", self.radar.value)))?;
        Ok(self.radar.map(|_| radar))
    }

    pub fn latest_gesture(&self) -> Result<Timestamped<Gesture>> {
        if !self.flags.gesture() {
            return Err(MipError::Empty);
        }
        let gesture = Gesture::try_from_primitive(self.gesture.value)
            .map_err(|_| MipError::BadResponse(format!("gesture value out of range: {:#04x}", self.gesture.value)))?;
        Ok(self.gesture.map(|_| gesture))
    }

    pub fn latest_status(&self) -> Result<Timestamped<Status>> {
        if !self.flags.status() {
            return Err(MipError::Empty);
        }
        Ok(self.status)
    }

    pub fn latest_weight(&self) -> Result<Timestamped<Weight>> {
        if !self.flags.weight() {
            return Err(MipError::Empty);
        }
        Ok(self.weight)
    }

    pub fn latest_clap(&self) -> Result<Timestamped<Clap>> {
        if !self.flags.clap() {
            return Err(MipError::Empty);
        }
        Ok(self.clap)
    }

    /// Consume the pending shake event, if any. Each shake is reported once.
    pub fn take_shake(&mut self) -> Result<()> {
        if !self.flags.shake() {
            return Err(MipError::Empty);
        }
        self.flags.set_shake(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_decoder_opcode_is_unique() {
        for (i, a) in DECODERS.iter().enumerate() {
            for b in &DECODERS[i + 1..] {
                assert_ne!(a.opcode, b.opcode, "{} and {} share an opcode", a.kind, b.kind);
            }
        }
    }

    #[test]
    fn test_radar_is_level_triggered() {
        let mut cache = NotificationCache::new();
        assert_eq!(cache.latest_radar(), Err(MipError::Empty));

        assert_eq!(cache.apply(&[0x0C, 0x02], 10), Some(NotificationKind::Radar));
        for _ in 0..3 {
            assert_eq!(cache.latest_radar().unwrap(), Timestamped::new(10, Radar::Range10To30Cm));
        }

        cache.apply(&[0x0C, 0x03], 20);
        assert_eq!(cache.latest_radar().unwrap().value, Radar::Range0To10Cm);
    }

    #[test]
    fn test_out_of_range_radar_is_cached_but_rejected_on_read() {
        let mut cache = NotificationCache::new();
        assert_eq!(cache.apply(&[0x0C, 0x09], 5), Some(NotificationKind::Radar));
        assert!(matches!(cache.latest_radar(), Err(MipError::BadResponse(_))));
    }

    #[test]
    fn test_shake_is_edge_triggered() {
        let mut cache = NotificationCache::new();
        assert_eq!(cache.take_shake(), Err(MipError::Empty));
        cache.apply(&[0x1A], 1);
        assert_eq!(cache.take_shake(), Ok(()));
        assert_eq!(cache.take_shake(), Err(MipError::Empty));
    }

    #[test]
    fn test_malformed_frames_leave_state_unchanged() {
        let mut cache = NotificationCache::new();
        cache.apply(&[0x1D, 0x03], 7);
        let before = cache.flags();

        assert_eq!(cache.apply(&[], 8), None);
        assert_eq!(cache.apply(&[0x55, 0x01], 8), None);
        assert_eq!(cache.apply(&[0x1D, 0x04, 0x00], 8), None);
        assert_eq!(cache.apply(&[0x1A, 0x00], 8), None);
        assert_eq!(cache.apply(&[0x79, 0x60, 0x09], 8), None);

        assert_eq!(cache.flags(), before);
        assert_eq!(cache.latest_clap().unwrap(), Timestamped::new(7, Clap { count: 3 }));
        assert_eq!(cache.latest_status(), Err(MipError::Empty));
    }
}
