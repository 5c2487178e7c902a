use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{BATTERY_RAW_MAX, BATTERY_RAW_MIN, BATTERY_VOLTS_MAX, BATTERY_VOLTS_MIN};

/// Which proximity sensing mode the robot's IR sensors run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum GestureRadarMode {
    #[default]
    Disabled = 0x00,
    Gesture = 0x02,
    Radar = 0x04,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum HeadLed {
    #[default]
    Off = 0,
    On = 1,
    #[strum(to_string = "Blink Slow")]
    BlinkSlow = 2,
    #[strum(to_string = "Blink Fast")]
    BlinkFast = 3,
}

/// Obstacle range reported by radar notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Radar {
    #[strum(to_string = "none")]
    None = 0x01,
    #[strum(to_string = "10-30 cm")]
    Range10To30Cm = 0x02,
    #[strum(to_string = "0-10 cm")]
    Range0To10Cm = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Gesture {
    Left = 0x0A,
    Right = 0x0B,
    #[strum(to_string = "Center Sweep Left")]
    CenterSweepLeft = 0x0C,
    #[strum(to_string = "Center Sweep Right")]
    CenterSweepRight = 0x0D,
    #[strum(to_string = "Center Hold")]
    CenterHold = 0x0E,
    Forward = 0x0F,
    Backward = 0x10,
}

/// Body position reported in status responses and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Position {
    #[strum(to_string = "On Back")]
    OnBack = 0x00,
    #[strum(to_string = "Face Down")]
    FaceDown = 0x01,
    Upright = 0x02,
    #[strum(to_string = "Picked Up")]
    PickedUp = 0x03,
    #[strum(to_string = "Hand Stand")]
    HandStand = 0x04,
    #[strum(to_string = "Face Down On Tray")]
    FaceDownOnTray = 0x05,
    #[strum(to_string = "On Back With Kickstand")]
    OnBackWithKickstand = 0x06,
}

/// Direction to fall when sent a set-position command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FallDirection {
    #[strum(to_string = "On Back")]
    OnBack = 0x00,
    #[strum(to_string = "Face Down")]
    FaceDown = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum GetUp {
    #[strum(to_string = "From Front")]
    FromFront = 0x00,
    #[strum(to_string = "From Back")]
    FromBack = 0x01,
    #[strum(to_string = "From Either")]
    FromEither = 0x02,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum DriveDirection {
    Forward = 0x00,
    Backward = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TurnDirection {
    Left = 0x00,
    Right = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ClapState {
    #[default]
    #[strum(to_string = "OFF")]
    Disabled = 0x00,
    #[strum(to_string = "ON")]
    Enabled = 0x01,
}

/// Index into the robot's built-in sound table.
///
/// Values `1..=106` are recorded clips; `0xF7..=0xFE` are pseudo-sounds that
/// change the volume mid-sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sound(pub u8);

impl Sound {
    pub const ONEKHZ_500MS_8K16BIT: Sound = Sound(1);
    pub const ACTION_BURPING: Sound = Sound(2);
    pub const ACTION_DRINKING: Sound = Sound(3);
    pub const ACTION_EATING: Sound = Sound(4);
    pub const ACTION_FARTING_SHORT: Sound = Sound(5);
    pub const ACTION_OUT_OF_BREATH: Sound = Sound(6);
    /// Filler for unused play-sound slots.
    pub const SHORT_MUTE_FOR_STOP: Sound = Sound(105);
    pub const VOLUME_OFF: Sound = Sound(0xF7);

    /// Pseudo-sound that sets the volume to `level` (0..=7) when played.
    pub fn volume(level: u8) -> Option<Sound> {
        (level <= crate::constants::VOLUME_MAX).then(|| Sound(0xF7 + level))
    }
}

impl From<u8> for Sound {
    fn from(value: u8) -> Self {
        Sound(value)
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0xF7..=0xFE => write!(f, "volume {}", self.0 - 0xF7),
            index => write!(f, "sound #{}", index),
        }
    }
}

/// One entry of a play-sound sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoundSlot {
    pub sound: Sound,
    /// Pause after the sound, in milliseconds (sent in 30 ms units).
    pub delay_ms: u16,
}

impl SoundSlot {
    pub fn new(sound: Sound, delay_ms: u16) -> Self {
        Self { sound, delay_ms }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChestLed {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub on_time_ms: u16,
    pub off_time_ms: u16,
}

impl fmt::Display for ChestLed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X} on {} ms / off {} ms",
            self.red, self.green, self.blue, self.on_time_ms, self.off_time_ms
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeadLeds {
    pub led1: HeadLed,
    pub led2: HeadLed,
    pub led3: HeadLed,
    pub led4: HeadLed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Status {
    pub battery_volts: f32,
    pub position: Position,
}

impl Status {
    /// Convert the raw battery byte to volts. 0x4D reads as 4.0 V and 0x7C as 6.4 V.
    pub fn battery_from_raw(raw: u8) -> f32 {
        let span = (BATTERY_RAW_MAX - BATTERY_RAW_MIN) as f32;
        ((raw as i16 - BATTERY_RAW_MIN as i16) as f32 / span) * (BATTERY_VOLTS_MAX - BATTERY_VOLTS_MIN)
            + BATTERY_VOLTS_MIN
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Battery: {:.2} V, Position: {}", self.battery_volts, self.position)
    }
}

/// Tilt caused by weight the robot is carrying, in degrees (negative leans back).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Weight {
    pub degrees: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClapSettings {
    pub enabled: ClapState,
    pub delay_ms: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Clap {
    pub count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoftwareVersion {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub build: u8,
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}.{}", self.year, self.month, self.day, self.build)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareInfo {
    pub voice_chip: u8,
    pub hardware: u8,
}

/// A decoded value stamped with the session clock (milliseconds since the
/// session was opened) at the moment it was decoded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamped<T> {
    pub millis: u32,
    pub value: T,
}

impl<T> Timestamped<T> {
    pub fn new(millis: u32, value: T) -> Self {
        Self { millis, value }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timestamped<U> {
        Timestamped {
            millis: self.millis,
            value: f(self.value),
        }
    }
}
