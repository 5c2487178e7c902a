//! Outgoing request frames.
//!
//! A [`Command`] is a plain value describing one request. [`Command::encode`]
//! validates its parameters and produces the exact bytes written to the
//! robot. Parameter range violations come back as
//! [`MipError::InvalidParam`] and never reach the wire.

use bytes::{BufMut, Bytes, BytesMut};
use zerocopy::byteorder::big_endian::U16;
use zerocopy::{Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::*;
use crate::error::{MipError, Result};
use crate::types::{
    ClapState, DriveDirection, FallDirection, GestureRadarMode, GetUp, HeadLeds, Sound, SoundSlot, TurnDirection,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetGestureRadarMode(GestureRadarMode),
    GetGestureRadarMode,
    SetChestLed {
        red: u8,
        green: u8,
        blue: u8,
    },
    FlashChestLed {
        red: u8,
        green: u8,
        blue: u8,
        on_time_ms: u16,
        off_time_ms: u16,
    },
    GetChestLed,
    SetHeadLeds(HeadLeds),
    GetHeadLeds,
    /// Velocity and turn rate in `-32..=32`; positive turn rate turns right.
    ContinuousDrive {
        velocity: i8,
        turn_rate: i8,
    },
    DistanceDrive {
        direction: DriveDirection,
        cm: u8,
        turn: TurnDirection,
        degrees: u16,
    },
    TurnLeft {
        degrees: u16,
        speed: u8,
    },
    TurnRight {
        degrees: u16,
        speed: u8,
    },
    DriveForward {
        speed: u8,
        time_ms: u16,
    },
    DriveBackward {
        speed: u8,
        time_ms: u16,
    },
    Stop,
    FallDown(FallDirection),
    GetUp(GetUp),
    /// Up to 8 sounds; `repeat` counts additional plays of the whole sequence.
    PlaySound {
        sounds: Vec<SoundSlot>,
        repeat: u8,
    },
    SetVolume(u8),
    GetVolume,
    ReadOdometer,
    ResetOdometer,
    GetStatus,
    GetWeight,
    GetClapSettings,
    EnableClap(ClapState),
    SetClapDelay(u16),
    GetSoftwareVersion,
    GetHardwareInfo,
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct SoundSlotRaw {
    sound: u8,
    delay: u8, // 30 ms units
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct PlaySoundFrame {
    opcode: u8,
    slots: [SoundSlotRaw; SOUND_SLOTS],
    repeat: u8,
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct DistanceDriveFrame {
    opcode: u8,
    direction: u8,
    cm: u8,
    turn: u8,
    degrees: U16,
}

#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct ClapDelayFrame {
    opcode: u8,
    delay: U16,
}

const MUTE_SLOT: SoundSlotRaw = SoundSlotRaw {
    sound: Sound::SHORT_MUTE_FOR_STOP.0,
    delay: 0,
};

impl Command {
    /// The opcode placed in the first byte of the request.
    pub fn opcode(&self) -> u8 {
        match self {
            Command::SetGestureRadarMode(_) => CMD_SET_GESTURE_RADAR_MODE,
            Command::GetGestureRadarMode => CMD_GET_GESTURE_RADAR_MODE,
            Command::SetChestLed { .. } => CMD_SET_CHEST_LED,
            Command::FlashChestLed { .. } => CMD_FLASH_CHEST_LED,
            Command::GetChestLed => CMD_GET_CHEST_LED,
            Command::SetHeadLeds(_) => CMD_SET_HEAD_LEDS,
            Command::GetHeadLeds => CMD_GET_HEAD_LEDS,
            Command::ContinuousDrive { .. } => CMD_CONTINUOUS_DRIVE,
            Command::DistanceDrive { .. } => CMD_DISTANCE_DRIVE,
            Command::TurnLeft { .. } => CMD_TURN_LEFT,
            Command::TurnRight { .. } => CMD_TURN_RIGHT,
            Command::DriveForward { .. } => CMD_DRIVE_FORWARD,
            Command::DriveBackward { .. } => CMD_DRIVE_BACKWARD,
            Command::Stop => CMD_STOP,
            Command::FallDown(_) => CMD_SET_POSITION,
            Command::GetUp(_) => CMD_GET_UP,
            Command::PlaySound { .. } => CMD_PLAY_SOUND,
            Command::SetVolume(_) => CMD_SET_VOLUME,
            Command::GetVolume => CMD_GET_VOLUME,
            Command::ReadOdometer => CMD_READ_ODOMETER,
            Command::ResetOdometer => CMD_RESET_ODOMETER,
            Command::GetStatus => CMD_GET_STATUS,
            Command::GetWeight => CMD_GET_WEIGHT,
            Command::GetClapSettings => CMD_GET_CLAP_SETTINGS,
            Command::EnableClap(_) => CMD_ENABLE_CLAP,
            Command::SetClapDelay(_) => CMD_SET_CLAP_DELAY,
            Command::GetSoftwareVersion => CMD_GET_SOFTWARE_VERSION,
            Command::GetHardwareInfo => CMD_GET_HARDWARE_INFO,
        }
    }

    /// Whether the robot answers this request with a response frame.
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            Command::GetGestureRadarMode
                | Command::GetChestLed
                | Command::GetHeadLeds
                | Command::GetVolume
                | Command::ReadOdometer
                | Command::GetStatus
                | Command::GetWeight
                | Command::GetClapSettings
                | Command::GetSoftwareVersion
                | Command::GetHardwareInfo
        )
    }

    /// Validate the parameters and build the request bytes.
    pub fn encode(&self) -> Result<Bytes> {
        let opcode = self.opcode();
        let mut frame = BytesMut::with_capacity(REQUEST_MAX_LEN);
        frame.put_u8(opcode);

        match self {
            Command::SetGestureRadarMode(mode) => frame.put_u8((*mode).into()),
            Command::SetChestLed { red, green, blue } => frame.put_slice(&[*red, *green, *blue]),
            Command::FlashChestLed {
                red,
                green,
                blue,
                on_time_ms,
                off_time_ms,
            } => {
                frame.put_slice(&[*red, *green, *blue]);
                frame.put_u8(quantize_ms("on_time_ms", *on_time_ms, CHEST_LED_MS_PER_TICK)?);
                frame.put_u8(quantize_ms("off_time_ms", *off_time_ms, CHEST_LED_MS_PER_TICK)?);
            }
            Command::SetHeadLeds(leds) => {
                frame.put_slice(&[leds.led1.into(), leds.led2.into(), leds.led3.into(), leds.led4.into()]);
            }
            Command::ContinuousDrive { velocity, turn_rate } => {
                frame.put_u8(encode_velocity(*velocity)?);
                frame.put_u8(encode_turn_rate(*turn_rate)?);
            }
            Command::DistanceDrive {
                direction,
                cm,
                turn,
                degrees,
            } => {
                if *degrees > DISTANCE_DRIVE_MAX_DEGREES {
                    return Err(MipError::param("degrees", *degrees, "must be <= 360"));
                }
                let raw = DistanceDriveFrame {
                    opcode,
                    direction: (*direction).into(),
                    cm: *cm,
                    turn: (*turn).into(),
                    degrees: U16::new(*degrees),
                };
                return Ok(Bytes::copy_from_slice(raw.as_bytes()));
            }
            Command::TurnLeft { degrees, speed } | Command::TurnRight { degrees, speed } => {
                frame.put_u8(quantize_angle(*degrees)?);
                if *speed > TURN_MAX_SPEED {
                    return Err(MipError::param("speed", *speed, "must be <= 24"));
                }
                frame.put_u8(*speed);
            }
            Command::DriveForward { speed, time_ms } | Command::DriveBackward { speed, time_ms } => {
                if *speed > DRIVE_MAX_SPEED {
                    return Err(MipError::param("speed", *speed, "must be <= 30"));
                }
                if *time_ms > 255 * DRIVE_MS_PER_TICK {
                    return Err(MipError::param("time_ms", *time_ms, "must be <= 1785"));
                }
                frame.put_u8(*speed);
                frame.put_u8((*time_ms / DRIVE_MS_PER_TICK) as u8);
            }
            Command::FallDown(direction) => frame.put_u8((*direction).into()),
            Command::GetUp(getup) => frame.put_u8((*getup).into()),
            Command::PlaySound { sounds, repeat } => {
                return encode_play_sound(sounds, *repeat);
            }
            Command::SetVolume(volume) => {
                if *volume > VOLUME_MAX {
                    return Err(MipError::param("volume", *volume, "must be <= 7"));
                }
                frame.put_u8(*volume);
            }
            Command::EnableClap(state) => frame.put_u8((*state).into()),
            Command::SetClapDelay(delay) => {
                let raw = ClapDelayFrame {
                    opcode,
                    delay: U16::new(*delay),
                };
                return Ok(Bytes::copy_from_slice(raw.as_bytes()));
            }
            Command::GetGestureRadarMode
            | Command::GetChestLed
            | Command::GetHeadLeds
            | Command::Stop
            | Command::GetVolume
            | Command::ReadOdometer
            | Command::ResetOdometer
            | Command::GetStatus
            | Command::GetWeight
            | Command::GetClapSettings
            | Command::GetSoftwareVersion
            | Command::GetHardwareInfo => {}
        }

        Ok(frame.freeze())
    }
}

fn encode_play_sound(sounds: &[SoundSlot], repeat: u8) -> Result<Bytes> {
    if sounds.len() > SOUND_SLOTS {
        return Err(MipError::param("sounds", sounds.len() as i64, "at most 8 sounds per request"));
    }

    let mut slots = [MUTE_SLOT; SOUND_SLOTS];
    for (slot, entry) in slots.iter_mut().zip(sounds) {
        if entry.delay_ms > 255 * SOUND_DELAY_MS_PER_TICK {
            return Err(MipError::param("delay_ms", entry.delay_ms, "must be <= 7650"));
        }
        *slot = SoundSlotRaw {
            sound: entry.sound.0,
            delay: (entry.delay_ms / SOUND_DELAY_MS_PER_TICK) as u8,
        };
    }

    let raw = PlaySoundFrame {
        opcode: CMD_PLAY_SOUND,
        slots,
        repeat,
    };
    Ok(Bytes::copy_from_slice(raw.as_bytes()))
}

fn quantize_ms(name: &'static str, time_ms: u16, ms_per_tick: u16) -> Result<u8> {
    u8::try_from(time_ms / ms_per_tick).map_err(|_| MipError::param(name, time_ms, "too long to fit in one byte of ticks"))
}

/// Turn angles travel in 5 degree units; remainders are truncated.
pub fn quantize_angle(degrees: u16) -> Result<u8> {
    if degrees > 255 * TURN_DEGREES_PER_UNIT {
        return Err(MipError::param("degrees", degrees, "must be <= 1275"));
    }
    Ok((degrees / TURN_DEGREES_PER_UNIT) as u8)
}

fn check_magnitude(name: &'static str, value: i8) -> Result<u8> {
    let magnitude = value.unsigned_abs();
    if magnitude > DRIVE_MAX_MAGNITUDE as u8 {
        return Err(MipError::param(name, value, "must be within -32..=32"));
    }
    Ok(magnitude)
}

/// Signed-magnitude byte for a continuous-drive velocity.
pub fn encode_velocity(velocity: i8) -> Result<u8> {
    let magnitude = check_magnitude("velocity", velocity)?;
    Ok(match velocity {
        0 => 0x00,
        v if v < 0 => VELOCITY_REVERSE_BASE + magnitude,
        _ => magnitude,
    })
}

/// Inverse of [`encode_velocity`]; `None` for bytes it never produces.
pub fn decode_velocity(byte: u8) -> Option<i8> {
    match byte {
        0x00..=0x20 => Some(byte as i8),
        0x21..=0x40 => Some(-((byte - VELOCITY_REVERSE_BASE) as i8)),
        _ => None,
    }
}

/// Signed-magnitude byte for a continuous-drive turn rate.
pub fn encode_turn_rate(turn_rate: i8) -> Result<u8> {
    let magnitude = check_magnitude("turn_rate", turn_rate)?;
    Ok(match turn_rate {
        0 => 0x00,
        r if r < 0 => TURN_LEFT_BASE + magnitude,
        _ => TURN_RIGHT_BASE + magnitude,
    })
}

/// Inverse of [`encode_turn_rate`]; `None` for bytes it never produces.
pub fn decode_turn_rate(byte: u8) -> Option<i8> {
    match byte {
        0x00 => Some(0),
        0x41..=0x60 => Some((byte - TURN_RIGHT_BASE) as i8),
        0x61..=0x80 => Some(-((byte - TURN_LEFT_BASE) as i8)),
        _ => None,
    }
}
