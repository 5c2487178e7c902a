//! Decoding of response frames.
//!
//! Every response has a fixed length and echoes the request opcode in its
//! first byte. Each decoder maps the frame onto a `zerocopy` layout, which
//! rejects any length mismatch, then checks the opcode and every enumerated
//! field before building the typed value. Nothing is returned unless the
//! whole frame is valid.

use std::mem::size_of;

use num_enum::TryFromPrimitive;
use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::constants::*;
use crate::error::{MipError, Result};
use crate::types::{
    ChestLed, ClapSettings, ClapState, GestureRadarMode, HardwareInfo, HeadLed, HeadLeds, Position, SoftwareVersion,
    Status, Weight,
};

/// Two byte frame carrying one value after the opcode.
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub(crate) struct ByteFrameRaw {
    pub opcode: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct ChestLedRaw {
    opcode: u8,
    red: u8,
    green: u8,
    blue: u8,
    on_ticks: u8,  // 20 ms units
    off_ticks: u8, // 20 ms units
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct HeadLedsRaw {
    opcode: u8,
    leds: [u8; 4],
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct OdometerRaw {
    opcode: u8,
    ticks: U32,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct StatusRaw {
    opcode: u8,
    battery: u8,
    position: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct WeightRaw {
    opcode: u8,
    weight: i8,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct ClapSettingsRaw {
    opcode: u8,
    enabled: u8,
    delay: U16,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct SoftwareVersionRaw {
    opcode: u8,
    year: u8,
    month: u8,
    day: u8,
    build: u8,
}

#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct HardwareInfoRaw {
    opcode: u8,
    voice_chip: u8,
    hardware: u8,
}

/// Map `frame` onto the fixed layout `R` and verify the echoed opcode.
pub(crate) fn parse_frame<'a, R>(frame: &'a [u8], opcode: u8, what: &str) -> Result<&'a R>
where
    R: FromBytes + KnownLayout + Immutable,
{
    let raw = R::ref_from_bytes(frame).map_err(|_| {
        MipError::BadResponse(format!(
            "{} frame must be {} bytes, got {}",
            what,
            size_of::<R>(),
            frame.len()
        ))
    })?;
    match frame.first() {
        Some(&first) if first == opcode => Ok(raw),
        first => Err(MipError::BadResponse(format!(
            "{} frame opcode mismatch: expected {:#04x}, got {:02x?}",
            what, opcode, first
        ))),
    }
}

fn enum_field<E: TryFromPrimitive<Primitive = u8>>(value: u8, what: &str) -> Result<E> {
    E::try_from_primitive(value).map_err(|_| MipError::BadResponse(format!("{} out of range: {:#04x}", what, value)))
}

pub fn decode_gesture_radar_mode(frame: &[u8]) -> Result<GestureRadarMode> {
    let raw: &ByteFrameRaw = parse_frame(frame, CMD_GET_GESTURE_RADAR_MODE, "gesture/radar mode")?;
    enum_field(raw.value, "gesture/radar mode")
}

pub fn decode_chest_led(frame: &[u8]) -> Result<ChestLed> {
    let raw: &ChestLedRaw = parse_frame(frame, CMD_GET_CHEST_LED, "chest LED")?;
    Ok(ChestLed {
        red: raw.red,
        green: raw.green,
        blue: raw.blue,
        on_time_ms: raw.on_ticks as u16 * CHEST_LED_MS_PER_TICK,
        off_time_ms: raw.off_ticks as u16 * CHEST_LED_MS_PER_TICK,
    })
}

pub fn decode_head_leds(frame: &[u8]) -> Result<HeadLeds> {
    let raw: &HeadLedsRaw = parse_frame(frame, CMD_GET_HEAD_LEDS, "head LEDs")?;
    let [led1, led2, led3, led4] = raw.leds;
    Ok(HeadLeds {
        led1: enum_field::<HeadLed>(led1, "head LED 1")?,
        led2: enum_field::<HeadLed>(led2, "head LED 2")?,
        led3: enum_field::<HeadLed>(led3, "head LED 3")?,
        led4: enum_field::<HeadLed>(led4, "head LED 4")?,
    })
}

pub fn decode_volume(frame: &[u8]) -> Result<u8> {
    let raw: &ByteFrameRaw = parse_frame(frame, CMD_GET_VOLUME, "volume")?;
    if raw.value > VOLUME_MAX {
        return Err(MipError::BadResponse(format!("volume out of range: {}", raw.value)));
    }
    Ok(raw.value)
}

pub fn odometer_ticks_to_cm(ticks: u32) -> f32 {
    (ticks as f64 / ODOMETER_TICKS_PER_CM) as f32
}

/// Distance travelled in centimeters.
pub fn decode_odometer(frame: &[u8]) -> Result<f32> {
    let raw: &OdometerRaw = parse_frame(frame, CMD_READ_ODOMETER, "odometer")?;
    Ok(odometer_ticks_to_cm(raw.ticks.get()))
}

/// Shared by the get-status response and the status notification.
pub fn decode_status(frame: &[u8]) -> Result<Status> {
    let raw: &StatusRaw = parse_frame(frame, CMD_GET_STATUS, "status")?;
    Ok(Status {
        position: enum_field::<Position>(raw.position, "position")?,
        battery_volts: Status::battery_from_raw(raw.battery),
    })
}

/// Shared by the get-weight response and the weight notification.
pub fn decode_weight(frame: &[u8]) -> Result<Weight> {
    let raw: &WeightRaw = parse_frame(frame, CMD_GET_WEIGHT, "weight")?;
    Ok(Weight { degrees: raw.weight })
}

pub fn decode_clap_settings(frame: &[u8]) -> Result<ClapSettings> {
    let raw: &ClapSettingsRaw = parse_frame(frame, CMD_GET_CLAP_SETTINGS, "clap settings")?;
    Ok(ClapSettings {
        enabled: enum_field::<ClapState>(raw.enabled, "clap enabled")?,
        delay_ms: raw.delay.get(),
    })
}

pub fn decode_software_version(frame: &[u8]) -> Result<SoftwareVersion> {
    let raw: &SoftwareVersionRaw = parse_frame(frame, CMD_GET_SOFTWARE_VERSION, "software version")?;
    Ok(SoftwareVersion {
        year: SOFTWARE_YEAR_BASE + raw.year as u16,
        month: raw.month,
        day: raw.day,
        build: raw.build,
    })
}

pub fn decode_hardware_info(frame: &[u8]) -> Result<HardwareInfo> {
    let raw: &HardwareInfoRaw = parse_frame(frame, CMD_GET_HARDWARE_INFO, "hardware info")?;
    Ok(HardwareInfo {
        voice_chip: raw.voice_chip,
        hardware: raw.hardware,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chest_led_response() {
        let led = decode_chest_led(&[0x83, 0xFF, 0x00, 0xFF, 0x32, 0x32]).unwrap();
        assert_eq!(
            led,
            ChestLed {
                red: 255,
                green: 0,
                blue: 255,
                on_time_ms: 1000,
                off_time_ms: 1000,
            }
        );
    }

    #[test]
    fn test_software_version_response() {
        let version = decode_software_version(&[0x14, 15, 6, 20, 3]).unwrap();
        assert_eq!(
            version,
            SoftwareVersion {
                year: 2015,
                month: 6,
                day: 20,
                build: 3,
            }
        );
        assert_eq!(version.to_string(), "2015-06-20.3");
    }

    #[test]
    fn test_battery_scale_bounds() {
        let low = decode_status(&[CMD_GET_STATUS, 0x4D, 0x02]).unwrap();
        let high = decode_status(&[CMD_GET_STATUS, 0x7C, 0x02]).unwrap();
        assert_eq!(low.battery_volts, 4.0);
        assert!((high.battery_volts - 6.4).abs() < 1e-6, "got {}", high.battery_volts);
        assert_eq!(low.position, Position::Upright);
    }

    #[test]
    fn test_odometer_response() {
        // 485 ticks, big-endian
        let cm = decode_odometer(&[CMD_READ_ODOMETER, 0x00, 0x00, 0x01, 0xE5]).unwrap();
        assert_eq!(cm, 10.0);
    }

    #[test]
    fn test_opcode_mismatch() {
        let err = decode_volume(&[CMD_SET_VOLUME, 3]).unwrap_err();
        assert!(matches!(err, MipError::BadResponse(msg) if msg.contains("opcode")));
    }

    #[test]
    fn test_enumerated_fields_rejected() {
        assert!(decode_status(&[CMD_GET_STATUS, 0x60, 0x07]).is_err());
        assert!(decode_head_leds(&[CMD_GET_HEAD_LEDS, 0, 1, 2, 4]).is_err());
        assert!(decode_gesture_radar_mode(&[CMD_GET_GESTURE_RADAR_MODE, 0x01]).is_err());
        assert!(decode_clap_settings(&[CMD_GET_CLAP_SETTINGS, 0x02, 0x01, 0xF5]).is_err());
        assert!(decode_volume(&[CMD_GET_VOLUME, 8]).is_err());
    }

    #[test]
    fn test_longest_response_layout() {
        let sizes = [
            size_of::<ByteFrameRaw>(),
            size_of::<ChestLedRaw>(),
            size_of::<HeadLedsRaw>(),
            size_of::<OdometerRaw>(),
            size_of::<StatusRaw>(),
            size_of::<WeightRaw>(),
            size_of::<ClapSettingsRaw>(),
            size_of::<SoftwareVersionRaw>(),
            size_of::<HardwareInfoRaw>(),
        ];
        assert_eq!(sizes.iter().max(), Some(&RESPONSE_MAX_LEN));
        assert_eq!(size_of::<ChestLedRaw>(), RESPONSE_MAX_LEN);
    }

    #[test]
    fn test_clap_settings_big_endian_delay() {
        let settings = decode_clap_settings(&[CMD_GET_CLAP_SETTINGS, 0x01, 0x01, 0xF5]).unwrap();
        assert_eq!(settings.enabled, ClapState::Enabled);
        assert_eq!(settings.delay_ms, 501);
    }
}
