// Protocol constants for the WowWee MiP BLE protocol.
//
// Every request, response and notification starts with one of these opcodes.

pub const CMD_PLAY_SOUND: u8 = 0x06;
pub const CMD_SET_POSITION: u8 = 0x08;
pub const CMD_GESTURE_NOTIFICATION: u8 = 0x0A;
pub const CMD_SET_GESTURE_RADAR_MODE: u8 = 0x0C;
/// Radar notifications reuse the set-mode opcode.
pub const CMD_RADAR_NOTIFICATION: u8 = 0x0C;
pub const CMD_GET_GESTURE_RADAR_MODE: u8 = 0x0D;
pub const CMD_GET_SOFTWARE_VERSION: u8 = 0x14;
pub const CMD_SET_VOLUME: u8 = 0x15;
pub const CMD_GET_VOLUME: u8 = 0x16;
pub const CMD_GET_HARDWARE_INFO: u8 = 0x19;
pub const CMD_SHAKE_NOTIFICATION: u8 = 0x1A;
pub const CMD_CLAP_NOTIFICATION: u8 = 0x1D;
pub const CMD_ENABLE_CLAP: u8 = 0x1E;
pub const CMD_GET_CLAP_SETTINGS: u8 = 0x1F;
pub const CMD_SET_CLAP_DELAY: u8 = 0x20;
pub const CMD_GET_UP: u8 = 0x23;
pub const CMD_DISTANCE_DRIVE: u8 = 0x70;
pub const CMD_DRIVE_FORWARD: u8 = 0x71;
pub const CMD_DRIVE_BACKWARD: u8 = 0x72;
pub const CMD_TURN_LEFT: u8 = 0x73;
pub const CMD_TURN_RIGHT: u8 = 0x74;
pub const CMD_STOP: u8 = 0x77;
pub const CMD_CONTINUOUS_DRIVE: u8 = 0x78;
pub const CMD_GET_STATUS: u8 = 0x79;
pub const CMD_GET_WEIGHT: u8 = 0x81;
pub const CMD_GET_CHEST_LED: u8 = 0x83;
pub const CMD_SET_CHEST_LED: u8 = 0x84;
pub const CMD_READ_ODOMETER: u8 = 0x85;
pub const CMD_RESET_ODOMETER: u8 = 0x86;
pub const CMD_FLASH_CHEST_LED: u8 = 0x89;
pub const CMD_SET_HEAD_LEDS: u8 = 0x8A;
pub const CMD_GET_HEAD_LEDS: u8 = 0x8B;

/// Longest request is play-sound (opcode + 8 sound/delay pairs + repeat count).
pub const REQUEST_MAX_LEN: usize = 17 + 1;

/// Longest response is the chest LED query.
pub const RESPONSE_MAX_LEN: usize = 5 + 1;

/// Number of sound/delay slots in a play-sound request.
pub const SOUND_SLOTS: usize = 8;

/// Largest magnitude accepted for continuous-drive velocity and turn rate.
pub const DRIVE_MAX_MAGNITUDE: i8 = 32;

/// Signed-magnitude bases for continuous-drive bytes.
pub const VELOCITY_REVERSE_BASE: u8 = 0x20;
pub const TURN_RIGHT_BASE: u8 = 0x40;
pub const TURN_LEFT_BASE: u8 = 0x60;

/// Turn angles are sent in units of 5 degrees.
pub const TURN_DEGREES_PER_UNIT: u16 = 5;
pub const TURN_MAX_SPEED: u8 = 24;

/// Drive forward/backward durations are sent in units of 7 ms.
pub const DRIVE_MS_PER_TICK: u16 = 7;
pub const DRIVE_MAX_SPEED: u8 = 30;

/// Chest LED flash on/off times are sent in units of 20 ms.
pub const CHEST_LED_MS_PER_TICK: u16 = 20;

/// Play-sound delays are sent in units of 30 ms.
pub const SOUND_DELAY_MS_PER_TICK: u16 = 30;

pub const DISTANCE_DRIVE_MAX_DEGREES: u16 = 360;
pub const VOLUME_MAX: u8 = 7;

/// Raw battery byte reported at 4.0 V.
pub const BATTERY_RAW_MIN: u8 = 0x4D;
/// Raw battery byte reported at 6.4 V.
pub const BATTERY_RAW_MAX: u8 = 0x7C;
pub const BATTERY_VOLTS_MIN: f32 = 4.0;
pub const BATTERY_VOLTS_MAX: f32 = 6.4;

pub const ODOMETER_TICKS_PER_CM: f64 = 48.5;

/// Software version years are reported relative to 2000.
pub const SOFTWARE_YEAR_BASE: u16 = 2000;
