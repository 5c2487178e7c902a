use std::fmt::Debug;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use num_enum::TryFromPrimitive;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mip_lib::command::Command;
use mip_lib::notification::NotificationCache;
use mip_lib::response;
use mip_lib::types::{
    Clap, ClapState, DriveDirection, FallDirection, Gesture, GestureRadarMode, GetUp, HeadLed, HeadLeds, Radar, Sound,
    SoundSlot, Status, Timestamped, TurnDirection, Weight,
};

/// Offline encoder, decoder and notification replayer for MiP robot frames.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the request frame for a command as hex.
    Encode {
        #[command(subcommand)]
        request: Request,
    },
    /// Decode a response frame given as hex.
    Decode {
        kind: ResponseKind,
        hex: String,
        /// Print the decoded value as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Feed notification frames through the cache and print the latest values.
    Replay {
        /// Notification frames as hex, oldest first.
        #[arg(required = true)]
        frames: Vec<String>,
        /// Simulated time between consecutive frames.
        #[arg(long, default_value_t = 50)]
        interval_ms: u32,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum Request {
    /// 0 = disabled, 2 = gesture, 4 = radar
    SetGestureRadarMode {
        #[arg(value_parser = parse_enum::<GestureRadarMode>)]
        mode: GestureRadarMode,
    },
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
    /// Each LED: 0 = off, 1 = on, 2 = blink slow, 3 = blink fast
    SetHeadLeds {
        #[arg(value_parser = parse_enum::<HeadLed>)]
        led1: HeadLed,
        #[arg(value_parser = parse_enum::<HeadLed>)]
        led2: HeadLed,
        #[arg(value_parser = parse_enum::<HeadLed>)]
        led3: HeadLed,
        #[arg(value_parser = parse_enum::<HeadLed>)]
        led4: HeadLed,
    },
    GetHeadLeds,
    ContinuousDrive {
        #[arg(allow_hyphen_values = true)]
        velocity: i8,
        #[arg(allow_hyphen_values = true)]
        turn_rate: i8,
    },
    /// Direction: 0 = forward, 1 = backward. Turn: 0 = left, 1 = right.
    DistanceDrive {
        #[arg(value_parser = parse_enum::<DriveDirection>)]
        direction: DriveDirection,
        cm: u8,
        #[arg(value_parser = parse_enum::<TurnDirection>)]
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
    /// 0 = on back, 1 = face down
    FallDown {
        #[arg(value_parser = parse_enum::<FallDirection>)]
        direction: FallDirection,
    },
    /// 0 = from front, 1 = from back, 2 = from either
    GetUp {
        #[arg(value_parser = parse_enum::<GetUp>)]
        getup: GetUp,
    },
    PlaySound {
        /// Sound slots as INDEX[:DELAY_MS], at most eight.
        #[arg(required = true, value_parser = parse_sound_slot)]
        sounds: Vec<SoundSlot>,
        #[arg(long, default_value_t = 0)]
        repeat: u8,
    },
    SetVolume {
        volume: u8,
    },
    GetVolume,
    ReadOdometer,
    ResetOdometer,
    GetStatus,
    GetWeight,
    GetClapSettings,
    /// 0 = disabled, 1 = enabled
    EnableClap {
        #[arg(value_parser = parse_enum::<ClapState>)]
        state: ClapState,
    },
    SetClapDelay {
        delay_ms: u16,
    },
    GetSoftwareVersion,
    GetHardwareInfo,
}

impl From<Request> for Command {
    fn from(request: Request) -> Self {
        match request {
            Request::SetGestureRadarMode { mode } => Command::SetGestureRadarMode(mode),
            Request::GetGestureRadarMode => Command::GetGestureRadarMode,
            Request::SetChestLed { red, green, blue } => Command::SetChestLed { red, green, blue },
            Request::FlashChestLed {
                red,
                green,
                blue,
                on_time_ms,
                off_time_ms,
            } => Command::FlashChestLed {
                red,
                green,
                blue,
                on_time_ms,
                off_time_ms,
            },
            Request::GetChestLed => Command::GetChestLed,
            Request::SetHeadLeds { led1, led2, led3, led4 } => {
                Command::SetHeadLeds(HeadLeds { led1, led2, led3, led4 })
            }
            Request::GetHeadLeds => Command::GetHeadLeds,
            Request::ContinuousDrive { velocity, turn_rate } => Command::ContinuousDrive { velocity, turn_rate },
            Request::DistanceDrive {
                direction,
                cm,
                turn,
                degrees,
            } => Command::DistanceDrive {
                direction,
                cm,
                turn,
                degrees,
            },
            Request::TurnLeft { degrees, speed } => Command::TurnLeft { degrees, speed },
            Request::TurnRight { degrees, speed } => Command::TurnRight { degrees, speed },
            Request::DriveForward { speed, time_ms } => Command::DriveForward { speed, time_ms },
            Request::DriveBackward { speed, time_ms } => Command::DriveBackward { speed, time_ms },
            Request::Stop => Command::Stop,
            Request::FallDown { direction } => Command::FallDown(direction),
            Request::GetUp { getup } => Command::GetUp(getup),
            Request::PlaySound { sounds, repeat } => Command::PlaySound { sounds, repeat },
            Request::SetVolume { volume } => Command::SetVolume(volume),
            Request::GetVolume => Command::GetVolume,
            Request::ReadOdometer => Command::ReadOdometer,
            Request::ResetOdometer => Command::ResetOdometer,
            Request::GetStatus => Command::GetStatus,
            Request::GetWeight => Command::GetWeight,
            Request::GetClapSettings => Command::GetClapSettings,
            Request::EnableClap { state } => Command::EnableClap(state),
            Request::SetClapDelay { delay_ms } => Command::SetClapDelay(delay_ms),
            Request::GetSoftwareVersion => Command::GetSoftwareVersion,
            Request::GetHardwareInfo => Command::GetHardwareInfo,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ResponseKind {
    GestureRadarMode,
    ChestLed,
    HeadLeds,
    Volume,
    Odometer,
    Status,
    Weight,
    ClapSettings,
    SoftwareVersion,
    HardwareInfo,
}

/// Latest cached value of every notification kind after a replay.
#[derive(Serialize, Debug, Default)]
struct Snapshot {
    radar: Option<Timestamped<Radar>>,
    gesture: Option<Timestamped<Gesture>>,
    status: Option<Timestamped<Status>>,
    weight: Option<Timestamped<Weight>>,
    clap: Option<Timestamped<Clap>>,
    shake: bool,
}

fn parse_enum<E>(s: &str) -> std::result::Result<E, String>
where
    E: TryFromPrimitive<Primitive = u8>,
{
    let value: u8 = s.parse().map_err(|e| format!("'{}' is not a number: {}", s, e))?;
    E::try_from_primitive(value).map_err(|_| format!("{} is not a valid value", value))
}

fn parse_sound_slot(s: &str) -> std::result::Result<SoundSlot, String> {
    let (index, delay) = s.split_once(':').unwrap_or((s, "0"));
    let index: u8 = index.parse().map_err(|e| format!("bad sound index '{}': {}", index, e))?;
    let delay_ms: u16 = delay.parse().map_err(|e| format!("bad delay '{}': {}", delay, e))?;
    Ok(SoundSlot::new(Sound(index), delay_ms))
}

fn setup_logging(verbosity: &Verbosity<InfoLevel>) {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry().with(filter).with(console_layer).init();
}

fn parse_hex(frame: &str) -> Result<Bytes> {
    let cleaned: String = frame.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
    let bytes = hex::decode(&cleaned).with_context(|| format!("Invalid hex frame: {:?}", frame))?;
    Ok(Bytes::from(bytes))
}

fn emit<T: Serialize + Debug>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{:#?}", value);
    }
    Ok(())
}

fn run_encode(request: Request) -> Result<()> {
    let command = Command::from(request);
    let frame = command
        .encode()
        .with_context(|| format!("Failed to encode {:?}", command))?;
    debug!(opcode = format!("{:#04x}", command.opcode()), len = frame.len(), "Encoded request");
    if command.expects_response() {
        info!("The robot answers this request with a response frame.");
    }
    println!("{}", hex::encode(&frame));
    Ok(())
}

fn run_decode(kind: ResponseKind, hex_frame: &str, json: bool) -> Result<()> {
    let frame = parse_hex(hex_frame)?;
    debug!(bytes = hex::encode(&frame), ?kind, "Decoding response");

    let context = || format!("Failed to decode {:?} response", kind);
    match kind {
        ResponseKind::GestureRadarMode => emit(&response::decode_gesture_radar_mode(&frame).with_context(context)?, json),
        ResponseKind::ChestLed => emit(&response::decode_chest_led(&frame).with_context(context)?, json),
        ResponseKind::HeadLeds => emit(&response::decode_head_leds(&frame).with_context(context)?, json),
        ResponseKind::Volume => emit(&response::decode_volume(&frame).with_context(context)?, json),
        ResponseKind::Odometer => emit(&response::decode_odometer(&frame).with_context(context)?, json),
        ResponseKind::Status => emit(&response::decode_status(&frame).with_context(context)?, json),
        ResponseKind::Weight => emit(&response::decode_weight(&frame).with_context(context)?, json),
        ResponseKind::ClapSettings => emit(&response::decode_clap_settings(&frame).with_context(context)?, json),
        ResponseKind::SoftwareVersion => {
            emit(&response::decode_software_version(&frame).with_context(context)?, json)
        }
        ResponseKind::HardwareInfo => emit(&response::decode_hardware_info(&frame).with_context(context)?, json),
    }
}

fn run_replay(frames: &[String], interval_ms: u32, json: bool) -> Result<()> {
    let mut cache = NotificationCache::new();

    for (index, text) in frames.iter().enumerate() {
        let frame = parse_hex(text)?;
        let millis = index as u32 * interval_ms;
        match cache.apply(&frame, millis) {
            Some(kind) => info!("[{:>6} ms] {} <- {}", millis, kind, hex::encode(&frame)),
            None => warn!("[{:>6} ms] ignored {}", millis, hex::encode(&frame)),
        }
    }

    let snapshot = Snapshot {
        radar: cache.latest_radar().ok(),
        gesture: cache.latest_gesture().ok(),
        status: cache.latest_status().ok(),
        weight: cache.latest_weight().ok(),
        clap: cache.latest_clap().ok(),
        shake: cache.take_shake().is_ok(),
    };
    emit(&snapshot, json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbose);

    match cli.command {
        Commands::Encode { request } => run_encode(request),
        Commands::Decode { kind, hex, json } => run_decode(kind, &hex, json),
        Commands::Replay {
            frames,
            interval_ms,
            json,
        } => run_replay(&frames, interval_ms, json),
    }
}
