use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::Config;
use crate::error::{MipError, Result};
use crate::notification::NotificationCache;
use crate::response::{
    decode_chest_led, decode_clap_settings, decode_gesture_radar_mode, decode_hardware_info, decode_head_leds,
    decode_odometer, decode_software_version, decode_status, decode_volume, decode_weight,
};
use crate::transport::{Expect, Transport};
use crate::types::{
    ChestLed, Clap, ClapSettings, ClapState, DriveDirection, FallDirection, Gesture, GestureRadarMode, GetUp,
    HardwareInfo, HeadLed, HeadLeds, Radar, SoftwareVersion, SoundSlot, Status, Timestamped, TurnDirection, Weight,
};

/// A session with one MiP robot.
///
/// The session owns its transport for its whole life and releases it in
/// [`Mip::close`]. Every operation takes `&mut self`, so at most one request
/// is ever waiting for a response.
pub struct Mip<T: Transport> {
    transport: T,
    config: Config,
    epoch: Instant,
    notifications: NotificationCache,
}

impl<T: Transport> Mip<T> {
    /// Open the transport described by `config` and start a new session.
    pub async fn open(config: Config) -> Result<Self> {
        info!("Opening MiP transport...");
        let transport = T::open(config.init_options.as_deref()).await?;
        Ok(Self::with_transport(transport, config))
    }

    /// Start a session on a transport that is already open.
    pub fn with_transport(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            epoch: Instant::now(),
            notifications: NotificationCache::new(),
        }
    }

    /// End the session and release the transport.
    pub async fn close(self) {
        self.transport.close().await;
        info!("MiP session closed.");
    }

    /// The configuration the session was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Milliseconds since the session was opened.
    pub fn millis(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    /// Connect to the named robot, or the first one discovered.
    pub async fn connect(&mut self, name: Option<&str>) -> Result<()> {
        info!("Connecting to {}...", name.unwrap_or("first MiP discovered"));
        self.transport.connect(name).await?;
        info!("Connected.");
        Ok(())
    }

    /// Drop the connection to the robot.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect().await?;
        info!("Disconnected.");
        Ok(())
    }

    /// Begin scanning for robots.
    pub async fn start_discovery(&mut self) -> Result<()> {
        self.transport.start_discovery().await
    }

    /// Number of robots found so far.
    pub async fn discovered_count(&mut self) -> Result<usize> {
        self.transport.discovered_count().await
    }

    /// Name of the robot at `index` in the discovery list.
    pub async fn discovered_name(&mut self, index: usize) -> Result<String> {
        self.transport.discovered_name(index).await
    }

    /// Stop scanning for robots.
    pub async fn stop_discovery(&mut self) -> Result<()> {
        self.transport.stop_discovery().await
    }

    // --- Mode and LEDs ---

    /// Switch the IR sensors between gesture, radar and off.
    pub async fn set_gesture_radar_mode(&mut self, mode: GestureRadarMode) -> Result<()> {
        self.send_command(Command::SetGestureRadarMode(mode)).await
    }

    /// Read the current IR sensor mode.
    pub async fn get_gesture_radar_mode(&mut self) -> Result<GestureRadarMode> {
        let response = self.query(Command::GetGestureRadarMode).await?;
        decode_gesture_radar_mode(&response)
    }

    /// Set the chest LED to a solid color.
    pub async fn set_chest_led(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.send_command(Command::SetChestLed { red, green, blue }).await
    }

    /// Flash the chest LED. On and off times are rounded down to 20 ms steps.
    pub async fn flash_chest_led(
        &mut self,
        red: u8,
        green: u8,
        blue: u8,
        on_time_ms: u16,
        off_time_ms: u16,
    ) -> Result<()> {
        self.send_command(Command::FlashChestLed {
            red,
            green,
            blue,
            on_time_ms,
            off_time_ms,
        })
        .await
    }

    /// Read the chest LED color and flash timing.
    pub async fn get_chest_led(&mut self) -> Result<ChestLed> {
        let response = self.query(Command::GetChestLed).await?;
        decode_chest_led(&response)
    }

    /// Set each of the four head LEDs.
    pub async fn set_head_leds(&mut self, led1: HeadLed, led2: HeadLed, led3: HeadLed, led4: HeadLed) -> Result<()> {
        self.send_command(Command::SetHeadLeds(HeadLeds { led1, led2, led3, led4 }))
            .await
    }

    /// Read the state of the four head LEDs.
    pub async fn get_head_leds(&mut self) -> Result<HeadLeds> {
        let response = self.query(Command::GetHeadLeds).await?;
        decode_head_leds(&response)
    }

    // --- Motion ---

    /// Drive continuously. Needs to be resent every ~50 ms to keep moving.
    pub async fn continuous_drive(&mut self, velocity: i8, turn_rate: i8) -> Result<()> {
        self.send_command(Command::ContinuousDrive { velocity, turn_rate }).await
    }

    /// Drive a set distance, then turn by `degrees` (at most 360).
    pub async fn distance_drive(
        &mut self,
        direction: DriveDirection,
        cm: u8,
        turn: TurnDirection,
        degrees: u16,
    ) -> Result<()> {
        self.send_command(Command::DistanceDrive {
            direction,
            cm,
            turn,
            degrees,
        })
        .await
    }

    /// Turn left in place. `degrees` is rounded down to 5 degree steps.
    pub async fn turn_left(&mut self, degrees: u16, speed: u8) -> Result<()> {
        self.send_command(Command::TurnLeft { degrees, speed }).await
    }

    /// Turn right in place. `degrees` is rounded down to 5 degree steps.
    pub async fn turn_right(&mut self, degrees: u16, speed: u8) -> Result<()> {
        self.send_command(Command::TurnRight { degrees, speed }).await
    }

    /// Drive forward for `time_ms` (7 ms steps, at most 1785 ms).
    pub async fn drive_forward(&mut self, speed: u8, time_ms: u16) -> Result<()> {
        self.send_command(Command::DriveForward { speed, time_ms }).await
    }

    /// Drive backward for `time_ms` (7 ms steps, at most 1785 ms).
    pub async fn drive_backward(&mut self, speed: u8, time_ms: u16) -> Result<()> {
        self.send_command(Command::DriveBackward { speed, time_ms }).await
    }

    /// Stop all motion.
    pub async fn stop(&mut self) -> Result<()> {
        self.send_command(Command::Stop).await
    }

    /// Fall over onto the back or the face.
    pub async fn fall_down(&mut self, direction: FallDirection) -> Result<()> {
        self.send_command(Command::FallDown(direction)).await
    }

    /// Get back up after falling.
    pub async fn get_up(&mut self, getup: GetUp) -> Result<()> {
        self.send_command(Command::GetUp(getup)).await
    }

    // --- Sound ---

    /// Play up to eight sounds in sequence, then `repeat` more times.
    pub async fn play_sound(&mut self, sounds: &[SoundSlot], repeat: u8) -> Result<()> {
        self.send_command(Command::PlaySound {
            sounds: sounds.to_vec(),
            repeat,
        })
        .await
    }

    /// Set the speaker volume, 0 to 7.
    pub async fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.send_command(Command::SetVolume(volume)).await
    }

    /// Read the speaker volume.
    pub async fn get_volume(&mut self) -> Result<u8> {
        let response = self.query(Command::GetVolume).await?;
        decode_volume(&response)
    }

    // --- Telemetry ---

    /// Distance travelled since the last reset, in centimeters.
    pub async fn read_odometer(&mut self) -> Result<f32> {
        let response = self.query(Command::ReadOdometer).await?;
        decode_odometer(&response)
    }

    /// Zero the odometer.
    pub async fn reset_odometer(&mut self) -> Result<()> {
        self.send_command(Command::ResetOdometer).await
    }

    /// Query battery voltage and body position.
    pub async fn get_status(&mut self) -> Result<Timestamped<Status>> {
        let response = self.query(Command::GetStatus).await?;
        let status = decode_status(&response)?;
        Ok(Timestamped::new(self.millis(), status))
    }

    /// Query the tilt caused by carried weight.
    pub async fn get_weight(&mut self) -> Result<Timestamped<Weight>> {
        let response = self.query(Command::GetWeight).await?;
        let weight = decode_weight(&response)?;
        Ok(Timestamped::new(self.millis(), weight))
    }

    /// Read whether clap detection is on and its delay.
    pub async fn get_clap_settings(&mut self) -> Result<ClapSettings> {
        let response = self.query(Command::GetClapSettings).await?;
        decode_clap_settings(&response)
    }

    /// Turn clap detection on or off.
    pub async fn enable_clap(&mut self, state: ClapState) -> Result<()> {
        self.send_command(Command::EnableClap(state)).await
    }

    /// Set the clap detection delay in milliseconds.
    pub async fn set_clap_delay(&mut self, delay_ms: u16) -> Result<()> {
        self.send_command(Command::SetClapDelay(delay_ms)).await
    }

    /// Query the firmware build date.
    pub async fn get_software_version(&mut self) -> Result<SoftwareVersion> {
        let response = self.query(Command::GetSoftwareVersion).await?;
        decode_software_version(&response)
    }

    /// Query the voice chip and hardware revisions.
    pub async fn get_hardware_info(&mut self) -> Result<HardwareInfo> {
        let response = self.query(Command::GetHardwareInfo).await?;
        decode_hardware_info(&response)
    }

    // --- Notifications ---

    /// Latest radar range, after draining pending notifications.
    pub async fn latest_radar(&mut self) -> Result<Timestamped<Radar>> {
        self.read_notifications().await;
        self.notifications.latest_radar()
    }

    /// Latest gesture, after draining pending notifications.
    pub async fn latest_gesture(&mut self) -> Result<Timestamped<Gesture>> {
        self.read_notifications().await;
        self.notifications.latest_gesture()
    }

    /// Latest pushed status, after draining pending notifications.
    pub async fn latest_status(&mut self) -> Result<Timestamped<Status>> {
        self.read_notifications().await;
        self.notifications.latest_status()
    }

    /// Succeeds once per shake; `Empty` until the robot is shaken again.
    pub async fn latest_shake(&mut self) -> Result<()> {
        self.read_notifications().await;
        self.notifications.take_shake()
    }

    /// Latest pushed weight, after draining pending notifications.
    pub async fn latest_weight(&mut self) -> Result<Timestamped<Weight>> {
        self.read_notifications().await;
        self.notifications.latest_weight()
    }

    /// Latest clap count, after draining pending notifications.
    pub async fn latest_clap(&mut self) -> Result<Timestamped<Clap>> {
        self.read_notifications().await;
        self.notifications.latest_clap()
    }

    /// Drain every queued out-of-band frame into the notification cache.
    async fn read_notifications(&mut self) {
        loop {
            match self.transport.poll_out_of_band().await {
                Ok(Some(frame)) => {
                    let millis = self.millis();
                    self.notifications.apply(&frame, millis);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Stopped draining notifications: {}", e);
                    break;
                }
            }
        }
    }

    // --- Raw access ---

    /// Send a request that has no response.
    pub async fn raw_send(&mut self, request: &[u8]) -> Result<()> {
        debug!(bytes = hex::encode(request), "MiP write");
        self.transport.send(request, Expect::NoResponse).await
    }

    /// Send a request and wait for its response.
    ///
    /// The wait is never abandoned here; a `Timeout` can only come from the
    /// transport, which then owns discarding any late reply.
    pub async fn raw_receive(&mut self, request: &[u8]) -> Result<Bytes> {
        debug!(bytes = hex::encode(request), "MiP write, awaiting response");
        self.transport.send(request, Expect::Response).await?;

        let response = self.transport.receive_response().await?;
        debug!(bytes = hex::encode(&response), "MiP read");
        Ok(response)
    }

    /// Pop one out-of-band frame without touching the notification cache.
    pub async fn raw_receive_notification(&mut self) -> Result<Bytes> {
        let frame = self.transport.poll_out_of_band().await?.ok_or(MipError::Empty)?;
        debug!(bytes = hex::encode(&frame), "MiP notification");
        Ok(frame)
    }

    async fn send_command(&mut self, command: Command) -> Result<()> {
        let frame = command.encode()?;
        self.raw_send(&frame).await
    }

    async fn query(&mut self, command: Command) -> Result<Bytes> {
        let frame = command.encode()?;
        self.raw_receive(&frame).await
    }
}
