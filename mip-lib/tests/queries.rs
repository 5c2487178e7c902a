mod common;
use common::*;

#[tokio::test]
async fn test_chest_led_query() {
    let mut mip = connected_mip();
    mip.transport_mut().respond("83ff00ff3232");

    let led = mip.get_chest_led().await.unwrap();
    assert_eq!((led.red, led.green, led.blue), (255, 0, 255));
    assert_eq!(led.on_time_ms, 1000);
    assert_eq!(led.off_time_ms, 1000);

    let (frame, expect) = mip.transport().last_sent().unwrap();
    assert_eq!(frame.as_ref(), &[CMD_GET_CHEST_LED]);
    assert_eq!(*expect, Expect::Response);
}

#[tokio::test]
async fn test_mode_led_and_volume_queries() {
    let mut mip = connected_mip();
    mip.transport_mut()
        .respond("0d02")
        .respond("8b03020100")
        .respond("1603");

    assert_eq!(mip.get_gesture_radar_mode().await.unwrap(), GestureRadarMode::Gesture);
    assert_eq!(
        mip.get_head_leds().await.unwrap(),
        HeadLeds {
            led1: HeadLed::BlinkFast,
            led2: HeadLed::BlinkSlow,
            led3: HeadLed::On,
            led4: HeadLed::Off,
        }
    );
    assert_eq!(mip.get_volume().await.unwrap(), 3);
    assert_eq!(mip.transport().sent_hex(), vec!["0d", "8b", "16"]);
}

#[tokio::test]
async fn test_telemetry_queries() {
    let mut mip = connected_mip();
    mip.transport_mut()
        .respond("85000001e5")
        .respond("797c02")
        .respond("81f6")
        .respond("1f0101f4");

    assert_eq!(mip.read_odometer().await.unwrap(), 10.0);

    let status = mip.get_status().await.unwrap().value;
    assert!((status.battery_volts - 6.4).abs() < 1e-6);
    assert_eq!(status.position, Position::Upright);

    assert_eq!(mip.get_weight().await.unwrap().value.degrees, -10);

    let clap = mip.get_clap_settings().await.unwrap();
    assert_eq!(clap.enabled, ClapState::Enabled);
    assert_eq!(clap.delay_ms, 500);
}

#[tokio::test]
async fn test_version_queries() {
    let mut mip = connected_mip();
    mip.transport_mut().respond("140f061403").respond("190201");

    let version = mip.get_software_version().await.unwrap();
    assert_eq!(version.to_string(), "2015-06-20.3");

    let info = mip.get_hardware_info().await.unwrap();
    assert_eq!(info.voice_chip, 2);
    assert_eq!(info.hardware, 1);
}

#[tokio::test]
async fn test_wrong_length_response_is_rejected() {
    let mut mip = connected_mip();
    mip.transport_mut()
        .respond("83ff00ff32")
        .respond("83ff00ff323200")
        .respond("79");

    assert!(matches!(mip.get_chest_led().await, Err(MipError::BadResponse(_))));
    assert!(matches!(mip.get_chest_led().await, Err(MipError::BadResponse(_))));
    assert!(matches!(mip.get_status().await, Err(MipError::BadResponse(_))));
}

#[tokio::test]
async fn test_mismatched_or_out_of_range_response_is_rejected() {
    let mut mip = connected_mip();
    mip.transport_mut()
        .respond("1505")
        .respond("790007")
        .respond("0d03");

    assert!(matches!(mip.get_volume().await, Err(MipError::BadResponse(_))));
    assert!(matches!(mip.get_status().await, Err(MipError::BadResponse(_))));
    assert!(matches!(mip.get_gesture_radar_mode().await, Err(MipError::BadResponse(_))));
}

#[tokio::test]
async fn test_every_decoder_rejects_wrong_length() {
    let mut mip = connected_mip();
    // One short and one long frame per query
    mip.transport_mut()
        .respond("0d")
        .respond("0d0200")
        .respond("8b030201")
        .respond("8b0302010000")
        .respond("16")
        .respond("160300")
        .respond("85000001")
        .respond("85000001e500")
        .respond("81")
        .respond("81f600")
        .respond("1f0101")
        .respond("1f0101f400")
        .respond("140f0614")
        .respond("140f06140300")
        .respond("1902")
        .respond("19020100");

    for _ in 0..2 {
        assert!(matches!(mip.get_gesture_radar_mode().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_head_leds().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_volume().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.read_odometer().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_weight().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_clap_settings().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_software_version().await, Err(MipError::BadResponse(_))));
    }
    for _ in 0..2 {
        assert!(matches!(mip.get_hardware_info().await, Err(MipError::BadResponse(_))));
    }
    assert!(mip.transport().responses.is_empty());
}

#[tokio::test]
async fn test_empty_response_is_rejected() {
    let mut mip = connected_mip();
    mip.transport_mut().responses.push_back(Bytes::new());
    assert!(matches!(mip.get_chest_led().await, Err(MipError::BadResponse(_))));
}
