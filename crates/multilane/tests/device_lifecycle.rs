//! End-to-end device behaviour against the mock backend.

#![allow(clippy::indexing_slicing)]

use multilane::{
    deinterleave, padding, Config, DeviceState, Error, LaneWidth, MultiLaneDevice, WAIT_FOREVER,
};
use platform::mocks::{MockBackend, MockEvent, MockFactory};
use embassy_time::Duration;
use platform::{BackendError, BackendRegistry, SpiBackend};
use static_cell::StaticCell;

fn quad_device() -> MultiLaneDevice<MockBackend> {
    let config = Config::new(18, &[23, 22, 21, 19]).unwrap();
    MultiLaneDevice::new(config, MockBackend::new(LaneWidth::Quad, 0, "quad0"))
}

#[tokio::test]
async fn four_lane_frame_end_to_end() {
    let mut device = quad_device();
    device.begin().unwrap();
    assert_eq!(device.state(), DeviceState::Ready);

    device.lane(0).write(&[0xA1, 0xA2, 0xA3]).unwrap();
    device.lane(1).write(&[0xB1, 0xB2]).unwrap();
    device.lane(2).write(&[0xC1]).unwrap();

    let transaction = device.flush().await.unwrap();
    assert_eq!(transaction.len(), 12);
    assert_eq!(transaction.sequence(), 1);
    assert!(transaction.wait().await);

    for index in 0..4 {
        assert!(device.lane(index).is_empty());
    }

    let frame = device.backend().last_transmission().unwrap().to_vec();
    assert_eq!(frame.len(), 12);
    let wire = |lane| deinterleave(LaneWidth::Quad, &frame, lane).unwrap();
    assert_eq!(wire(0), [0xA1, 0xA2, 0xA3]);
    assert_eq!(wire(1), [0x00, 0xB1, 0xB2]);
    assert_eq!(wire(2), [0x00, 0x00, 0xC1]);
    assert_eq!(wire(3), [0x00, 0x00, 0x00]);
}

#[tokio::test]
async fn lifecycle_event_order() {
    let mut device = quad_device();
    device.begin().unwrap();
    device.lane(0).write(&[1, 2]).unwrap();
    device.flush().await.unwrap().wait().await;
    device.end().await;

    assert_eq!(device.state(), DeviceState::Uninitialized);
    assert_eq!(
        device.backend().events(),
        &[
            MockEvent::Begin { bus: 0 },
            MockEvent::Transmit { len: 8 },
            MockEvent::Complete,
            MockEvent::End,
        ]
    );
}

#[tokio::test]
async fn padding_frame_fills_short_lanes() {
    let config = Config::new(18, &[23, 22])
        .unwrap()
        .with_padding(padding::APA102)
        .unwrap();
    let mut device = MultiLaneDevice::new(config, MockBackend::new(LaneWidth::Dual, 0, "dual0"));
    device.begin().unwrap();

    device.lane(0).write(&[0xFF; 6]).unwrap();
    device.lane(1).write(&[0x11]).unwrap();
    device.flush().await.unwrap().wait().await;

    let frame = device.backend().last_transmission().unwrap();
    assert_eq!(
        deinterleave(LaneWidth::Dual, frame, 1).unwrap(),
        [0xE0, 0x00, 0x00, 0x00, 0xE0, 0x11]
    );
}

#[tokio::test]
async fn flush_before_begin_fails() {
    let mut device = quad_device();
    assert_eq!(device.flush().await.err(), Some(Error::NotInitialized));
    assert!(!device.wait_complete(10).await);
    assert!(!device.is_busy());
}

#[tokio::test]
async fn empty_flush_transmits_nothing() {
    let mut device = quad_device();
    device.begin().unwrap();
    let transaction = device.flush().await.unwrap();
    assert!(transaction.is_empty());
    assert!(transaction.is_done());
    assert!(transaction.wait().await);
    assert_eq!(device.backend().transmit_count(), 0);
}

#[tokio::test]
async fn flush_waits_for_previous_frame() {
    let config = Config::new(18, &[23, 22, 21, 19]).unwrap();
    let backend = MockBackend::new(LaneWidth::Quad, 0, "quad0").with_completion_polls(5);
    let mut device = MultiLaneDevice::new(config, backend);
    device.begin().unwrap();

    device.lane(0).write(&[1]).unwrap();
    let _ = device.flush().await.unwrap();
    assert_eq!(device.state(), DeviceState::Busy);

    assert_eq!(device.try_flush().await.err(), Some(Error::Busy));

    device.lane(0).write(&[2]).unwrap();
    let second = device.flush().await.unwrap();
    assert_eq!(second.sequence(), 2);
    assert!(second.wait().await);

    let events = device.backend().events();
    assert_eq!(
        &events[1..],
        &[
            MockEvent::Transmit { len: 4 },
            MockEvent::Complete,
            MockEvent::Transmit { len: 4 },
            MockEvent::Complete,
        ]
    );
}

#[tokio::test]
async fn timeout_does_not_cancel() {
    let mut device = quad_device();
    device.begin().unwrap();
    device.backend_mut().set_stuck(true);

    device.lane(3).write(&[0x55; 4]).unwrap();
    let transaction = device.flush().await.unwrap();
    assert!(!transaction.wait_timeout(20).await);
    assert!(device.is_busy());

    device.backend_mut().set_stuck(false);
    assert!(device.wait_complete(WAIT_FOREVER).await);
    assert_eq!(device.backend().transmit_count(), 1);
}

#[tokio::test]
async fn lanes_are_empty_as_soon_as_flush_returns() {
    let config = Config::new(18, &[23, 22, 21, 19]).unwrap();
    let backend = MockBackend::new(LaneWidth::Quad, 0, "quad0").with_completion_polls(50);
    let mut device = MultiLaneDevice::new(config, backend);
    device.begin().unwrap();

    device.lane(0).write(&[0xA1, 0xA2, 0xA3]).unwrap();
    device.lane(1).write(&[0xB1, 0xB2]).unwrap();
    device.lane(2).write(&[0xC1]).unwrap();

    let len = device.flush().await.unwrap().len();
    assert_eq!(len, 12);
    assert!(device.is_busy());
    for index in 0..4 {
        assert!(device.lane(index).is_empty());
    }

    assert!(device.wait_complete(WAIT_FOREVER).await);
    assert!(!device.is_busy());
}

#[tokio::test]
async fn wait_for_duration_times_out_on_stuck_hardware() {
    let mut device = quad_device();
    device.begin().unwrap();
    device.backend_mut().set_stuck(true);

    device.lane(0).write(&[0x0F; 2]).unwrap();
    let transaction = device.flush().await.unwrap();
    assert!(!transaction.wait_for(Duration::from_millis(20)).await);
    assert!(device.is_busy());

    device.backend_mut().set_stuck(false);
    device.lane(0).write(&[0xF0]).unwrap();
    let transaction = device.flush().await.unwrap();
    assert!(transaction.wait_for(Duration::from_secs(1)).await);
    assert_eq!(device.backend().transmit_count(), 2);
}

#[tokio::test]
async fn begin_is_idempotent_and_end_is_safe_twice() {
    let mut device = quad_device();
    device.end().await;
    device.begin().unwrap();
    device.begin().unwrap();
    device.end().await;
    device.end().await;
    assert_eq!(
        device.backend().events(),
        &[MockEvent::Begin { bus: 0 }, MockEvent::End]
    );
}

#[test]
fn begin_rejects_narrow_backend() {
    let config = Config::new(18, &[1, 2, 3]).unwrap();
    let mut device = MultiLaneDevice::new(config, MockBackend::new(LaneWidth::Dual, 0, "dual0"));
    assert!(matches!(device.begin(), Err(Error::Config(_))));
    assert_eq!(device.state(), DeviceState::Uninitialized);
}

#[test]
fn begin_surfaces_backend_errors() {
    let mut device = quad_device();
    device
        .backend_mut()
        .fail_next_begin(BackendError::ResourceUnavailable("DMA channel taken"));
    assert_eq!(
        device.begin(),
        Err(Error::Backend(BackendError::ResourceUnavailable(
            "DMA channel taken"
        )))
    );
    assert_eq!(device.state(), DeviceState::Uninitialized);
    device.begin().unwrap();
}

#[tokio::test]
async fn wider_backend_leaves_spare_wires_padded() {
    let config = Config::new(18, &[23, 22, 21]).unwrap();
    let mut device = MultiLaneDevice::new(config, MockBackend::new(LaneWidth::Quad, 0, "quad0"));
    device.begin().unwrap();
    device.lane(2).write(&[0xAB, 0xCD]).unwrap();
    device.flush().await.unwrap().wait().await;

    let frame = device.backend().last_transmission().unwrap();
    assert_eq!(frame.len(), 8);
    assert_eq!(deinterleave(LaneWidth::Quad, frame, 2).unwrap(), [0xAB, 0xCD]);
    assert_eq!(deinterleave(LaneWidth::Quad, frame, 3).unwrap(), [0x00, 0x00]);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn lane_index_out_of_range_panics() {
    let mut device = quad_device();
    let _ = device.lane(4);
}

#[test]
fn try_lane_is_checked() {
    let mut device = quad_device();
    assert_eq!(device.num_lanes(), 4);
    assert!(device.try_lane(3).is_some());
    assert!(device.try_lane(4).is_none());
}

#[tokio::test]
async fn registry_selects_family_by_lane_count() {
    let mut registry = BackendRegistry::discover(&MockFactory::new());

    let five = Config::new(0, &[1, 2, 3, 4, 5]).unwrap();
    let mut octal = MultiLaneDevice::from_registry(five, &mut registry).unwrap();
    assert_eq!(octal.backend().width(), LaneWidth::Octal);
    octal.begin().unwrap();
    assert_eq!(octal.backend().config().map(|c| c.bus_num), Some(6));

    let three = Config::new(0, &[1, 2, 3]).unwrap();
    let quad = MultiLaneDevice::from_registry(three, &mut registry).unwrap();
    assert_eq!(quad.backend().name(), "mock-quad-0");

    assert_eq!(registry.available(LaneWidth::Octal), 1);
    assert!(octal.release(&mut registry).await.is_ok());
    assert_eq!(registry.available(LaneWidth::Octal), 2);
}

#[test]
fn registry_errors_are_distinct() {
    let mut registry = BackendRegistry::discover(&MockFactory::only(&[LaneWidth::Single]));

    let two = Config::new(0, &[1, 2]).unwrap();
    assert_eq!(
        MultiLaneDevice::from_registry(two, &mut registry).err(),
        Some(Error::Backend(BackendError::Unsupported(LaneWidth::Dual)))
    );

    let one = || Config::new(0, &[1]).unwrap();
    let _a = MultiLaneDevice::from_registry(one(), &mut registry).unwrap();
    let _b = MultiLaneDevice::from_registry(one(), &mut registry).unwrap();
    assert_eq!(
        MultiLaneDevice::from_registry(one(), &mut registry).err(),
        Some(Error::Backend(BackendError::AllInUse(LaneWidth::Single)))
    );
}

#[tokio::test]
async fn device_from_static_registry() {
    static REGISTRY: StaticCell<BackendRegistry<MockBackend>> = StaticCell::new();
    let registry = BackendRegistry::init_static(&REGISTRY, &MockFactory::new()).unwrap();

    let config = Config::new(18, &[23, 22, 21, 19]).unwrap();
    let mut device = MultiLaneDevice::from_registry(config, registry).unwrap();
    assert_eq!(registry.available(LaneWidth::Quad), 1);

    device.begin().unwrap();
    device.lane(1).write(&[0x42]).unwrap();
    assert!(device.flush().await.unwrap().wait().await);
    assert_eq!(device.backend().transmit_count(), 1);

    assert!(device.release(registry).await.is_ok());
    assert_eq!(registry.available(LaneWidth::Quad), 2);
}
