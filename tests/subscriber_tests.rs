// Subscriber delivery tests
//
// Drive a subscriber through the in-memory transport with mixed valid and
// invalid messages and check that only the last good frame is kept.

mod common;

use common::{bgr_pixel, truncated_pixel};
use std::time::Duration;
use topic_viewer::{Display, ImageSubscriber, InMemoryTransport, RawImage};

#[test]
fn test_last_good_frame_wins() {
    let mut transport = InMemoryTransport::new();
    let publisher = transport.publisher("/cones");
    let mut subscriber = ImageSubscriber::new(&mut transport, "/cones").unwrap();

    let sequence = [
        bgr_pixel(1, 1, 1),
        truncated_pixel(),
        bgr_pixel(2, 2, 2),
        bgr_pixel(3, 3, 3),
        truncated_pixel(),
        RawImage::packed(1, 1, "jpeg", 1, vec![0xFF]),
    ];
    for msg in sequence {
        publisher.publish(msg);
    }

    assert_eq!(subscriber.spin_once(&mut transport, Duration::ZERO).unwrap(), 6);
    assert_eq!(subscriber.latest_frame().unwrap().pixel(0, 0), [3, 3, 3]);

    let stats = subscriber.stats();
    assert_eq!((stats.received, stats.converted, stats.rejected), (6, 3, 3));
}

#[test]
fn test_only_failures_leave_none() {
    let mut transport = InMemoryTransport::new();
    let publisher = transport.publisher("/cones");
    let mut subscriber = ImageSubscriber::new(&mut transport, "/cones").unwrap();

    publisher.publish(truncated_pixel());
    publisher.publish(truncated_pixel());
    subscriber.spin_once(&mut transport, Duration::ZERO).unwrap();

    assert!(subscriber.latest_frame().is_none());

    let mut display = Display::new();
    assert!(!display.refresh(subscriber.latest_frame().as_deref()));
    assert!(display.canvas().image().is_none());
}

#[test]
fn test_frames_between_refreshes_are_dropped() {
    let mut transport = InMemoryTransport::new();
    let publisher = transport.publisher("/cones");
    let mut subscriber = ImageSubscriber::new(&mut transport, "/cones").unwrap();
    let mut display = Display::new();

    for value in 1..=5 {
        publisher.publish(bgr_pixel(value, 0, 0));
        subscriber.spin_once(&mut transport, Duration::ZERO).unwrap();
    }
    display.refresh(subscriber.latest_frame().as_deref());

    assert_eq!(display.canvas().generation(), 1);
    assert_eq!(display.canvas().image().unwrap().get_pixel(0, 0).0, [0, 0, 5]);
}

#[test]
fn test_rgb_source_displays_unchanged() {
    let mut transport = InMemoryTransport::new();
    let publisher = transport.publisher("/cones");
    let mut subscriber = ImageSubscriber::new(&mut transport, "/cones").unwrap();
    let mut display = Display::new();

    // rgb8 -> bgr8 on receive, bgr8 -> rgb on display
    publisher.publish(RawImage::packed(2, 1, "rgb8", 3, vec![30, 20, 10, 1, 2, 3]));
    subscriber.spin_once(&mut transport, Duration::ZERO).unwrap();
    display.refresh(subscriber.latest_frame().as_deref());

    let image = display.canvas().image().unwrap();
    assert_eq!(image.dimensions(), (2, 1));
    assert_eq!(image.get_pixel(0, 0).0, [30, 20, 10]);
    assert_eq!(image.get_pixel(1, 0).0, [1, 2, 3]);
}
