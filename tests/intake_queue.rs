use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use eventgate::{EventDocument, EventQueue, OfferError};
use serde_json::json;

fn event(id: i64) -> EventDocument {
    EventDocument::from_value(json!({ "id": id }))
}

#[test]
fn offers_are_rejected_at_capacity_and_the_event_is_returned() {
    let queue = EventQueue::new(2);
    queue.try_push(event(1)).unwrap();
    queue.try_push(event(2)).unwrap();

    let rejected = queue.try_push(event(3)).unwrap_err();
    let OfferError::Full(returned) = rejected;
    assert_eq!(returned.get_int("/id"), Some(3));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.capacity(), 2);
}

#[test]
fn dequeue_preserves_offer_order() {
    let queue = EventQueue::new(8);
    for id in 0..4 {
        queue.try_push(event(id)).unwrap();
    }
    for id in 0..4 {
        let dequeued = queue.pop_timeout(Duration::from_millis(50)).unwrap();
        assert_eq!(dequeued.get_int("/id"), Some(id));
    }
}

#[test]
fn timed_dequeue_expires_on_an_empty_queue() {
    let queue = EventQueue::new(1);
    let started = Instant::now();
    assert!(queue.pop_timeout(Duration::from_millis(50)).is_none());
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[test]
fn a_blocked_consumer_wakes_for_a_late_offer() {
    let queue = Arc::new(EventQueue::new(4));
    let consumer_queue = Arc::clone(&queue);
    let consumer = thread::spawn(move || consumer_queue.pop_timeout(Duration::from_secs(5)));

    thread::sleep(Duration::from_millis(30));
    queue.try_push(event(42)).unwrap();

    let received = consumer.join().unwrap().unwrap();
    assert_eq!(received.get_int("/id"), Some(42));
}
