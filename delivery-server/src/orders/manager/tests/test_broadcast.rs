use super::*;
use tokio::sync::broadcast::error::TryRecvError;

#[test]
fn test_creation_emits_one_full_snapshot() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    let order = manager
        .submit_order_at(request(vec![half_half_m(), burger_with_bacon()]), NOW)
        .unwrap();

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event_type, OrderEventType::Created);
    assert_eq!(event.previous_status, None);
    assert_eq!(event.payload, order);
    assert_eq!(
        event.payload.lines[0].second_flavor.as_ref().unwrap().product_name,
        "Calabresa"
    );
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_each_transition_emits_one_event() {
    let manager = create_test_manager();
    let order = submit(&manager);
    let mut rx = manager.subscribe();

    manager.transition_at(order.id, act(LifecycleAction::Advance), NOW).unwrap();
    manager.transition_at(order.id, act(LifecycleAction::Cancel), NOW).unwrap();
    manager.transition_at(order.id, act(LifecycleAction::Purge), NOW).unwrap();

    let events: Vec<OrderEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    let summary: Vec<_> = events
        .iter()
        .map(|e| (e.event_type, e.previous_status, e.payload.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                OrderEventType::StatusChanged,
                Some(OrderStatus::Pending),
                OrderStatus::InPreparation
            ),
            (
                OrderEventType::StatusChanged,
                Some(OrderStatus::InPreparation),
                OrderStatus::Canceled
            ),
            (
                OrderEventType::Purged,
                Some(OrderStatus::Canceled),
                OrderStatus::Canceled
            ),
        ]
    );
    assert!(events.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(events.iter().all(|e| e.order_id() == order.id));
}

#[test]
fn test_failed_transition_emits_nothing() {
    let manager = create_test_manager();
    let order = submit(&manager);
    let mut rx = manager.subscribe();

    assert!(manager.transition_at(order.id, act(LifecycleAction::Resume), NOW).is_err());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_commit_stands_without_subscribers() {
    let manager = create_test_manager();
    assert_eq!(manager.bus().subscriber_count(), 0);

    let order = submit(&manager);
    assert_eq!(manager.get_order(order.id).unwrap().order_number, order.order_number);
    assert_eq!(manager.bus().current_sequence(), 1);
}

#[test]
fn test_higher_sequence_always_carries_newer_status() {
    let manager = create_test_manager();
    let mut rx = manager.subscribe();

    for _ in 0..200 {
        let order = submit(&manager);
        let barrier = std::sync::Barrier::new(2);
        std::thread::scope(|s| {
            for _ in 0..2 {
                s.spawn(|| {
                    barrier.wait();
                    manager
                        .transition_at(order.id, act(LifecycleAction::Advance), NOW)
                        .unwrap();
                });
            }
        });

        let mut events: Vec<OrderEvent> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| e.event_type == OrderEventType::StatusChanged)
            .collect();
        assert_eq!(events.len(), 2);
        events.sort_by_key(|e| e.sequence);
        assert_eq!(events[0].payload.status, OrderStatus::InPreparation);
        assert_eq!(events[1].payload.status, OrderStatus::InTransit);
        assert_eq!(events[1].previous_status, Some(OrderStatus::InPreparation));
    }
}
