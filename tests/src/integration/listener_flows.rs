//! Listener lifecycle flows: listen, pull, supersede, shut down.

#[cfg(test)]
mod tests {
    use crate::support;
    use gate_events::{LedgerConnection, ListenOptions, ListenerError, ListenerRegistry, MockLedger};
    use gate_types::StreamCategory;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn registry_over(ledger: &Arc<MockLedger>) -> ListenerRegistry {
        ListenerRegistry::new(Arc::clone(ledger) as Arc<dyn LedgerConnection>)
    }

    #[tokio::test]
    async fn test_basic_event_flow_then_absent_after_close() {
        support::init_tracing();
        let ledger = Arc::new(MockLedger::new());
        let registry = registry_over(&ledger);

        registry
            .listen_ledger_events("L1", "basic", ListenOptions::new())
            .await
            .unwrap();

        ledger.set_next_block(10);
        ledger.emit_event("basic", "created", b"a");
        ledger.emit_event("basic", "updated", b"b");
        ledger.emit_event("basic", "deleted", b"c");

        for (expected_block, expected_name) in [(10, "created"), (11, "updated"), (12, "deleted")] {
            let event = timeout(Duration::from_millis(100), registry.next_ledger_event("L1"))
                .await
                .expect("timeout")
                .expect("event");
            assert_eq!(event.block_number, expected_block);
            assert_eq!(event.event_name, expected_name);
        }

        registry.close_ledger_events("L1").unwrap();
        assert!(matches!(
            registry.next_ledger_event("L1").await,
            Err(ListenerError::NoSuchListener { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_four_categories_deliver_from_one_commit() {
        let ledger = Arc::new(MockLedger::new());
        let registry = registry_over(&ledger);

        registry
            .listen_ledger_events("events", "basic", ListenOptions::new())
            .await
            .unwrap();
        registry
            .listen_blocks("blocks", ListenOptions::new())
            .await
            .unwrap();
        registry
            .listen_filtered_blocks("filtered", ListenOptions::new())
            .await
            .unwrap();
        registry
            .listen_blocks_with_private_data("private", ListenOptions::new())
            .await
            .unwrap();

        let committed = ledger.emit_event("basic", "created", b"payload");

        let event = timeout(Duration::from_millis(100), registry.next_ledger_event("events"))
            .await
            .expect("timeout")
            .expect("event");
        let block = timeout(Duration::from_millis(100), registry.next_block("blocks"))
            .await
            .expect("timeout")
            .expect("block");
        let filtered = timeout(
            Duration::from_millis(100),
            registry.next_filtered_block("filtered"),
        )
        .await
        .expect("timeout")
        .expect("filtered block");
        let private = timeout(
            Duration::from_millis(100),
            registry.next_block_with_private_data("private"),
        )
        .await
        .expect("timeout")
        .expect("private block");

        assert_eq!(event.block_number, committed);
        assert_eq!(block.header.number, committed);
        assert_eq!(filtered.block_number, committed);
        assert_eq!(private.block.header.number, committed);
        assert_eq!(filtered.transactions[0].transaction_id, event.transaction_id);
    }

    #[tokio::test]
    async fn test_replay_from_a_future_block_stays_silent_until_reached() {
        let ledger = Arc::new(MockLedger::new());
        let registry = registry_over(&ledger);

        registry
            .listen_blocks("replay", ListenOptions::new().with_start_block(100))
            .await
            .unwrap();

        // A commit below the requested start must not come through.
        ledger.commit_block(vec![b"early".to_vec()]);
        assert!(
            timeout(Duration::from_millis(50), registry.next_block("replay"))
                .await
                .is_err()
        );

        ledger.set_next_block(100);
        let reached = ledger.commit_block(vec![b"late".to_vec()]);
        let block = timeout(Duration::from_millis(100), registry.next_block("replay"))
            .await
            .expect("timeout")
            .expect("block");
        assert_eq!(block.header.number, reached);
    }

    #[tokio::test]
    async fn test_supersession_reopens_a_fresh_subscription() {
        let ledger = Arc::new(MockLedger::new());
        let registry = registry_over(&ledger);

        registry
            .listen_ledger_events("L1", "basic", ListenOptions::new())
            .await
            .unwrap();
        let first = ledger.emit_event("basic", "created", b"a");
        let event = timeout(Duration::from_millis(100), registry.next_ledger_event("L1"))
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(event.block_number, first);

        // Same name again: the old subscription is retired and a new one
        // opened at the requested position, replaying the same event.
        registry
            .listen_ledger_events("L1", "basic", ListenOptions::new().with_start_block(first))
            .await
            .unwrap();

        assert_eq!(ledger.open_feeds(), 1);
        assert_eq!(registry.active_listeners(StreamCategory::LedgerEvents), 1);
        let replayed = timeout(Duration::from_millis(100), registry.next_ledger_event("L1"))
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(replayed.block_number, first);
        assert_eq!(replayed.event_name, "created");
    }

    #[tokio::test]
    async fn test_shutdown_closes_every_listener_and_the_connection() {
        let ledger = Arc::new(MockLedger::new());
        let registry = registry_over(&ledger);

        registry
            .listen_ledger_events("events", "basic", ListenOptions::new())
            .await
            .unwrap();
        registry
            .listen_blocks("primary", ListenOptions::new())
            .await
            .unwrap();
        registry
            .listen_blocks("secondary", ListenOptions::new())
            .await
            .unwrap();
        assert_eq!(ledger.open_feeds(), 3);

        registry.close_all().unwrap();

        assert_eq!(ledger.open_feeds(), 0);
        assert!(ledger.is_closed());
        for category in StreamCategory::ALL {
            assert_eq!(registry.active_listeners(category), 0);
        }
        assert!(matches!(
            registry.next_block("primary").await,
            Err(ListenerError::NoSuchListener { .. })
        ));

        // Repeating shutdown, with every slot already absent, is fine.
        registry.close_all().unwrap();
    }

    #[tokio::test]
    async fn test_supersession_fails_an_inflight_next_with_closed() {
        let ledger = Arc::new(MockLedger::new());
        let registry = Arc::new(registry_over(&ledger));
        registry
            .listen_blocks("watcher", ListenOptions::new())
            .await
            .unwrap();

        let stale = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.next_block("watcher").await })
        };
        tokio::task::yield_now().await;

        // Re-listening under the name retires the old subscription, so the
        // pull parked on it fails rather than silently moving over.
        registry
            .listen_blocks("watcher", ListenOptions::new())
            .await
            .unwrap();

        let result = timeout(Duration::from_millis(100), stale)
            .await
            .expect("stale next must unblock")
            .expect("join");
        assert!(matches!(result, Err(ListenerError::Closed)));

        // The replacement listener is live.
        let live = ledger.commit_block(Vec::new());
        let block = timeout(Duration::from_millis(100), registry.next_block("watcher"))
            .await
            .expect("timeout")
            .expect("block");
        assert_eq!(block.header.number, live);
    }

    #[tokio::test]
    async fn test_close_unblocks_a_suspended_next() {
        let ledger = Arc::new(MockLedger::new());
        let registry = Arc::new(registry_over(&ledger));
        registry
            .listen_blocks("watcher", ListenOptions::new())
            .await
            .unwrap();

        let waiting = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.next_block("watcher").await })
        };
        // Let the pull reach its suspension point before closing.
        tokio::task::yield_now().await;

        registry.close_blocks("watcher").unwrap();

        let result = timeout(Duration::from_millis(100), waiting)
            .await
            .expect("next must unblock")
            .expect("join");
        assert!(matches!(result, Err(ListenerError::Closed)));
    }

    #[tokio::test]
    async fn test_registries_are_independent_instances() {
        let ledger_a = Arc::new(MockLedger::new());
        let ledger_b = Arc::new(MockLedger::new());
        let registry_a = registry_over(&ledger_a);
        let registry_b = registry_over(&ledger_b);

        registry_a
            .listen_blocks("watcher", ListenOptions::new())
            .await
            .unwrap();
        registry_b
            .listen_blocks("watcher", ListenOptions::new())
            .await
            .unwrap();

        ledger_a.commit_block(vec![b"a".to_vec()]);
        ledger_b.commit_block(vec![b"b".to_vec()]);

        let block_a = timeout(Duration::from_millis(100), registry_a.next_block("watcher"))
            .await
            .expect("timeout")
            .expect("block");
        let block_b = timeout(Duration::from_millis(100), registry_b.next_block("watcher"))
            .await
            .expect("timeout")
            .expect("block");
        assert_eq!(block_a.envelopes[0], b"a".to_vec());
        assert_eq!(block_b.envelopes[0], b"b".to_vec());

        // Tearing one session down leaves the other untouched.
        registry_a.close_all().unwrap();
        assert!(!ledger_b.is_closed());
        assert_eq!(registry_b.active_listeners(StreamCategory::Blocks), 1);
    }
}
