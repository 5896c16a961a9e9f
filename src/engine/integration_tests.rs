// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crate::config::{SignalConfig, Strategy};
use crate::context::EmitContext;
use crate::engine::test_support::{Journal, MockListener};
use crate::errors::{EmitError, RegistryError};
use crate::listener::Listener;
use crate::signal::Signal;

/// End-to-end tests driving both dispatch strategies through `Signal`
#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn counting(counter: &Arc<AtomicUsize>) -> Listener<u32> {
        let counter = counter.clone();
        Listener::from_fn(move |_ctx, _v: u32| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_sequential_signal_preserves_registration_order() {
        init_tracing();
        let journal = Journal::new();
        let signal = Signal::<u32>::new_sequential("ordered");

        for name in ["first", "second", "third"] {
            signal
                .add_listener(MockListener::new(name).build(&journal), Some(name))
                .unwrap();
        }

        signal.emit(&EmitContext::background(), 1).await.unwrap();
        signal.emit(&EmitContext::background(), 2).await.unwrap();

        assert_eq!(
            journal.entries(),
            vec![
                "handle:first:1",
                "handle:second:1",
                "handle:third:1",
                "handle:first:2",
                "handle:second:2",
                "handle:third:2",
            ]
        );
    }

    #[tokio::test]
    async fn test_sequential_signal_rolls_back_up_to_failed_listener() {
        init_tracing();
        let journal = Journal::new();
        let signal = Signal::<u32>::new_sequential("orders");

        signal.add_listener(MockListener::new("reserve").build(&journal), Some("reserve")).unwrap();
        signal.add_listener(MockListener::new("charge").failing().build(&journal), Some("charge")).unwrap();
        signal.add_listener(MockListener::new("ship").build(&journal), Some("ship")).unwrap();

        let error = signal.emit(&EmitContext::background(), 11).await.unwrap_err();

        assert_eq!(
            error,
            EmitError::RolledBack {
                signal: "orders".to_string(),
                strategy: Strategy::Sequential,
            }
        );
        assert_eq!(
            journal.entries(),
            vec![
                "handle:reserve:11",
                "handle:charge:11",
                "rollback:reserve:11",
                "rollback:charge:11",
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_signal_rolls_back_every_listener() {
        init_tracing();
        let journal = Journal::new();
        let signal = Signal::<u32>::new_concurrent("orders");

        signal.add_listener(MockListener::new("reserve").build(&journal), None).unwrap();
        signal.add_listener(MockListener::new("charge").failing().build(&journal), None).unwrap();
        signal
            .add_listener(
                MockListener::new("ship")
                    .delay(Duration::from_millis(30))
                    .build(&journal),
                None,
            )
            .unwrap();

        let error = signal.emit(&EmitContext::background(), 5).await.unwrap_err();
        assert_eq!(error.strategy(), Strategy::Concurrent);

        let mut handled = journal.phase("handle");
        handled.sort();
        assert_eq!(
            handled,
            vec!["handle:charge:5", "handle:reserve:5", "handle:ship:5"]
        );

        let mut rolled_back = journal.phase("rollback");
        rolled_back.sort();
        assert_eq!(
            rolled_back,
            vec!["rollback:charge:5", "rollback:reserve:5", "rollback:ship:5"]
        );
    }

    fn sleeping(
        delay: Duration,
        fail: bool,
        calls: &Arc<AtomicUsize>,
        rollbacks: &Arc<AtomicUsize>,
    ) -> Listener<u32> {
        let calls = calls.clone();
        let rollbacks = rollbacks.clone();
        Listener::from_fn_with_rollback(
            move |_ctx, _v: u32| {
                let calls = calls.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    calls.fetch_add(1, Ordering::SeqCst);
                    if fail {
                        return Err(anyhow::anyhow!("listener failed"));
                    }
                    Ok(())
                }
            },
            move |_ctx, _v: u32| {
                let rollbacks = rollbacks.clone();
                async move {
                    rollbacks.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signal_handles_simultaneous_emits() {
        init_tracing();
        let calls = Arc::new(AtomicUsize::new(0));
        let rollbacks = Arc::new(AtomicUsize::new(0));
        let signal = Arc::new(Signal::<u32>::new_concurrent("busy"));

        for _ in 0..2 {
            signal
                .add_listener(sleeping(Duration::from_millis(100), false, &calls, &rollbacks), None)
                .unwrap();
        }

        let started = Instant::now();
        let emits: Vec<_> = (0..3)
            .map(|payload| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.emit(&EmitContext::background(), payload).await })
            })
            .collect();

        // spawning the emits must not wait for their listeners
        assert!(calls.load(Ordering::SeqCst) < 6);

        for emit in emits {
            emit.await.unwrap().unwrap();
        }

        // listeners overlap within an emission; emissions run one after another
        assert!(started.elapsed() < Duration::from_millis(350));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(rollbacks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_simultaneous_failing_emits_roll_back_every_listener() {
        init_tracing();
        let calls = Arc::new(AtomicUsize::new(0));
        let rollbacks = Arc::new(AtomicUsize::new(0));
        let signal = Arc::new(Signal::<u32>::new_concurrent("failing"));

        signal
            .add_listener(sleeping(Duration::from_millis(100), true, &calls, &rollbacks), None)
            .unwrap();
        signal
            .add_listener(sleeping(Duration::from_millis(100), false, &calls, &rollbacks), None)
            .unwrap();

        let started = Instant::now();
        let emits: Vec<_> = (1..=3)
            .map(|payload| {
                let signal = signal.clone();
                tokio::spawn(async move { signal.emit(&EmitContext::background(), payload).await })
            })
            .collect();

        assert!(rollbacks.load(Ordering::SeqCst) < 6);

        for emit in emits {
            let error = emit.await.unwrap().unwrap_err();
            assert_eq!(error.signal(), "failing");
        }

        assert!(started.elapsed() < Duration::from_millis(350));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(rollbacks.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dropped_concurrent_emit_still_rolls_back_and_holds_admission() {
        init_tracing();
        let rollbacks = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let signal = Signal::<u32>::new_concurrent("abandoned");

        let listener = {
            let rollbacks = rollbacks.clone();
            let active = active.clone();
            let max_active = max_active.clone();
            Listener::from_fn_with_rollback(
                move |_ctx, _v: u32| {
                    let active = active.clone();
                    let max_active = max_active.clone();
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_active.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Err(anyhow::anyhow!("slow failure"))
                    }
                },
                move |_ctx, _v: u32| {
                    let rollbacks = rollbacks.clone();
                    async move {
                        rollbacks.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
            )
        };
        signal.add_listener(listener, None).unwrap();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            signal.emit(&EmitContext::background(), 1),
        )
        .await;
        assert!(abandoned.is_err());

        let second = signal.emit(&EmitContext::background(), 2).await;

        assert!(second.is_err());
        // the first emission finished its rollback before the second was admitted
        assert_eq!(rollbacks.load(Ordering::SeqCst), 2);
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queued_concurrent_emit_sees_registry_at_admission() {
        init_tracing();
        let gate_calls = Arc::new(AtomicUsize::new(0));
        let removed_calls = Arc::new(AtomicUsize::new(0));
        let unused = Arc::new(AtomicUsize::new(0));
        let signal = Arc::new(Signal::<u32>::new_concurrent("queued"));

        signal
            .add_listener(
                sleeping(Duration::from_millis(100), false, &gate_calls, &unused),
                Some("gate"),
            )
            .unwrap();
        signal.add_listener(counting(&removed_calls), Some("x")).unwrap();

        let first = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.emit(&EmitContext::background(), 1).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.emit(&EmitContext::background(), 2).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(removed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(signal.remove_listener("x"), Ok(1));

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(gate_calls.load(Ordering::SeqCst), 2);
        assert_eq!(removed_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_observes_emit_deadline() {
        init_tracing();
        let journal = Journal::new();
        let signal = Signal::<u32>::new_sequential("slow");

        signal
            .add_listener(
                Listener::from_fn(|ctx: EmitContext, _v: u32| async move {
                    tokio::select! {
                        _ = ctx.done() => Err(anyhow::anyhow!("gave up waiting")),
                        _ = tokio::time::sleep(Duration::from_secs(60)) => Ok(()),
                    }
                }),
                Some("slow"),
            )
            .unwrap();
        signal.add_listener(MockListener::new("after").build(&journal), None).unwrap();

        let ctx = EmitContext::with_timeout(Duration::from_millis(50));
        let result = signal.emit(&ctx, 3).await;

        assert!(result.is_err());
        assert!(ctx.is_done());
        assert!(journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_reaches_listeners() {
        init_tracing();
        let signal = Signal::<u32>::new_concurrent("cancel");
        signal
            .add_listener(
                Listener::from_fn(|ctx: EmitContext, _v: u32| async move {
                    if ctx.is_done() {
                        return Err(anyhow::anyhow!("cancelled before start"));
                    }
                    Ok(())
                }),
                None,
            )
            .unwrap();

        let ctx = EmitContext::background();
        assert!(signal.emit(&ctx, 1).await.is_ok());

        ctx.cancel();
        assert!(signal.emit(&ctx, 2).await.is_err());
    }

    #[tokio::test]
    async fn test_removed_and_reset_listeners_stop_receiving() {
        init_tracing();
        let calls = Arc::new(AtomicUsize::new(0));
        let signal = Signal::<u32>::from_config(&SignalConfig::new("keys", Strategy::Sequential));

        signal.add_listener(counting(&calls), Some("a")).unwrap();
        signal.add_listener(counting(&calls), Some("b")).unwrap();
        assert_eq!(
            signal.add_listener(counting(&calls), Some("a")),
            Err(RegistryError::DuplicateKey { key: "a".to_string() })
        );

        signal.emit(&EmitContext::background(), 1).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(signal.remove_listener("a"), Ok(1));
        assert!(!signal.contains_key("a"));
        assert_eq!(
            signal.remove_listener("missing"),
            Err(RegistryError::KeyNotFound { key: "missing".to_string() })
        );
        signal.emit(&EmitContext::background(), 2).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // a freed key can be reused
        assert_eq!(signal.add_listener(counting(&calls), Some("a")), Ok(2));

        signal.reset();
        signal.reset();
        signal.emit(&EmitContext::background(), 3).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(signal.is_empty());
    }

    #[tokio::test]
    async fn test_listener_can_mutate_its_own_signal_during_emit() {
        init_tracing();
        let late_calls = Arc::new(AtomicUsize::new(0));
        let signal = Arc::new(Signal::<u32>::new_sequential("reentrant"));
        let weak: Weak<Signal<u32>> = Arc::downgrade(&signal);

        let late = counting(&late_calls);
        signal
            .add_listener(
                Listener::from_fn(move |_ctx, _v: u32| {
                    let weak = weak.clone();
                    let late = late.clone();
                    async move {
                        if let Some(signal) = weak.upgrade() {
                            let _ = signal.add_listener(late, Some("late"));
                            let _ = signal.remove_listener("doomed");
                        }
                        Ok(())
                    }
                }),
                Some("mutator"),
            )
            .unwrap();
        let doomed_calls = Arc::new(AtomicUsize::new(0));
        signal.add_listener(counting(&doomed_calls), Some("doomed")).unwrap();

        signal.emit(&EmitContext::background(), 1).await.unwrap();

        // the emission ran against its snapshot
        assert_eq!(doomed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        assert!(signal.contains_key("late"));
        assert!(!signal.contains_key("doomed"));

        signal.emit(&EmitContext::background(), 2).await.unwrap();
        assert_eq!(doomed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_listener_can_mutate_its_own_signal_during_emit() {
        init_tracing();
        let signal = Arc::new(Signal::<u32>::new_concurrent("reentrant"));
        let weak = Arc::downgrade(&signal);

        signal
            .add_listener(
                Listener::from_fn(move |_ctx, v: u32| {
                    let weak = weak.clone();
                    async move {
                        if let Some(signal) = weak.upgrade() {
                            let key = format!("added-{}", v);
                            let _ = signal.add_listener(
                                Listener::from_fn(|_ctx, _v: u32| async move { Ok(()) }),
                                Some(key.as_str()),
                            );
                        }
                        Ok(())
                    }
                }),
                None,
            )
            .unwrap();

        signal.emit(&EmitContext::background(), 1).await.unwrap();
        assert_eq!(signal.len(), 2);
        assert!(signal.contains_key("added-1"));
    }

    #[tokio::test]
    async fn test_empty_signal_emits_successfully() {
        init_tracing();
        let sequential = Signal::<String>::new_sequential("empty");
        let concurrent = Signal::<String>::default();

        assert!(sequential
            .emit(&EmitContext::background(), "nothing".to_string())
            .await
            .is_ok());
        assert!(concurrent
            .emit(&EmitContext::background(), "nothing".to_string())
            .await
            .is_ok());
    }
}
