mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use procwatch::WatchError;
use procwatch::export;
use procwatch::watch::{Interval, RefreshEvent, SamplerOptions, SessionState, Watcher};

use common::{FakeProcess, FakeSource, RecordingHook, eventually, millis, watcher_for};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn retarget_starts_empty_and_fills_within_a_tick() {
    let source = Arc::new(FakeSource::new(1).with(10, FakeProcess::new("worker")));
    let watcher = watcher_for(source, SamplerOptions::default());

    let info = watcher.retarget(10, millis(50)).unwrap();
    assert_eq!(info.name, "worker");
    assert_eq!(info.state, SessionState::Collecting);
    assert!(watcher.samples().is_empty());
    assert_eq!(watcher.current_name().unwrap(), "worker");

    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    watcher.stop().await;
}

#[tokio::test]
async fn memory_is_resident_minus_shared() {
    let source = Arc::new(
        FakeSource::new(1).with(10, FakeProcess::new("worker").rss(10_000, 4_000)),
    );
    let watcher = watcher_for(source, SamplerOptions::default());

    watcher.retarget(10, millis(20)).unwrap();
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    assert_eq!(watcher.samples()[0].memory, 6_000);
    watcher.stop().await;
}

#[tokio::test]
async fn sessions_never_mix_samples() {
    let source = Arc::new(
        FakeSource::new(1)
            .with(1, FakeProcess::new("alpha").rss(100, 0))
            .with(2, FakeProcess::new("beta").rss(200, 0)),
    );
    let watcher = watcher_for(source, SamplerOptions::default());

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || watcher.samples().len() >= 3).await);
    let alpha = watcher.samples();

    watcher.retarget(2, millis(10)).unwrap();
    assert!(watcher.samples().is_empty());
    assert!(eventually(WAIT, || watcher.samples().len() >= 3).await);

    assert!(watcher.samples().iter().all(|s| s.memory == 200));
    // A snapshot taken earlier is unaffected by the hand-off.
    assert!(alpha.iter().all(|s| s.memory == 100));
    assert_eq!(watcher.current_name().unwrap(), "beta");
    watcher.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rapid_concurrent_retargets_never_deadlock_or_double_append() {
    let source = Arc::new(
        FakeSource::new(1)
            .with(1, FakeProcess::new("alpha").rss(100, 0))
            .with(2, FakeProcess::new("beta").rss(200, 0)),
    );
    let hook = Arc::new(RecordingHook::default());
    let watcher = Arc::new(Watcher::new(
        source,
        hook.clone(),
        SamplerOptions::default(),
        tokio::runtime::Handle::current(),
    ));

    let workers: Vec<_> = [1u32, 2]
        .into_iter()
        .map(|first| {
            let watcher = Arc::clone(&watcher);
            tokio::task::spawn_blocking(move || {
                for i in 0..25u32 {
                    let pid = if i % 2 == 0 { first } else { 3 - first };
                    watcher.retarget(pid, millis(2)).unwrap();
                }
            })
        })
        .collect();

    let joined = tokio::time::timeout(Duration::from_secs(10), async {
        for worker in workers {
            worker.await.unwrap();
        }
    })
    .await;
    assert!(joined.is_ok(), "retarget calls deadlocked");

    let info = watcher.session_info().unwrap();
    let expected = if info.pid == 1 { 100 } else { 200 };
    assert!(eventually(WAIT, || watcher.samples().len() >= 3).await);
    assert!(watcher.samples().iter().all(|s| s.memory == expected));

    watcher.stop().await;
    let settled = hook.events().len();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(hook.events().len(), settled, "appends after stop");

    // Every session's lengths climb one at a time: no sample landed twice.
    let mut lens: HashMap<u64, Vec<usize>> = HashMap::new();
    for event in hook.events() {
        if let RefreshEvent::Appended { session, len } = event {
            lens.entry(session).or_default().push(len);
        }
    }
    for (session, seen) in lens {
        let expected: Vec<usize> = (1..=seen.len()).collect();
        assert_eq!(seen, expected, "session {session}");
    }
}

#[tokio::test]
async fn exited_process_keeps_collected_samples() {
    let source = Arc::new(
        FakeSource::new(1)
            .with(1, FakeProcess::new("short-lived").exits_after(2))
            .with(2, FakeProcess::new("other")),
    );
    let hook = Arc::new(RecordingHook::default());
    let watcher = Watcher::new(
        source,
        hook.clone(),
        SamplerOptions::default(),
        tokio::runtime::Handle::current(),
    );

    let first = watcher.retarget(1, millis(10)).unwrap();
    let ended = eventually(WAIT, || {
        watcher
            .session_info()
            .is_some_and(|s| s.state == SessionState::Ended)
    })
    .await;
    assert!(ended);
    assert_eq!(watcher.samples().len(), 2);
    assert!(hook.events().contains(&RefreshEvent::Finished {
        session: first.id,
        state: SessionState::Ended,
    }));

    // No further samples once ended.
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(watcher.samples().len(), 2);

    let next = watcher.retarget(2, millis(10)).unwrap();
    assert_eq!(next.name, "other");
    assert!(watcher.samples().is_empty());
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    watcher.stop().await;
}

#[tokio::test]
async fn unknown_pid_leaves_current_session_running() {
    let source = Arc::new(FakeSource::new(1).with(1, FakeProcess::new("alpha")));
    let watcher = watcher_for(source, SamplerOptions::default());

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);

    let err = watcher.retarget(99, millis(10)).unwrap_err();
    assert!(matches!(err, WatchError::ProcessNotFound(99)));

    let info = watcher.session_info().unwrap();
    assert_eq!(info.pid, 1);
    assert_eq!(info.state, SessionState::Collecting);
    let before = watcher.samples().len();
    assert!(eventually(WAIT, || watcher.samples().len() > before).await);
    watcher.stop().await;
}

#[tokio::test]
async fn retarget_without_any_session_reports_not_found() {
    let source = Arc::new(FakeSource::new(1));
    let watcher = watcher_for(source, SamplerOptions::default());

    assert!(matches!(
        watcher.retarget(5, Interval::default()),
        Err(WatchError::ProcessNotFound(5))
    ));
    assert!(watcher.session_info().is_none());
    assert!(matches!(
        watcher.current_name(),
        Err(WatchError::NoActiveSession)
    ));
    assert!(watcher.samples().is_empty());
}

#[tokio::test]
async fn cpu_is_normalized_per_core() {
    let source = Arc::new(FakeSource::new(4).with(1, FakeProcess::new("busy").cpu(400.0)));
    let watcher = watcher_for(source, SamplerOptions::default());

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    assert_eq!(watcher.samples()[0].cpu, Some(100.0));
    watcher.stop().await;
}

#[tokio::test]
async fn cpu_sampling_can_be_disabled() {
    let source = Arc::new(FakeSource::new(4).with(1, FakeProcess::new("busy").cpu(400.0)));
    let options = SamplerOptions {
        cpu: false,
        ..SamplerOptions::default()
    };
    let watcher = watcher_for(source, options);

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    assert_eq!(watcher.samples()[0].cpu, None);
    watcher.stop().await;
}

#[tokio::test]
async fn hung_query_times_out_the_session() {
    let source = Arc::new(
        FakeSource::new(1)
            .with(1, FakeProcess::new("stuck").stalls_for(Duration::from_millis(300)))
            .with(2, FakeProcess::new("healthy")),
    );
    let options = SamplerOptions {
        cpu: true,
        query_timeout: Duration::from_millis(30),
    };
    let watcher = watcher_for(source, options);

    watcher.retarget(1, millis(10)).unwrap();
    let timed_out = eventually(WAIT, || {
        watcher
            .session_info()
            .is_some_and(|s| s.state == SessionState::TimedOut)
    })
    .await;
    assert!(timed_out);
    assert!(watcher.samples().is_empty());

    watcher.retarget(2, millis(10)).unwrap();
    assert!(eventually(WAIT, || !watcher.samples().is_empty()).await);
    watcher.stop().await;
}

#[tokio::test]
async fn stop_keeps_series_readable() {
    let source = Arc::new(FakeSource::new(1).with(1, FakeProcess::new("alpha")));
    let watcher = watcher_for(source.clone(), SamplerOptions::default());

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || watcher.samples().len() >= 2).await);
    watcher.stop().await;

    let info = watcher.session_info().unwrap();
    assert_eq!(info.state, SessionState::Cancelled);
    let kept = watcher.samples().len();
    let queries = source.memory_queries();
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(watcher.samples().len(), kept);
    assert_eq!(source.memory_queries(), queries);
}

#[tokio::test]
async fn three_ticks_then_export() {
    let source = Arc::new(FakeSource::new(1).with(1234, FakeProcess::new("worker")));
    let watcher = watcher_for(source, SamplerOptions::default());
    let dir = tempfile::tempdir().unwrap();

    watcher.retarget(1234, Interval::from_secs(1).unwrap()).unwrap();
    assert!(eventually(Duration::from_secs(5), || watcher.samples().len() >= 3).await);
    watcher.stop().await;

    let samples = watcher.samples();
    assert_eq!(samples.len(), 3);
    for pair in samples.windows(2) {
        let gap = (pair[1].timestamp - pair[0].timestamp).num_milliseconds();
        assert!((800..=1500).contains(&gap), "gap {gap}ms");
    }

    let name = watcher.export_to(dir.path()).unwrap();
    let expected = format!(
        "worker_{}-{}.csv",
        samples[0].timestamp.format("%Y%m%dT%H%M"),
        samples[2].timestamp.format("%Y%m%dT%H%M")
    );
    assert_eq!(name, expected);

    let written = std::fs::read_to_string(dir.path().join(&name)).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert_eq!(written.lines().next(), Some(export::HEADER));
    assert_eq!(export::read_export(&dir.path().join(&name)).unwrap(), samples.to_vec());
}

#[tokio::test]
async fn export_without_session_is_rejected() {
    let source = Arc::new(FakeSource::new(1));
    let watcher = watcher_for(source, SamplerOptions::default());
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        watcher.export_to(dir.path()),
        Err(WatchError::NoActiveSession)
    ));
}

#[tokio::test]
async fn export_before_first_sample_writes_nothing() {
    let source = Arc::new(FakeSource::new(1).with(1, FakeProcess::new("alpha")));
    let watcher = watcher_for(source, SamplerOptions::default());
    let dir = tempfile::tempdir().unwrap();

    watcher.retarget(1, Interval::from_secs(60).unwrap()).unwrap();
    assert!(matches!(
        watcher.export_to(dir.path()),
        Err(WatchError::NoDataToExport)
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    watcher.stop().await;
}

#[tokio::test]
async fn killed_process_ends_session_and_stays_exportable() {
    let source = Arc::new(FakeSource::new(1).with(1, FakeProcess::new("victim")));
    let watcher = watcher_for(source.clone(), SamplerOptions::default());
    let dir = tempfile::tempdir().unwrap();

    watcher.retarget(1, millis(10)).unwrap();
    assert!(eventually(WAIT, || watcher.samples().len() >= 2).await);
    source.kill(1);

    let ended = eventually(WAIT, || {
        watcher
            .session_info()
            .is_some_and(|s| s.state == SessionState::Ended)
    })
    .await;
    assert!(ended);

    let kept = watcher.samples();
    let name = watcher.export_to(dir.path()).unwrap();
    assert!(name.starts_with("victim_"));
    assert_eq!(export::read_export(&dir.path().join(name)).unwrap(), kept.to_vec());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hung_source_cannot_stall_a_later_retarget() {
    let source = Arc::new(
        FakeSource::new(1)
            .single_handle()
            .with(1, FakeProcess::new("stuck").stalls_for(Duration::from_millis(1500)))
            .with(2, FakeProcess::new("healthy")),
    );
    let options = SamplerOptions {
        cpu: false,
        query_timeout: Duration::from_millis(50),
    };
    let watcher = watcher_for(source, options);

    watcher.retarget(1, millis(10)).unwrap();
    let timed_out = eventually(WAIT, || {
        watcher
            .session_info()
            .is_some_and(|s| s.state == SessionState::TimedOut)
    })
    .await;
    assert!(timed_out);

    // The stuck query still holds the source; the lookup gives up on time.
    let started = std::time::Instant::now();
    let result = watcher.retarget(2, millis(10));
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(matches!(
        result,
        Err(WatchError::QueryTimeout { pid: 2, .. })
    ));
    assert_eq!(watcher.session_info().unwrap().pid, 1);

    // Once the source answers again the same retarget goes through.
    let recovered = eventually(Duration::from_secs(4), || {
        watcher.retarget(2, millis(10)).is_ok()
    })
    .await;
    assert!(recovered);
    assert_eq!(watcher.current_name().unwrap(), "healthy");
    watcher.stop().await;
}
