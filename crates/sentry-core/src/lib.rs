//! The Job Manager core: job records, the output broadcaster, the
//! registry, and shutdown coordination.
//!
//! This crate is transport-agnostic — it knows nothing about gRPC, TLS,
//! or the wire schema. `sentry-api` sits on top of it.

mod broadcaster;
mod error;
mod record;
mod registry;
mod shutdown;

pub use error::{CoreError, CoreResult};
pub use record::JobRecord;
pub use registry::JobRegistry;
pub use shutdown::ShutdownCoordinator;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sentry_model::Limits;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn registry() -> JobRegistry {
        // Tests never reach the real cgroup hierarchy: no limits are set,
        // so `install` only needs to create (and later remove) a throwaway
        // directory under a tempdir-like path.
        JobRegistry::with_cgroup_root(std::env::temp_dir().join("sentry-core-tests"))
    }

    async fn drain(mut rx: mpsc::Receiver<sentry_model::OutputChunk>) -> (Vec<u8>, Vec<u8>) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(chunk) = rx.recv().await {
            if chunk.is_stderr {
                stderr.extend_from_slice(&chunk.data);
            } else {
                stdout.extend_from_slice(&chunk.data);
            }
        }
        (stdout, stderr)
    }

    #[tokio::test]
    async fn s1_start_then_history_replay() {
        let reg = registry();
        let id = reg
            .start(
                "/bin/sh".into(),
                vec!["-c".into(), "echo hello; echo err 1>&2; exit 0".into()],
                Limits::default(),
                None,
            )
            .await
            .expect("start");

        // Let the job run to completion before attaching.
        for _ in 0..50 {
            if !reg.status(&id).await.unwrap_or(false) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let (tx, rx) = mpsc::channel(1);
        reg.stream(&id, CancellationToken::new(), tx)
            .await
            .expect("stream");

        let (stdout, stderr) = timeout(Duration::from_secs(2), drain(rx)).await.unwrap();
        assert_eq!(stdout, b"hello\n");
        assert_eq!(stderr, b"err\n");
    }

    #[tokio::test]
    async fn s4_stop_is_ignorable_kill_is_not() {
        let reg = registry();
        let id = reg
            .start(
                "/bin/sh".into(),
                vec!["-c".into(), "trap '' TERM; sleep 60".into()],
                Limits::default(),
                None,
            )
            .await
            .expect("start");

        tokio::time::sleep(Duration::from_millis(50)).await;
        reg.stop(&id).await.expect("stop signals even if ignored");

        // `stop` already removed the record: a further stop/kill/status
        // is NotFound even though the process is still alive.
        assert!(matches!(reg.status(&id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn s6_unknown_id_is_not_found() {
        let reg = registry();
        let bogus = sentry_model::JobId::generate();

        assert!(matches!(reg.stop(&bogus).await, Err(CoreError::NotFound(_))));
        assert!(matches!(reg.kill(&bogus).await, Err(CoreError::NotFound(_))));
        assert!(matches!(reg.status(&bogus).await, Err(CoreError::NotFound(_))));

        let (tx, _rx) = mpsc::channel(1);
        assert!(matches!(
            reg.stream(&bogus, CancellationToken::new(), tx).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn s2_late_subscriber_gets_history_then_live() {
        let reg = registry();
        let id = reg
            .start(
                "/bin/sh".into(),
                vec![
                    "-c".into(),
                    "echo 1; sleep 0.2; echo 2; sleep 0.2; echo 3".into(),
                ],
                Limits::default(),
                None,
            )
            .await
            .expect("start");

        let (tx_a, rx_a) = mpsc::channel(1);
        reg.stream(&id, CancellationToken::new(), tx_a)
            .await
            .expect("stream a");

        // Give the job a moment to emit its first line before B attaches,
        // so B's history replay is guaranteed nonempty.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let (tx_b, rx_b) = mpsc::channel(1);
        reg.stream(&id, CancellationToken::new(), tx_b)
            .await
            .expect("stream b");

        let (a_stdout, _) = timeout(Duration::from_secs(2), drain(rx_a)).await.unwrap();
        let (b_stdout, _) = timeout(Duration::from_secs(2), drain(rx_b)).await.unwrap();

        assert_eq!(a_stdout, b"1\n2\n3\n");
        assert_eq!(b_stdout, b"1\n2\n3\n");
    }

    #[tokio::test]
    async fn s5_cancelled_subscriber_detaches_without_affecting_job() {
        let reg = registry();
        let id = reg
            .start(
                "/bin/sh".into(),
                vec!["-c".into(), "for i in 1 2 3 4 5; do echo $i; sleep 0.1; done".into()],
                Limits::default(),
                None,
            )
            .await
            .expect("start");

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(1);
        reg.stream(&id, cancel.clone(), tx).await.expect("stream");

        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();
        let _ = timeout(Duration::from_secs(1), drain(rx)).await;

        // The job is unaffected by subscriber cancellation: it keeps
        // running and a fresh subscriber still sees the full history.
        assert!(reg.status(&id).await.expect("status"));

        // Let the job finish, then attach again.
        for _ in 0..50 {
            if !reg.status(&id).await.unwrap_or(false) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let (tx2, rx2) = mpsc::channel(1);
        reg.stream(&id, CancellationToken::new(), tx2)
            .await
            .expect("stream again");
        let (stdout, _) = timeout(Duration::from_secs(2), drain(rx2)).await.unwrap();
        assert_eq!(stdout, b"1\n2\n3\n4\n5\n");
    }

    #[tokio::test]
    async fn concurrent_starts_never_collide() {
        let reg = registry();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..10 {
            let id = reg
                .start("/bin/true".into(), vec![], Limits::default(), None)
                .await
                .expect("start");
            assert!(ids.insert(id));
        }
    }
}
