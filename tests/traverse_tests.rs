//! Integration tests for the bounded-parallelism entry points.
//!
//! These tests drive `sequence`, `traverse`, `choose` and `partition`
//! end to end and check:
//! - input-order output under out-of-order completion
//! - the in-flight bound, observed through an instrumented Operation
//! - the fold policy of each outcome type
//! - configuration errors, cancellation checkpoints and panics

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rstest::rstest;
use tokio_util::sync::CancellationToken;

use partraverse::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("partraverse=trace")
        .with_test_writer()
        .try_init();
}

/// Counts Operations in flight and remembers the peak.
#[derive(Debug, Default, Clone)]
struct InFlight {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl InFlight {
    async fn around<T>(&self, delay: Duration, value: T) -> T {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        value
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Ordering
// =============================================================================

#[rstest]
#[case(1)]
#[case(8)]
#[case(100)]
#[tokio::test(start_paused = true)]
async fn unbounded_successes_fold_in_input_order(#[case] count: u64) {
    init_tracing();
    let items: Vec<u64> = (0..count).collect();
    let aggregate = traverse(
        items.clone(),
        |item| async move {
            // Later items finish first.
            tokio::time::sleep(Duration::from_millis(count - item)).await;
            Ok::<_, String>(item)
        },
        &ParallelOptions::default(),
    )
    .await;
    assert_eq!(aggregate, Ok(Ok(items)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn bounded_output_keeps_input_order() {
    let options = ParallelOptions::try_with_limit(3).unwrap();
    let delays = vec![50_u64, 10, 40, 20, 30, 5, 15];
    let aggregate = delays
        .clone()
        .traverse_par(
            |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Some(delay)
            },
            &options,
        )
        .await;
    assert_eq!(aggregate, Ok(Some(delays)));
}

// =============================================================================
// Concurrency Bound
// =============================================================================

#[rstest]
#[case(1, 10)]
#[case(3, 10)]
#[case(4, 40)]
#[tokio::test(start_paused = true)]
async fn never_more_than_bound_in_flight(#[case] limit: i64, #[case] count: usize) {
    init_tracing();
    let probe = InFlight::default();
    let options = ParallelOptions::try_with_limit(limit).unwrap();

    let aggregate = traverse(
        0..count,
        |index| {
            let probe = probe.clone();
            async move {
                let delay = Duration::from_millis(1 + (index as u64 * 7) % 5);
                probe.around(delay, Ok::<_, ()>(index)).await
            }
        },
        &options,
    )
    .await;

    assert_eq!(aggregate, Ok(Ok((0..count).collect())));
    assert_eq!(probe.started(), count);
    assert!(probe.peak() <= usize::try_from(limit).unwrap());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn bound_covering_the_batch_starts_everything_at_once() {
    let probe = InFlight::default();
    let options = ParallelOptions::try_with_limit(10).unwrap();

    let outcome = traverse(
        0..10,
        |index| {
            let probe = probe.clone();
            async move { probe.around(Duration::from_millis(5), Some(index)).await }
        },
        &options,
    )
    .await;

    assert!(matches!(outcome, Ok(Some(_))));
    assert_eq!(probe.peak(), 10);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn rejections_do_not_stop_other_operations() {
    let probe = InFlight::default();
    let options = ParallelOptions::try_with_limit(2).unwrap();

    let aggregate = traverse(
        0..6,
        |index| {
            let probe = probe.clone();
            async move {
                let outcome = if index == 0 { Err("first") } else { Ok(index) };
                probe.around(Duration::from_millis(1), outcome).await
            }
        },
        &options,
    )
    .await;

    assert_eq!(aggregate, Ok(Err("first")));
    assert_eq!(probe.started(), 6);
}

// =============================================================================
// Fold Policies
// =============================================================================

#[rstest]
#[tokio::test]
async fn sequence_reports_lowest_index_error() {
    let operations = vec![
        futures::future::ready(Ok(1)),
        futures::future::ready(Err("a")),
        futures::future::ready(Ok(3)),
        futures::future::ready(Err("b")),
    ];
    let aggregate = operations.sequence_par(&ParallelOptions::default()).await;
    assert_eq!(aggregate, Ok(Err("a")));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn lowest_index_error_wins_even_when_it_completes_last() {
    let aggregate = traverse(
        vec![(0, Ok(1)), (30, Err("a")), (0, Ok(3)), (1, Err("b"))],
        |(delay, outcome)| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            outcome
        },
        &ParallelOptions::default(),
    )
    .await;
    assert_eq!(aggregate, Ok(Err("a")));
}

#[rstest]
#[tokio::test]
async fn sequence_accumulates_validation_errors() {
    let operations = vec![
        futures::future::ready(Validation::valid(1)),
        futures::future::ready(Validation::invalid("x")),
        futures::future::ready(Validation::valid(3)),
        futures::future::ready(Validation::invalid_all(vec!["y", "z"])),
    ];
    let aggregate = sequence(operations, &ParallelOptions::try_with_limit(2).unwrap()).await;
    assert_eq!(aggregate, Ok(Validation::Invalid(vec!["x", "y", "z"])));
}

#[rstest]
#[tokio::test]
async fn sequence_merges_remote_data_by_priority() {
    let operations = vec![
        futures::future::ready(RemoteData::Success(1)),
        futures::future::ready(RemoteData::NotAsked),
        futures::future::ready(RemoteData::Failure("e")),
        futures::future::ready(RemoteData::Loading),
    ];
    let aggregate = sequence(operations, &ParallelOptions::default()).await;
    assert_eq!(aggregate, Ok(RemoteData::Failure("e")));
}

#[rstest]
#[tokio::test]
async fn empty_input_is_success_for_every_policy() {
    let options = ParallelOptions::try_with_limit(1).unwrap();
    let none: Vec<i32> = Vec::new();

    assert_eq!(
        traverse(none.clone(), |n| async move { Some(n) }, &options).await,
        Ok(Some(Vec::new()))
    );
    assert_eq!(
        traverse(none.clone(), |n| async move { Ok::<_, ()>(n) }, &options).await,
        Ok(Ok(Vec::new()))
    );
    assert_eq!(
        traverse(none.clone(), |n| async move { RemoteData::<_, ()>::Success(n) }, &options).await,
        Ok(RemoteData::Success(Vec::new()))
    );
    assert_eq!(
        traverse(none.clone(), |n| async move { Validation::<_, ()>::valid(n) }, &options).await,
        Ok(Validation::Valid(Vec::new()))
    );
    assert_eq!(
        traverse(none, |n| async move { Try::Success(n) }, &options).await,
        Ok(Try::Success(Vec::new()))
    );
}

#[rstest]
#[tokio::test]
async fn choose_keeps_successes_in_input_order() {
    let chosen = vec![1, 2, 3, 4, 5]
        .choose_par(
            |number| async move {
                if number % 2 == 1 {
                    RemoteData::Success(number * 10)
                } else {
                    RemoteData::<i32, ()>::Loading
                }
            },
            &ParallelOptions::try_with_limit(2).unwrap(),
        )
        .await;
    assert_eq!(chosen, Ok(vec![10, 30, 50]));
}

#[rstest]
#[tokio::test]
async fn partition_splits_successes_and_errors() {
    let split = vec!["10", "ten", "20", "twenty"]
        .partition_par(
            |text| async move { text.parse::<u32>().map_err(|_| text.to_owned()) },
            &ParallelOptions::default(),
        )
        .await;
    assert_eq!(
        split,
        Ok((vec![10, 20], vec!["ten".to_owned(), "twenty".to_owned()]))
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[rstest]
#[case(0)]
#[case(-2)]
#[case(-100)]
fn invalid_bounds_are_rejected(#[case] limit: i64) {
    assert_eq!(
        ParallelOptions::try_with_limit(limit).unwrap_err(),
        TraverseError::InvalidConfiguration(ConfigurationError::InvalidBound(limit))
    );
    assert!(limit.to_string().parse::<Bound>().is_err());
}

#[rstest]
fn minus_one_means_unbounded() {
    let options = ParallelOptions::try_with_limit(-1).unwrap();
    assert_eq!(options.bound(), Bound::Unbounded);
}

// =============================================================================
// Cancellation
// =============================================================================

#[rstest]
#[tokio::test]
async fn cancellation_before_admission_starts_nothing() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let token = CancellationToken::new();
    token.cancel();
    let options = ParallelOptions::try_with_limit(2)
        .unwrap()
        .with_cancellation(token);

    let aggregate = traverse(
        0..10,
        |index| {
            invoked.fetch_add(1, Ordering::SeqCst);
            async move { Some(index) }
        },
        &options,
    )
    .await;

    assert_eq!(
        aggregate,
        Err(TraverseError::Cancelled(Checkpoint::BeforeAdmission))
    );
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancellation_at_admission_stops_further_invocations() {
    init_tracing();
    let invoked = Arc::new(AtomicUsize::new(0));
    let token = CancellationToken::new();
    let options = ParallelOptions::try_with_limit(1)
        .unwrap()
        .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(12)).await;
        token.cancel();
    });

    let aggregate = traverse(
        0..10,
        |index| {
            invoked.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, ()>(index)
            }
        },
        &options,
    )
    .await;
    canceller.await.unwrap();

    // Admitted at 0ms, 5ms and 10ms; item 3 is the lowest index to see the request.
    assert_eq!(
        aggregate,
        Err(TraverseError::Cancelled(Checkpoint::Admission { index: 3 }))
    );
    assert_eq!(invoked.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn cancellation_during_flight_discards_results() {
    let probe = InFlight::default();
    let token = CancellationToken::new();
    let options = ParallelOptions::new().with_cancellation(token.clone());

    let aggregate = traverse(
        0..4,
        |index| {
            let probe = probe.clone();
            let token = token.clone();
            async move {
                let value = probe.around(Duration::from_millis(5), index).await;
                token.cancel();
                Some(value)
            }
        },
        &options,
    )
    .await;

    assert_eq!(
        aggregate,
        Err(TraverseError::Cancelled(Checkpoint::AfterCompletion))
    );
    assert_eq!(probe.started(), 4);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn timeout_composes_with_cancellation() {
    let token = CancellationToken::new();
    let options = ParallelOptions::try_with_limit(2)
        .unwrap()
        .with_cancellation(token.clone());

    let raced = tokio::time::timeout(
        Duration::from_millis(10),
        traverse(
            0..4,
            |index| async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Some(index)
            },
            &options,
        ),
    )
    .await;

    assert!(raced.is_err());
    token.cancel();
    let retried = traverse(0..4, |index| async move { Some(index) }, &options).await;
    assert_eq!(
        retried,
        Err(TraverseError::Cancelled(Checkpoint::BeforeAdmission))
    );
}

// =============================================================================
// Faults
// =============================================================================

#[rstest]
#[tokio::test]
#[should_panic(expected = "operation blew up")]
async fn operation_panic_escapes_the_batch() {
    let _ = traverse(
        0..4,
        |index| async move {
            if index == 2 {
                panic!("operation blew up");
            }
            Some(index)
        },
        &ParallelOptions::try_with_limit(2).unwrap(),
    )
    .await;
}

#[rstest]
#[tokio::test]
async fn try_isolates_operation_panics() {
    let aggregate = traverse(
        0..4,
        |index| {
            Try::catching(async move {
                if index == 2 {
                    panic!("item {index} blew up");
                }
                index
            })
        },
        &ParallelOptions::default(),
    )
    .await;
    assert_eq!(aggregate, Ok(Try::Failure(Fault::new("item 2 blew up"))));
}
