use task_dispatch::{
    Arguments, BoxError, Callable, DEFAULT_CONCURRENCY, DispatchError, Dispatcher, PoolBuilder,
    TaskRequest, WorkerPool, current_worker, request, run_to_completion,
};

use rand::Rng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Sleeps for `delay_ms` (named, default 0), then returns its positional
/// value, or fails with the `fail` message if one was bound.
fn checked(mut args: Arguments) -> Result<usize, BoxError> {
    let value: usize = args.take(0)?;
    let delay_ms: u64 = args.take_named_or("delay_ms", 0)?;
    let fail: Option<&'static str> = args.take_named_or("fail", None)?;

    thread::sleep(Duration::from_millis(delay_ms));

    match fail {
        Some(message) => Err(message.into()),
        None => Ok(value),
    }
}

fn random_delay() -> u64 {
    rand::thread_rng().gen_range(1..25)
}

#[test]
fn test_owned_pool_returns_results_in_request_order() {
    let pool = WorkerPool::new(4).unwrap();
    let checked = Callable::new(checked);

    let requests: Vec<_> = (0..32usize)
        .map(|i| request!(checked, i; delay_ms = random_delay()))
        .collect();

    let results = run_to_completion(requests, Some(&pool)).unwrap();

    assert_eq!(results, (0..32).collect::<Vec<_>>());
}

#[test]
fn test_owned_pool_order_survives_reverse_completion() {
    let pool = WorkerPool::new(8).unwrap();
    let checked = Callable::new(checked);

    // Later requests finish first.
    let requests: Vec<_> = (0..8usize)
        .map(|i| request!(checked, i; delay_ms = (8 - i as u64) * 15))
        .collect();

    let results = run_to_completion(requests, Some(&pool)).unwrap();

    assert_eq!(results, vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_ephemeral_pool_returns_every_result() {
    let checked = Callable::new(checked);

    let requests: Vec<_> = (0..20usize)
        .map(|i| request!(checked, i * 3; delay_ms = random_delay()))
        .collect();

    let mut results = run_to_completion(requests, None).unwrap();
    assert_eq!(results.len(), 20);

    results.sort_unstable();
    assert_eq!(results, (0..20).map(|i| i * 3).collect::<Vec<_>>());
}

#[test]
fn test_ephemeral_pool_handles_empty_batch() {
    let results = run_to_completion(Vec::<TaskRequest<usize>>::new(), None).unwrap();
    assert!(results.is_empty());
}

fn gated(mut args: Arguments) -> Result<usize, BoxError> {
    let value: usize = args.take(0)?;
    let gate: Receiver<()> = args.take_named("gate")?;
    let done: Sender<usize> = args.take_named("done")?;

    gate.recv()?;
    let _ = done.send(value);

    Ok(value)
}

#[test]
fn test_ephemeral_pool_returns_results_in_completion_order() {
    let gated = Callable::new(gated);
    let (done_tx, done_rx) = mpsc::channel::<usize>();

    let mut gates = Vec::new();
    let mut requests = Vec::new();
    for i in 0..3usize {
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        gates.push(gate_tx);
        requests.push(request!(gated, i * 10; gate = gate_rx, done = done_tx.clone()));
    }

    let releaser = thread::spawn(move || {
        for index in [2usize, 0, 1] {
            gates[index].send(()).unwrap();
            assert_eq!(done_rx.recv().unwrap(), index * 10);
            // Leave time for the finished unit to record its outcome.
            thread::sleep(Duration::from_millis(50));
        }
    });

    let results = run_to_completion(requests, None).unwrap();
    releaser.join().unwrap();

    assert_eq!(results, vec![20, 0, 10], "results must follow completion order");
}

#[test]
fn test_owned_pool_surfaces_first_failure_in_request_order() {
    let pool = WorkerPool::new(4).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();

    let counted = Callable::new(move |args: Arguments| {
        let out = checked(args);
        counter.fetch_add(1, Ordering::SeqCst);
        out
    });

    let requests = vec![
        request!(counted, 0usize),
        request!(counted, 1usize; delay_ms = 60u64, fail = Some("first")),
        request!(counted, 2usize),
        request!(counted, 3usize; fail = Some("second")),
        request!(counted, 4usize; delay_ms = 30u64),
    ];

    let err = run_to_completion(requests, Some(&pool)).unwrap_err();

    assert_eq!(err.to_string(), "task failed: first");
    assert_eq!(
        ran.load(Ordering::SeqCst),
        5,
        "every unit runs before the barrier releases"
    );
}

#[test]
fn test_owned_pool_keeps_running_after_dispatch() {
    let pool = WorkerPool::new(3).unwrap();
    let checked = Callable::new(checked);

    let first = run_to_completion(vec![request!(checked, 1usize)], Some(&pool)).unwrap();
    let failed = run_to_completion(
        vec![request!(checked, 2usize; fail = Some("nope"))],
        Some(&pool),
    );
    let second = run_to_completion(vec![request!(checked, 3usize)], Some(&pool)).unwrap();

    assert_eq!(first, vec![1]);
    assert!(failed.is_err());
    assert_eq!(second, vec![3]);
    assert_eq!(pool.worker_threads(), 3, "caller pool must not be torn down");
}

#[test]
fn test_ephemeral_failure_propagates() {
    let checked = Callable::new(checked);

    let requests = vec![
        request!(checked, 0usize),
        request!(checked, 1usize; fail = Some("broken unit")),
        request!(checked, 2usize),
    ];

    let err = run_to_completion(requests, None).unwrap_err();

    assert!(matches!(err, DispatchError::Failed(_)));
    assert_eq!(err.to_string(), "task failed: broken unit");
}

#[test]
fn test_ephemeral_failure_still_waits_for_siblings() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();

    let slow = TaskRequest::new(move |_args: Arguments| {
        thread::sleep(Duration::from_millis(80));
        flag.store(true, Ordering::SeqCst);
        Ok::<_, BoxError>(0usize)
    });
    let fast_failure = TaskRequest::new(|_args: Arguments| Err::<usize, _>("fast failure"));

    let result = run_to_completion(vec![slow, fast_failure], None);

    assert!(result.is_err());
    assert!(
        finished.load(Ordering::SeqCst),
        "ephemeral pool must drain before the call returns"
    );
}

/// Builds a dispatcher whose ephemeral pools report live worker threads.
fn counting_dispatcher(live: &Arc<AtomicUsize>, started: &Arc<AtomicUsize>) -> Dispatcher {
    let on_start_live = live.clone();
    let on_start_count = started.clone();
    let on_stop_live = live.clone();

    Dispatcher::new().with_ephemeral_pool(
        PoolBuilder::new()
            .worker_threads(DEFAULT_CONCURRENCY)
            .on_thread_start(move || {
                on_start_live.fetch_add(1, Ordering::SeqCst);
                on_start_count.fetch_add(1, Ordering::SeqCst);
            })
            .on_thread_stop(move || {
                on_stop_live.fetch_sub(1, Ordering::SeqCst);
            }),
    )
}

#[test]
fn test_ephemeral_workers_are_joined_after_success() {
    let live = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let dispatcher = counting_dispatcher(&live, &started);
    let checked = Callable::new(checked);

    let requests: Vec<_> = (0..25usize)
        .map(|i| request!(checked, i; delay_ms = random_delay()))
        .collect();

    let results = dispatcher.run_to_completion(requests, None).unwrap();

    assert_eq!(results.len(), 25);
    assert_eq!(started.load(Ordering::SeqCst), DEFAULT_CONCURRENCY);
    assert_eq!(live.load(Ordering::SeqCst), 0, "no worker may outlive the call");
}

#[test]
fn test_ephemeral_workers_are_joined_after_failure() {
    let live = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let dispatcher = counting_dispatcher(&live, &started);
    let checked = Callable::new(checked);

    let mut requests: Vec<_> = (0..12usize)
        .map(|i| request!(checked, i; delay_ms = random_delay()))
        .collect();
    requests.push(request!(checked, 99usize; fail = Some("late failure")));

    let result = dispatcher.run_to_completion(requests, None);

    assert!(result.is_err());
    assert_eq!(started.load(Ordering::SeqCst), DEFAULT_CONCURRENCY);
    assert_eq!(live.load(Ordering::SeqCst), 0, "no worker may outlive the call");
}

#[test]
fn test_default_dispatcher_runs_at_most_ten_units_at_once() {
    assert_eq!(DEFAULT_CONCURRENCY, 10);
    assert_eq!(Dispatcher::new().ephemeral_workers(), DEFAULT_CONCURRENCY);

    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let workers = Arc::new(Mutex::new(HashSet::new()));

    let (a, p, w) = (active.clone(), peak.clone(), workers.clone());
    let probe = Callable::new(move |_args: Arguments| {
        let now = a.fetch_add(1, Ordering::SeqCst) + 1;
        p.fetch_max(now, Ordering::SeqCst);

        let worker = current_worker().ok_or("unit ran off the pool")?;
        w.lock().unwrap().insert(worker.index());

        thread::sleep(Duration::from_millis(20));
        a.fetch_sub(1, Ordering::SeqCst);
        Ok::<_, BoxError>(())
    });

    let requests: Vec<_> = (0..30).map(|_| probe.request()).collect();
    let results = run_to_completion(requests, None).unwrap();

    assert_eq!(results.len(), 30);
    assert!(peak.load(Ordering::SeqCst) <= DEFAULT_CONCURRENCY);
    assert!(
        workers
            .lock()
            .unwrap()
            .iter()
            .all(|&index| index < DEFAULT_CONCURRENCY)
    );
}

#[test]
fn test_units_never_run_on_the_calling_thread() {
    let caller = thread::current().id();
    let on_caller = Callable::new(move |_args: Arguments| {
        Ok::<_, BoxError>(thread::current().id() == caller)
    });

    assert!(current_worker().is_none());

    let pool = WorkerPool::new(2).unwrap();
    let owned = run_to_completion(vec![on_caller.request(), on_caller.request()], Some(&pool));
    let ephemeral = run_to_completion(vec![on_caller.request(), on_caller.request()], None);

    assert_eq!(owned.unwrap(), vec![false, false]);
    assert_eq!(ephemeral.unwrap(), vec![false, false]);
}
