//! Bounded worker pool for the file workloads
//!
//! Workers pull task indices from a shared queue and keep their results in
//! a worker-local buffer, so nothing is locked inside the timed region.
//! Buffers are merged once every worker has joined.

use crossbeam::channel;

/// Run `work` over every task on at most `concurrency` threads
///
/// Returns exactly one result per task, in task order. `concurrency` is
/// clamped to `1..=tasks.len()`.
pub fn run_tasks<T, R, F>(tasks: &[T], concurrency: usize, work: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if tasks.is_empty() {
        return Vec::new();
    }
    let workers = concurrency.clamp(1, tasks.len());

    let (tx, rx) = channel::bounded(tasks.len());
    for index in 0..tasks.len() {
        // Capacity equals task count and the receiver is alive
        let _ = tx.send(index);
    }
    drop(tx);

    let mut merged = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                let work = &work;
                s.spawn(move |_| {
                    let mut local = Vec::new();
                    for index in rx.iter() {
                        local.push((index, work(&tasks[index])));
                    }
                    tracing::trace!(worker, completed = local.len(), "worker drained queue");
                    local
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|e| std::panic::resume_unwind(e));

    merged.sort_unstable_by_key(|(index, _)| *index);
    merged.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_empty_task_list() {
        let tasks: Vec<u32> = vec![];
        let results = run_tasks(&tasks, 4, |t| *t);
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_worker_preserves_order() {
        let tasks: Vec<u32> = (0..50).collect();
        let results = run_tasks(&tasks, 1, |t| t * 2);
        assert_eq!(results, (0..50).map(|t| t * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_many_workers_every_task_once() {
        let tasks: Vec<u32> = (0..200).collect();
        let results = run_tasks(&tasks, 8, |t| *t);
        assert_eq!(results.len(), 200);
        let unique: HashSet<_> = results.iter().collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(results, tasks);
    }

    #[test]
    fn test_concurrency_zero_runs_sequentially() {
        let tasks = vec!["a", "b", "c"];
        let results = run_tasks(&tasks, 0, |t| t.to_uppercase());
        assert_eq!(results, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_uses_multiple_threads() {
        let tasks: Vec<u32> = (0..64).collect();
        let seen = Mutex::new(HashSet::new());
        run_tasks(&tasks, 4, |_| {
            std::thread::sleep(std::time::Duration::from_millis(2));
            seen.lock().unwrap().insert(std::thread::current().id());
        });
        let threads = seen.lock().unwrap().len();
        assert!((1..=4).contains(&threads));
    }

    #[test]
    fn test_failures_are_kept_in_place() {
        let tasks: Vec<u32> = (0..10).collect();
        let results = run_tasks(&tasks, 3, |t| if *t == 3 { None } else { Some(*t) });
        assert_eq!(results[3], None);
        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 9);
    }
}
