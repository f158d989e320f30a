//! Pure operations on an ordered task sequence.

use std::collections::{HashMap, HashSet};

use shared::domain::{Filter, Task, TaskId};

use crate::error::ListError;

/// Stable sort by `order`; equal ranks keep arrival order.
pub fn sort_by_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.order);
}

/// Drops repeated ids, keeping the first occurrence.
pub fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect()
}

pub fn filtered(tasks: &[Task], filter: Filter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Assigns `order = index + 1` across the whole sequence.
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.order = index as i64 + 1;
    }
}

/// Moves the task at filtered-view index `source` so that it lands at filtered
/// index `destination`, then renumbers the full sequence.
///
/// The moved task is located by identity. Its absolute insertion slot is found by
/// walking the remaining sequence and counting only tasks visible under `filter`:
/// it goes before the `destination`-th visible task, or directly after the last
/// visible task when dropped at the end of the view. Hidden tasks keep their
/// relative positions.
pub fn move_within_filter(
    held: &[Task],
    filter: Filter,
    source: usize,
    destination: usize,
) -> Result<Vec<Task>, ListError> {
    let visible: Vec<&TaskId> = held
        .iter()
        .filter(|task| filter.matches(task))
        .map(|task| &task.id)
        .collect();
    for index in [source, destination] {
        if index >= visible.len() {
            return Err(ListError::IndexOutOfRange {
                index,
                len: visible.len(),
            });
        }
    }

    let moved_id = visible[source].clone();
    let mut next = held.to_vec();
    let Some(from) = next.iter().position(|task| task.id == moved_id) else {
        return Err(ListError::IndexOutOfRange {
            index: source,
            len: visible.len(),
        });
    };
    let moved = next.remove(from);

    let mut rank = 0;
    let mut last_visible = None;
    let mut insert_at = None;
    for (index, task) in next.iter().enumerate() {
        if !filter.matches(task) {
            continue;
        }
        if rank == destination {
            insert_at = Some(index);
            break;
        }
        rank += 1;
        last_visible = Some(index);
    }
    let insert_at = insert_at
        .or_else(|| last_visible.map(|index| index + 1))
        .unwrap_or(from);

    next.insert(insert_at, moved);
    renumber(&mut next);
    Ok(next)
}

/// Places the tasks of `held` in the order given by `arrangement`, keeping their
/// current values. Ids no longer held are skipped; held tasks missing from the
/// arrangement follow in held order.
pub fn arrange_by(held: &[Task], arrangement: &[TaskId]) -> Vec<Task> {
    let by_id: HashMap<&TaskId, &Task> = held.iter().map(|task| (&task.id, task)).collect();
    let placed: HashSet<&TaskId> = arrangement.iter().collect();
    arrangement
        .iter()
        .filter_map(|id| by_id.get(id).map(|task| (*task).clone()))
        .chain(
            held.iter()
                .filter(|task| !placed.contains(&task.id))
                .cloned(),
        )
        .collect()
}

/// Merges a persisted reorder into the sequence as it stands now.
///
/// Returned tasks that are no longer held are dropped. Held tasks missing from
/// the response keep their current values and sort in after them by `order`.
pub fn adopt_reordered(current: &[Task], returned: Vec<Task>) -> Vec<Task> {
    let held: HashSet<&TaskId> = current.iter().map(|task| &task.id).collect();
    let mut next: Vec<Task> = dedup_by_id(returned)
        .into_iter()
        .filter(|task| held.contains(&task.id))
        .collect();

    let adopted: HashSet<TaskId> = next.iter().map(|task| task.id.clone()).collect();
    next.extend(
        current
            .iter()
            .filter(|task| !adopted.contains(&task.id))
            .cloned(),
    );
    sort_by_order(&mut next);
    next
}
