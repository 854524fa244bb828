//! Data-parallel helpers shared by the transfer passes.
//!
//! Scatters run in two phases. Fixed-size particle chunks are processed in
//! parallel, each into its own node buffer keyed by node index in insertion
//! order. The buffers are then added into the grid serially in chunk order, so
//! the floating-point summation order depends only on the particle order and
//! never on the thread count.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::MpmResult;

/// Particles handled by one task.
pub const CHUNK_SIZE: usize = 256;

/// Per-chunk node contributions.
pub type NodeBuffer<C> = IndexMap<usize, C>;

/// Scatter `items` onto `nodes`.
///
/// `emit(index, item, buffer)` records the contributions of one item;
/// `apply(node, contribution)` folds one buffered contribution into a node.
pub fn scatter<T, N, C, E, A>(items: &[T], nodes: &mut [N], emit: E, apply: A) -> MpmResult<()>
where
    T: Sync,
    C: Send,
    E: Fn(usize, &T, &mut NodeBuffer<C>) -> MpmResult<()> + Sync + Send,
    A: Fn(&mut N, C),
{
    let buffers: Vec<NodeBuffer<C>> = items
        .par_chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(chunk, slice)| {
            let mut buffer = NodeBuffer::default();
            for (offset, item) in slice.iter().enumerate() {
                emit(chunk * CHUNK_SIZE + offset, item, &mut buffer)?;
            }
            Ok(buffer)
        })
        .collect::<MpmResult<_>>()?;

    for buffer in buffers {
        for (index, contribution) in buffer {
            apply(&mut nodes[index], contribution);
        }
    }
    Ok(())
}

/// Run `f(index, item)` on every item in parallel.
///
/// Every item is visited. On failure the error of the lowest failing index is
/// returned, whatever the thread schedule.
pub fn for_each_mut<T, F>(items: &mut [T], f: F) -> MpmResult<()>
where
    T: Send,
    F: Fn(usize, &mut T) -> MpmResult<()> + Sync + Send,
{
    let first_error = items
        .par_iter_mut()
        .enumerate()
        .filter_map(|(index, item)| f(index, item).err().map(|err| (index, err)))
        .min_by_key(|(index, _)| *index);
    match first_error {
        Some((_, err)) => Err(err),
        None => Ok(()),
    }
}
