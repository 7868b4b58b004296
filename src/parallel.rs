//! Block-parallel run-and-merge engine: partition the array into aligned
//! blocks, sort each block on its own worker thread, then reduce the sorted
//! blocks with tree-style pairwise merges.

use std::cmp;
use std::thread;

use crate::error::SortError;
use crate::merge::{merge, merge_into, ScratchBuffer};
use crate::serial::{serial_sort, sort_range, DEFAULT_RUN_SIZE};

/// Block boundaries are rounded up to this many elements so neighbouring
/// workers never write to the same cache line (64 bytes for 4-byte keys).
pub const BLOCK_ALIGN: usize = 16;

sort_impl!(SortImpl, "parallel_run64", |v| parallel_sort(
    v,
    default_workers(),
    DEFAULT_RUN_SIZE
));

/// Inclusive index range of a contiguous, independently sorted region.
///
/// The live block list always satisfies: `start <= end` for every block,
/// blocks are ascending by `start`, and together they cover `[0, len - 1]`
/// with no gaps or overlaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Everything one worker needs: its disjoint slice of the array, its private
/// scratch buffer and the run length. Built before dispatch, consumed by the
/// worker thread.
struct WorkItem<'a, T> {
    block: &'a mut [T],
    scratch: &'a mut [T],
    run_size: usize,
}

impl<'a, T: Ord + Copy> WorkItem<'a, T> {
    fn run(self) {
        if self.block.len() > 1 {
            sort_range(self.block, self.run_size, self.scratch, merge);
        }
    }
}

fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Splits `len` elements into at most `workers` contiguous blocks of
/// `ceil(len / workers)` elements rounded up to [`BLOCK_ALIGN`]. Blocks that
/// would start past the end are dropped, so small arrays get fewer blocks
/// than requested workers.
pub fn partition(len: usize, workers: usize) -> Vec<Block> {
    if len == 0 {
        return Vec::new();
    }

    let p = workers.max(1);
    let mut chunk = (len + p - 1) / p;
    chunk = (chunk + BLOCK_ALIGN - 1) & !(BLOCK_ALIGN - 1);

    let mut blocks = Vec::with_capacity(p);
    let mut start = 0;
    while start < len {
        let end = cmp::min(start + chunk, len) - 1;
        blocks.push(Block { start, end });
        start += chunk;
    }
    blocks
}

/// Sorts `v` in place using `workers` OS threads. Stable. Output is identical
/// for every worker count, including counts exceeding the array length.
///
/// All scratch memory (one private buffer per worker, one whole-array buffer
/// for the reduction) is claimed before any thread is spawned, so an
/// allocation failure aborts the invocation with `v` untouched.
pub fn parallel_sort<T>(v: &mut [T], workers: usize, run_size: usize) -> Result<(), SortError>
where
    T: Ord + Copy + Send,
{
    assert!(run_size >= 1, "run_size must be at least 1");

    if v.len() <= 1 {
        return Ok(());
    }

    let mut blocks = partition(v.len(), workers);
    if blocks.len() == 1 {
        // One block is the degenerate case, no threads or reduction needed.
        return serial_sort(v, run_size);
    }

    let mut worker_scratch: Vec<ScratchBuffer<T>> = Vec::new();
    worker_scratch
        .try_reserve_exact(blocks.len())
        .map_err(|_| SortError::alloc_of::<ScratchBuffer<T>>(blocks.len()))?;
    for block in &blocks {
        worker_scratch.push(ScratchBuffer::try_new(&v[block.start..=block.end])?);
    }
    let mut reduce_scratch = ScratchBuffer::try_new(v)?;

    // Sort phase: one task per block, fork/join. The scope end is the join
    // barrier; no reduction merge starts before every block is sorted.
    // Workers share nothing: each owns a disjoint &mut slice and a private
    // scratch buffer, so the phase needs no locks.
    thread::scope(|s| {
        let mut rest = &mut v[..];
        for (block, scratch) in blocks.iter().zip(worker_scratch.iter_mut()) {
            let (head, tail) = rest.split_at_mut(block.len());
            rest = tail;

            let item = WorkItem {
                block: head,
                scratch: scratch.as_mut_slice(),
                run_size,
            };
            s.spawn(move || item.run());
        }
    });

    reduce(v, &mut blocks, reduce_scratch.as_mut_slice());
    Ok(())
}

/// Tree reduction: merge adjacent block pairs round by round until a single
/// block spanning the whole array remains.
///
/// One shared scratch buffer is safe here because merges within a round touch
/// disjoint ranges and rounds run strictly one after another.
fn reduce<T: Ord + Copy>(v: &mut [T], blocks: &mut Vec<Block>, scratch: &mut [T]) {
    debug_assert!(!blocks.is_empty());

    while blocks.len() > 1 {
        merge_round(v, blocks, scratch);
        next_round(blocks);
    }

    debug_assert_eq!(
        blocks[0],
        Block {
            start: 0,
            end: v.len() - 1
        }
    );
}

/// Merges each adjacent pair `(2k, 2k+1)` into the scratch mirror. An odd
/// trailing block is mirrored unchanged so the copy-back stays one uniform
/// whole-array copy.
fn merge_round<T: Ord + Copy>(v: &mut [T], blocks: &[Block], scratch: &mut [T]) {
    for pair in blocks.chunks(2) {
        match *pair {
            [a, b] => {
                debug_assert_eq!(a.end + 1, b.start);
                merge_into(&v[a.start..=b.end], a.len(), &mut scratch[a.start..=b.end]);
            }
            [last] => {
                scratch[last.start..=last.end].copy_from_slice(&v[last.start..=last.end]);
            }
            _ => unreachable!(),
        }
    }
    v.copy_from_slice(&scratch[..v.len()]);
}

/// Rebuilds the block list after a round: new block `k` spans from
/// `old[2k].start` to `old[2k+1].end`, an unpaired trailing block carries
/// over as-is. In place, reads stay ahead of writes.
fn next_round(blocks: &mut Vec<Block>) {
    let n = blocks.len();
    let mut k = 0;
    while 2 * k + 1 < n {
        blocks[k] = Block {
            start: blocks[2 * k].start,
            end: blocks[2 * k + 1].end,
        };
        k += 1;
    }
    if n % 2 == 1 {
        blocks[k] = blocks[n - 1];
        k += 1;
    }
    blocks.truncate(k);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns;

    fn assert_covers(blocks: &[Block], len: usize) {
        assert_eq!(blocks[0].start, 0);
        assert_eq!(blocks[blocks.len() - 1].end, len - 1);
        for w in blocks.windows(2) {
            assert!(w[0].start <= w[0].end);
            assert_eq!(w[0].end + 1, w[1].start);
        }
        assert!(blocks[blocks.len() - 1].start <= blocks[blocks.len() - 1].end);
    }

    #[test]
    fn partition_covers_exactly() {
        for len in [1usize, 15, 16, 17, 100, 1000, 4096, 100_000] {
            for workers in [1usize, 2, 3, 4, 5, 7, 8, 16, 64] {
                let blocks = partition(len, workers);
                assert!(blocks.len() <= workers);
                assert_covers(&blocks, len);
            }
        }
    }

    #[test]
    fn partition_aligns_interior_boundaries() {
        let blocks = partition(1000, 7);
        for block in &blocks[..blocks.len() - 1] {
            assert_eq!(block.len() % BLOCK_ALIGN, 0);
        }
    }

    #[test]
    fn partition_drops_empty_blocks() {
        // 10 elements for 8 workers: one aligned chunk swallows everything.
        let blocks = partition(10, 8);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], Block { start: 0, end: 9 });
    }

    #[test]
    fn partition_empty_array() {
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn next_round_handles_odd_counts_at_every_level() {
        // 5 blocks -> 3 -> 2 -> 1, the trailing block carried at two levels.
        let mut blocks: Vec<Block> = [(0, 9), (10, 19), (20, 29), (30, 39), (40, 49)]
            .iter()
            .map(|&(start, end)| Block { start, end })
            .collect();

        let mut counts = Vec::new();
        while blocks.len() > 1 {
            next_round(&mut blocks);
            counts.push(blocks.len());
            assert_covers(&blocks, 50);
        }
        assert_eq!(counts, [3, 2, 1]);
        assert_eq!(blocks[0], Block { start: 0, end: 49 });
    }

    #[test]
    fn next_round_seven_blocks() {
        let mut blocks: Vec<Block> = (0..7)
            .map(|i| Block {
                start: i * 10,
                end: i * 10 + 9,
            })
            .collect();

        let mut counts = Vec::new();
        while blocks.len() > 1 {
            next_round(&mut blocks);
            counts.push(blocks.len());
            assert_covers(&blocks, 70);
        }
        assert_eq!(counts, [4, 2, 1]);
    }

    #[test]
    fn reduce_merges_presorted_blocks() {
        // Three sorted blocks of unequal size, interleaved values.
        let mut v: Vec<u32> = Vec::new();
        v.extend((0..32).map(|i| i * 3));
        v.extend((0..32).map(|i| i * 3 + 1));
        v.extend((0..10).map(|i| i * 3 + 2));
        let mut blocks = vec![
            Block { start: 0, end: 31 },
            Block { start: 32, end: 63 },
            Block { start: 64, end: 73 },
        ];

        let mut expected = v.clone();
        expected.sort();

        let mut scratch = ScratchBuffer::try_new(&v).unwrap();
        reduce(&mut v, &mut blocks, scratch.as_mut_slice());

        assert_eq!(v, expected);
        assert_eq!(blocks, [Block { start: 0, end: 73 }]);
    }

    #[test]
    fn sorts_with_odd_worker_counts() {
        for workers in [3, 5, 7, 11] {
            let mut v = patterns::random(10_000);
            let mut expected = v.clone();
            expected.sort();

            parallel_sort(&mut v, workers, 32).unwrap();
            assert_eq!(v, expected);
        }
    }

    #[test]
    fn more_workers_than_elements() {
        let mut v = patterns::random(33);
        let mut expected = v.clone();
        expected.sort();

        parallel_sort(&mut v, 64, DEFAULT_RUN_SIZE).unwrap();
        assert_eq!(v, expected);
    }
}
