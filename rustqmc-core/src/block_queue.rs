use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A block of pixels that a worker is responsible for optimising (i.e.
/// a bucket).
#[derive(Debug)]
pub struct Block {
    pub start: (u32, u32),
    current: (u32, u32),
    pub end: (u32, u32),
}

impl Block {
    pub fn new(start: (u32, u32), size: u32, dims: (u32, u32)) -> Block {
        Block {
            start,
            current: start,
            end: ((start.0 + size).min(dims.0), (start.1 + size).min(dims.1)),
        }
    }

    /// Number of pixels this block covers.
    pub fn area(&self) -> u32 {
        (self.end.0 - self.start.0) * (self.end.1 - self.start.1)
    }
}

impl Iterator for Block {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        if self.current.0 >= self.end.0 || self.current.1 >= self.end.1 {
            None
        } else {
            let cur = self.current;

            if self.current.0 == self.end.0 - 1 {
                self.current.0 = self.start.0;
                self.current.1 += 1;
            } else {
                self.current.0 += 1;
            }

            Some(cur)
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}, {}) → ({}, {})",
            self.start.0, self.start.1, self.end.0, self.end.1
        )
    }
}

/// Shared work queue over a pixel grid. Workers pull blocks until the
/// queue is drained; the only synchronisation is one atomic counter.
pub struct BlockQueue {
    pub dims: (u32, u32),
    pub block_size: u32,
    counter: AtomicUsize,
    pub num_blocks: u32,
}

impl BlockQueue {
    pub fn new(dims: (u32, u32), block_size: u32) -> BlockQueue {
        let xblocks = (f64::from(dims.0) / f64::from(block_size)).ceil() as u32;
        let yblocks = (f64::from(dims.1) / f64::from(block_size)).ceil() as u32;

        BlockQueue {
            dims,
            block_size,
            counter: AtomicUsize::new(0),
            num_blocks: xblocks * yblocks,
        }
    }

    pub fn next(&self) -> Option<Block> {
        let c = self.counter.fetch_add(1, Ordering::AcqRel) as u32;
        if c >= self.num_blocks {
            None
        } else {
            let blocks_wide = (self.dims.0 + self.block_size - 1) / self.block_size;
            Some(Block::new(
                (
                    c % blocks_wide * self.block_size,
                    c / blocks_wide * self.block_size,
                ),
                self.block_size,
                self.dims,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_area_and_iteration() {
        let block = Block::new((8, 8), 8, (16, 16));
        assert_eq!(block.area(), 64);

        let pixels: Vec<(u32, u32)> = Block::new((8, 8), 8, (16, 16)).collect();
        assert_eq!(pixels.len(), 64);
        assert_eq!(pixels[0], (8, 8));
        assert_eq!(pixels[63], (15, 15));
    }

    #[test]
    fn blocks_clip_to_the_grid() {
        let block = Block::new((8, 0), 8, (12, 12));
        assert_eq!(block.area(), 32);
    }

    #[test]
    fn queue_covers_the_whole_grid() {
        let queue = BlockQueue::new((32, 32), 8);
        let mut covered = 0;
        while let Some(block) = queue.next() {
            covered += block.area();
        }
        assert_eq!(covered, 32 * 32);
    }

    #[test]
    fn queue_handles_grids_smaller_than_a_block() {
        let queue = BlockQueue::new((4, 4), 8);
        assert_eq!(queue.num_blocks, 1);

        let block = queue.next().unwrap();
        assert_eq!(block.area(), 16);
        assert!(queue.next().is_none());
    }
}
