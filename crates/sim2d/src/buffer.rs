//! Ping-pong storage for double-buffered fields.

/// A read/write pair of equally sized targets.
///
/// Passes read from [`read`](Self::read) and render into
/// [`write_mut`](Self::write_mut); [`swap`](Self::swap) commits the written
/// target by flipping an index. Texel data is never copied.
#[derive(Debug)]
pub struct DoubleBuffer<T> {
    targets: [T; 2],
    read_index: usize,
}

impl<T> DoubleBuffer<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            targets: [first, second],
            read_index: 0,
        }
    }

    /// The target last committed by a swap.
    pub fn read(&self) -> &T {
        &self.targets[self.read_index]
    }

    /// The inactive target, to be rendered into.
    pub fn write(&self) -> &T {
        &self.targets[1 - self.read_index]
    }

    pub fn write_mut(&mut self) -> &mut T {
        &mut self.targets[1 - self.read_index]
    }

    /// Borrow both sides at once for a pass that reads one and writes the other.
    pub fn split(&mut self) -> (&T, &mut T) {
        let [first, second] = &mut self.targets;
        if self.read_index == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }

    pub fn swap(&mut self) {
        self.read_index = 1 - self.read_index;
    }

    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Both targets in storage order, independent of the read index.
    pub fn targets(&self) -> &[T; 2] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_twice_restores_roles() {
        let mut buffer = DoubleBuffer::new("a", "b");
        assert_eq!(*buffer.read(), "a");
        assert_eq!(*buffer.write(), "b");

        buffer.swap();
        assert_eq!(*buffer.read(), "b");
        assert_eq!(*buffer.write(), "a");

        buffer.swap();
        assert_eq!(*buffer.read(), "a");
        assert_eq!(*buffer.write(), "b");
        assert_eq!(buffer.read_index(), 0);
    }

    #[test]
    fn test_split_is_disjoint() {
        let mut buffer = DoubleBuffer::new(vec![1.0f32], vec![0.0f32]);
        {
            let (src, dst) = buffer.split();
            dst[0] = src[0] * 2.0;
        }
        buffer.swap();
        assert_eq!(buffer.read()[0], 2.0);
        assert_eq!(buffer.write()[0], 1.0);
    }
}
