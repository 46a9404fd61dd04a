/****************************************************************************************[mean.rs]
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

//! Running averages feeding the restart policy.

/// Mean over the last `capacity` values.
#[derive(Debug, Clone)]
pub struct SlidingMean {
    values: Vec<f64>,
    capacity: usize,
    pos: usize,
    sum: f64,
}

impl SlidingMean {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sliding window must hold at least one value");
        SlidingMean {
            values: Vec::with_capacity(capacity),
            capacity,
            pos: 0,
            sum: 0.0,
        }
    }

    pub fn add(&mut self, v: f64) {
        if self.values.len() < self.capacity {
            self.values.push(v);
        } else {
            self.sum -= self.values[self.pos];
            self.values[self.pos] = v;
        }
        self.sum += v;
        self.pos = (self.pos + 1) % self.capacity;
    }

    /// Mean of the values in the window, `0.0` when empty.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget every value; the window keeps its capacity.
    pub fn clear(&mut self) {
        self.values.clear();
        self.pos = 0;
        self.sum = 0.0;
    }
}

/// Mean of every value ever added.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    pub fn add(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sliding_window() {
        let mut m = SlidingMean::new(3);
        assert_eq!(m.mean(), 0.0);
        m.add(3.0);
        m.add(6.0);
        assert!(!m.is_full());
        assert_eq!(m.mean(), 4.5);
        m.add(9.0);
        assert!(m.is_full());
        assert_eq!(m.mean(), 6.0);
        // evicts 3.0
        m.add(12.0);
        assert_eq!(m.len(), 3);
        assert_eq!(m.mean(), 9.0);
        m.clear();
        assert!(m.is_empty());
        m.add(1.0);
        assert_eq!(m.mean(), 1.0);
    }

    #[test]
    fn test_mean() {
        let mut m = Mean::default();
        assert_eq!(m.mean(), 0.0);
        for v in 1..=4 {
            m.add(v as f64);
        }
        assert_eq!(m.count(), 4);
        assert_eq!(m.mean(), 2.5);
    }
}
