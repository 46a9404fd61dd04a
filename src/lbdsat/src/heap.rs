/****************************************************************************************[heap.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
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

use {
    crate::intmap::{AsIndex, IntMap},
    std::cmp,
};

/// Strict ordering used by `Heap`: the smallest element is on top.
pub trait Comparator<T: ?Sized> {
    fn cmp(&self, lhs: &T, rhs: &T) -> cmp::Ordering;

    #[inline]
    fn lt(&self, lhs: &T, rhs: &T) -> bool {
        self.cmp(lhs, rhs) == cmp::Ordering::Less
    }
}

/// Storage for an indexed binary heap over dense keys.
///
/// The ordering lives outside (e.g. in an activity map), so the heap is
/// `promote`d with a comparator borrowing it for each operation.
#[derive(Debug, Clone)]
pub struct HeapData<K: AsIndex> {
    heap: Vec<K>,
    /// Position of each key in `heap`, or -1.
    indices: IntMap<K, i32>,
}

impl<K: AsIndex> Default for HeapData<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AsIndex> HeapData<K> {
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            indices: IntMap::new(),
        }
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn in_heap(&self, k: K) -> bool {
        self.indices.has(k) && self.indices[k] >= 0
    }
    pub fn as_slice(&self) -> &[K] {
        &self.heap
    }

    pub fn promote<Comp: Comparator<K>>(&mut self, comp: Comp) -> Heap<K, Comp> {
        Heap { data: self, comp }
    }
}

/// A `HeapData` paired with its comparator.
pub struct Heap<'a, K: AsIndex + 'a, Comp: Comparator<K>> {
    data: &'a mut HeapData<K>,
    comp: Comp,
}

impl<'a, K: AsIndex + 'a, Comp: Comparator<K>> Heap<'a, K, Comp> {
    pub fn in_heap(&self, k: K) -> bool {
        self.data.in_heap(k)
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn place(&mut self, i: usize, k: K) {
        self.data.heap[i] = k;
        self.data.indices[k] = i as i32;
    }

    fn percolate_up(&mut self, mut i: usize) {
        let x = self.data.heap[i];
        while i != 0 {
            let p = (i - 1) >> 1;
            let parent = self.data.heap[p];
            if !self.comp.lt(&x, &parent) {
                break;
            }
            self.place(i, parent);
            i = p;
        }
        self.place(i, x);
    }

    fn percolate_down(&mut self, mut i: usize) {
        let x = self.data.heap[i];
        let len = self.data.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && self.comp.lt(&self.data.heap[right], &self.data.heap[left])
            {
                right
            } else {
                left
            };
            let c = self.data.heap[child];
            if !self.comp.lt(&c, &x) {
                break;
            }
            self.place(i, c);
            i = child;
        }
        self.place(i, x);
    }

    /// `k` moved towards the top (its key improved).
    pub fn decrease(&mut self, k: K) {
        debug_assert!(self.in_heap(k));
        let i = self.data.indices[k] as usize;
        self.percolate_up(i);
    }

    pub fn insert(&mut self, k: K) {
        self.data.indices.reserve(k, -1);
        debug_assert!(!self.in_heap(k));
        let i = self.data.heap.len();
        self.data.heap.push(k);
        self.data.indices[k] = i as i32;
        self.percolate_up(i);
    }

    /// Pop the smallest element.
    pub fn remove_min(&mut self) -> Option<K> {
        let last = self.data.heap.pop()?;
        if self.data.heap.is_empty() {
            self.data.indices[last] = -1;
            return Some(last);
        }
        let top = self.data.heap[0];
        self.data.indices[top] = -1;
        self.place(0, last);
        self.percolate_down(0);
        Some(top)
    }

    /// Rebuild the heap from scratch, using the elements in `ns`.
    pub fn build(&mut self, ns: &[K]) {
        for &x in &self.data.heap {
            self.data.indices[x] = -1;
        }
        self.data.heap.clear();
        for (i, &x) in ns.iter().enumerate() {
            self.data.indices.reserve(x, -1);
            self.data.indices[x] = i as i32;
            self.data.heap.push(x);
        }
        for i in (0..self.data.heap.len() / 2).rev() {
            self.percolate_down(i);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clause::Var;

    /// larger score first, lower index on ties
    struct ByScore<'a>(&'a [u32]);

    impl<'a> Comparator<Var> for ByScore<'a> {
        fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
            let (l, r) = (lhs.idx() as usize, rhs.idx() as usize);
            self.0[r].cmp(&self.0[l]).then(l.cmp(&r))
        }
    }

    fn drain(data: &mut HeapData<Var>, score: &[u32]) -> Vec<u32> {
        let mut h = data.promote(ByScore(score));
        let mut out = vec![];
        while let Some(v) = h.remove_min() {
            out.push(v.idx());
        }
        out
    }

    #[test]
    fn test_order_with_tie_break() {
        let score = [3, 9, 3, 1, 9, 0];
        let mut data = HeapData::new();
        {
            let mut h = data.promote(ByScore(&score));
            for i in (0..6).rev() {
                h.insert(Var::from_idx(i));
            }
        }
        assert_eq!(drain(&mut data, &score), vec![1, 4, 0, 2, 3, 5]);
        assert!(data.is_empty());
        assert!(!data.in_heap(Var::from_idx(1)));
    }

    #[test]
    fn test_decrease_after_bump() {
        let mut score = vec![1, 2, 3, 4];
        let mut data = HeapData::new();
        {
            let mut h = data.promote(ByScore(&score));
            for i in 0..4 {
                h.insert(Var::from_idx(i));
            }
        }
        score[0] = 10;
        data.promote(ByScore(&score)).decrease(Var::from_idx(0));
        assert_eq!(drain(&mut data, &score), vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_build() {
        let score = [5, 1, 7, 7];
        let vars: Vec<Var> = (0..4).map(Var::from_idx).collect();
        let mut data = HeapData::new();
        data.promote(ByScore(&score)).build(&vars[1..]);
        assert!(!data.in_heap(Var::from_idx(0)));
        assert_eq!(data.len(), 3);
        assert_eq!(drain(&mut data, &score), vec![2, 3, 1]);
    }
}
