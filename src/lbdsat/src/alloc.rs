/***************************************************************************************[alloc.rs]
Copyright (c) 2008-2010, Niklas Sorensson (MiniSat)
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
    crate::error::{Error, Result},
    std::{cmp, fmt, marker::PhantomData, mem, ops},
};

/// Arena of `T` words addressed by `Ref<T>` offsets.
///
/// Regions are never freed individually: `free` only accounts for wasted
/// words, and memory is reclaimed by copying the live regions into a
/// fresh allocator (see `ClauseAllocator::reloc`).
#[derive(Debug)]
pub struct RegionAllocator<T: Copy> {
    vec: Vec<T>,
    wasted: usize,
    limit: u32,
}

impl<T: Copy + Default> RegionAllocator<T> {
    /// New arena with room for `start_cap` words, never growing past `limit` words.
    pub fn new(start_cap: u32, limit: u32) -> Self {
        debug_assert!(limit < !0, "the last offset is reserved for `Ref::UNDEF`");
        Self {
            vec: Vec::with_capacity(cmp::min(start_cap, limit) as usize),
            wasted: 0,
            limit,
        }
    }
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.vec.len() as u32
    }
    pub fn wasted(&self) -> u32 {
        self.wasted as u32
    }
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Bytes reserved by the arena, used or not.
    pub fn memory_footprint(&self) -> usize {
        self.vec.capacity() * mem::size_of::<T>()
    }

    /// Allocate `size` contiguous words.
    ///
    /// Fails without touching the arena if it would grow past its limit
    /// or if the allocation itself fails.
    pub fn alloc(&mut self, size: u32) -> Result<Ref<T>> {
        debug_assert!(size > 0);
        let len = self.vec.len();
        let requested = len as u64 + size as u64;
        if requested > self.limit as u64 {
            return Err(Error::CapacityExhausted {
                requested: requested as usize,
                limit: self.limit as usize,
            });
        }
        self.vec.try_reserve(size as usize)?;
        self.vec.resize(len + size as usize, T::default());
        Ok(Ref(len as u32, PhantomData))
    }
    /// Make sure `additional` more words fit without reallocating.
    pub fn reserve(&mut self, additional: u32) -> Result<()> {
        self.vec.try_reserve(additional as usize)?;
        Ok(())
    }
    pub fn free(&mut self, size: u32) {
        self.wasted += size as usize;
    }
    pub fn subslice(&self, r: Ref<T>, len: u32) -> &[T] {
        &self.vec[r.0 as usize..r.0 as usize + len as usize]
    }
    pub fn subslice_mut(&mut self, r: Ref<T>, len: u32) -> &mut [T] {
        &mut self.vec[r.0 as usize..r.0 as usize + len as usize]
    }
}

impl<T: Copy> ops::Index<Ref<T>> for RegionAllocator<T> {
    type Output = T;
    fn index(&self, index: Ref<T>) -> &Self::Output {
        &self.vec[index.0 as usize]
    }
}
impl<T: Copy> ops::IndexMut<Ref<T>> for RegionAllocator<T> {
    fn index_mut(&mut self, index: Ref<T>) -> &mut Self::Output {
        &mut self.vec[index.0 as usize]
    }
}

/// Offset of a region living in a `RegionAllocator<T>`.
///
/// A `Ref` is only meaningful for the allocator that produced it; it is
/// invariant in `T` so that handles of different arenas cannot be mixed.
#[derive(Clone, Copy, Hash)]
pub struct Ref<T: Copy>(u32, PhantomData<fn(T) -> T>);

impl<T: Copy> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Self::UNDEF {
            write!(f, "Ref(UNDEF)")
        } else {
            f.debug_tuple("Ref").field(&self.0).finish()
        }
    }
}
impl<T: Copy> PartialEq for Ref<T> {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0
    }
}
impl<T: Copy> Eq for Ref<T> {}
impl<T: Copy> PartialOrd for Ref<T> {
    fn partial_cmp(&self, rhs: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(rhs))
    }
}
impl<T: Copy> Ord for Ref<T> {
    #[inline(always)]
    fn cmp(&self, rhs: &Self) -> cmp::Ordering {
        Ord::cmp(&self.0, &rhs.0)
    }
}

impl<T: Copy> Ref<T> {
    pub const UNDEF: Self = Ref(!0, PhantomData);

    /// Raw offset in the arena.
    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.0
    }
}

impl<T: Copy> ops::Add<u32> for Ref<T> {
    type Output = Ref<T>;
    #[inline(always)]
    fn add(self, rhs: u32) -> Self::Output {
        Ref(self.0 + rhs, PhantomData)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alloc_contiguous() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(4, 100);
        let a = ra.alloc(3).unwrap();
        let b = ra.alloc(5).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 3);
        assert_eq!(ra.len(), 8);
        ra.subslice_mut(b, 5).copy_from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(ra[b + 2], 3);
        assert_eq!(ra.subslice(a, 3), &[0, 0, 0]);
    }

    #[test]
    fn test_limit() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(0, 10);
        ra.alloc(8).unwrap();
        match ra.alloc(3) {
            Err(Error::CapacityExhausted { requested, limit }) => {
                assert_eq!(requested, 11);
                assert_eq!(limit, 10);
            }
            r => panic!("expected capacity error, got {:?}", r),
        }
        // failed allocation leaves the arena untouched
        assert_eq!(ra.len(), 8);
        ra.alloc(2).unwrap();
        assert_eq!(ra.len(), 10);
    }

    #[test]
    fn test_wasted() {
        let mut ra: RegionAllocator<u32> = RegionAllocator::new(16, 100);
        ra.alloc(6).unwrap();
        ra.free(4);
        ra.free(2);
        assert_eq!(ra.wasted(), 6);
        assert!(ra.memory_footprint() >= 6 * 4);
    }
}
