/**************************************************************************************[clause.rs]
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
    crate::{
        alloc::{self, RegionAllocator},
        error::{Error, Result},
        intmap::{AsIndex, IntMap, IntSet},
    },
    std::{fmt, iter::DoubleEndedIterator, mem, ops, slice},
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0 + 1)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(!0);
    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    /// Variable with the given DIMACS number (1-based).
    ///
    /// The variable still has to be created in the solver before use.
    pub fn from_dimacs(n: u32) -> Self {
        debug_assert!(n > 0, "DIMACS variables start at 1");
        Var::from_idx(n.wrapping_sub(1))
    }
}

impl AsIndex for Var {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

/// A variable with a polarity. `Lit::new(v, true)` is the positive literal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(!1);
    pub const ERROR: Lit = Lit(!0);

    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }
    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    /// `lit.apply_sign(b)` keeps the same sign if `b==true`, flips sign otherwise
    #[inline(always)]
    pub fn apply_sign(&self, sign: bool) -> Lit {
        if sign {
            *self
        } else {
            !*self
        }
    }

    /// Literal from a signed DIMACS integer; `0` gives `Lit::UNDEF`.
    ///
    /// ```
    /// use lbdsat::*;
    /// let l = Lit::from_dimacs(-3);
    /// assert!(!l.sign());
    /// assert_eq!(l.var().idx(), 2);
    /// assert_eq!(l.to_dimacs(), -3);
    /// ```
    pub fn from_dimacs(i: i32) -> Lit {
        if i == 0 {
            Lit::UNDEF
        } else {
            Lit::new(Var::from_dimacs(i.unsigned_abs()), i > 0)
        }
    }

    pub fn to_dimacs(&self) -> i32 {
        let n = self.var().idx() as i32 + 1;
        if self.sign() {
            n
        } else {
            -n
        }
    }

    /// Is this one of the sentinel values?
    #[inline(always)]
    pub fn is_sentinel(&self) -> bool {
        *self == Lit::UNDEF || *self == Lit::ERROR
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "ERROR")
        } else if self.0 == !1 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}{:?}", if self.sign() { "" } else { "-" }, self.var())
        }
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}
impl ops::BitXor<bool> for Lit {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        Lit(self.0 ^ rhs as u32)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;
pub type LSet = IntSet<Lit>;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
/// A ternary boolean (true, false, undefined) used for partial assignments.
pub struct lbool(u8);

impl fmt::Debug for lbool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "TRUE"),
            1 => write!(f, "FALSE"),
            2 | 3 => write!(f, "UNDEF"),
            n => write!(f, "lbool({})", n),
        }
    }
}
impl Default for lbool {
    fn default() -> Self {
        lbool::UNDEF
    }
}

impl lbool {
    pub const TRUE: lbool = lbool(0);
    pub const FALSE: lbool = lbool(1);
    pub const UNDEF: lbool = lbool(2);
    pub fn from_u8(v: u8) -> Self {
        debug_assert!(v == (v & 3), "lbool::from_u8: invalid value");
        lbool(v)
    }
    #[inline(always)]
    pub fn new(v: bool) -> Self {
        lbool((!v) as u8)
    }
    /// `Some(b)` if the value is defined.
    pub fn to_bool(&self) -> Option<bool> {
        match self.0 {
            0 => Some(true),
            1 => Some(false),
            _ => None,
        }
    }
}

// all undefined values are equal to each other
impl PartialEq for lbool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for lbool {}

impl ops::Neg for lbool {
    type Output = lbool;
    fn neg(self) -> Self {
        lbool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for lbool {
    type Output = lbool;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        lbool(self.0 ^ rhs as u8)
    }
}

impl ops::BitAnd for lbool {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        let sel = (self.0 << 1) | (rhs.0 << 3);
        let v = (0xF7F755F4_u32 >> sel) & 3;
        lbool(v as u8)
    }
}

impl ops::BitOr for lbool {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        let sel = (self.0 << 1) | (rhs.0 << 3);
        let v = (0xFCFCF400_u32 >> sel) & 3;
        lbool(v as u8)
    }
}

impl From<bool> for lbool {
    fn from(x: bool) -> Self {
        lbool::new(x)
    }
}

/// The source of a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Axiom,
    Learnt,
}

/// Number of words stored after the literals of a learnt clause:
/// activity, then LBD and freeze counter.
const LEARNT_EXTRA: u32 = 2;

/// LBD values saturate here.
pub(crate) const MAX_LBD: u32 = (1 << 16) - 1;

#[derive(Debug, Clone, Copy)]
/// Read-only view of a clause in the allocator
pub(crate) struct ClauseRef<'a> {
    header: ClauseHeader,
    data: &'a [ClauseData],
    extra: &'a [ClauseData],
}

#[derive(Debug)]
/// A mutable view of some clause, with a temporary lifetime
pub(crate) struct ClauseMut<'a> {
    header: &'a mut ClauseHeader,
    data: &'a mut [ClauseData],
    extra: &'a mut [ClauseData],
}

impl<'a> ClauseRef<'a> {
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.header.mark()
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        self.header.learnt()
    }
    #[inline(always)]
    pub fn frozen(&self) -> bool {
        self.header.frozen()
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        self.header.reloced()
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.header.size()
    }
    #[inline(always)]
    pub fn activity(&self) -> f32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[0].f32 }
    }
    #[inline(always)]
    pub fn lbd(&self) -> u32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[1].u32 & MAX_LBD }
    }
    #[inline(always)]
    pub fn freeze_count(&self) -> u32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[1].u32 >> 16 }
    }
    #[inline(always)]
    pub fn lits(&self) -> &'a [Lit] {
        let ptr = self.data.as_ptr() as *const Lit;
        unsafe { slice::from_raw_parts(ptr, self.data.len()) }
    }
    #[inline(always)]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Lit> {
        self.lits().iter()
    }
    /// Number of words this clause occupies in the allocator.
    pub fn words(&self) -> u32 {
        1 + self.size() + self.extra.len() as u32
    }
}

/// Anything that can be considered as a list of literals.
pub trait ClauseIterable: fmt::Debug {
    fn items(&self) -> &[Lit];
}

/// Any iterable clause can be printed in DIMACS
impl<T: ClauseIterable> display::Print for T {
    fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for lit in self.items() {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        write!(out, "0")
    }
}

impl<'a> ClauseIterable for ClauseRef<'a> {
    fn items(&self) -> &[Lit] {
        self.lits()
    }
}

impl<'a> ClauseIterable for &'a [Lit] {
    fn items(&self) -> &[Lit] {
        self
    }
}

impl ClauseIterable for Vec<Lit> {
    fn items(&self) -> &[Lit] {
        self
    }
}

impl ClauseIterable for IntSet<Lit> {
    fn items(&self) -> &[Lit] {
        self.as_slice()
    }
}

impl<'a> ClauseMut<'a> {
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        self.header.learnt()
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        self.header.reloced()
    }
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.header.mark()
    }
    #[inline(always)]
    pub fn frozen(&self) -> bool {
        self.header.frozen()
    }
    #[inline(always)]
    pub fn set_mark(&mut self, mark: u32) {
        self.header.set_mark(mark);
    }
    #[inline(always)]
    pub fn set_frozen(&mut self, frozen: bool) {
        debug_assert!(self.learnt(), "only learnt clauses can be frozen");
        self.header.set_frozen(frozen);
    }
    #[inline(always)]
    pub fn activity(&self) -> f32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[0].f32 }
    }
    #[inline(always)]
    pub fn set_activity(&mut self, activity: f32) {
        debug_assert!(self.learnt());
        self.extra[0].f32 = activity;
    }
    #[inline(always)]
    pub fn lbd(&self) -> u32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[1].u32 & MAX_LBD }
    }
    pub fn set_lbd(&mut self, lbd: u32) {
        debug_assert!(self.learnt());
        let meta = unsafe { self.extra[1].u32 };
        self.extra[1].u32 = (meta & !MAX_LBD) | lbd.min(MAX_LBD);
    }
    pub fn freeze_count(&self) -> u32 {
        debug_assert!(self.learnt());
        unsafe { self.extra[1].u32 >> 16 }
    }
    pub fn set_freeze_count(&mut self, count: u32) {
        debug_assert!(self.learnt());
        let meta = unsafe { self.extra[1].u32 };
        self.extra[1].u32 = (meta & MAX_LBD) | (count.min(MAX_LBD) << 16);
    }
    pub fn relocation(&self) -> CRef {
        debug_assert!(self.reloced());
        unsafe { self.data[0].cref }
    }
    pub fn relocate(self, c: CRef) {
        debug_assert!(!self.reloced());
        self.header.set_reloced(true);
        self.data[0].cref = c;
    }
    #[inline(always)]
    pub fn swap(&mut self, i: u32, j: u32) {
        self.data.swap(i as usize, j as usize);
    }

    /// Forget literals past `new_size`; the learnt metadata follows the
    /// last literal. The caller accounts for the freed words.
    pub fn shrink(self, new_size: u32) {
        debug_assert!(2 <= new_size);
        debug_assert!(new_size <= self.size());
        if new_size == self.size() {
            return;
        }
        self.header.set_size(new_size);
        let saved: Vec<ClauseData> = self.extra.to_vec();
        let n = self.data.len();
        for (k, w) in saved.into_iter().enumerate() {
            let pos = new_size as usize + k;
            if pos < n {
                self.data[pos] = w;
            } else {
                self.extra[pos - n] = w;
            }
        }
    }
    pub fn as_clause_ref(&self) -> ClauseRef {
        ClauseRef {
            header: *self.header,
            data: self.data,
            extra: self.extra,
        }
    }
}

impl<'a> ops::Index<u32> for ClauseRef<'a> {
    type Output = Lit;
    #[inline(always)]
    fn index(&self, index: u32) -> &Self::Output {
        unsafe { &self.data[index as usize].lit }
    }
}
impl<'a> ops::Index<u32> for ClauseMut<'a> {
    type Output = Lit;
    #[inline(always)]
    fn index(&self, index: u32) -> &Self::Output {
        unsafe { &self.data[index as usize].lit }
    }
}
impl<'a> ops::IndexMut<u32> for ClauseMut<'a> {
    #[inline(always)]
    fn index_mut(&mut self, index: u32) -> &mut Self::Output {
        unsafe { &mut self.data[index as usize].lit }
    }
}

#[derive(Debug)]
/// Arena holding every clause of size >= 3, original and learnt.
///
/// Handles (`CRef`) are stable until the next compaction, which copies
/// live clauses into a new allocator through `reloc`; the old allocator
/// keeps a forwarding handle in each moved clause so every holder can
/// be remapped before the old arena is dropped.
pub struct ClauseAllocator {
    ra: RegionAllocator<ClauseData>,
}

#[repr(C)]
#[derive(Clone, Copy)]
/// Items used in the clause allocator. It should be compact enough that
/// we do no waste space.
pub(crate) union ClauseData {
    u32: u32,
    f32: f32,
    cref: CRef,
    header: ClauseHeader,
    lit: Lit,
}

impl Default for ClauseData {
    fn default() -> Self {
        ClauseData { u32: 0 }
    }
}
impl fmt::Debug for ClauseData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ClauseData({})", unsafe { self.u32 })
    }
}

/// Metadata of a clause
///
/// Layout:
/// unsigned mark      : 2;
/// unsigned learnt    : 1;
/// unsigned frozen    : 1;
/// unsigned reloced   : 1;
/// unsigned size      : 27;
#[derive(Clone, Copy)]
pub struct ClauseHeader(u32);

impl fmt::Debug for ClauseHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClauseHeader")
            .field("mark", &self.mark())
            .field("learnt", &self.learnt())
            .field("frozen", &self.frozen())
            .field("reloced", &self.reloced())
            .field("size", &self.size())
            .finish()
    }
}

impl ClauseHeader {
    pub const MAX_SIZE: u32 = (1 << 27) - 1;

    pub fn new(learnt: bool, size: u32) -> Self {
        debug_assert!(size <= Self::MAX_SIZE);
        ClauseHeader(((learnt as u32) << 29) | size)
    }
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.0 >> 30
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        (self.0 & (1 << 29)) != 0
    }
    #[inline(always)]
    pub fn frozen(&self) -> bool {
        (self.0 & (1 << 28)) != 0
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        (self.0 & (1 << 27)) != 0
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.0 & Self::MAX_SIZE
    }
    pub fn set_mark(&mut self, mark: u32) {
        debug_assert!(mark < 4);
        self.0 = (self.0 & !(3 << 30)) | (mark << 30);
    }
    pub fn set_frozen(&mut self, frozen: bool) {
        self.0 = (self.0 & !(1 << 28)) | ((frozen as u32) << 28);
    }
    pub fn set_reloced(&mut self, reloced: bool) {
        self.0 = (self.0 & !(1 << 27)) | ((reloced as u32) << 27);
    }
    pub fn set_size(&mut self, size: u32) {
        debug_assert!(size <= Self::MAX_SIZE);
        self.0 = (self.0 & !Self::MAX_SIZE) | size;
    }
}

impl ClauseAllocator {
    /// Size in bytes of one arena word.
    pub const WORD_SIZE: usize = mem::size_of::<ClauseData>();

    pub fn with_start_cap(start_cap: u32, limit: u32) -> Self {
        Self {
            ra: RegionAllocator::new(start_cap, limit),
        }
    }
    pub fn new(limit: u32) -> Self {
        Self::with_start_cap(1024 * 1024, limit)
    }
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.ra.len()
    }
    pub fn wasted(&self) -> u32 {
        self.ra.wasted()
    }
    pub fn limit(&self) -> u32 {
        self.ra.limit()
    }
    pub fn memory_footprint(&self) -> usize {
        self.ra.memory_footprint()
    }

    /// Fresh allocator with the same limit, able to receive every live
    /// clause of `self` without growing.
    pub(crate) fn for_compaction(&self) -> Result<Self> {
        let live = self.len() - self.wasted();
        let mut to = Self::with_start_cap(0, self.limit());
        to.ra.reserve(live)?;
        Ok(to)
    }

    pub(crate) fn alloc_with_learnt(&mut self, clause: &[Lit], learnt: bool) -> Result<CRef> {
        if clause.len() > ClauseHeader::MAX_SIZE as usize {
            return Err(Error::ClauseTooLarge(clause.len()));
        }
        let size = clause.len() as u32;
        let extra = if learnt { LEARNT_EXTRA } else { 0 };
        let cid = self.ra.alloc(1 + size + extra)?;
        self.ra[cid].header = ClauseHeader::new(learnt, size);
        let clause_ptr = cid + 1;
        for (i, &lit) in clause.iter().enumerate() {
            self.ra[clause_ptr + i as u32].lit = lit;
        }
        if learnt {
            self.ra[clause_ptr + size].f32 = 0.0;
            self.ra[clause_ptr + size + 1].u32 = 0;
        }
        Ok(cid)
    }

    fn alloc_copy(&mut self, from: ClauseRef) -> Result<CRef> {
        let cid = self.ra.alloc(from.words())?;
        self.ra[cid].header = from.header;
        let dst = self.ra.subslice_mut(cid + 1, from.words() - 1);
        let (lits, extra) = dst.split_at_mut(from.data.len());
        lits.copy_from_slice(from.data);
        extra.copy_from_slice(from.extra);
        Ok(cid)
    }

    pub(crate) fn free(&mut self, cr: CRef) {
        let words = self.get_ref(cr).words();
        self.ra.free(words);
    }

    pub(crate) fn free_amount(&mut self, size: u32) {
        self.ra.free(size);
    }

    /// Relocate clause `cr` into allocator `to`.
    ///
    /// post condition: `*cr` now contains the index of the copy in `to`
    pub(crate) fn reloc(&mut self, cr: &mut CRef, to: &mut ClauseAllocator) -> Result<()> {
        let c = self.get_mut(*cr);

        if c.reloced() {
            *cr = c.relocation();
            return Ok(());
        }

        let new_cr = to.alloc_copy(c.as_clause_ref())?;
        c.relocate(new_cr);
        *cr = new_cr;
        Ok(())
    }

    /// Get a reference on the clause `cr` points to
    pub(crate) fn get_ref(&self, cr: CRef) -> ClauseRef {
        let header = unsafe { self.ra[cr].header };
        let size = header.size();
        let extra = if header.learnt() { LEARNT_EXTRA } else { 0 };

        let all = self.ra.subslice(cr + 1, size + extra);
        let (data, extra) = all.split_at(size as usize);
        ClauseRef {
            header,
            data,
            extra,
        }
    }

    /// Get a mutable reference on the clause `cr` points to
    pub(crate) fn get_mut(&mut self, cr: CRef) -> ClauseMut {
        let header = unsafe { self.ra[cr].header };
        let size = header.size();
        let extra = if header.learnt() { LEARNT_EXTRA } else { 0 };

        let subslice = self.ra.subslice_mut(cr, 1 + size + extra);
        let (subslice0, subslice) = subslice.split_at_mut(1);
        let (data, extra) = subslice.split_at_mut(size as usize);
        ClauseMut {
            header: unsafe { &mut subslice0[0].header },
            data,
            extra,
        }
    }
}

pub(crate) type CRef = alloc::Ref<ClauseData>;

/// Generic interface for objects printable in DIMACS
pub mod display {
    use std::fmt;

    /// Objects that can be printed in DIMACS syntax
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Any type implementing `Print` can be used in a format string by
        /// just using `x.pp_dimacs()` instead of `x`.
        ///
        /// ```
        /// use lbdsat::*;
        /// let v: Vec<Lit> = vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)];
        /// assert_eq!(format!("{}", v.pp_dimacs()), "1 -2 0");
        /// ```
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(self)
        }
    }

    /// A wrapper that can be used to display objects in format strings
    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lits(xs: &[i32]) -> Vec<Lit> {
        xs.iter().map(|&i| Lit::from_dimacs(i)).collect()
    }

    /// test that ClauseData doesn't waste space
    #[test]
    fn test_size_clause_data() {
        assert_eq!(mem::size_of::<ClauseData>(), 4);
        assert_eq!(ClauseAllocator::WORD_SIZE, 4);
    }

    #[test]
    fn test_lit_encoding() {
        let l = Lit::from_dimacs(5);
        assert!(l.sign());
        assert_eq!(l.var(), Var::from_dimacs(5));
        assert_eq!((!l).to_dimacs(), -5);
        assert_eq!(l ^ true, !l);
        assert_eq!(l.apply_sign(false), !l);
        assert_eq!(Lit::from_dimacs(0), Lit::UNDEF);
        assert!(Lit::UNDEF.is_sentinel());
        assert!(!l.is_sentinel());
        assert_eq!(format!("{:?}", !l), "-5");
    }

    #[test]
    fn test_eq() {
        for i in 0..4 {
            let a = lbool::from_u8(i);
            for j in 0..4 {
                let b = lbool::from_u8(j);
                let are_eq = (i == 0 && j == 0) || (i == 1 && j == 1) || (i >= 2 && j >= 2);
                assert_eq!(are_eq, a == b, "{:?}[{}] == {:?}[{}]", a, i, b, j);
            }
        }
    }

    #[test]
    fn test_lbool_ops() {
        assert_eq!(-lbool::TRUE, lbool::FALSE);
        assert_eq!(-lbool::UNDEF, lbool::UNDEF);
        assert_eq!(lbool::TRUE ^ true, lbool::FALSE);
        assert_eq!(lbool::UNDEF ^ true, lbool::UNDEF);
        assert_eq!(lbool::UNDEF & lbool::FALSE, lbool::FALSE);
        assert_eq!(lbool::UNDEF & lbool::TRUE, lbool::UNDEF);
        assert_eq!(lbool::UNDEF | lbool::TRUE, lbool::TRUE);
        assert_eq!(lbool::FALSE | lbool::UNDEF, lbool::UNDEF);
        assert_eq!(lbool::default(), lbool::UNDEF);
        assert_eq!(lbool::from(true).to_bool(), Some(true));
        assert_eq!(lbool::UNDEF.to_bool(), None);
    }

    #[test]
    fn test_header_fields() {
        let mut h = ClauseHeader::new(true, 12);
        assert!(h.learnt());
        assert!(!h.frozen());
        assert_eq!(h.mark(), 0);
        h.set_frozen(true);
        h.set_mark(1);
        h.set_size(7);
        assert!(h.frozen() && h.learnt() && !h.reloced());
        assert_eq!(h.mark(), 1);
        assert_eq!(h.size(), 7);
        h.set_frozen(false);
        assert!(!h.frozen());
        assert_eq!(h.size(), 7);
    }

    #[test]
    fn test_learnt_metadata() {
        let mut ca = ClauseAllocator::with_start_cap(16, 1000);
        let cr = ca.alloc_with_learnt(&lits(&[1, -2, 3, 4]), true).unwrap();
        {
            let mut c = ca.get_mut(cr);
            c.set_lbd(3);
            c.set_freeze_count(2);
            c.set_activity(1.5);
        }
        let c = ca.get_ref(cr);
        assert_eq!(c.size(), 4);
        assert_eq!(c.lbd(), 3);
        assert_eq!(c.freeze_count(), 2);
        assert_eq!(c.activity(), 1.5);
        assert_eq!(c.words(), 1 + 4 + 2);
        assert_eq!(c.lits(), &lits(&[1, -2, 3, 4])[..]);
    }

    #[test]
    fn test_shrink_keeps_metadata() {
        let mut ca = ClauseAllocator::with_start_cap(16, 1000);
        let cr = ca.alloc_with_learnt(&lits(&[1, 2, 3, 4, 5]), true).unwrap();
        {
            let mut c = ca.get_mut(cr);
            c.set_lbd(4);
            c.set_activity(2.0);
        }
        ca.get_mut(cr).shrink(3);
        let c = ca.get_ref(cr);
        assert_eq!(c.lits(), &lits(&[1, 2, 3])[..]);
        assert_eq!(c.lbd(), 4);
        assert_eq!(c.activity(), 2.0);
    }

    #[test]
    fn test_reloc_forwards() {
        let mut ca = ClauseAllocator::with_start_cap(16, 1000);
        let c1 = ca.alloc_with_learnt(&lits(&[1, 2, 3]), false).unwrap();
        let c2 = ca.alloc_with_learnt(&lits(&[-1, 2, -3]), true).unwrap();
        ca.get_mut(c2).set_lbd(2);
        ca.get_mut(c1).set_mark(1);
        ca.free(c1);
        assert_eq!(ca.wasted(), 4);

        let mut to = ClauseAllocator::with_start_cap(16, 1000);
        let mut r1 = c2;
        let mut r2 = c2;
        ca.reloc(&mut r1, &mut to).unwrap();
        ca.reloc(&mut r2, &mut to).unwrap();
        assert_eq!(r1, r2, "second relocation follows the forwarding handle");
        assert_eq!(to.len(), 1 + 3 + 2);
        let c = to.get_ref(r1);
        assert_eq!(c.lits(), &lits(&[-1, 2, -3])[..]);
        assert_eq!(c.lbd(), 2);
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut ca = ClauseAllocator::with_start_cap(0, 8);
        ca.alloc_with_learnt(&lits(&[1, 2, 3]), false).unwrap();
        let err = ca.alloc_with_learnt(&lits(&[1, 2, 3, 4]), false).unwrap_err();
        assert!(matches!(err, Error::CapacityExhausted { limit: 8, .. }));
    }
}
