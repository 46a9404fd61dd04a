/***************************************************************************************[error.rs]
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
    crate::clause::{Lit, Var},
    std::collections::TryReserveError,
    thiserror::Error,
};

/// Conditions that the search cannot resolve by backtracking.
///
/// An unsatisfiable formula is not an error: it is reported through
/// `State::Unsat` or a `false` return from `add_clause`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("variable {0:?} was not created in this solver")]
    UnknownVar(Var),

    #[error("literal {0:?} is a sentinel and cannot be used in a clause")]
    InvalidLit(Lit),

    #[error("clause of {0} literals exceeds the maximal clause size")]
    ClauseTooLarge(usize),

    #[error("clause arena exhausted: {requested} words requested, limit is {limit}")]
    CapacityExhausted { requested: usize, limit: usize },

    #[error("clause arena could not grow: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, Error>;
