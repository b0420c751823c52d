// wasmv - wasmv-validator
// Module: Validation Context
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Module-level tables and per-function locals.
//!
//! A [`ModuleContext`] is built once per module and shared read-only by every
//! function validator. [`Locals`] belongs to a single function.

use crate::prelude::{Error, Result, Vec};
use crate::types::{FuncType, GlobalType, ValueType};

/// Types, function signatures and globals visible to a function body.
///
/// Function and global index spaces list imports first, then definitions,
/// in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleContext {
    types:   Vec<FuncType>,
    funcs:   Vec<u32>,
    globals: Vec<GlobalType>,
}

impl ModuleContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function type and return its index.
    pub fn add_type(&mut self, ty: FuncType) -> u32 {
        self.types.push(ty);
        (self.types.len() - 1) as u32
    }

    /// Append a function with the given type index and return its index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTypeIndex` if `type_idx` does not name a known type.
    pub fn add_func(&mut self, type_idx: u32) -> Result<u32> {
        self.func_type(type_idx)?;
        self.funcs.push(type_idx);
        Ok((self.funcs.len() - 1) as u32)
    }

    /// Append a global and return its index.
    pub fn add_global(&mut self, ty: GlobalType) -> u32 {
        self.globals.push(ty);
        (self.globals.len() - 1) as u32
    }

    /// Function type at `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTypeIndex` if out of range.
    pub fn func_type(&self, idx: u32) -> Result<&FuncType> {
        self.types.get(idx as usize).ok_or_else(|| Error::invalid_type_index("Type index out of range"))
    }

    /// Signature of the function at `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFunctionIndex` if out of range.
    pub fn func(&self, idx: u32) -> Result<&FuncType> {
        let type_idx = self
            .funcs
            .get(idx as usize)
            .ok_or_else(|| Error::invalid_function_index("Function index out of range"))?;
        self.func_type(*type_idx)
    }

    /// Type of the global at `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGlobalIndex` if out of range.
    pub fn global(&self, idx: u32) -> Result<GlobalType> {
        self.globals
            .get(idx as usize)
            .copied()
            .ok_or_else(|| Error::invalid_global_index("Global index out of range"))
    }

    /// All function types.
    #[must_use]
    pub fn types(&self) -> &[FuncType] {
        &self.types
    }

    /// Type index of every function.
    #[must_use]
    pub fn funcs(&self) -> &[u32] {
        &self.funcs
    }

    /// All globals.
    #[must_use]
    pub fn globals(&self) -> &[GlobalType] {
        &self.globals
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.types.clear();
        self.funcs.clear();
        self.globals.clear();
    }
}

/// Local variables of one function: parameters first, then declared locals.
///
/// Stored as runs of equal type, so a body declaring a large number of
/// locals of one type costs a single entry. Lookup is a binary search over
/// the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locals {
    // (exclusive end index, type) per run
    runs: Vec<(u32, ValueType)>,
}

impl Locals {
    /// No locals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of locals.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.runs.last().map_or(0, |&(end, _)| end)
    }

    /// Whether there are no locals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Append one local.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if the index space would exceed `u32`.
    pub fn add(&mut self, ty: ValueType) -> Result<u32> {
        let idx = self.len();
        self.add_many(1, ty)?;
        Ok(idx)
    }

    /// Append `count` locals of type `ty`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if the index space would exceed `u32`.
    pub fn add_many(&mut self, count: u32, ty: ValueType) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let end = self
            .len()
            .checked_add(count)
            .ok_or_else(|| Error::invalid_local_index("Too many locals"))?;
        match self.runs.last_mut() {
            Some((last_end, last_ty)) if *last_ty == ty => *last_end = end,
            _ => self.runs.push((end, ty)),
        }
        Ok(())
    }

    /// Type of local `idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocalIndex` if out of range.
    pub fn get(&self, idx: u32) -> Result<ValueType> {
        let run = self.runs.partition_point(|&(end, _)| end <= idx);
        self.runs
            .get(run)
            .map(|&(_, ty)| ty)
            .ok_or_else(|| Error::invalid_local_index("Local index out of range"))
    }

    /// Remove every local.
    pub fn clear(&mut self) {
        self.runs.clear();
    }
}
