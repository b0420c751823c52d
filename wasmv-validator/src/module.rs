// wasmv - wasmv-validator
// Module: Module Validation Driver
//
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Validation of a whole decoded module.
//!
//! [`ModuleValidator`] builds the [`ModuleContext`] from the module's
//! declarations, then runs a [`FuncValidator`] over every global initializer
//! and every function body. Limits, exports, tables, memories and data or
//! element segments are left to the embedder.

use crate::config::{FailurePolicy, ValidatorConfig};
use crate::context::ModuleContext;
use crate::instruction::Instruction;
use crate::prelude::{fmt, Display, Error, Result, String, Vec};
use crate::types::{FuncType, GlobalType, ValueType};
use crate::validator::FuncValidator;

/// A decoded module: the sections relevant to function validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Module {
    /// Function types, indexed by type index
    pub types:     Vec<FuncType>,
    /// Imports; imported functions and globals come first in their index
    /// spaces
    pub imports:   Vec<Import>,
    /// Defined functions
    pub functions: Vec<Function>,
    /// Defined globals
    pub globals:   Vec<Global>,
}

/// An imported item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Import {
    /// Exporting module name
    pub module: String,
    /// Item name
    pub name:   String,
    /// What is imported
    pub desc:   ImportDesc,
}

/// Kind and type of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImportDesc {
    /// A function with the given type index
    Func(u32),
    /// A global of the given type
    Global(GlobalType),
}

/// A run of locals of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalDecl {
    /// Number of locals
    pub count: u32,
    /// Their type
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty:    ValueType,
}

/// A defined function.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    /// Type index of the signature
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_idx: u32,
    /// Declared locals, after the parameters
    #[cfg_attr(feature = "serde", serde(default))]
    pub locals:   Vec<LocalDecl>,
    /// Decoded body; the trailing `end` is optional
    pub body:     Vec<Instruction>,
}

/// A defined global.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Global {
    /// Type of the global
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty:   GlobalType,
    /// Initializer constant expression
    pub init: Vec<Instruction>,
}

/// A unit of validation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatedUnit {
    /// Type, import and function declarations
    Declarations,
    /// Initializer of the global at this index
    GlobalInit(u32),
    /// Body of the function at this index
    Function(u32),
}

impl Display for ValidatedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declarations => f.write_str("declarations"),
            Self::GlobalInit(idx) => write!(f, "global {idx} initializer"),
            Self::Function(idx) => write!(f, "function {idx}"),
        }
    }
}

/// A unit that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitFailure {
    /// The failing unit
    pub unit:  ValidatedUnit,
    /// Its first violation
    pub error: Error,
}

impl Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.error)
    }
}

/// Outcome of validating a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    passed:   Vec<ValidatedUnit>,
    failures: Vec<UnitFailure>,
}

impl ValidationReport {
    /// Whether every unit passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Units that passed, in validation order.
    #[must_use]
    pub fn passed(&self) -> &[ValidatedUnit] {
        &self.passed
    }

    /// Units that failed, in validation order.
    #[must_use]
    pub fn failures(&self) -> &[UnitFailure] {
        &self.failures
    }

    /// The first failure as an error, if any.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing unit.
    pub fn into_result(self) -> Result<()> {
        match self.failures.first() {
            Some(failure) => Err(failure.error),
            None => Ok(()),
        }
    }

    fn record(&mut self, unit: ValidatedUnit, result: Result<()>) {
        match result {
            Ok(()) => self.passed.push(unit),
            Err(error) => {
                vdebug!("{unit} failed: {error}");
                self.failures.push(UnitFailure { unit, error });
            }
        }
    }
}

/// Validates every global initializer and function body of a module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleValidator {
    config: ValidatorConfig,
}

impl ModuleValidator {
    /// Module validator with the given configuration.
    #[must_use]
    pub const fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Build the context function bodies are checked against: every type,
    /// then imported followed by defined functions and globals.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTypeIndex` for a function or import naming an
    /// unknown type.
    pub fn build_context(module: &Module) -> Result<ModuleContext> {
        let mut ctx = Self::import_context(module)?;
        for func in &module.functions {
            ctx.add_func(func.type_idx)?;
        }
        for global in &module.globals {
            ctx.add_global(global.ty);
        }
        Ok(ctx)
    }

    // Types and imports only: what a global initializer may refer to.
    fn import_context(module: &Module) -> Result<ModuleContext> {
        let mut ctx = ModuleContext::new();
        for ty in &module.types {
            ctx.add_type(ty.clone());
        }
        for import in &module.imports {
            if let ImportDesc::Func(type_idx) = import.desc {
                ctx.add_func(type_idx)?;
            }
        }
        for import in &module.imports {
            if let ImportDesc::Global(ty) = import.desc {
                ctx.add_global(ty);
            }
        }
        Ok(ctx)
    }

    /// Validate `module`.
    ///
    /// With [`FailurePolicy::FailFast`] validation stops at the first failing
    /// unit; with [`FailurePolicy::CollectAll`] every unit is checked.
    #[must_use]
    pub fn validate(&self, module: &Module) -> ValidationReport {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "validate_module",
            functions = module.functions.len(),
            globals = module.globals.len()
        )
        .entered();

        let mut report = ValidationReport::default();
        let contexts = Self::import_context(module)
            .and_then(|init_ctx| Self::build_context(module).map(|ctx| (init_ctx, ctx)));
        let (init_ctx, ctx) = match contexts {
            Ok(contexts) => contexts,
            Err(error) => {
                report.record(ValidatedUnit::Declarations, Err(error));
                return report;
            }
        };
        report.record(ValidatedUnit::Declarations, Ok(()));
        let fail_fast = self.config.failure_policy == FailurePolicy::FailFast;

        let imported_globals = init_ctx.globals().len() as u32;
        let mut validator = FuncValidator::with_config(&init_ctx, self.config);
        for (i, global) in module.globals.iter().enumerate() {
            let unit = ValidatedUnit::GlobalInit(imported_globals + i as u32);
            validator.reset();
            let result = validator.validate_const_expr(&global.init, global.ty.value_type);
            report.record(unit, result);
            if fail_fast && !report.is_valid() {
                return report;
            }
        }

        let imported_funcs = ctx.funcs().len() - module.functions.len();
        let mut validator = FuncValidator::with_config(&ctx, self.config);
        for (i, func) in module.functions.iter().enumerate() {
            let func_idx = (imported_funcs + i) as u32;
            let unit = ValidatedUnit::Function(func_idx);
            vtrace!("validating {unit}");
            validator.reset();
            let result = Self::validate_function(&mut validator, func_idx, func);
            report.record(unit, result);
            if fail_fast && !report.is_valid() {
                return report;
            }
        }

        vdebug!(
            "module validated: {} passed, {} failed",
            report.passed.len(),
            report.failures.len()
        );
        report
    }

    fn validate_function(validator: &mut FuncValidator<'_>, func_idx: u32, func: &Function) -> Result<()> {
        let ty = validator.context().func(func_idx)?;
        for param in &ty.params {
            validator.add_local(*param)?;
        }
        for decl in &func.locals {
            validator.add_locals(decl.count, decl.ty)?;
        }
        validator.validate(&func.body, &ty.results)
    }
}
