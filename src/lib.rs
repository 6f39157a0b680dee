#![forbid(unsafe_code)]

//! Pattern-match planning core for an embedded property-graph query engine.
//!
//! The crate models a MATCH pattern as a [`pattern::PatternGraph`], compiles
//! it into an array of [`algebra::AlgebraicExpr`] traversal expressions, and
//! reorders that array with [`planner::order_expressions`] so execution
//! starts from the most selective entry point and every traversal step
//! extends an already-resolved frontier.

pub mod algebra;
pub mod config;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod planner;

pub use crate::algebra::{build_expressions, AlgebraicExpr, MatrixOperand};
pub use crate::config::PlannerConfig;
pub use crate::error::{PlanError, Result};
pub use crate::filter::{CmpOp, FilterTree, Literal};
pub use crate::pattern::{PatternEdge, PatternGraph, PatternNode};
pub use crate::planner::order_expressions;
