//! Static metrics backends
//!
//! The feature extractor only needs two capabilities from a static-analysis
//! library: raw line metrics and per-block cyclomatic complexity. Both live
//! behind [`MetricsBackend`] so the analyzer can be swapped without touching
//! the decision logic.

pub mod python;

pub use python::PythonMetrics;

use thiserror::Error;

/// Errors raised while analyzing a snippet of source code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("source is empty")]
    Empty,

    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("nesting too deep at line {line}, column {column}")]
    TooDeep { line: usize, column: usize },

    #[error("parser failure: {0}")]
    Parser(String),
}

/// Line-oriented metrics of a source snippet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawMetrics {
    /// Logical lines of code (one per statement or clause header)
    pub lloc: u32,
    /// Lines carrying a comment token
    pub comments: u32,
}

/// Kind of block reported by complexity analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Function,
    Method,
    Class,
}

/// Cyclomatic complexity of a single function, method or class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityBlock {
    pub name: String,
    pub kind: BlockKind,
    /// 1-based line of the definition
    pub line: u32,
    pub complexity: u32,
}

/// A static-analysis library able to produce the raw inputs of a feature vector
pub trait MetricsBackend: Send + Sync {
    /// Compute logical-line and comment counts
    fn raw_metrics(&self, source: &str) -> Result<RawMetrics, AnalysisError>;

    /// Compute per-block cyclomatic complexity
    fn complexity(&self, source: &str) -> Result<Vec<ComplexityBlock>, AnalysisError>;
}
