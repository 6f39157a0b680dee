//! Algebraic traversal expressions.
//!
//! A single traversal step is expressed as a left-to-right product of matrix
//! operands: relationship matrices for edges and diagonal label matrices for
//! label constraints. A fused one-hop traversal such as `(a:L)-[:R]->(b)`
//! becomes the product `[L] * [R]`; a variable-length edge cannot be fused
//! and always stands alone as a single bare operand.
//!
//! Expressions expose exactly the capabilities planning needs: endpoint and
//! edge aliases, operand and transpose counts, and an in-place transpose
//! that flips the traversal direction.

use std::collections::HashSet;
use std::mem;

use crate::error::{PlanError, Result};
use crate::pattern::PatternGraph;

/// One matrix in an expression product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixOperand {
    /// Row domain alias.
    pub src: String,
    /// Column domain alias.
    pub dest: String,
    /// Edge alias, for relationship matrices.
    pub edge: Option<String>,
    /// Label name, for diagonal label matrices.
    pub label: Option<String>,
    /// Diagonal operands constrain a single node domain (`src == dest`).
    pub diagonal: bool,
    /// Whether the operand is used in transposed orientation.
    pub transposed: bool,
}

impl MatrixOperand {
    /// Diagonal label matrix over a node alias.
    pub fn label(alias: impl Into<String>, label: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            src: alias.clone(),
            dest: alias,
            edge: None,
            label: Some(label.into()),
            diagonal: true,
            transposed: false,
        }
    }

    /// Relationship matrix between two node aliases.
    pub fn relation(
        src: impl Into<String>,
        dest: impl Into<String>,
        edge: impl Into<String>,
    ) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            edge: Some(edge.into()),
            label: None,
            diagonal: false,
            transposed: false,
        }
    }

    fn transpose(&mut self) {
        self.transposed = !self.transposed;
        mem::swap(&mut self.src, &mut self.dest);
    }
}

/// A traversal step as a product of matrix operands.
///
/// The expression tracks its own source and destination aliases so that
/// transposing is a constant bookkeeping operation on top of reversing the
/// operand product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgebraicExpr {
    operands: Vec<MatrixOperand>,
    src: String,
    dest: String,
    edge: Option<String>,
    transposed: bool,
}

impl AlgebraicExpr {
    /// A label scan over a single node alias: one diagonal operand.
    pub fn label_scan(alias: impl Into<String>, label: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            operands: vec![MatrixOperand::label(alias.clone(), label)],
            src: alias.clone(),
            dest: alias,
            edge: None,
            transposed: false,
        }
    }

    /// A node scan with no label constraint.
    pub fn node_scan(alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let operand = MatrixOperand {
            src: alias.clone(),
            dest: alias.clone(),
            edge: None,
            label: None,
            diagonal: true,
            transposed: false,
        };
        Self {
            operands: vec![operand],
            src: alias.clone(),
            dest: alias,
            edge: None,
            transposed: false,
        }
    }

    /// A bare single-operand traversal over one edge.
    pub fn traversal(
        src: impl Into<String>,
        dest: impl Into<String>,
        edge: impl Into<String>,
    ) -> Self {
        let src = src.into();
        let dest = dest.into();
        let edge = edge.into();
        Self {
            operands: vec![MatrixOperand::relation(src.clone(), dest.clone(), edge.clone())],
            src,
            dest,
            edge: Some(edge),
            transposed: false,
        }
    }

    /// Builds an expression from an explicit operand product. The source is
    /// the first operand's row domain, the destination the last operand's
    /// column domain, and the edge the first relationship operand's alias.
    pub fn from_operands(operands: Vec<MatrixOperand>) -> Result<Self> {
        let first = operands.first().ok_or(PlanError::EmptyExpression)?;
        let src = first.src.clone();
        let dest = operands[operands.len() - 1].dest.clone();
        let edge = operands.iter().find_map(|o| o.edge.clone());
        Ok(Self {
            operands,
            src,
            dest,
            edge,
            transposed: false,
        })
    }

    /// Source node alias.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// Destination node alias.
    pub fn destination(&self) -> &str {
        &self.dest
    }

    /// Edge alias, when the expression traverses a relationship.
    pub fn edge(&self) -> Option<&str> {
        self.edge.as_deref()
    }

    /// Number of matrix operands in the product.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Number of operands currently in transposed orientation.
    pub fn transpose_count(&self) -> usize {
        self.operands.iter().filter(|o| o.transposed).count()
    }

    /// Whether the expression as a whole has been flipped relative to its
    /// constructed orientation.
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    /// Operands in evaluation order.
    pub fn operands(&self) -> &[MatrixOperand] {
        &self.operands
    }

    /// Flips the traversal direction in place: `(A * B)^T = B^T * A^T`.
    /// The operand product is reversed, every operand's orientation is
    /// toggled, and source and destination swap roles.
    pub fn transpose(&mut self) {
        self.operands.reverse();
        for operand in &mut self.operands {
            operand.transpose();
        }
        mem::swap(&mut self.src, &mut self.dest);
        self.transposed = !self.transposed;
    }
}

/// Converts a pattern into the expression array consumed by traversal
/// planning.
///
/// Each fixed-length edge yields one expression, with the endpoint label
/// matrices folded into the product the first time the labeled node is
/// seen. Variable-length edges cannot carry label operands; their labeled
/// endpoints are emitted as standalone label scans around the bare edge
/// expression. Nodes untouched by any edge become scan expressions of
/// their own.
pub fn build_expressions(graph: &PatternGraph) -> Result<Vec<AlgebraicExpr>> {
    if graph.nodes().is_empty() {
        return Err(PlanError::EmptyPattern);
    }

    let mut expressions = Vec::new();
    let mut folded: HashSet<&str> = HashSet::new();
    let mut touched: HashSet<&str> = HashSet::new();

    for edge in graph.edges() {
        touched.insert(edge.src.as_str());
        touched.insert(edge.dest.as_str());

        let src_label = pending_label(graph, &folded, &edge.src);
        let dest_label = pending_label(graph, &folded, &edge.dest);

        if edge.variable_length() {
            // Label matrices cannot be folded into a variable-length
            // traversal; surround the bare edge with standalone scans.
            if let Some(label) = src_label {
                folded.insert(edge.src.as_str());
                expressions.push(AlgebraicExpr::label_scan(&edge.src, label));
            }
            expressions.push(AlgebraicExpr::traversal(&edge.src, &edge.dest, &edge.alias));
            if edge.src != edge.dest {
                if let Some(label) = dest_label {
                    folded.insert(edge.dest.as_str());
                    expressions.push(AlgebraicExpr::label_scan(&edge.dest, label));
                }
            }
        } else {
            let mut operands = Vec::with_capacity(3);
            if let Some(label) = src_label {
                folded.insert(edge.src.as_str());
                operands.push(MatrixOperand::label(&edge.src, label));
            }
            operands.push(MatrixOperand::relation(&edge.src, &edge.dest, &edge.alias));
            if edge.src != edge.dest {
                if let Some(label) = dest_label {
                    folded.insert(edge.dest.as_str());
                    operands.push(MatrixOperand::label(&edge.dest, label));
                }
            }
            expressions.push(AlgebraicExpr::from_operands(operands)?);
        }
    }

    for node in graph.nodes() {
        if touched.contains(node.alias.as_str()) {
            continue;
        }
        match &node.label {
            Some(label) => expressions.push(AlgebraicExpr::label_scan(&node.alias, label)),
            None => expressions.push(AlgebraicExpr::node_scan(&node.alias)),
        }
    }

    Ok(expressions)
}

fn pending_label<'g>(
    graph: &'g PatternGraph,
    folded: &HashSet<&str>,
    alias: &str,
) -> Option<&'g str> {
    if folded.contains(alias) {
        return None;
    }
    graph
        .node_by_alias(alias)
        .and_then(|n| n.label.as_deref())
}
