//! Core expression types for cvxexpr.
//!
//! The `Expr` enum is the closed set of expression nodes. Compound nodes are
//! immutable, share their children through `Arc`, and cache the shape and
//! curvature computed when they were built (see `crate::atoms::affine`).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;

use super::shape::Shape;
use crate::dcp::Curvature;
use crate::sparse::csc_to_dense;

/// Unique identifier for variables and parameters.
///
/// Drawn from a process-wide counter that is never reset, so an id is never
/// handed out twice within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(u64);

impl ExprId {
    /// Generate a new unique ID.
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        ExprId(NEXT_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric storage for constant data (dense or sparse).
#[derive(Debug, Clone)]
pub enum Array {
    /// Dense matrix storage.
    Dense(DMatrix<f64>),
    /// Sparse CSC matrix storage.
    Sparse(CscMatrix<f64>),
    /// Scalar value.
    Scalar(f64),
}

impl Array {
    /// Get the shape of the array.
    pub fn shape(&self) -> Shape {
        match self {
            Array::Dense(m) => Shape::matrix(m.nrows(), m.ncols()),
            Array::Sparse(m) => Shape::matrix(m.nrows(), m.ncols()),
            Array::Scalar(_) => Shape::scalar(),
        }
    }

    /// Try to get as a scalar value.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Array::Scalar(v) => Some(*v),
            Array::Dense(m) if m.nrows() == 1 && m.ncols() == 1 => Some(m[(0, 0)]),
            _ => None,
        }
    }

    /// Element at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if !self.shape().contains(row, col) {
            return None;
        }
        match self {
            Array::Scalar(v) => Some(*v),
            Array::Dense(m) => Some(m[(row, col)]),
            Array::Sparse(m) => Some(
                m.get_entry(row, col)
                    .map(|entry| entry.into_value())
                    .unwrap_or(0.0),
            ),
        }
    }

    /// Dense copy of the data.
    pub fn to_dense(&self) -> DMatrix<f64> {
        match self {
            Array::Scalar(v) => DMatrix::from_element(1, 1, *v),
            Array::Dense(m) => m.clone(),
            Array::Sparse(m) => csc_to_dense(m),
        }
    }

    /// Create from a scalar.
    pub fn from_scalar(v: f64) -> Self {
        Array::Scalar(v)
    }

    /// Create a column vector.
    pub fn from_vec(v: Vec<f64>) -> Self {
        let n = v.len();
        Array::Dense(DMatrix::from_vec(n, 1, v))
    }

    /// Create from a dense matrix.
    pub fn from_matrix(m: DMatrix<f64>) -> Self {
        Array::Dense(m)
    }
}

/// NaN entries match each other, so every array equals its own clone.
fn same_entry(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Array::Scalar(a), Array::Scalar(b)) => same_entry(*a, *b),
            (Array::Dense(a), Array::Dense(b)) => {
                a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| same_entry(*x, *y))
            }
            _ => {
                let (a, b) = (self.to_dense(), other.to_dense());
                a.shape() == b.shape() && a.iter().zip(b.iter()).all(|(x, y)| same_entry(*x, *y))
            }
        }
    }
}

impl fmt::Display for Array {
    /// Scalars print as plain numbers, everything else row by row:
    /// `[[1, 2], [3, 4]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Array::Scalar(v) = self {
            return write!(f, "{v}");
        }
        let dense = self.to_dense();
        write!(f, "[")?;
        for (i, row) in dense.row_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

impl From<f64> for Array {
    fn from(v: f64) -> Self {
        Array::Scalar(v)
    }
}

impl From<Vec<f64>> for Array {
    fn from(v: Vec<f64>) -> Self {
        Array::from_vec(v)
    }
}

impl From<DMatrix<f64>> for Array {
    fn from(m: DMatrix<f64>) -> Self {
        Array::Dense(m)
    }
}

impl From<CscMatrix<f64>> for Array {
    fn from(m: CscMatrix<f64>) -> Self {
        Array::Sparse(m)
    }
}

/// Data for a variable expression.
#[derive(Debug, Clone)]
pub struct VariableData {
    /// Unique identifier.
    pub id: ExprId,
    /// Shape of the variable.
    pub shape: Shape,
    /// Optional name for display.
    pub name: Option<String>,
}

impl VariableData {
    /// Display name: the user's name, or one derived from the id.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("var{}", self.id.raw()),
        }
    }
}

/// Variables are the same entity only when their ids match.
impl PartialEq for VariableData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Data for a constant expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantData {
    /// The constant value.
    pub value: Array,
    /// Name override; the value's rendering is used otherwise.
    pub name: Option<String>,
}

impl ConstantData {
    /// Get the shape of the constant.
    pub fn shape(&self) -> Shape {
        self.value.shape()
    }

    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.value.to_string(),
        }
    }
}

/// Data for a parameter: a named constant whose value is supplied later.
#[derive(Debug, Clone)]
pub struct ParameterData {
    pub id: ExprId,
    pub name: String,
    pub shape: Shape,
}

impl PartialEq for ParameterData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Which factor of a product is the constant coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// `lhs + rhs` or `lhs - rhs`.
#[derive(Debug, Clone)]
pub struct BinaryNode {
    pub(crate) lhs: Arc<Expr>,
    pub(crate) rhs: Arc<Expr>,
    pub(crate) shape: Shape,
    pub(crate) curvature: Curvature,
}

impl BinaryNode {
    pub fn lhs(&self) -> &Arc<Expr> {
        &self.lhs
    }

    pub fn rhs(&self) -> &Arc<Expr> {
        &self.rhs
    }
}

/// `-arg`.
#[derive(Debug, Clone)]
pub struct NegNode {
    pub(crate) arg: Arc<Expr>,
    pub(crate) curvature: Curvature,
}

impl NegNode {
    pub fn arg(&self) -> &Arc<Expr> {
        &self.arg
    }
}

/// `lhs * rhs` where the factor on `coeff` is constant.
///
/// Operands keep the order the user wrote them in; `coeff` records which of
/// them acts as the coefficient.
#[derive(Debug, Clone)]
pub struct MulNode {
    pub(crate) lhs: Arc<Expr>,
    pub(crate) rhs: Arc<Expr>,
    pub(crate) coeff: Side,
    pub(crate) shape: Shape,
    pub(crate) curvature: Curvature,
}

impl MulNode {
    pub fn lhs(&self) -> &Arc<Expr> {
        &self.lhs
    }

    pub fn rhs(&self) -> &Arc<Expr> {
        &self.rhs
    }

    /// Side holding the constant coefficient.
    pub fn coeff_side(&self) -> Side {
        self.coeff
    }

    /// The constant coefficient and the factor it multiplies.
    pub fn operands(&self) -> (&Arc<Expr>, &Arc<Expr>) {
        match self.coeff {
            Side::Left => (&self.lhs, &self.rhs),
            Side::Right => (&self.rhs, &self.lhs),
        }
    }
}

/// `base[row, col]`.
#[derive(Debug, Clone)]
pub struct IndexNode {
    pub(crate) base: Arc<Expr>,
    pub(crate) row: usize,
    pub(crate) col: usize,
}

impl IndexNode {
    pub fn base(&self) -> &Arc<Expr> {
        &self.base
    }

    pub fn key(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// The core expression type.
///
/// Compound variants can only be obtained through the validating builders
/// (the arithmetic operators, `try_add`, `try_mul`, `index`, ...), so every
/// `Expr` in existence has a legal shape and curvature.
#[derive(Debug, Clone)]
pub enum Expr {
    // ========== Leaf nodes ==========
    /// A decision variable.
    Variable(VariableData),
    /// A constant value.
    Constant(ConstantData),
    /// A named constant without a value.
    Parameter(ParameterData),

    // ========== Affine operators ==========
    Add(BinaryNode),
    Sub(BinaryNode),
    Neg(NegNode),
    Mul(MulNode),
    Index(IndexNode),
}

impl Expr {
    /// Get the shape of the expression.
    pub fn shape(&self) -> Shape {
        match self {
            Expr::Variable(v) => v.shape,
            Expr::Constant(c) => c.shape(),
            Expr::Parameter(p) => p.shape,
            Expr::Add(node) | Expr::Sub(node) => node.shape,
            Expr::Neg(node) => node.arg.shape(),
            Expr::Mul(node) => node.shape,
            Expr::Index(_) => Shape::scalar(),
        }
    }

    /// Human-readable rendering used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Expr::Variable(v) => v.name(),
            Expr::Constant(c) => c.name(),
            Expr::Parameter(p) => p.name.clone(),
            Expr::Add(node) => format!("{} + {}", node.lhs.name(), node.rhs.name()),
            Expr::Sub(node) => format!("{} - {}", node.lhs.name(), node.rhs.name()),
            Expr::Neg(node) => format!("-{}", node.arg.name()),
            Expr::Mul(node) => format!("{} * {}", node.lhs.name(), node.rhs.name()),
            Expr::Index(node) => format!("{}[{},{}]", node.base.name(), node.row, node.col),
        }
    }

    /// Override the display name of a leaf. Compound expressions are
    /// returned unchanged.
    pub fn named(self, name: impl Into<String>) -> Expr {
        match self {
            Expr::Variable(mut v) => {
                v.name = Some(name.into());
                Expr::Variable(v)
            }
            Expr::Constant(mut c) => {
                c.name = Some(name.into());
                Expr::Constant(c)
            }
            Expr::Parameter(mut p) => {
                p.name = name.into();
                Expr::Parameter(p)
            }
            other => other,
        }
    }

    /// Get the unique ID if this is a variable.
    pub fn variable_id(&self) -> Option<ExprId> {
        match self {
            Expr::Variable(v) => Some(v.id),
            _ => None,
        }
    }

    /// Check if this expression is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable(_))
    }

    /// Get the constant value if this is a constant leaf.
    pub fn constant_value(&self) -> Option<&Array> {
        match self {
            Expr::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    /// Distinct variables in this expression, keyed by id.
    ///
    /// A variable reachable through several paths appears once.
    pub fn variables(&self) -> BTreeMap<ExprId, Expr> {
        let mut vars = BTreeMap::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeMap<ExprId, Expr>) {
        match self {
            Expr::Variable(v) => {
                vars.entry(v.id).or_insert_with(|| self.clone());
            }
            Expr::Constant(_) | Expr::Parameter(_) => {}
            Expr::Add(node) | Expr::Sub(node) => {
                node.lhs.collect_variables(vars);
                node.rhs.collect_variables(vars);
            }
            Expr::Neg(node) => node.arg.collect_variables(vars),
            Expr::Mul(node) => {
                node.lhs.collect_variables(vars);
                node.rhs.collect_variables(vars);
            }
            Expr::Index(node) => node.base.collect_variables(vars),
        }
    }

    /// Leaf terms in left-to-right order, repeats included.
    pub fn terms(&self) -> Vec<Expr> {
        let mut terms = Vec::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms(&self, terms: &mut Vec<Expr>) {
        match self {
            Expr::Variable(_) | Expr::Constant(_) | Expr::Parameter(_) => {
                terms.push(self.clone())
            }
            Expr::Add(node) | Expr::Sub(node) => {
                node.lhs.collect_terms(terms);
                node.rhs.collect_terms(terms);
            }
            Expr::Neg(node) => node.arg.collect_terms(terms),
            Expr::Mul(node) => {
                node.lhs.collect_terms(terms);
                node.rhs.collect_terms(terms);
            }
            Expr::Index(node) => node.base.collect_terms(terms),
        }
    }
}

fn same_child(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

/// Structural equality: leaves compare by identity (variables, parameters)
/// or value (constants), compound nodes by operator and children.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Variable(a), Expr::Variable(b)) => a == b,
            (Expr::Constant(a), Expr::Constant(b)) => a == b,
            (Expr::Parameter(a), Expr::Parameter(b)) => a == b,
            (Expr::Add(a), Expr::Add(b)) | (Expr::Sub(a), Expr::Sub(b)) => {
                same_child(&a.lhs, &b.lhs) && same_child(&a.rhs, &b.rhs)
            }
            (Expr::Neg(a), Expr::Neg(b)) => same_child(&a.arg, &b.arg),
            (Expr::Mul(a), Expr::Mul(b)) => {
                a.coeff == b.coeff && same_child(&a.lhs, &b.lhs) && same_child(&a.rhs, &b.rhs)
            }
            (Expr::Index(a), Expr::Index(b)) => {
                a.key() == b.key() && same_child(&a.base, &b.base)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// Scalar promotion for operator operands
impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        crate::expr::constant(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        crate::expr::constant(f64::from(value))
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}
