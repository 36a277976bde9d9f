//! # formula-pool: hash-consed boolean formulas in Rust
//!
//! **`formula-pool`** is a pool-centric (hash-consing) representation of boolean formulas
//! with paired negations. It is designed as the shared-structure backbone of SMT-style
//! preprocessing: Tseitin transformations, normalization passes, and static analysis.
//!
//! ## What is a formula pool?
//!
//! A formula pool stores every distinct formula exactly once and hands out lightweight
//! handles to it. Structural equality thereby coincides with handle identity: comparing
//! two formulas, however large, is a single integer comparison. Each stored node is
//! created together with its negation, so negating a formula never allocates either.
//!
//! ## Key Features
//!
//! - **Pool-Centric Architecture**: all construction goes through a
//!   [`FormulaPool`][crate::pool::FormulaPool]. This enforces structural sharing and keeps
//!   the canonical-form invariants in one place.
//! - **Paired Negations**: every node and its negation are co-created, carry consecutive
//!   ids, and die together. Double negation is the identity, for free.
//! - **Normalizing Builder**: n-ary AND/OR/XOR/IFF applications are flattened, ordered,
//!   deduplicated, and simplified on complementary pairs before interning, so boolean
//!   identities resolve to existing nodes.
//! - **Usage-Counted Lifecycle**: handles are counted; dropping the last one returns the
//!   pair to the pool, cascading into its operands.
//! - **Tseitin Support**: formulas can be associated with fresh substitute variables, with
//!   cooperative cleanup once both sides of an association fall out of use.
//! - **Pluggable Atoms**: the pool is generic over a theory-atom type via
//!   [`Atom`][crate::atom::Atom]; use [`NoAtom`][crate::atom::NoAtom] for purely
//!   propositional work.
//!
//! ## Basic Usage
//!
//! ```rust
//! use formula_pool::atom::NoAtom;
//! use formula_pool::pool::FormulaPool;
//! use formula_pool::types::Variable;
//!
//! // 1. Initialize the pool
//! let pool: FormulaPool<NoAtom> = FormulaPool::new();
//!
//! // 2. Create variables (1-indexed)
//! let x1 = pool.var(Variable::new(1));
//! let x2 = pool.var(Variable::new(2));
//!
//! // 3. Build a formula: f = x1 AND (NOT x2)
//! let f = pool.mk_and(&[x1.clone(), !&x2]);
//!
//! // 4. Structural equality is identity
//! assert_eq!(f, &x1 & &!&x2);
//!
//! // 5. Complementary operands collapse without allocating
//! assert!(pool.mk_and(&[x1.clone(), !&x1]).is_false());
//! assert!(pool.mk_or(&[x1.clone(), !&x1]).is_true());
//! ```
//!
//! ## Core Components
//!
//! - **[`pool`]**: the heart of the library. Contains the
//!   [`FormulaPool`][crate::pool::FormulaPool] manager, the pairing scheme, and the
//!   usage-counted lifecycle.
//! - **[`builder`]**: n-ary construction, implications, and if-then-else expansion.
//! - **[`tseitin`]**: substitute variables for Tseitin-style encodings.
//! - **[`debug`]**: pool-wide iteration and human-readable dumps.
//!
//! For the invariants behind the pairing and counting scheme, check the [`pool`] module
//! documentation.

pub mod arena;
pub mod atom;
pub mod builder;
pub mod content;
pub mod debug;
pub mod formula;
pub mod lock;
pub mod pool;
pub mod tseitin;
pub mod types;
