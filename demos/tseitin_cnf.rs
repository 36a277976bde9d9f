//! Tseitin CNF encoder built on the formula pool.
//!
//! Builds a layered circuit (alternating AND/OR gates over a sliding window
//! of the previous layer), registers a substitute variable for every gate,
//! and emits the corresponding CNF clauses. Along the way it demonstrates
//! the pool's canonicalization and the cooperative cleanup of substitutes.
//!
//! Run with:
//! ```bash
//! cargo run --example tseitin-cnf -- --width 6 --depth 3
//! ```

use std::time::Instant;

use clap::Parser;
use formula_pool::atom::NoAtom;
use formula_pool::formula::Formula;
use formula_pool::pool::FormulaPool;
use formula_pool::types::Variable;

#[derive(Debug, Parser)]
#[command(about = "Tseitin CNF encoder on top of the formula pool")]
struct Cli {
    /// Number of leaf variables
    #[arg(long, default_value = "6")]
    width: usize,

    /// Number of gate layers
    #[arg(long, default_value = "3")]
    depth: usize,

    /// Print the final pool contents before tearing it down
    #[arg(long)]
    dump: bool,
}

type Gate<'p> = (Formula<'p, NoAtom>, bool, Vec<Formula<'p, NoAtom>>);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let cli = Cli::parse();
    assert!(cli.width > cli.depth, "each layer shrinks the width by one");

    let time_total = Instant::now();
    let pool: FormulaPool<NoAtom> = FormulaPool::new();

    let (root, gates) = build_circuit(&pool, cli.width, cli.depth);
    println!("root = {}", root);
    println!("gates: {}", gates.len());
    println!("pool entries after construction: {}", pool.size());

    // Rebuilding the whole circuit hits the existing nodes.
    let entries = pool.size();
    let (root_again, _) = build_circuit(&pool, cli.width, cli.depth);
    assert_eq!(root_again, root);
    assert_eq!(pool.size(), entries);
    println!("rebuilt the circuit: same root (id {}), pool unchanged", root.id());

    // One substitute per gate. The returned handles are dropped right away;
    // the associations survive because the gates are still alive.
    for (gate, _, _) in &gates {
        pool.create_tseitin_var(gate);
    }
    println!("pool entries after substitutes: {}", pool.size());

    let mut clauses: Vec<Vec<i32>> = Vec::new();
    for (gate, conjunctive, operands) in &gates {
        let v = literal(&pool, gate);
        let operand_lits: Vec<i32> = operands.iter().map(|op| literal(&pool, op)).collect();
        if *conjunctive {
            // v <-> AND(ops)
            let mut long_clause = vec![v];
            for &lit in &operand_lits {
                clauses.push(vec![-v, lit]);
                long_clause.push(-lit);
            }
            clauses.push(long_clause);
        } else {
            // v <-> OR(ops)
            let mut long_clause = vec![-v];
            for &lit in &operand_lits {
                clauses.push(vec![v, -lit]);
                long_clause.push(lit);
            }
            clauses.push(long_clause);
        }
    }
    clauses.push(vec![literal(&pool, &root)]);

    let num_vars = clauses.iter().flatten().map(|lit| lit.unsigned_abs()).max().unwrap_or(0);
    println!();
    println!("p cnf {} {}", num_vars, clauses.len());
    for clause in clauses.iter().take(10) {
        let body: Vec<String> = clause.iter().map(|lit| lit.to_string()).collect();
        println!("{} 0", body.join(" "));
    }
    if clauses.len() > 10 {
        println!("... {} more clauses", clauses.len() - 10);
    }

    if cli.dump {
        println!();
        print!("{}", pool.dump());
    }

    // Dropping every handle sweeps the gates together with their
    // substitutes; only the TRUE/FALSE pair stays.
    drop(root);
    drop(root_again);
    drop(gates);
    println!();
    println!("pool entries after dropping every handle: {}", pool.size());
    assert_eq!(pool.size(), 1);

    println!("All done in {:.2} ms", time_total.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

/// Alternating AND/OR layers over a sliding window; returns the root and
/// every gate with its operands.
fn build_circuit<'p>(
    pool: &'p FormulaPool<NoAtom>,
    width: usize,
    depth: usize,
) -> (Formula<'p, NoAtom>, Vec<Gate<'p>>) {
    let mut gates = Vec::new();
    let mut layer: Vec<Formula<'_, NoAtom>> =
        (1..=width).map(|i| pool.var(Variable::new(i as u32))).collect();
    for level in 0..depth {
        let conjunctive = level % 2 == 0;
        let mut next = Vec::with_capacity(layer.len() - 1);
        for pair in layer.windows(2) {
            let gate = if conjunctive { pool.mk_and(pair) } else { pool.mk_or(pair) };
            gates.push((gate.clone(), conjunctive, pair.to_vec()));
            next.push(gate);
        }
        layer = next;
    }
    let root = pool.mk_or(&layer);
    if layer.len() > 1 {
        gates.push((root.clone(), false, layer));
    }
    (root, gates)
}

/// CNF literal for a node: the variable itself for leaves, the registered
/// substitute for gates.
fn literal(pool: &FormulaPool<NoAtom>, f: &Formula<NoAtom>) -> i32 {
    let var = match f.as_var() {
        Some(v) => v,
        None => pool
            .tseitin_var(f)
            .as_var()
            .expect("every composite gate has a registered substitute"),
    };
    var.id() as i32
}
