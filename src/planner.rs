//! Traversal-order planning.
//!
//! Given the algebraic expressions of one connected pattern component, this
//! pass decides the order in which the expressions are evaluated and the
//! orientation of each one, so that the downstream traversal operators do
//! the least work. It enumerates every arrangement of the expression array,
//! drops arrangements the execution layer cannot realize, scores the
//! survivors against transpose cost and filter/label/bound-variable
//! selectivity, then repairs the winner so every expression's source is
//! resolved by an earlier expression.
//!
//! The pass runs once per component at plan-build time. Work is bounded by
//! `n!` over the component's expression count, which stays small in
//! practice because patterns decompose into short chains.

use std::collections::HashSet;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::algebra::AlgebraicExpr;
use crate::config::PlannerConfig;
use crate::filter::FilterTree;
use crate::pattern::PatternGraph;

/// Cost of a single transpose operation.
const TRANSPOSE_PENALTY: i32 = 1;
/// Reward for a labeled expression source.
const LABEL_SCORE: i32 = 2 * TRANSPOSE_PENALTY;
/// Reward for a filtered expression endpoint.
const FILTER_SCORE: i32 = 4 * TRANSPOSE_PENALTY;
/// Reward for an endpoint bound by an earlier pipeline stage. Outweighs any
/// combination of filter and label rewards on a single expression.
const BOUND_SCORE: i32 = 8 * FILTER_SCORE;

/// One candidate evaluation order, as indices into the expression array.
type Arrangement = SmallVec<[usize; 8]>;

/// Reorders `exps` in place so the pattern is evaluated cheapest-first.
///
/// The first expression of the result is realized as a scan downstream;
/// every later expression's source alias is guaranteed to be resolved by
/// some earlier expression. Expressions may be transposed in the process,
/// both mid-sequence to repair the chain and at position zero to pick the
/// better entry point.
///
/// `filters` and `bound_vars` describe which aliases are constrained by
/// predicates and which are already materialized by earlier stages; both
/// are optional. `n == 1` self-loop scans are returned untouched.
///
/// # Panics
///
/// Panics if `exps` is empty, or if no valid arrangement exists. Both are
/// upheld by the connected-component decomposition that produces the
/// expression array.
pub fn order_expressions(
    graph: &PatternGraph,
    exps: &mut [AlgebraicExpr],
    filters: Option<&FilterTree>,
    bound_vars: Option<&HashSet<String>>,
    config: &PlannerConfig,
) {
    assert!(!exps.is_empty(), "cannot order an empty expression array");

    // A lone scan such as `MATCH (n:L)` has nothing to order or orient.
    if exps.len() == 1
        && exps[0].operand_count() == 1
        && exps[0].source() == exps[0].destination()
    {
        return;
    }

    let filtered: HashSet<&str> = filters
        .map(FilterTree::collect_modified)
        .unwrap_or_default();
    let labeled = graph.labeled_aliases();

    let arrangements = permutations(exps.len());
    if arrangements.len() > 1 {
        let valid: Vec<&Arrangement> = arrangements
            .iter()
            .filter(|a| valid_arrangement(a, exps, &labeled))
            .collect();
        assert!(
            !valid.is_empty(),
            "a connected component admits at least one valid arrangement"
        );
        trace!(
            total = arrangements.len(),
            valid = valid.len(),
            "enumerated arrangements"
        );

        let mut max_score = i32::MIN;
        let mut winner = valid[0];
        for &arrangement in &valid {
            let score =
                score_arrangement(arrangement, exps, &labeled, &filtered, bound_vars, config);
            trace!(?arrangement, score, "scored arrangement");
            if score > max_score {
                max_score = score;
                winner = arrangement;
            }
        }
        debug!(score = max_score, "traversal order selected");

        apply_arrangement(exps, winner);
        resolve_winning_sequence(exps);
    }

    select_entry_point(&mut exps[0], &labeled, &filtered, bound_vars);
}

/// Produces every ordering of `0..n` by recursive prefix swaps. The output
/// order is deterministic for a given `n`; ties during scoring are broken
/// by this production order.
fn permutations(n: usize) -> Vec<Arrangement> {
    let mut out = Vec::with_capacity(factorial(n));
    let mut work: Arrangement = (0..n).collect();
    permute(&mut work, 0, &mut out);
    debug_assert_eq!(out.len(), factorial(n));
    out
}

fn permute(work: &mut Arrangement, l: usize, out: &mut Vec<Arrangement>) {
    if l == work.len() - 1 {
        out.push(work.clone());
        return;
    }
    for i in l..work.len() {
        work.swap(l, i);
        permute(work, l + 1, out);
        work.swap(l, i);
    }
}

fn factorial(n: usize) -> usize {
    (2..=n).product::<usize>().max(1)
}

/// An arrangement is valid when every expression after the first shares an
/// endpoint with some earlier expression, and the opener can be realized as
/// a scan.
///
/// The opener restriction exists for patterns like
/// `(a:L0)-[:R*]->(b:L1)`, which plans as three expressions `[L0]`, `[R]`,
/// `[L1]`. A bare variable-length edge cannot become a scan operator, so
/// any arrangement that puts `[R]` first while a labeled endpoint scan is
/// available must be rejected.
fn valid_arrangement(
    arrangement: &[usize],
    exps: &[AlgebraicExpr],
    labeled: &HashSet<&str>,
) -> bool {
    let first = &exps[arrangement[0]];
    if (labeled.contains(first.source()) || labeled.contains(first.destination()))
        && first.edge().is_some()
        && first.operand_count() == 1
    {
        return false;
    }

    for i in 1..arrangement.len() {
        let exp = &exps[arrangement[i]];
        let chained = arrangement[..i].iter().any(|&j| {
            let prev = &exps[j];
            prev.source() == exp.source()
                || prev.destination() == exp.source()
                || prev.source() == exp.destination()
                || prev.destination() == exp.destination()
        });
        if !chained {
            return false;
        }
    }
    true
}

fn score_arrangement(
    arrangement: &[usize],
    exps: &[AlgebraicExpr],
    labeled: &HashSet<&str>,
    filtered: &HashSet<&str>,
    bound_vars: Option<&HashSet<String>>,
    config: &PlannerConfig,
) -> i32 {
    arrangement_reward(arrangement, exps, labeled, filtered, bound_vars)
        - arrangement_penalty(arrangement, exps, config)
}

/// Transpose cost of evaluating the arrangement as ordered.
///
/// An expression whose source is resolved by a predecessor runs in its
/// current orientation and pays for the transposes it already contains.
/// Otherwise the whole product must be flipped, which costs one transpose
/// per operand not already transposed.
fn arrangement_penalty(
    arrangement: &[usize],
    exps: &[AlgebraicExpr],
    config: &PlannerConfig,
) -> i32 {
    if config.maintain_transpose {
        return 0;
    }

    let first = &exps[arrangement[0]];
    let mut penalty = first.transpose_count() as i32 * TRANSPOSE_PENALTY;

    for i in 1..arrangement.len() {
        let exp = &exps[arrangement[i]];
        let src_resolved = arrangement[..i].iter().any(|&j| {
            let prev = &exps[j];
            prev.source() == exp.source() || prev.destination() == exp.source()
        });

        // The destination is resolved either way in a valid arrangement.
        let transposes = exp.transpose_count() as i32;
        if src_resolved {
            penalty += transposes * TRANSPOSE_PENALTY;
        } else {
            penalty += (exp.operand_count() as i32 - transposes) * TRANSPOSE_PENALTY;
        }
    }
    penalty
}

/// Selectivity reward, weighted so earlier positions count for more.
///
/// Bound endpoints dominate filters, filters dominate labels. Only the
/// source side earns the label reward here; scoring both sides would stop
/// the search from favoring arrangements whose opener already faces its
/// labeled endpoint, and the entry-point pass weighs the destination label
/// when orienting the opener.
fn arrangement_reward(
    arrangement: &[usize],
    exps: &[AlgebraicExpr],
    labeled: &HashSet<&str>,
    filtered: &HashSet<&str>,
    bound_vars: Option<&HashSet<String>>,
) -> i32 {
    let n = arrangement.len();
    let mut reward = 0;
    for (i, &idx) in arrangement.iter().enumerate() {
        let factor = (n - i) as i32;
        let exp = &exps[idx];

        if let Some(bound) = bound_vars {
            if bound.contains(exp.source()) {
                reward += BOUND_SCORE * factor;
            }
            if bound.contains(exp.destination()) {
                reward += BOUND_SCORE * factor;
            }
        }

        if filtered.contains(exp.source()) {
            reward += FILTER_SCORE * factor;
        }
        if filtered.contains(exp.destination()) {
            reward += FILTER_SCORE * factor;
        }

        if labeled.contains(exp.source()) {
            reward += LABEL_SCORE * factor;
        }
    }
    reward
}

fn apply_arrangement(exps: &mut [AlgebraicExpr], arrangement: &[usize]) {
    let reordered: Vec<AlgebraicExpr> =
        arrangement.iter().map(|&i| exps[i].clone()).collect();
    for (slot, exp) in exps.iter_mut().zip(reordered) {
        *slot = exp;
    }
}

/// Transposes out-of-order expressions so that every expression's source is
/// resolved by an earlier expression. The winning arrangement only
/// guarantees a shared endpoint; the traversal operators need the shared
/// endpoint on the source side.
fn resolve_winning_sequence(exps: &mut [AlgebraicExpr]) {
    for i in 1..exps.len() {
        let (head, tail) = exps.split_at_mut(i);
        let exp = &mut tail[0];
        let src_resolved = head
            .iter()
            .any(|prev| prev.source() == exp.source() || prev.destination() == exp.source());
        if !src_resolved {
            trace!(source = exp.source(), "transposing to repair chain");
            exp.transpose();
        }
    }
}

/// Orients the opening expression.
///
/// A bound endpoint always wins: starting from rows that are already
/// materialized skips the scan entirely. With nothing bound, the endpoint
/// with the better filter/label combination becomes the source; filters
/// outrank labels because a selective predicate shrinks the frontier more
/// than a label scan does.
fn select_entry_point(
    exp: &mut AlgebraicExpr,
    labeled: &HashSet<&str>,
    filtered: &HashSet<&str>,
    bound_vars: Option<&HashSet<String>>,
) {
    // MATCH (a)-[]->(a)
    if exp.operand_count() == 1 && exp.source() == exp.destination() {
        return;
    }

    if let Some(bound) = bound_vars {
        if bound.contains(exp.source()) {
            return;
        }
        if bound.contains(exp.destination()) {
            exp.transpose();
            return;
        }
    }

    let mut src_score = 0;
    let mut dest_score = 0;

    if filtered.contains(exp.source()) {
        src_score += FILTER_SCORE;
    }
    if filtered.contains(exp.destination()) {
        dest_score += FILTER_SCORE;
    }

    if labeled.contains(exp.source()) {
        src_score += LABEL_SCORE;
    }
    if labeled.contains(exp.destination()) {
        dest_score += LABEL_SCORE;
    }

    if dest_score > src_score {
        trace!(
            entry = exp.destination(),
            "transposing opener toward better entry point"
        );
        exp.transpose();
    }
}
