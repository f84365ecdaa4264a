//! Puzzle engine: polynomial-derivative problem generation.
//!
//! A problem is a random polynomial with small non-negative coefficients and
//! a random derivative order. The user must evaluate the derivative at the
//! secret pattern key and add the key back: `answer = f^(d)(key) + key`.
//! Everything here is pure arithmetic; the only entropy comes from the
//! injected RNG, so grading is reproducible from (coefficients, order, key).

use rand::Rng;
use rookery_common::ChallengeProblem;

use super::PatternCatalog;

const MIN_TERMS: usize = 3;
const MAX_TERMS: usize = 4;
const MAX_COEFFICIENT: i64 = 20;
const MAX_DERIVATIVE_ORDER: u32 = 3;

/// Generates verification problems against a pattern catalog
#[derive(Debug, Clone)]
pub struct ProblemGenerator {
    catalog: PatternCatalog,
}

impl ProblemGenerator {
    pub fn new(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Generate a fresh challenge problem.
    ///
    /// The RNG is injected so tests can seed it; production callers pass
    /// `rand::rng()`.
    pub fn generate(&self, rng: &mut impl Rng) -> ChallengeProblem {
        let (pattern_id, key) = self.catalog.choose(rng);

        // Ascending-degree coefficients: coefficients[i] multiplies x^i
        let n = rng.random_range(MIN_TERMS..=MAX_TERMS);
        let coefficients: Vec<i64> = (0..n).map(|_| rng.random_range(0..=MAX_COEFFICIENT)).collect();
        let polynomial = format_polynomial(&coefficients);

        let derivative_order = rng.random_range(1..=MAX_DERIVATIVE_ORDER);
        let answer = answer_for(&coefficients, derivative_order, i64::from(key));

        let primes = "'".repeat(derivative_order as usize);
        let problem_text = format!(
            "Let x be the correct pattern\nf(x) = {polynomial}\nWhat is f{primes}(x) + x?"
        );

        tracing::debug!(
            pattern = %pattern_id,
            derivative_order,
            answer,
            "Generated challenge problem"
        );

        ChallengeProblem {
            pattern_id: pattern_id.to_string(),
            problem_text,
            answer,
        }
    }
}

/// One symbolic differentiation step: `[c0, c1, ..., ck] -> [c1*1, c2*2, ..., ck*k]`.
/// A constant or empty polynomial differentiates to the empty sequence.
fn differentiate(coefficients: &[i64]) -> Vec<i64> {
    coefficients
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, &coef)| coef * (i as i64 + 1))
        .collect()
}

fn nth_derivative(coefficients: &[i64], order: u32) -> Vec<i64> {
    let mut current = coefficients.to_vec();
    for _ in 0..order {
        current = differentiate(&current);
    }
    current
}

/// Evaluate an ascending-degree coefficient sequence at `x`.
/// The empty sequence is the zero polynomial.
fn evaluate(coefficients: &[i64], x: i64) -> i64 {
    coefficients
        .iter()
        .enumerate()
        .map(|(i, &coef)| coef * x.pow(i as u32))
        .sum()
}

/// The full scoring function: pure in (coefficients, order, key)
fn answer_for(coefficients: &[i64], derivative_order: u32, key: i64) -> i64 {
    evaluate(&nth_derivative(coefficients, derivative_order), key) + key
}

/// Render the polynomial in descending-degree order, omitting zero terms.
/// All-zero coefficients produce an empty string; that degenerate challenge
/// is still well-defined (the answer is just the key).
fn format_polynomial(coefficients: &[i64]) -> String {
    let terms: Vec<String> = coefficients
        .iter()
        .enumerate()
        .rev()
        .filter(|&(_, &coef)| coef != 0)
        .map(|(degree, &coef)| match degree {
            0 => coef.to_string(),
            1 => format!("{coef}x"),
            _ => format!("{coef}x^{degree}"),
        })
        .collect();
    terms.join(" + ")
}
