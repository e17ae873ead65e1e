//! Randomized population sieve for short lattice vectors

use crate::combiner::Combiner;
use crate::core::error::{LatticeError, Result};
use crate::core::lattice::Lattice;
use crate::core::types::{CoefficientRange, LatticePoint};
use crate::population::Population;
use crate::sampler::PopulationSampler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Candidates drawn per batch, relative to the number of free slots
const BATCH_FACTOR: usize = 2;

/// How the first population is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// The basis vectors themselves
    BasisVectors,
    /// Random small coefficient vectors drawn from the coefficient range
    Random,
}

impl Default for Seeding {
    fn default() -> Self {
        Seeding::Random
    }
}

/// Parameters for the sieve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveParams {
    /// Target population size `n`
    pub population_size: usize,
    /// Fraction `p` of the shortest points kept each round, in (0, 1]
    pub retention: f64,
    /// Range for random seeding and injected points
    pub coefficient_range: CoefficientRange,
    /// Combination rule for the strict and relaxed phases
    pub combiner: Combiner,
    /// Initial population mode
    pub seeding: Seeding,
    /// Number of augmentation rounds
    pub rounds: usize,
    /// Wall-clock budget in seconds, checked between rounds
    pub time_budget_secs: Option<f64>,
    /// RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Candidate draws allowed per phase of a round, and for random seeding
    pub max_attempts: usize,
    /// Rounds between progress messages
    pub log_interval: usize,
}

impl Default for SieveParams {
    fn default() -> Self {
        SieveParams {
            population_size: 100,
            retention: 0.5,
            coefficient_range: CoefficientRange::default(),
            combiner: Combiner::default(),
            seeding: Seeding::default(),
            rounds: 50,
            time_budget_secs: None,
            seed: None,
            max_attempts: 10_000,
            log_interval: 10,
        }
    }
}

impl SieveParams {
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_retention(mut self, retention: f64) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_coefficient_range(mut self, range: CoefficientRange) -> Self {
        self.coefficient_range = range;
        self
    }

    pub fn with_combiner(mut self, combiner: Combiner) -> Self {
        self.combiner = combiner;
        self
    }

    pub fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_time_budget_secs(mut self, secs: f64) -> Self {
        self.time_budget_secs = Some(secs);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Time budget as a `Duration`
    ///
    /// A budget `Duration` cannot represent (negative, NaN, or beyond
    /// `Duration::MAX`) is an error; `validate` reports the same values.
    pub fn time_budget(&self) -> Result<Option<Duration>> {
        self.time_budget_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|e| {
                    LatticeError::invalid_parameters(format!(
                        "Time budget must be a representable non-negative number of seconds, \
                         got {}: {}",
                        secs, e
                    ))
                })
            })
            .transpose()
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(LatticeError::invalid_parameters(
                "Population size must be at least 1",
            ));
        }

        if !(self.retention > 0.0 && self.retention <= 1.0) {
            return Err(LatticeError::invalid_parameters(format!(
                "Retention must be in (0, 1], got {}",
                self.retention
            )));
        }

        self.time_budget()?;

        if self.max_attempts == 0 {
            return Err(LatticeError::invalid_parameters(
                "Max attempts must be at least 1",
            ));
        }

        if self.log_interval == 0 {
            return Err(LatticeError::invalid_parameters(
                "Log interval must be at least 1",
            ));
        }

        self.coefficient_range.validate()?;
        self.combiner.validate()
    }
}

/// Stage of a round's fill loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Full acceptance policy
    Strict,
    /// Candidates no longer have to beat a parent
    Relaxed,
    /// Fresh random points
    Inject,
}

/// Why a candidate was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoResult,
    ZeroNorm,
    SelfCombination,
    NoImprovement,
    Duplicate,
}

/// Rejection tally for a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub no_result: u64,
    pub zero_norm: u64,
    pub self_combination: u64,
    pub no_improvement: u64,
    pub duplicate: u64,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::NoResult => self.no_result += 1,
            Rejection::ZeroNorm => self.zero_norm += 1,
            Rejection::SelfCombination => self.self_combination += 1,
            Rejection::NoImprovement => self.no_improvement += 1,
            Rejection::Duplicate => self.duplicate += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.no_result
            + self.zero_norm
            + self.self_combination
            + self.no_improvement
            + self.duplicate
    }
}

/// Summary of one augmentation round
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    /// Points carried over unchanged
    pub retained: usize,
    /// New points accepted
    pub accepted: usize,
    /// Candidates drawn across all phases
    pub candidates: u64,
    pub rejections: RejectionCounts,
    /// Last phase the round needed
    pub phase: Phase,
    /// Whether the population reached its target size
    pub filled: bool,
    /// Size of the new population
    pub population_size: usize,
    /// Shortest norm in the new population
    pub population_best_norm: f64,
    /// Best norm seen so far in the run
    pub best_norm: f64,
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SieveStatus {
    /// All requested rounds ran
    Completed,
    /// The time budget ran out before the next round
    TimeBudgetExhausted { rounds_completed: usize },
    /// A round could not fill the population within its attempt budget
    RetryBudgetExhausted { round: usize },
}

impl SieveStatus {
    pub fn is_early_termination(&self) -> bool {
        !matches!(self, SieveStatus::Completed)
    }
}

impl std::fmt::Display for SieveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveStatus::Completed => write!(f, "completed"),
            SieveStatus::TimeBudgetExhausted { rounds_completed } => {
                write!(f, "time budget exhausted after {} rounds", rounds_completed)
            }
            SieveStatus::RetryBudgetExhausted { round } => {
                write!(f, "retry budget exhausted in round {}", round)
            }
        }
    }
}

/// Result of a sieve run
#[derive(Debug, Clone, Serialize)]
pub struct SieveResult {
    /// Shortest nonzero point found
    pub shortest: LatticePoint,
    /// Its norm
    pub norm: f64,
    pub rounds_completed: usize,
    pub candidates_evaluated: u64,
    /// Execution time in seconds
    pub execution_time: f64,
    pub status: SieveStatus,
    /// Best norm after each round
    pub history: Vec<f64>,
    /// Seed the run used
    pub seed: u64,
}

/// One evaluated draw: the parent indices and what the combiner made of them
struct Draw {
    first: usize,
    second: usize,
    candidate: Option<LatticePoint>,
}

/// Drives seeding and augmentation rounds over one lattice
pub struct SieveEngine<'a> {
    lattice: &'a Lattice,
    params: SieveParams,
    seed: u64,
    rng: StdRng,
    population: Population,
    best: Option<LatticePoint>,
    history: Vec<f64>,
    rounds_completed: usize,
    candidates_evaluated: u64,
}

impl<'a> SieveEngine<'a> {
    /// Create an engine with an empty population
    pub fn new(lattice: &'a Lattice, params: SieveParams) -> Result<Self> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(|| rand::rng().random());
        Ok(SieveEngine {
            lattice,
            params,
            seed,
            rng: StdRng::seed_from_u64(seed),
            population: Population::new(),
            best: None,
            history: Vec::new(),
            rounds_completed: 0,
            candidates_evaluated: 0,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        self.lattice
    }

    pub fn params(&self) -> &SieveParams {
        &self.params
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best point seen so far
    pub fn best(&self) -> Option<&LatticePoint> {
        self.best.as_ref()
    }

    /// Best norm after each completed round
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Build the first population according to the seeding mode
    ///
    /// Basis seeding on a lattice of rank above `n` keeps the `n` shortest
    /// basis vectors.
    pub fn seed_population(&mut self) -> Result<()> {
        let sampler = PopulationSampler::new(self.lattice);
        let mut population = match self.params.seeding {
            Seeding::BasisVectors => sampler.basis_vectors()?,
            Seeding::Random => {
                let sampled = sampler.random(
                    self.params.population_size,
                    self.params.coefficient_range,
                    self.params.max_attempts,
                    &mut self.rng,
                )?;
                self.candidates_evaluated += sampled.attempts as u64;
                sampled.population
            }
        };

        if population.is_empty() {
            return Err(LatticeError::resource_exhaustion(format!(
                "{:?} seeding produced no nonzero lattice point",
                self.params.seeding
            )));
        }
        population.truncate(self.params.population_size);

        log::debug!(
            "Seeded {} points ({:?}), shortest norm {:.4}",
            population.len(),
            self.params.seeding,
            population.first().map(|p| p.norm()).unwrap_or(f64::NAN)
        );

        if let Some(first) = population.first() {
            self.observe(first);
        }
        self.population = population;
        Ok(())
    }

    /// Run one augmentation round
    ///
    /// The shortest `floor(p·|population|)` points survive, never more than
    /// `n`; the rest of the new population is filled from combinations of the
    /// survivors. On error the population is left as it was.
    pub fn augment(&mut self) -> Result<RoundReport> {
        if self.population.is_empty() {
            return Err(LatticeError::resource_exhaustion(
                "Cannot augment an empty population",
            ));
        }

        let lattice = self.lattice;
        let round = self.rounds_completed + 1;
        let target = self.params.population_size;
        let keep = retained_count(self.population.len(), self.params.retention).min(target);

        let parents = self.population.as_slice()[..keep].to_vec();
        let mut next = Population::from_points(parents.iter().cloned());

        let mut rejections = RejectionCounts::default();
        let mut candidates = 0u64;
        let mut phase = Phase::Strict;

        for current in [Phase::Strict, Phase::Relaxed, Phase::Inject] {
            if next.len() >= target {
                break;
            }
            if current != Phase::Strict {
                log::warn!(
                    "Round {}: {}/{} points after {:?} phase, falling back to {:?}",
                    round,
                    next.len(),
                    target,
                    phase,
                    current
                );
            }
            phase = current;

            let combiner = match current {
                Phase::Inject => Combiner::Random {
                    range: self.params.coefficient_range,
                },
                _ => self.params.combiner,
            };
            let require_improvement = current == Phase::Strict;

            let mut attempts = 0usize;
            while next.len() < target && attempts < self.params.max_attempts {
                let batch = ((target - next.len()) * BATCH_FACTOR)
                    .min(self.params.max_attempts - attempts)
                    .max(1);
                let seeds: Vec<u64> = (0..batch).map(|_| self.rng.random()).collect();
                attempts += batch;
                candidates += batch as u64;

                for draw in evaluate_batch(lattice, &parents, combiner, &seeds)? {
                    if next.len() >= target {
                        break;
                    }
                    match judge(draw, &parents, &next, combiner, require_improvement) {
                        Ok(point) => {
                            if self.observe(&point) {
                                log::debug!("Round {}: new best {}", round, point);
                            }
                            next.insert(point);
                        }
                        Err(rejection) => rejections.record(rejection),
                    }
                }
            }
        }

        next.sort_by_norm();
        let filled = next.len() >= target;
        self.population = next;
        self.rounds_completed = round;
        self.candidates_evaluated += candidates;

        let best_norm = self.best.as_ref().map(|p| p.norm()).unwrap_or(f64::INFINITY);
        self.history.push(best_norm);

        let report = RoundReport {
            round,
            retained: keep,
            accepted: self.population.len() - keep,
            candidates,
            rejections,
            phase,
            filled,
            population_size: self.population.len(),
            population_best_norm: self
                .population
                .first()
                .map(|p| p.norm())
                .unwrap_or(f64::INFINITY),
            best_norm,
        };

        log::debug!(
            "Round {}: kept {}, accepted {}, drew {}, phase {:?}, rejected {:?}, best {:.4}",
            report.round,
            report.retained,
            report.accepted,
            report.candidates,
            report.phase,
            report.rejections,
            report.best_norm
        );

        Ok(report)
    }

    /// Seed if needed, then augment until the round count, time budget or
    /// retry budget runs out
    pub fn run(&mut self) -> Result<SieveResult> {
        let start_time = Instant::now();

        log::info!(
            "Sieving rank-{} lattice: population {}, retention {}, combiner {}, {} rounds, seed {}",
            self.lattice.rank(),
            self.params.population_size,
            self.params.retention,
            self.params.combiner,
            self.params.rounds,
            self.seed
        );

        if self.population.is_empty() {
            self.seed_population()?;
        }

        let budget = self.params.time_budget()?;
        let mut status = SieveStatus::Completed;

        for _ in 0..self.params.rounds {
            if let Some(budget) = budget {
                if start_time.elapsed() >= budget {
                    status = SieveStatus::TimeBudgetExhausted {
                        rounds_completed: self.rounds_completed,
                    };
                    log::warn!("Stopping: {}", status);
                    break;
                }
            }

            let report = self.augment()?;

            if report.round % self.params.log_interval == 0 {
                log::info!(
                    "Round {}: best norm {:.4}, population best {:.4}",
                    report.round,
                    report.best_norm,
                    report.population_best_norm
                );
            }

            if !report.filled {
                status = SieveStatus::RetryBudgetExhausted { round: report.round };
                log::warn!(
                    "Stopping: {} ({} of {} points)",
                    status,
                    report.population_size,
                    self.params.population_size
                );
                break;
            }
        }

        let shortest = self.best.clone().ok_or_else(|| {
            LatticeError::resource_exhaustion("Sieve finished without a nonzero point")
        })?;
        let execution_time = start_time.elapsed().as_secs_f64();

        log::info!(
            "Sieve {} after {} rounds in {:.3}s: norm {:.4}",
            status,
            self.rounds_completed,
            execution_time,
            shortest.norm()
        );

        Ok(SieveResult {
            norm: shortest.norm(),
            shortest,
            rounds_completed: self.rounds_completed,
            candidates_evaluated: self.candidates_evaluated,
            execution_time,
            status,
            history: self.history.clone(),
            seed: self.seed,
        })
    }

    /// Track `point` as the best if it is shorter; returns whether it was
    fn observe(&mut self, point: &LatticePoint) -> bool {
        if point.is_zero() {
            return false;
        }
        let improved = match &self.best {
            Some(best) => point.norm_squared() < best.norm_squared(),
            None => true,
        };
        if improved {
            self.best = Some(point.clone());
        }
        improved
    }
}

/// Number of points kept from a population of `len`
pub fn retained_count(len: usize, retention: f64) -> usize {
    if len == 0 {
        return 0;
    }
    ((retention * len as f64).floor() as usize).clamp(1, len)
}

fn evaluate_batch(
    lattice: &Lattice,
    parents: &[LatticePoint],
    combiner: Combiner,
    seeds: &[u64],
) -> Result<Vec<Draw>> {
    #[cfg(feature = "parallel")]
    let draws = seeds
        .par_iter()
        .map(|&seed| draw_candidate(lattice, parents, combiner, seed))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let draws = seeds
        .iter()
        .map(|&seed| draw_candidate(lattice, parents, combiner, seed))
        .collect();

    draws
}

fn draw_candidate(
    lattice: &Lattice,
    parents: &[LatticePoint],
    combiner: Combiner,
    seed: u64,
) -> Result<Draw> {
    let mut rng = StdRng::seed_from_u64(seed);
    let first = rng.random_range(0..parents.len());
    let second = rng.random_range(0..parents.len());
    let candidate = combiner.combine(lattice, &parents[first], &parents[second], &mut rng)?;
    Ok(Draw {
        first,
        second,
        candidate,
    })
}

/// Acceptance policy, checked in order
fn judge(
    draw: Draw,
    parents: &[LatticePoint],
    next: &Population,
    combiner: Combiner,
    require_improvement: bool,
) -> std::result::Result<LatticePoint, Rejection> {
    let candidate = draw.candidate.ok_or(Rejection::NoResult)?;
    if candidate.is_zero() {
        return Err(Rejection::ZeroNorm);
    }

    if !combiner.is_generator() {
        let p1 = &parents[draw.first];
        let p2 = &parents[draw.second];
        if p1 == p2 {
            return Err(Rejection::SelfCombination);
        }
        if require_improvement
            && candidate.norm_squared() > p1.norm_squared()
            && candidate.norm_squared() > p2.norm_squared()
        {
            return Err(Rejection::NoImprovement);
        }
    }

    if next.contains(&candidate) {
        return Err(Rejection::Duplicate);
    }
    Ok(candidate)
}

/// SVP front door: seed, sieve, report
pub struct SieveSolver {
    params: SieveParams,
}

impl Default for SieveSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SieveSolver {
    /// Create a solver with default parameters
    pub fn new() -> Self {
        Self::with_params(SieveParams::default())
    }

    /// Create a solver with custom parameters
    pub fn with_params(params: SieveParams) -> Self {
        SieveSolver { params }
    }

    pub fn params(&self) -> &SieveParams {
        &self.params
    }

    /// Search `lattice` for a short nonzero vector
    pub fn solve(&self, lattice: &Lattice) -> Result<SieveResult> {
        let mut engine = SieveEngine::new(lattice, self.params.clone())?;
        engine.run()
    }

    /// Get algorithm info
    pub fn algorithm_info(&self) -> String {
        format!(
            "Population sieve: n={}, p={}, combiner {}, seeding {:?}",
            self.params.population_size,
            self.params.retention,
            self.params.combiner,
            self.params.seeding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> Lattice {
        Lattice::new(crate::core::matrix::Matrix::identity(n).unwrap()).unwrap()
    }

    #[test]
    fn test_sieve_params_validation() {
        assert!(SieveParams::default().validate().is_ok());
        assert!(SieveParams::default().with_population_size(0).validate().is_err());
        assert!(SieveParams::default().with_retention(0.0).validate().is_err());
        assert!(SieveParams::default().with_retention(1.5).validate().is_err());
        assert!(SieveParams::default().with_retention(1.0).validate().is_ok());
        assert!(SieveParams::default().with_time_budget_secs(-1.0).validate().is_err());
        assert!(SieveParams::default().with_time_budget_secs(f64::NAN).validate().is_err());
        assert!(SieveParams::default().with_time_budget_secs(2.5).validate().is_ok());
        assert!(SieveParams::default().with_max_attempts(0).validate().is_err());
        assert!(SieveParams::default()
            .with_coefficient_range(CoefficientRange::new(2, 2))
            .validate()
            .is_err());
    }

    #[test]
    fn test_params_from_partial_json() {
        let json = r#"{
            "population_size": 8,
            "combiner": {"kind": "modified_average_with_noise", "kicks": 3, "step": 2},
            "seeding": "basis_vectors"
        }"#;
        let params: SieveParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.population_size, 8);
        assert_eq!(params.combiner, Combiner::noisy());
        assert_eq!(params.seeding, Seeding::BasisVectors);
        assert_eq!(params.retention, 0.5);
    }

    #[test]
    fn test_retained_count() {
        assert_eq!(retained_count(0, 0.5), 0);
        assert_eq!(retained_count(1, 0.5), 1);
        assert_eq!(retained_count(2, 0.5), 1);
        assert_eq!(retained_count(4, 0.5), 2);
        assert_eq!(retained_count(7, 0.5), 3);
        assert_eq!(retained_count(7, 1.0), 7);
        assert_eq!(retained_count(10, 0.01), 1);
    }

    #[test]
    fn test_rejection_order() {
        let lattice = identity(2);
        let a = LatticePoint::new(&lattice, vec![1, 0]).unwrap();
        let b = LatticePoint::new(&lattice, vec![0, 3]).unwrap();
        let parents = vec![a.clone(), b.clone()];
        let empty = Population::new();
        let strict = |draw| judge(draw, &parents, &empty, Combiner::ModifiedAverage, true);

        let none = Draw { first: 0, second: 1, candidate: None };
        assert_eq!(strict(none).unwrap_err(), Rejection::NoResult);

        let zero = LatticePoint::new(&lattice, vec![0, 0]).unwrap();
        let draw = Draw { first: 0, second: 0, candidate: Some(zero) };
        assert_eq!(strict(draw).unwrap_err(), Rejection::ZeroNorm);

        let draw = Draw { first: 1, second: 1, candidate: Some(a.clone()) };
        assert_eq!(strict(draw).unwrap_err(), Rejection::SelfCombination);

        let long = LatticePoint::new(&lattice, vec![4, 4]).unwrap();
        let draw = Draw { first: 0, second: 1, candidate: Some(long.clone()) };
        assert_eq!(strict(draw).unwrap_err(), Rejection::NoImprovement);

        // relaxed phase lets the same candidate through
        let draw = Draw { first: 0, second: 1, candidate: Some(long) };
        assert!(judge(draw, &parents, &empty, Combiner::ModifiedAverage, false).is_ok());

        let taken = Population::from_points(vec![b.clone()]);
        let draw = Draw { first: 0, second: 1, candidate: Some(b) };
        assert_eq!(
            judge(draw, &parents, &taken, Combiner::ModifiedAverage, true).unwrap_err(),
            Rejection::Duplicate
        );
    }

    #[test]
    fn test_generator_skips_parent_checks() {
        let lattice = identity(2);
        let a = LatticePoint::new(&lattice, vec![1, 0]).unwrap();
        let parents = vec![a];
        let generator = Combiner::Random { range: CoefficientRange::default() };
        let far = LatticePoint::new(&lattice, vec![2, 2]).unwrap();
        let draw = Draw { first: 0, second: 0, candidate: Some(far) };
        assert!(judge(draw, &parents, &Population::new(), generator, true).is_ok());
    }

    #[test]
    fn test_basis_seeding_on_identity() {
        let lattice = identity(2);
        let params = SieveParams::default().with_seeding(Seeding::BasisVectors).with_seed(1);
        let mut engine = SieveEngine::new(&lattice, params).unwrap();
        engine.seed_population().unwrap();
        assert_eq!(engine.population().len(), 2);
        assert_eq!(engine.best().unwrap().norm(), 1.0);
    }

    #[test]
    fn test_single_survivor_round_fills_by_injection() {
        // n = 4 from two basis vectors keeps one parent, so every pair is a self-combination
        let lattice = identity(2);
        let params = SieveParams::default()
            .with_population_size(4)
            .with_seeding(Seeding::BasisVectors)
            .with_max_attempts(200)
            .with_seed(3);
        let mut engine = SieveEngine::new(&lattice, params).unwrap();
        engine.seed_population().unwrap();

        let report = engine.augment().unwrap();
        assert_eq!(report.retained, 1);
        assert_eq!(report.phase, Phase::Inject);
        assert!(report.filled);
        assert!(report.rejections.self_combination > 0);
        assert_eq!(engine.population().len(), 4);
        assert!(engine.population().is_sorted_by_norm());
        assert_eq!(report.best_norm, 1.0);
    }

    #[test]
    fn test_unfillable_population_stops_with_status() {
        // 1-D range [-2, 3) only holds the points ±1 and ±2
        let lattice = identity(1);
        let params = SieveParams::default()
            .with_population_size(10)
            .with_rounds(5)
            .with_max_attempts(200)
            .with_seed(17);
        let result = SieveSolver::with_params(params).solve(&lattice).unwrap();
        assert_eq!(result.status, SieveStatus::RetryBudgetExhausted { round: 1 });
        assert!(result.status.is_early_termination());
        assert_eq!(result.rounds_completed, 1);
        assert_eq!(result.norm, 1.0);
    }

    #[test]
    fn test_zero_time_budget_runs_no_rounds() {
        let lattice = identity(3);
        let params = SieveParams::default()
            .with_population_size(10)
            .with_seeding(Seeding::BasisVectors)
            .with_time_budget_secs(0.0)
            .with_seed(5);
        let result = SieveSolver::with_params(params).solve(&lattice).unwrap();
        assert_eq!(result.status, SieveStatus::TimeBudgetExhausted { rounds_completed: 0 });
        assert!(result.history.is_empty());
        assert_eq!(result.norm, 1.0);
    }

    #[test]
    fn test_unrepresentable_time_budget_is_rejected() {
        let params = SieveParams::default().with_time_budget_secs(1e20);
        assert!(matches!(
            params.validate(),
            Err(LatticeError::InvalidParameters(_))
        ));
        assert!(params.time_budget().is_err());

        let lattice = identity(2);
        assert!(matches!(
            SieveSolver::with_params(params).solve(&lattice),
            Err(LatticeError::InvalidParameters(_))
        ));
        assert_eq!(
            SieveParams::default().with_time_budget_secs(1.5).time_budget().unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(SieveParams::default().time_budget().unwrap(), None);
    }

    #[test]
    fn test_basis_seeding_respects_population_size() {
        let lattice = identity(6);
        let params = SieveParams::default()
            .with_population_size(2)
            .with_retention(1.0)
            .with_seeding(Seeding::BasisVectors)
            .with_seed(4);
        let mut engine = SieveEngine::new(&lattice, params).unwrap();
        engine.seed_population().unwrap();
        assert_eq!(engine.population().len(), 2);

        for _ in 0..3 {
            let report = engine.augment().unwrap();
            assert_eq!(report.population_size, 2);
            assert!(report.retained <= 2);
            assert!(report.filled);
        }
    }

    #[test]
    fn test_failed_round_keeps_population() {
        // both parents are kept; the difference (1, -1) maps to 2^63, outside i64
        let lattice = Lattice::from_matrix(vec![vec![1 << 62, -(1 << 62)]]).unwrap();
        let params = SieveParams::default()
            .with_population_size(4)
            .with_retention(1.0)
            .with_combiner(Combiner::Difference)
            .with_seeding(Seeding::BasisVectors)
            .with_seed(6);
        let mut engine = SieveEngine::new(&lattice, params).unwrap();
        engine.seed_population().unwrap();
        let before: Vec<Vec<i64>> = engine
            .population()
            .iter()
            .map(|p| p.coefficients().to_vec())
            .collect();

        assert!(engine.augment().is_err());
        let after: Vec<Vec<i64>> = engine
            .population()
            .iter()
            .map(|p| p.coefficients().to_vec())
            .collect();
        assert_eq!(before, after);
        assert_eq!(engine.rounds_completed(), 0);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_augment_requires_population() {
        let lattice = identity(2);
        let mut engine = SieveEngine::new(&lattice, SieveParams::default().with_seed(0)).unwrap();
        assert!(matches!(
            engine.augment(),
            Err(LatticeError::ResourceExhaustion(_))
        ));
    }

    #[test]
    fn test_zero_basis_cannot_be_seeded() {
        let lattice = Lattice::from_matrix(vec![vec![0, 0], vec![0, 0]]).unwrap();
        let params = SieveParams::default().with_seeding(Seeding::BasisVectors).with_seed(0);
        assert!(SieveSolver::with_params(params).solve(&lattice).is_err());
    }
}
