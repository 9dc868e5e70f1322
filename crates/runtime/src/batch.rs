//! Parallel execution of independent battles.
//!
//! Battles in a batch share the read-only environment (skills, executors,
//! configuration) and one resolution cache, so plans computed by one worker
//! warm the others. Each battle is otherwise isolated: its own seed, its
//! own state, its own log.

use battle_core::{
    ActionProvider, BattleEnv, BattleError, BattleResult, CancelToken, HeroDefinition, Simulator,
};

/// One battle to run: its roster and its seed.
#[derive(Clone, Debug)]
pub struct BattleSpec {
    pub heroes: Vec<HeroDefinition>,
    pub seed: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// A worker thread stopped without reporting every result it took.
    #[error("worker terminated without reporting a result")]
    WorkerLost,
}

/// Runs batches of battles across a fixed-size worker pool.
pub struct BatchRunner {
    workers: usize,
}

impl BatchRunner {
    /// A runner with `workers` threads; zero is clamped to one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Runs every spec, returning per-battle results in submission order.
    ///
    /// The token is checked by each simulation at its round boundaries;
    /// cancelled battles complete as `BattleOutcome::Aborted` rather than
    /// vanishing from the output.
    pub fn run(
        &self,
        env: BattleEnv<'_>,
        specs: &[BattleSpec],
        provider: &dyn ActionProvider,
        cancel: &CancelToken,
    ) -> Result<Vec<Result<BattleResult, BattleError>>, BatchError> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &BattleSpec)>();
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(usize, Result<BattleResult, BattleError>)>();
        for job in specs.iter().enumerate() {
            // An unbounded channel only fails when disconnected, and both
            // ends are alive here.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let workers = self.workers.min(specs.len());
        std::thread::scope(|scope| {
            for worker in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancel = cancel.clone();
                scope.spawn(move || {
                    let simulator = Simulator::new(env);
                    while let Ok((index, spec)) = job_rx.recv() {
                        let span =
                            tracing::info_span!("battle", index, seed = spec.seed, worker);
                        let _guard = span.enter();
                        let result =
                            simulator.run(&spec.heroes, spec.seed, provider, Some(&cancel));
                        match &result {
                            Ok(result) => tracing::debug!(
                                outcome = ?result.outcome,
                                rounds = result.rounds,
                                "battle finished"
                            ),
                            Err(err) => tracing::warn!(%err, "battle aborted"),
                        }
                        if result_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let mut slots: Vec<Option<Result<BattleResult, BattleError>>> =
                (0..specs.len()).map(|_| None).collect();
            for _ in 0..specs.len() {
                let (index, result) = result_rx.recv().map_err(|_| BatchError::WorkerLost)?;
                slots[index] = Some(result);
            }

            let stats = env.cache.stats();
            tracing::info!(
                battles = specs.len(),
                cache_hits = stats.hits,
                cache_misses = stats.misses,
                cache_evictions = stats.evictions,
                "batch finished"
            );

            slots
                .into_iter()
                .map(|slot| slot.ok_or(BatchError::WorkerLost))
                .collect()
        })
    }
}
