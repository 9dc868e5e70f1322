//! Batch runner behavior: ordering, shared cache, cancellation, tracing.

use std::sync::{Arc, Mutex};

use battle_core::{
    AttributeSet, BattleEnv, BattleOutcome, CancelToken, ChainCast, EffectCategory, EngineConfig,
    HeroDefinition, HeroId, PcgRng, PluginRegistry, ResolutionCache, SideId, SkillBook,
    SkillDefinition, SkillId, SkillParams, TargetSelector,
};
use battle_runtime::{BatchRunner, BattleSpec, ScriptedProvider};

const STRIKE: SkillId = SkillId(1);

fn book() -> SkillBook {
    let mut book = SkillBook::new();
    book.insert(SkillDefinition {
        id: STRIKE,
        name: "Strike".into(),
        category: EffectCategory::Damage,
        attribute: None,
        levels: vec![SkillParams {
            magnitude: 20,
            chance: 100,
            ..Default::default()
        }],
    });
    book
}

fn roster(attacker_hp: u32) -> Vec<HeroDefinition> {
    [(1u32, 0u8, 9, attacker_hp), (2, 1, 1, 100)]
        .into_iter()
        .map(|(id, side, speed, hp)| HeroDefinition {
            id: HeroId(id),
            name: format!("hero-{id}"),
            side: SideId(side),
            level: 10,
            max_hp: hp,
            max_resource: 100,
            attributes: AttributeSet {
                attack: 100,
                speed,
                ..Default::default()
            },
            skills: vec![STRIKE],
        })
        .collect()
}

fn provider() -> ScriptedProvider {
    ScriptedProvider::new().with_repeating(
        HeroId(1),
        vec![ChainCast {
            skill: STRIKE,
            level: 1,
            target: TargetSelector::Enemy,
        }],
    )
}

/// Shared in-memory sink for formatted tracing output.
#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedOutput {
    type Writer = CapturedOutput;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

struct Fixture {
    config: EngineConfig,
    book: SkillBook,
    registry: PluginRegistry,
    cache: ResolutionCache,
    rng: PcgRng,
}

impl Fixture {
    fn new() -> Self {
        let config = EngineConfig::new();
        let cache = ResolutionCache::new(config.cache_capacity);
        Self {
            config,
            book: book(),
            registry: PluginRegistry::with_builtins(),
            cache,
            rng: PcgRng,
        }
    }

    fn env(&self) -> BattleEnv<'_> {
        BattleEnv::new(&self.config, &self.book, &self.registry, &self.cache, &self.rng)
    }
}

#[test]
fn results_come_back_in_submission_order() {
    let fixture = Fixture::new();
    let provider = provider();

    // Distinct attacker HP pools tag each battle.
    let specs: Vec<BattleSpec> = (0..8)
        .map(|i| BattleSpec {
            heroes: roster(500 + i),
            seed: i as u64,
        })
        .collect();

    let results = BatchRunner::new(3)
        .run(fixture.env(), &specs, &provider, &CancelToken::new())
        .unwrap();

    assert_eq!(results.len(), specs.len());
    for (i, result) in results.iter().enumerate() {
        let result = result.as_ref().unwrap();
        assert_eq!(result.heroes[0].max_hp, 500 + i as u32);
        assert_eq!(result.outcome, BattleOutcome::Victory { side: SideId(0) });
        assert_eq!(result.rounds, 5);
    }
}

#[test]
fn workers_share_one_plan_cache() {
    let fixture = Fixture::new();
    let provider = provider();

    let specs: Vec<BattleSpec> = (0..4)
        .map(|seed| BattleSpec {
            heroes: roster(1000),
            seed,
        })
        .collect();

    let results = BatchRunner::new(4)
        .run(fixture.env(), &specs, &provider, &CancelToken::new())
        .unwrap();
    assert!(results.iter().all(|r| r.is_ok()));

    // Four identical battles, five strikes each. Workers racing on a cold
    // cache may each compute the plan once, but never more than that.
    let stats = fixture.cache.stats();
    assert_eq!(stats.hits + stats.misses, 20);
    assert!(stats.misses <= specs.len() as u64);
    assert!(stats.hits >= 16);
}

#[test]
fn cancelled_batch_aborts_every_battle() {
    let fixture = Fixture::new();
    let provider = provider();
    let token = CancelToken::new();
    token.cancel();

    let specs: Vec<BattleSpec> = (0..3)
        .map(|seed| BattleSpec {
            heroes: roster(1000),
            seed,
        })
        .collect();

    let results = BatchRunner::new(2)
        .run(fixture.env(), &specs, &provider, &token)
        .unwrap();

    for result in results {
        let result = result.unwrap();
        assert_eq!(result.outcome, BattleOutcome::Aborted);
        assert_eq!(result.rounds, 0);
    }
}

#[test]
fn batch_summary_event_reports_cache_statistics() {
    let fixture = Fixture::new();
    let provider = provider();
    let specs: Vec<BattleSpec> = (0..2)
        .map(|seed| BattleSpec {
            heroes: roster(1000),
            seed,
        })
        .collect();

    let output = CapturedOutput::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(output.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();

    // The summary fires on the coordinating thread, where this subscriber
    // is the thread default.
    let results = tracing::subscriber::with_default(subscriber, || {
        BatchRunner::new(2).run(fixture.env(), &specs, &provider, &CancelToken::new())
    })
    .unwrap();
    assert!(results.iter().all(|r| r.is_ok()));

    let captured = output.contents();
    assert!(captured.contains("batch finished"));
    assert!(captured.contains("battles=2"));
    assert!(captured.contains("cache_hits="));
    assert!(captured.contains("cache_misses="));
}

#[test]
fn empty_batch_is_a_noop() {
    let fixture = Fixture::new();
    let results = BatchRunner::new(2)
        .run(fixture.env(), &[], &provider(), &CancelToken::new())
        .unwrap();
    assert!(results.is_empty());
}
