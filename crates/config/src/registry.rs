//! Compiles the raw YAML shapes into immutable, process-wide views.
//!
//! Loaded once behind `once_cell::sync::OnceCell`: the first caller pays
//! parse cost, every later caller gets a shared `&'static` reference. The
//! compiled intent registry, alias index and planning contract table are
//! immutable after warmup and shared read-only — there is no runtime
//! mutation path; reloading means restarting the process.

use crate::error::ConfigError;
use crate::execution::IntentExecutionFile;
use crate::signals::IntentSignalFile;
use booking_core::Intent;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashMap;

const DEFAULT_EXECUTION_YAML: &str = include_str!("../resources/intent_execution.yaml");
const DEFAULT_SIGNALS_YAML: &str = include_str!("../resources/intent_signals.yaml");

/// Compiled commit + fallback plan for one intent.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub commit_action: String,
    pub fallbacks: Vec<CompiledFallback>,
}

#[derive(Debug, Clone)]
pub struct CompiledFallback {
    pub action: String,
    pub when_missing_any_of: Vec<String>,
}

/// A compiled `any`/`all`/`ordered` signal match for one intent. `any`
/// phrases are compiled to word-boundary regexes once at load time so a
/// per-turn match is just a scan of pre-built patterns.
#[derive(Debug, Clone)]
pub struct CompiledSignals {
    pub any: Vec<Regex>,
    pub all: Vec<Vec<String>>,
    pub ordered: Vec<Vec<String>>,
    pub required_slots: Vec<String>,
    pub intent_defining_slots: Vec<String>,
    pub is_booking: bool,
}

impl CompiledSignals {
    /// `ordered` semantics: all tokens present, in order, not necessarily
    /// contiguous.
    pub fn matches_ordered(&self, normalized: &str) -> bool {
        let words: Vec<&str> = normalized.split_whitespace().collect();
        self.ordered.iter().any(|seq| {
            let mut cursor = 0;
            seq.iter().all(|tok| {
                if let Some(pos) = words[cursor..].iter().position(|w| w == tok) {
                    cursor += pos + 1;
                    true
                } else {
                    false
                }
            })
        })
    }

    /// `all` semantics: every token in the set is present somewhere.
    pub fn matches_all(&self, normalized: &str) -> bool {
        let words: std::collections::HashSet<&str> = normalized.split_whitespace().collect();
        self.all.iter().any(|set| set.iter().all(|tok| words.contains(tok.as_str())))
    }

    /// `any` semantics: a whole-word phrase match.
    pub fn matches_any(&self, normalized: &str) -> bool {
        self.any.iter().any(|re| re.is_match(normalized))
    }

    pub fn matches(&self, normalized: &str) -> bool {
        self.matches_any(normalized) || self.matches_all(normalized) || self.matches_ordered(normalized)
    }
}

/// The compiled, process-wide intent registry.
pub struct IntentRegistry {
    execution: HashMap<Intent, ExecutionPlan>,
    signals: HashMap<Intent, CompiledSignals>,
}

impl IntentRegistry {
    fn compile(
        execution_yaml: &str,
        signals_yaml: &str,
    ) -> Result<IntentRegistry, ConfigError> {
        let execution_file: IntentExecutionFile =
            serde_yaml::from_str(execution_yaml).map_err(|source| ConfigError::Parse {
                file: "intent_execution.yaml",
                source,
            })?;
        let signals_file: IntentSignalFile =
            serde_yaml::from_str(signals_yaml).map_err(|source| ConfigError::Parse {
                file: "intent_signals.yaml",
                source,
            })?;

        let mut execution = HashMap::new();
        for (name, cfg) in execution_file.intents {
            let intent = Intent::parse(&name);
            execution.insert(
                intent,
                ExecutionPlan {
                    commit_action: cfg.commit.action,
                    fallbacks: cfg
                        .fallbacks
                        .into_iter()
                        .map(|f| CompiledFallback {
                            action: f.action,
                            when_missing_any_of: f.when_missing.any_of,
                        })
                        .collect(),
                },
            );
        }

        let mut signals = HashMap::new();
        for (name, entry) in signals_file.intents {
            let intent = Intent::parse(&name);
            let any = entry
                .signals
                .any
                .iter()
                .map(|phrase| {
                    let escaped = regex::escape(phrase);
                    Regex::new(&format!(r"\b{escaped}\b")).expect("phrase regex always compiles")
                })
                .collect();
            signals.insert(
                intent,
                CompiledSignals {
                    any,
                    all: entry.signals.all,
                    ordered: entry.signals.ordered,
                    required_slots: entry.required_slots,
                    intent_defining_slots: entry.intent_defining_slots,
                    is_booking: entry.is_booking,
                },
            );
        }

        Ok(IntentRegistry { execution, signals })
    }

    pub fn execution_plan(&self, intent: Intent) -> Option<&ExecutionPlan> {
        self.execution.get(&intent)
    }

    pub fn signals_for(&self, intent: Intent) -> Option<&CompiledSignals> {
        self.signals.get(&intent)
    }

    /// Iterate non-booking intents in `Intent::SIGNAL_PRIORITY` order,
    /// paired with their compiled signals.
    pub fn signal_priority_entries(&self) -> impl Iterator<Item = (Intent, &CompiledSignals)> {
        Intent::SIGNAL_PRIORITY
            .iter()
            .filter_map(move |intent| self.signals.get(intent).map(|s| (*intent, s)))
    }
}

static REGISTRY: OnceCell<IntentRegistry> = OnceCell::new();

/// Returns the process-wide compiled registry, compiling the embedded
/// default YAML on first call. Single-flight lazy-init (`once_cell` +
/// internal immutability, no `RwLock` needed since there is no runtime
/// mutation path).
pub fn registry() -> &'static IntentRegistry {
    REGISTRY.get_or_init(|| {
        IntentRegistry::compile(DEFAULT_EXECUTION_YAML, DEFAULT_SIGNALS_YAML)
            .expect("embedded default intent config must parse")
    })
}
