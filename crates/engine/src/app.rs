//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use branchwright_domain::{BranchSettings, DeviationConfig};

use crate::infrastructure::{
    clock::{SeededRandom, SystemClock, SystemRandom},
    memory_branch_repo::InMemoryBranchRepo,
    ports::{BranchRepo, ClockPort, ProsePort, RandomPort},
    prose::TemplateProse,
    resilient_prose::{ResilientProse, RetryConfig},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the settings the app was built from and every use case, wired to
/// one set of ports.
pub struct App {
    pub settings: BranchSettings,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub generation: use_cases::VariationGenerator,
    pub review: use_cases::ReviewPipeline,
    pub refinement: use_cases::RefinementLoop,
    pub comparison: use_cases::BranchComparator,
    pub branches: use_cases::BranchUseCases,
}

/// Ports the use cases are built on.
pub struct Ports {
    pub branch_repo: Arc<dyn BranchRepo>,
    pub prose: Arc<dyn ProsePort>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

impl Ports {
    /// Offline adapters: in-memory storage and template prose with retry.
    ///
    /// A configured seed makes generation reproducible.
    pub fn offline(settings: &BranchSettings) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let random: Arc<dyn RandomPort> = match settings.rng_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(SystemRandom::new()),
        };
        let prose: Arc<dyn ProsePort> = Arc::new(ResilientProse::new(
            Arc::new(TemplateProse::new()),
            RetryConfig::from_settings(settings),
        ));
        Self {
            branch_repo: Arc::new(InMemoryBranchRepo::new(clock.clone())),
            prose,
            clock,
            random,
        }
    }
}

impl App {
    pub fn new(settings: BranchSettings) -> Self {
        let ports = Ports::offline(&settings);
        Self::with_ports(settings, ports)
    }

    /// Create an App with all dependencies wired up.
    pub fn with_ports(settings: BranchSettings, ports: Ports) -> Self {
        let refinement = use_cases::RefinementLoop::new(
            ports.prose,
            ports.clock,
            ports.random.clone(),
            settings.refinement_options(),
        )
        .with_refiner_timeout(Duration::from_millis(settings.refiner_timeout_ms));

        tracing::debug!(
            seeded = settings.rng_seed.is_some(),
            max_iterations = settings.max_iterations,
            strictness = %settings.default_strictness,
            "Composed application"
        );

        Self {
            use_cases: UseCases {
                generation: use_cases::VariationGenerator::new(ports.random.clone()),
                review: use_cases::ReviewPipeline::new(ports.random),
                refinement,
                comparison: use_cases::BranchComparator::new(),
                branches: use_cases::BranchUseCases::new(ports.branch_repo),
            },
            settings,
        }
    }

    /// Deviation config at the configured default strictness.
    pub fn deviation_config(&self) -> DeviationConfig {
        DeviationConfig::with_level(self.settings.default_strictness)
    }
}
