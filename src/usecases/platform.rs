use std::collections::BTreeMap;

use crate::domain::PlatformName;
use crate::error::{ReleaseDroidError, Result};
use crate::release::ReleaseMaker;
use crate::validation::RepositoryValidator;

/// A publish target: its readiness checks and its release action
pub struct Platform {
    name: PlatformName,
    validator: Box<dyn RepositoryValidator>,
    release_maker: Box<dyn ReleaseMaker>,
}

impl Platform {
    pub fn new(
        name: PlatformName,
        validator: Box<dyn RepositoryValidator>,
        release_maker: Box<dyn ReleaseMaker>,
    ) -> Self {
        Platform {
            name,
            validator,
            release_maker,
        }
    }

    pub fn name(&self) -> PlatformName {
        self.name
    }

    pub fn validator(&self) -> &dyn RepositoryValidator {
        self.validator.as_ref()
    }

    pub fn release_maker(&self) -> &dyn ReleaseMaker {
        self.release_maker.as_ref()
    }
}

/// Platforms keyed by name, iterated in platform order
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<PlatformName, Platform>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a platform, replacing any earlier one with the same name
    pub fn register(&mut self, platform: Platform) {
        self.platforms.insert(platform.name(), platform);
    }

    pub fn with(mut self, platform: Platform) -> Self {
        self.register(platform);
        self
    }

    pub fn get(&self, name: PlatformName) -> Result<&Platform> {
        self.platforms.get(&name).ok_or_else(|| {
            ReleaseDroidError::user_input(
                "E-RD-PL-2",
                format!("The platform {} is not available in this setup.", name),
            )
        })
    }

    /// Requested platforms in platform order, failing on the first unknown one
    pub fn select(&self, names: &[PlatformName]) -> Result<Vec<&Platform>> {
        let mut sorted = names.to_vec();
        sorted.sort();
        sorted.dedup();
        sorted.into_iter().map(|name| self.get(name)).collect()
    }
}
