use super::error::ConfigError;
use crate::events::engine::{AutoNavigator, EngineOptions};
use crate::flow::step::{step_position, FlowStep, Role, ServiceType, ALL_ROLES};
use crate::flow::store::FlowStore;
use crate::navigation::feedback::FeedbackChannel;
use crate::navigation::guard::{NavigationGuard, RestrictedDestinations, DENIAL_TITLE};
use crate::navigation::route::Router;
use crate::pager::{PagerAdapter, PagerConfig, PagerGroup};
use crate::registry::mapper::MapperOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperSettings {
    #[serde(default = "default_true")]
    pub fallback_to_default: bool,
    #[serde(default)]
    pub show_debug_info: bool,
}

impl Default for MapperSettings {
    fn default() -> Self {
        Self {
            fallback_to_default: true,
            show_debug_info: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSettings {
    #[serde(default = "default_denial_title")]
    pub denial_title: String,
    #[serde(default)]
    pub restricted_destinations: RestrictedDestinations,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            denial_title: default_denial_title(),
            restricted_destinations: RestrictedDestinations::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_denial_title() -> String {
    DENIAL_TITLE.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub mapper: MapperSettings,
    #[serde(default)]
    pub guard: GuardSettings,
    #[serde(default)]
    pub pager: PagerConfig,
    #[serde(default)]
    pub engine: EngineOptions,
}

impl FlowConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_yaml(&raw, &path.display().to_string())
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(raw, "<inline>")
    }

    fn parse_yaml(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn mapper_options(&self, role: Role) -> MapperOptions {
        let options = MapperOptions::for_role(role).with_debug_info(self.mapper.show_debug_info);
        if self.mapper.fallback_to_default {
            options
        } else {
            options.without_fallback()
        }
    }

    pub fn navigation_guard<R: Router, F: FeedbackChannel>(
        &self,
        flow: FlowStore,
        router: R,
        feedback: F,
    ) -> NavigationGuard<R, F> {
        NavigationGuard::new(flow, router, feedback)
            .with_restricted_destinations(self.guard.restricted_destinations.clone())
            .with_denial_title(&self.guard.denial_title)
    }

    pub fn auto_navigator(&self, flow: FlowStore) -> AutoNavigator {
        AutoNavigator::new(flow).with_options(self.engine.clone())
    }

    pub fn pager_adapter(&self, flow: FlowStore) -> PagerAdapter {
        PagerAdapter::new(flow, self.pager.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guard.denial_title.trim().is_empty() {
            return Err(ConfigError::Guard(
                "`denial_title` must be non-empty".to_string(),
            ));
        }
        for role in ALL_ROLES {
            for destination in self.guard.restricted_destinations.for_role(role) {
                if !destination.starts_with('/') {
                    return Err(ConfigError::Guard(format!(
                        "restricted destination `{destination}` for {role} must be an absolute path"
                    )));
                }
            }
        }

        let mut claimed: HashMap<(Role, ServiceType, FlowStep), usize> = HashMap::new();
        for (index, group) in self.pager.groups().iter().enumerate() {
            validate_pager_group(index, group)?;
            for step in &group.steps {
                if let Some(previous) = claimed.insert((group.role, group.service, *step), index) {
                    return Err(ConfigError::Pager(format!(
                        "step `{step}` appears in pager groups {previous} and {index}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_pager_group(index: usize, group: &PagerGroup) -> Result<(), ConfigError> {
    if group.steps.is_empty() {
        return Err(ConfigError::Pager(format!(
            "pager group {index} must list at least one step"
        )));
    }

    let mut positions = Vec::with_capacity(group.steps.len());
    for step in &group.steps {
        let Some(position) = step_position(group.role, group.service, *step) else {
            return Err(ConfigError::Pager(format!(
                "pager group {index} step `{step}` is not part of the {} {} flow",
                group.role, group.service
            )));
        };
        positions.push(position);
    }

    if positions.windows(2).any(|pair| pair[1] != pair[0] + 1) {
        return Err(ConfigError::Pager(format!(
            "pager group {index} steps must be consecutive in the {} {} flow",
            group.role, group.service
        )));
    }
    Ok(())
}
