pub mod mapper;

use crate::flow::state::FlowState;
use crate::flow::step::{FlowStep, Role, ALL_FLOW_STEPS};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

pub use mapper::{create_mapper, resolve_step, MapperOptions};

pub type RenderFactory<V> = Rc<dyn Fn(&FlowState) -> V>;

pub fn render_factory<V>(render: impl Fn(&FlowState) -> V + 'static) -> RenderFactory<V> {
    Rc::new(render)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requires_active_service: bool,
}

impl StepMetadata {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }
}

pub struct RegistryEntry<V> {
    pub step: FlowStep,
    pub role: Role,
    pub render_factory: RenderFactory<V>,
    pub metadata: StepMetadata,
}

impl<V> Clone for RegistryEntry<V> {
    fn clone(&self) -> Self {
        Self {
            step: self.step,
            role: self.role,
            render_factory: Rc::clone(&self.render_factory),
            metadata: self.metadata.clone(),
        }
    }
}

impl<V> std::fmt::Debug for RegistryEntry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("step", &self.step)
            .field("role", &self.role)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

struct DefaultEntry<V> {
    render_factory: RenderFactory<V>,
    metadata: StepMetadata,
}

pub struct ResolvedEntry<'a, V> {
    pub render_factory: &'a RenderFactory<V>,
    pub metadata: &'a StepMetadata,
    pub is_default: bool,
}

impl<V> Clone for ResolvedEntry<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ResolvedEntry<'_, V> {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_steps: usize,
    pub total_components: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("step `{step}` is already registered for role `{role}`")]
    DuplicateRegistration { step: FlowStep, role: Role },
    #[error("{} registration(s) were silently overwritten: {}", .keys.len(), describe_keys(.keys))]
    OverwrittenRegistrations { keys: Vec<(FlowStep, Role)> },
}

fn describe_keys(keys: &[(FlowStep, Role)]) -> String {
    keys.iter()
        .map(|(step, role)| format!("{role}/{step}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct StepRegistry<V> {
    entries: HashMap<(FlowStep, Role), RegistryEntry<V>>,
    default: Option<DefaultEntry<V>>,
    overwritten: Vec<(FlowStep, Role)>,
}

impl<V> Default for StepRegistry<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            default: None,
            overwritten: Vec::new(),
        }
    }
}

impl<V> std::fmt::Debug for StepRegistry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("entries", &self.entries.len())
            .field("has_default", &self.default.is_some())
            .field("overwritten", &self.overwritten)
            .finish()
    }
}

impl<V> StepRegistry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        step: FlowStep,
        role: Role,
        render_factory: RenderFactory<V>,
        metadata: StepMetadata,
    ) -> Option<RegistryEntry<V>> {
        let previous = self.entries.insert(
            (step, role),
            RegistryEntry {
                step,
                role,
                render_factory,
                metadata,
            },
        );
        if previous.is_some() {
            tracing::warn!(step = %step, role = %role, "step registration overwritten");
            self.overwritten.push((step, role));
        }
        previous
    }

    pub fn register_unique(
        &mut self,
        step: FlowStep,
        role: Role,
        render_factory: RenderFactory<V>,
        metadata: StepMetadata,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(&(step, role)) {
            return Err(RegistryError::DuplicateRegistration { step, role });
        }
        self.register(step, role, render_factory, metadata);
        Ok(())
    }

    pub fn set_default(&mut self, render_factory: RenderFactory<V>, metadata: StepMetadata) {
        self.default = Some(DefaultEntry {
            render_factory,
            metadata,
        });
    }

    pub fn clear_default(&mut self) {
        self.default = None;
    }

    pub fn get(&self, step: FlowStep, role: Role) -> Option<ResolvedEntry<'_, V>> {
        if let Some(entry) = self.entries.get(&(step, role)) {
            return Some(ResolvedEntry {
                render_factory: &entry.render_factory,
                metadata: &entry.metadata,
                is_default: false,
            });
        }
        self.default.as_ref().map(|fallback| ResolvedEntry {
            render_factory: &fallback.render_factory,
            metadata: &fallback.metadata,
            is_default: true,
        })
    }

    pub fn get_exact(&self, step: FlowStep, role: Role) -> Option<&RegistryEntry<V>> {
        self.entries.get(&(step, role))
    }

    pub fn default_factory(&self) -> Option<&RenderFactory<V>> {
        self.default.as_ref().map(|fallback| &fallback.render_factory)
    }

    pub fn registered_steps(&self) -> Vec<FlowStep> {
        self.entries
            .keys()
            .map(|(step, _)| *step)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_steps: self.registered_steps().len(),
            total_components: self.entries.len(),
        }
    }

    pub fn missing_steps(&self, role: Role) -> Vec<FlowStep> {
        ALL_FLOW_STEPS
            .iter()
            .copied()
            .filter(|step| step.belongs_to(role))
            .filter(|step| !self.entries.contains_key(&(*step, role)))
            .collect()
    }

    pub fn overwritten_keys(&self) -> &[(FlowStep, Role)] {
        &self.overwritten
    }

    pub fn verify_no_overwrites(&self) -> Result<(), RegistryError> {
        if self.overwritten.is_empty() {
            return Ok(());
        }
        Err(RegistryError::OverwrittenRegistrations {
            keys: self.overwritten.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.default = None;
        self.overwritten.clear();
    }
}
