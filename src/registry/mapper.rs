use crate::flow::step::{FlowStep, Role};
use crate::registry::{RenderFactory, StepRegistry};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperOptions {
    pub role: Role,
    #[serde(default = "default_true")]
    pub fallback_to_default: bool,
    #[serde(default)]
    pub show_debug_info: bool,
}

fn default_true() -> bool {
    true
}

impl MapperOptions {
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            fallback_to_default: true,
            show_debug_info: false,
        }
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback_to_default = false;
        self
    }

    pub fn with_debug_info(mut self, show_debug_info: bool) -> Self {
        self.show_debug_info = show_debug_info;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Exact,
    Default,
    Missing,
}

impl Resolution {
    fn as_str(self) -> &'static str {
        match self {
            Resolution::Exact => "exact",
            Resolution::Default => "default",
            Resolution::Missing => "missing",
        }
    }
}

pub fn resolve_step<V>(
    registry: &StepRegistry<V>,
    options: MapperOptions,
    step: FlowStep,
) -> Option<RenderFactory<V>> {
    let (resolution, factory) = match registry.get_exact(step, options.role) {
        Some(entry) => (Resolution::Exact, Some(Rc::clone(&entry.render_factory))),
        None => match registry.default_factory() {
            Some(fallback) if options.fallback_to_default => {
                (Resolution::Default, Some(Rc::clone(fallback)))
            }
            _ => (Resolution::Missing, None),
        },
    };

    if options.show_debug_info {
        tracing::debug!(
            step = %step,
            role = %options.role,
            fallback_to_default = options.fallback_to_default,
            resolution = resolution.as_str(),
            "step component mapping"
        );
    }
    factory
}

pub fn create_mapper<V>(
    registry: &StepRegistry<V>,
    options: MapperOptions,
) -> impl Fn(FlowStep) -> Option<RenderFactory<V>> + '_ {
    move |step| resolve_step(registry, options, step)
}
