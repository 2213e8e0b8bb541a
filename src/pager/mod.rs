use crate::flow::state::FlowState;
use crate::flow::step::{FlowStep, Role, ServiceType};
use crate::flow::store::{FlowStore, ObserverId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroPhase {
    Booking,
    Tracking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerGroup {
    pub role: Role,
    pub service: ServiceType,
    pub phase: MacroPhase,
    pub steps: Vec<FlowStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagerConfig {
    groups: Vec<PagerGroup>,
}

fn group(role: Role, service: ServiceType, phase: MacroPhase, steps: &[FlowStep]) -> PagerGroup {
    PagerGroup {
        role,
        service,
        phase,
        steps: steps.to_vec(),
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        use FlowStep::*;
        use MacroPhase::*;
        use ServiceType::*;
        Self::new(vec![
            group(
                Role::Customer,
                Transport,
                Booking,
                &[TransportRoute, TransportVehicle, TransportConfirm],
            ),
            group(
                Role::Customer,
                Delivery,
                Booking,
                &[DeliveryPickup, DeliveryDropoff, DeliveryPackage],
            ),
            group(
                Role::Customer,
                Errand,
                Booking,
                &[ErrandDescription, ErrandLocations, ErrandBudget],
            ),
            group(
                Role::Customer,
                Parcel,
                Booking,
                &[ParcelSender, ParcelRecipient, ParcelDimensions],
            ),
            group(
                Role::Driver,
                Transport,
                Tracking,
                &[
                    DriverTransportEnRoute,
                    DriverTransportAtPickup,
                    DriverTransportInProgress,
                ],
            ),
            group(
                Role::Driver,
                Delivery,
                Tracking,
                &[
                    DriverDeliveryEnRoute,
                    DriverDeliveryAtPickup,
                    DriverDeliveryInProgress,
                ],
            ),
            group(
                Role::Driver,
                Errand,
                Tracking,
                &[
                    DriverErrandEnRoute,
                    DriverErrandAtPickup,
                    DriverErrandInProgress,
                ],
            ),
            group(
                Role::Driver,
                Parcel,
                Tracking,
                &[
                    DriverParcelEnRoute,
                    DriverParcelAtPickup,
                    DriverParcelInProgress,
                ],
            ),
        ])
    }
}

impl PagerConfig {
    pub fn new(groups: Vec<PagerGroup>) -> Self {
        Self { groups }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn groups(&self) -> &[PagerGroup] {
        &self.groups
    }

    pub fn group_for(
        &self,
        role: Role,
        service: Option<ServiceType>,
        step: FlowStep,
    ) -> Option<&PagerGroup> {
        let service = service?;
        self.groups.iter().find(|group| {
            group.role == role && group.service == service && group.steps.contains(&step)
        })
    }

    pub fn configured_steps(
        &self,
        role: Role,
        service: Option<ServiceType>,
        step: FlowStep,
    ) -> &[FlowStep] {
        self.group_for(role, service, step)
            .map(|group| group.steps.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagerWindow {
    pub steps: Vec<FlowStep>,
    pub current_page_index: f64,
    pub should_use_pager: bool,
}

impl PagerWindow {
    pub fn closed() -> Self {
        Self {
            steps: Vec::new(),
            current_page_index: 0.0,
            should_use_pager: false,
        }
    }
}

pub fn compute_pager_window(
    config: &PagerConfig,
    state: &FlowState,
    previous_index: f64,
) -> PagerWindow {
    let steps = config
        .configured_steps(state.role(), state.service(), state.step())
        .to_vec();
    let current_page_index = steps
        .iter()
        .position(|step| *step == state.step())
        .map(|index| index as f64)
        .unwrap_or(previous_index);
    PagerWindow {
        should_use_pager: !steps.is_empty(),
        steps,
        current_page_index,
    }
}

#[derive(Debug)]
struct PagerView {
    window: PagerWindow,
    is_transitioning: bool,
    last_step: FlowStep,
}

impl PagerView {
    fn sync(&mut self, config: &PagerConfig, state: &FlowState) {
        if state.step() != self.last_step {
            // An external step change while animating snaps to the new page.
            self.is_transitioning = false;
            self.last_step = state.step();
        }
        self.window = compute_pager_window(config, state, self.window.current_page_index);
    }
}

#[derive(Debug)]
pub struct PagerAdapter {
    flow: FlowStore,
    config: Rc<PagerConfig>,
    view: Rc<RefCell<PagerView>>,
    observer: ObserverId,
}

impl PagerAdapter {
    pub fn new(flow: FlowStore, config: PagerConfig) -> Self {
        let config = Rc::new(config);
        let view = flow.with_state(|state| PagerView {
            window: compute_pager_window(&config, state, 0.0),
            is_transitioning: false,
            last_step: state.step(),
        });
        let view = Rc::new(RefCell::new(view));

        let weak: Weak<RefCell<PagerView>> = Rc::downgrade(&view);
        let observed = Rc::clone(&config);
        let observer = flow.subscribe(move |state| {
            if let Some(view) = weak.upgrade() {
                view.borrow_mut().sync(&observed, state);
            }
        });

        Self {
            flow,
            config,
            view,
            observer,
        }
    }

    pub fn window(&self) -> PagerWindow {
        self.view.borrow().window.clone()
    }

    pub fn pager_steps(&self) -> Vec<FlowStep> {
        self.view.borrow().window.steps.clone()
    }

    pub fn should_use_pager(&self) -> bool {
        self.view.borrow().window.should_use_pager
    }

    pub fn current_page_index(&self) -> f64 {
        self.view.borrow().window.current_page_index
    }

    pub fn current_page(&self) -> Option<usize> {
        let view = self.view.borrow();
        let index = view.window.current_page_index;
        if !view.window.should_use_pager || !index.is_finite() || index < 0.0 || index.fract() != 0.0
        {
            return None;
        }
        let index = index as usize;
        (index < view.window.steps.len()).then_some(index)
    }

    pub fn total_pages(&self) -> usize {
        self.view.borrow().window.steps.len()
    }

    pub fn is_transitioning(&self) -> bool {
        self.view.borrow().is_transitioning
    }

    pub fn go_to_pager_step(&self, step: Option<FlowStep>) {
        let Some(step) = step else {
            return;
        };
        let before = self.current_page_index();
        self.flow.set_step(step);
        let mut view = self.view.borrow_mut();
        self.flow.with_state(|state| view.sync(&self.config, state));
        let after = view.window.current_page_index;
        view.is_transitioning = view.window.should_use_pager && after != before;
    }

    pub fn go_to_pager_token(&self, raw: &str) {
        match FlowStep::parse(raw) {
            Ok(step) => self.go_to_pager_step(Some(step)),
            Err(err) => tracing::debug!(token = raw, error = %err, "ignoring pager step token"),
        }
    }

    pub fn set_current_page_index(&self, index: f64) {
        self.view.borrow_mut().window.current_page_index = index;
    }

    pub fn finish_transition(&self) {
        self.view.borrow_mut().is_transitioning = false;
    }
}

impl Drop for PagerAdapter {
    fn drop(&mut self) {
        self.flow.unsubscribe(self.observer);
    }
}
