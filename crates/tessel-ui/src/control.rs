//! Control delegation: which widget receives the input of a device.
//!
//! Control is granted on two tiers. The sheet-wide [`ControlSwitch`] keeps,
//! per device, a stack of grants; the top entry receives the device's events
//! before any spatial routing happens, and yielding pops back to the entry
//! below. When the switch declines a request (a modal grant is active and
//! the requester lies outside the modal receiver), the requesting widget
//! keeps a local [`ControlGraph`] instead, consulted whenever routing passes
//! through it. A widget is on at most one tier at a time.

use tessel_core::alloc::HashMap;
use tessel_input::DeviceType;

use crate::error::UiResult;
use crate::sheet::RootSheet;
use crate::state::WidgetState;
use crate::widget::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    /// Events of the device go straight to the receiver.
    Control,
    /// Events of the device are routed within the receiver's subtree only.
    Modal,
}

impl ControlMode {
    pub fn is_modal(self) -> bool {
        self == ControlMode::Modal
    }
}

/// Which authority a widget's control grants live with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlTier {
    #[default]
    None,
    /// Granted by the sheet's control switch.
    Global,
    /// Held in the widget's own control graph.
    LocalChain,
}

fn device_matches(granted: DeviceType, device: DeviceType) -> bool {
    granted == device || device.fallback() == Some(granted)
}

/// One link of a local delegation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlNode {
    pub receiver: WidgetId,
    /// The link created before this one.
    pub parent: Option<usize>,
    pub mode: ControlMode,
    pub device: DeviceType,
}

/// Local delegation chain of a widget. The newest link is the head.
#[derive(Debug, Clone, Default)]
pub struct ControlGraph {
    nodes: Vec<ControlNode>,
}

impl ControlGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link on top of the chain.
    pub fn push(&mut self, receiver: WidgetId, mode: ControlMode, device: DeviceType) {
        let parent = self.nodes.len().checked_sub(1);
        self.nodes.push(ControlNode {
            receiver,
            parent,
            mode,
            device,
        });
    }

    pub fn head(&self) -> Option<&ControlNode> {
        self.nodes.last()
    }

    /// Links from the head back to the first one.
    pub fn chain(&self) -> impl Iterator<Item = &ControlNode> {
        let mut next = self.nodes.len().checked_sub(1);
        std::iter::from_fn(move || {
            let node = self.nodes.get(next?)?;
            next = node.parent;
            Some(node)
        })
    }

    /// Newest link granted for `device` (button devices also match a mouse grant).
    pub fn find(&self, device: DeviceType) -> Option<&ControlNode> {
        self.chain().find(|node| device_matches(node.device, device))
    }

    pub fn receivers(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.nodes.iter().map(|node| node.receiver)
    }

    /// Drop every link to `receiver`. Returns whether any was dropped.
    pub(crate) fn remove_receiver(&mut self, receiver: WidgetId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.receiver != receiver);
        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.parent = index.checked_sub(1);
        }
        self.nodes.len() != before
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A grant held in the control switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEntry {
    pub owner: WidgetId,
    pub receiver: WidgetId,
    pub mode: ControlMode,
}

/// Sheet-wide arbiter of device control.
#[derive(Debug, Default)]
pub struct ControlSwitch {
    stacks: HashMap<DeviceType, Vec<ControlEntry>>,
}

impl ControlSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    fn top(&self, device: DeviceType) -> Option<&ControlEntry> {
        self.stacks.get(&device).and_then(|stack| stack.last())
    }

    fn stack(&self, device: DeviceType) -> impl Iterator<Item = &ControlEntry> {
        self.stacks.get(&device).into_iter().flatten()
    }

    /// Current grant for `device`; button devices fall back to the mouse.
    pub fn controller(&self, device: DeviceType) -> Option<&ControlEntry> {
        self.top(device)
            .or_else(|| device.fallback().and_then(|fallback| self.top(fallback)))
    }

    /// Grant `device` to `receiver` on behalf of `owner`.
    ///
    /// Declined while any modal grant for the device is still stacked and
    /// `owner` is neither its owner nor inside its receiver, as told by
    /// `within(owner, receiver)`. Grants stacked above a modal one do not
    /// lift it.
    pub fn take_control(
        &mut self,
        owner: WidgetId,
        receiver: WidgetId,
        mode: ControlMode,
        device: DeviceType,
        within: impl Fn(WidgetId, WidgetId) -> bool,
    ) -> bool {
        let blocking = self
            .stack(device)
            .chain(device.fallback().into_iter().flat_map(|fallback| self.stack(fallback)))
            .find(|entry| entry.mode.is_modal() && entry.owner != owner && !within(owner, entry.receiver));
        if let Some(modal) = blocking {
            tracing::debug!(
                "control of {:?} for {} declined: modal grant held by {}",
                device,
                owner,
                modal.owner
            );
            return false;
        }

        self.stacks.entry(device).or_default().push(ControlEntry {
            owner,
            receiver,
            mode,
        });
        true
    }

    /// Remove every grant owned by or received by `id`; control yields back
    /// to the entries below. Returns the removed grants.
    pub fn yield_control(&mut self, id: WidgetId) -> Vec<ControlEntry> {
        self.remove_where(|entry| entry.owner == id || entry.receiver == id)
    }

    /// Remove the grants owned by `owner` only.
    pub fn withdraw(&mut self, owner: WidgetId) -> Vec<ControlEntry> {
        self.remove_where(|entry| entry.owner == owner)
    }

    fn remove_where(&mut self, remove: impl Fn(&ControlEntry) -> bool) -> Vec<ControlEntry> {
        let mut removed = Vec::new();
        for stack in self.stacks.values_mut() {
            stack.retain(|entry| {
                if remove(entry) {
                    removed.push(*entry);
                    false
                } else {
                    true
                }
            });
        }
        self.stacks.retain(|_, stack| !stack.is_empty());
        removed
    }

    /// `Some(modal)` if `id` owns the top grant of at least one device;
    /// `modal` tells whether any of those grants is modal.
    pub fn controls_of(&self, id: WidgetId) -> Option<bool> {
        self.stacks
            .values()
            .filter_map(|stack| stack.last())
            .filter(|entry| entry.owner == id)
            .map(|entry| entry.mode.is_modal())
            .reduce(|a, b| a || b)
    }

    /// Owners of the top grant of each device.
    pub fn controllers(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.stacks
            .values()
            .filter_map(|stack| stack.last())
            .map(|entry| entry.owner)
    }

    pub fn owns_any(&self, owner: WidgetId) -> bool {
        self.stacks
            .values()
            .flatten()
            .any(|entry| entry.owner == owner)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

impl RootSheet {
    /// Make `id` the widget keyboard routing starts from.
    pub fn make_active(&mut self, id: WidgetId) -> UiResult<()> {
        self.alive(id)?;
        if let Some(previous) = self.active.replace(id)
            && previous != id
            && self.contains_widget(previous)
        {
            self.disable_state(previous, WidgetState::ACTIVE)?;
        }
        self.enable_state(id, WidgetState::ACTIVE)
    }

    /// Hand control of `device` from `owner` to `receiver`.
    ///
    /// The switch is asked first; if it declines, the grant is recorded in
    /// the owner's local control graph, on top of any earlier local grant.
    pub fn give_control(
        &mut self,
        owner: WidgetId,
        receiver: WidgetId,
        mode: ControlMode,
        device: DeviceType,
    ) -> UiResult<ControlTier> {
        self.alive(owner)?;
        self.alive(receiver)?;

        let widgets = &self.widgets;
        let granted = self
            .switch
            .take_control(owner, receiver, mode, device, |id, ancestor| {
                Self::is_within(widgets, id, ancestor)
            });

        let tier = if granted {
            let widget = self.alive_mut(owner)?;
            if widget.control_graph.take().is_some() {
                tracing::debug!("{} left its local control chain for a global grant", owner);
            }
            widget.tier = ControlTier::Global;
            ControlTier::Global
        } else {
            if self.alive(owner)?.tier == ControlTier::Global {
                let withdrawn = self.switch.withdraw(owner);
                for entry in withdrawn {
                    self.restore_control_parent(entry.receiver, entry.owner);
                }
            }
            let widget = self.alive_mut(owner)?;
            widget
                .control_graph
                .get_or_insert_with(ControlGraph::new)
                .push(receiver, mode, device);
            widget.tier = ControlTier::LocalChain;
            ControlTier::LocalChain
        };

        if receiver != owner {
            self.alive_mut(receiver)?.control_parent = Some(owner);
        }

        tracing::debug!(
            "{} gave {:?} control of {:?} to {} ({:?})",
            owner,
            mode,
            device,
            receiver,
            tier
        );
        self.sync_control_states();
        Ok(tier)
    }

    /// Make `id` the receiver of `device`.
    pub fn take_control(
        &mut self,
        id: WidgetId,
        mode: ControlMode,
        device: DeviceType,
    ) -> UiResult<ControlTier> {
        self.give_control(id, id, mode, device)
    }

    /// Give up every grant `id` owns or receives, in the switch and locally.
    pub fn yield_control(&mut self, id: WidgetId) -> UiResult<()> {
        let widget = self.alive_mut(id)?;
        widget.control_parent = widget.parent;
        let graph = widget.control_graph.take();
        widget.tier = ControlTier::None;

        for entry in self.switch.yield_control(id) {
            self.restore_control_parent(entry.receiver, entry.owner);
        }
        if let Some(graph) = graph {
            for receiver in graph.receivers() {
                self.restore_control_parent(receiver, id);
            }
        }

        tracing::debug!("{} yielded control", id);
        self.sync_control_states();
        Ok(())
    }

    /// Set `CONTROL`, and `MODAL` if `modal`.
    pub fn control(&mut self, id: WidgetId, modal: bool) -> UiResult<()> {
        self.enable_state(id, WidgetState::CONTROL)?;
        if modal {
            self.enable_state(id, WidgetState::MODAL)?;
        }
        Ok(())
    }

    /// Clear `CONTROL`, and `MODAL` if `modal`.
    pub fn uncontrol(&mut self, id: WidgetId, modal: bool) -> UiResult<()> {
        self.disable_state(id, WidgetState::CONTROL)?;
        if modal {
            self.disable_state(id, WidgetState::MODAL)?;
        }
        Ok(())
    }

    pub fn control_tier(&self, id: WidgetId) -> UiResult<ControlTier> {
        Ok(self.alive(id)?.tier)
    }

    pub fn control_graph(&self, id: WidgetId) -> UiResult<Option<&ControlGraph>> {
        Ok(self.alive(id)?.control_graph.as_ref())
    }

    /// A receiver that bubbled to `owner` bubbles to its tree parent again.
    fn restore_control_parent(&mut self, receiver: WidgetId, owner: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&receiver)
            && widget.control_parent == Some(owner)
            && receiver != owner
        {
            widget.control_parent = widget.parent;
        }
    }

    /// Bring `CONTROL`/`MODAL` flags and tiers in line with the switch.
    pub(crate) fn sync_control_states(&mut self) {
        let mut candidates: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|w| {
                w.is_alive()
                    && (w.state.intersects(WidgetState::CONTROL | WidgetState::MODAL)
                        || w.tier == ControlTier::Global)
            })
            .map(|w| w.id())
            .collect();
        candidates.extend(self.switch.controllers());
        candidates.sort_unstable();
        candidates.dedup();

        for id in candidates {
            if !self.contains_widget(id) {
                continue;
            }

            let result = match self.switch.controls_of(id) {
                Some(modal) => self.control(id, modal).and_then(|_| {
                    if modal {
                        Ok(())
                    } else {
                        self.disable_state(id, WidgetState::MODAL)
                    }
                }),
                None => self.uncontrol(id, true),
            };
            if let Err(err) = result {
                tracing::warn!("failed to sync control state of {}: {}", id, err);
            }

            let owns_grant = self.switch.owns_any(id);
            if let Some(widget) = self.widgets.get_mut(&id)
                && widget.tier == ControlTier::Global
                && !owns_grant
            {
                widget.tier = if widget.control_graph.is_some() {
                    ControlTier::LocalChain
                } else {
                    ControlTier::None
                };
            }
        }
    }

    /// Drop `id` from the switch and from every local chain.
    pub(crate) fn release_controls(&mut self, id: WidgetId) {
        for entry in self.switch.yield_control(id) {
            self.restore_control_parent(entry.receiver, entry.owner);
        }

        for widget in self.widgets.values_mut() {
            if widget.control_parent == Some(id) && widget.id() != id {
                widget.control_parent = widget.parent.filter(|parent| *parent != id);
            }
            let emptied = widget
                .control_graph
                .as_mut()
                .is_some_and(|graph| graph.remove_receiver(id) && graph.is_empty());
            if emptied {
                widget.control_graph = None;
                if widget.tier == ControlTier::LocalChain {
                    widget.tier = ControlTier::None;
                }
            }
        }

        if self.active == Some(id) {
            self.active = None;
        }
        self.sync_control_states();
    }
}
