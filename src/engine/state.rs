//! Lifecycle flags and the triggers that fire when they change.
//!
//! [`ControlStateManager`] tracks a small set of [`ControlState`] flags. Triggers are
//! registered with a mask of flags that must be set and a mask of flags that must be clear;
//! whenever a call to [`set_state`](ControlStateManager::set_state) or
//! [`clear_state`](ControlStateManager::clear_state) changes a flag a trigger cares about and
//! the new state satisfies both masks, the trigger runs. Triggers run in registration order,
//! at most once per call.
//!
//! Triggers receive a mutable context `C` (the navigation engine for the web view) instead of
//! capturing it, so the manager can live next to the context it drives.
//!
//! The manager is not synchronized and is meant to be driven from the owner thread only.

use bitflags::bitflags;

bitflags! {
    /// Lifecycle flags of a web view control.
    pub struct ControlState: u8 {
        /// The control is part of a live visual tree
        const LOADED    = 0b001;
        /// The template is applied and a browser engine is attached
        const TEMPLATED = 0b010;
        /// The control has been measured
        const SIZED     = 0b100;

        /// Flags required before the navigation engine is allowed to act
        const READY = Self::LOADED.bits | Self::TEMPLATED.bits;
    }
}

/// Releases a scoped resource obtained from a subscription factory.
pub type Disposer<C> = Box<dyn FnOnce(&mut C)>;

enum TriggerAction<C> {
    Invoke(Box<dyn FnMut(&mut C)>),
    Acquire {
        slot: usize,
        factory: Box<dyn FnMut(&mut C) -> Option<Disposer<C>>>,
    },
    Release {
        slot: usize,
    },
}

struct Trigger<C> {
    active: ControlState,
    inactive: ControlState,
    action: TriggerAction<C>,
}

pub struct ControlStateManager<C> {
    state: ControlState,
    triggers: Vec<Trigger<C>>,
    /// Live subscription disposers, indexed by the slot handed out in `add_subscription`
    subscriptions: Vec<Option<Disposer<C>>>,
}

impl<C> Default for ControlStateManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ControlStateManager<C> {
    pub fn new() -> Self {
        Self {
            state: ControlState::empty(),
            triggers: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    /// True if all of `flags` are currently set.
    pub fn has_state(&self, flags: ControlState) -> bool {
        self.state.contains(flags)
    }

    /// Runs `action` whenever `active` becomes fully set.
    pub fn add_set_trigger(&mut self, active: ControlState, action: impl FnMut(&mut C) + 'static) {
        self.add_trigger(active, ControlState::empty(), action);
    }

    /// Runs `action` whenever all of `inactive` become clear.
    pub fn add_clear_trigger(&mut self, inactive: ControlState, action: impl FnMut(&mut C) + 'static) {
        self.add_trigger(ControlState::empty(), inactive, action);
    }

    pub fn add_trigger(
        &mut self,
        active: ControlState,
        inactive: ControlState,
        action: impl FnMut(&mut C) + 'static,
    ) {
        self.triggers.push(Trigger {
            active,
            inactive,
            action: TriggerAction::Invoke(Box::new(action)),
        });
    }

    /// Calls `factory` when `activate` becomes fully set and runs the disposer it returned when
    /// all of `deactivate` become clear. A factory returning `None` acquires nothing.
    pub fn add_subscription(
        &mut self,
        activate: ControlState,
        deactivate: ControlState,
        factory: impl FnMut(&mut C) -> Option<Disposer<C>> + 'static,
    ) {
        let slot = self.subscriptions.len();
        self.subscriptions.push(None);

        self.triggers.push(Trigger {
            active: activate,
            inactive: ControlState::empty(),
            action: TriggerAction::Acquire {
                slot,
                factory: Box::new(factory),
            },
        });
        self.triggers.push(Trigger {
            active: ControlState::empty(),
            inactive: deactivate,
            action: TriggerAction::Release { slot },
        });
    }

    /// Sets `flags`. Returns `true` if anything changed (and triggers were evaluated).
    pub fn set_state(&mut self, flags: ControlState, ctx: &mut C) -> bool {
        let previous = self.state;
        self.state |= flags;

        let changed = self.state ^ previous;
        if changed.is_empty() {
            return false;
        }

        self.execute_triggers(changed, ctx);
        true
    }

    /// Clears `flags`. Returns `true` if anything changed (and triggers were evaluated).
    pub fn clear_state(&mut self, flags: ControlState, ctx: &mut C) -> bool {
        let previous = self.state;
        self.state.remove(flags);

        let changed = self.state ^ previous;
        if changed.is_empty() {
            return false;
        }

        self.execute_triggers(changed, ctx);
        true
    }

    fn execute_triggers(&mut self, changed: ControlState, ctx: &mut C) {
        let state = self.state;
        let subscriptions = &mut self.subscriptions;

        for trigger in self.triggers.iter_mut() {
            let concerned = trigger.active.intersects(changed) || trigger.inactive.intersects(changed);
            if !concerned {
                continue;
            }
            if !state.contains(trigger.active) || state.intersects(trigger.inactive) {
                continue;
            }

            match &mut trigger.action {
                TriggerAction::Invoke(action) => action(ctx),
                TriggerAction::Acquire { slot, factory } => {
                    // A second activation without a release in between replaces the old handle.
                    if let Some(stale) = subscriptions[*slot].take() {
                        stale(ctx);
                    }
                    subscriptions[*slot] = factory(ctx);
                }
                TriggerAction::Release { slot } => {
                    if let Some(disposer) = subscriptions[*slot].take() {
                        disposer(ctx);
                    }
                }
            }
        }
    }
}
