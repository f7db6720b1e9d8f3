//! Long-press multi-select as a pure state machine.
//!
//! The input layer reports raw presses, releases, taps and clock ticks;
//! [`Selection::apply`] decides what they mean. The only timer is the
//! deadline of the press currently held.

use std::time::{Duration, Instant};

use crate::catalog::Id;

/// How long a press must be held to enter selection mode.
pub const LONG_PRESS: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browsing,
    Selecting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Pointer down / touch start on an item.
    PressStart { id: Id, at: Instant },
    /// Pointer up / touch end.
    PressEnd { at: Instant },
    /// Clock tick while a press may be held.
    Tick { at: Instant },
    /// Click / tap on an item.
    Tap { id: Id },
    Cancel,
    /// Toggle between "everything visible selected" and nothing.
    SelectAll { visible: Vec<Id> },
    /// Replace the selection outright, e.g. from ids given on a command line.
    SelectOnly { ids: Vec<Id> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Browsing tap: show the read-only detail view.
    OpenDetail(Id),
    /// A long press fired.
    EnteredSelection(Id),
    Toggled { id: Id, selected: bool },
    SelectionChanged,
    ExitedSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    id: Id,
    deadline: Instant,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    mode: Mode,
    /// Selected ids, in the order they were picked.
    selected: Vec<Id>,
    press: Option<Press>,
    /// Set when a long press fired, so the tap that follows its release is
    /// not treated as a toggle.
    swallow_tap: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selected(&self) -> &[Id] {
        &self.selected
    }

    pub fn is_selected(&self, id: Id) -> bool {
        self.selected.contains(&id)
    }

    /// When the held press turns into a long press, if one is held.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.press.map(|press| press.deadline)
    }

    /// Transition function. Consumes the state and returns the next one
    /// together with what the view should do.
    pub fn apply(mut self, input: Input) -> (Self, Effect) {
        let effect = match input {
            Input::PressStart { id, at } => {
                self.swallow_tap = false;
                self.press = Some(Press {
                    id,
                    deadline: at + LONG_PRESS,
                });
                Effect::None
            }
            Input::Tick { at } => self.fire_if_due(at),
            Input::PressEnd { at } => {
                let effect = self.fire_if_due(at);
                self.press = None;
                effect
            }
            Input::Tap { id } => {
                if self.swallow_tap {
                    self.swallow_tap = false;
                    Effect::None
                } else {
                    match self.mode {
                        Mode::Browsing => Effect::OpenDetail(id),
                        Mode::Selecting => self.toggle(id),
                    }
                }
            }
            Input::Cancel => {
                let was_selecting = self.mode == Mode::Selecting;
                self.clear();
                if was_selecting {
                    Effect::ExitedSelection
                } else {
                    Effect::None
                }
            }
            Input::SelectAll { visible } => {
                let all_selected =
                    !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id));
                if all_selected || visible.is_empty() {
                    self.clear();
                    Effect::ExitedSelection
                } else {
                    self.selected = visible;
                    self.mode = Mode::Selecting;
                    Effect::SelectionChanged
                }
            }
            Input::SelectOnly { ids } => {
                self.clear();
                for id in ids {
                    if !self.selected.contains(&id) {
                        self.selected.push(id);
                    }
                }
                if self.selected.is_empty() {
                    Effect::ExitedSelection
                } else {
                    self.mode = Mode::Selecting;
                    Effect::SelectionChanged
                }
            }
        };
        (self, effect)
    }

    /// In-place convenience over [`apply`](Self::apply).
    pub fn handle(&mut self, input: Input) -> Effect {
        let (next, effect) = std::mem::take(self).apply(input);
        *self = next;
        effect
    }

    pub fn clear(&mut self) {
        self.mode = Mode::Browsing;
        self.selected.clear();
        self.press = None;
        self.swallow_tap = false;
    }

    fn fire_if_due(&mut self, now: Instant) -> Effect {
        let Some(press) = self.press else {
            return Effect::None;
        };
        if now < press.deadline {
            return Effect::None;
        }
        self.press = None;
        self.swallow_tap = true;
        self.mode = Mode::Selecting;
        match self.toggle(press.id) {
            Effect::Toggled { selected: true, .. } => Effect::EnteredSelection(press.id),
            other => other,
        }
    }

    fn toggle(&mut self, id: Id) -> Effect {
        if let Some(index) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(index);
            if self.selected.is_empty() {
                self.mode = Mode::Browsing;
                return Effect::ExitedSelection;
            }
            Effect::Toggled {
                id,
                selected: false,
            }
        } else {
            self.selected.push(id);
            Effect::Toggled { id, selected: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_press(state: &mut Selection, id: Id, start: Instant) -> Effect {
        state.handle(Input::PressStart { id, at: start });
        state.handle(Input::Tick {
            at: start + LONG_PRESS,
        })
    }

    #[test]
    fn tap_while_browsing_opens_detail() {
        let mut state = Selection::new();
        assert_eq!(state.handle(Input::Tap { id: 4 }), Effect::OpenDetail(4));
        assert_eq!(state.mode(), Mode::Browsing);
    }

    #[test]
    fn short_press_is_a_plain_tap() {
        let start = Instant::now();
        let mut state = Selection::new();
        state.handle(Input::PressStart { id: 1, at: start });
        assert_eq!(
            state.handle(Input::PressEnd {
                at: start + Duration::from_millis(200)
            }),
            Effect::None
        );
        assert_eq!(state.handle(Input::Tap { id: 1 }), Effect::OpenDetail(1));
    }

    #[test]
    fn long_press_enters_selection_and_swallows_release_tap() {
        let start = Instant::now();
        let mut state = Selection::new();
        assert_eq!(long_press(&mut state, 7, start), Effect::EnteredSelection(7));
        assert_eq!(state.mode(), Mode::Selecting);
        assert_eq!(state.selected(), &[7]);

        state.handle(Input::PressEnd {
            at: start + Duration::from_millis(900),
        });
        assert_eq!(state.handle(Input::Tap { id: 7 }), Effect::None);
        assert_eq!(state.selected(), &[7]);
    }

    #[test]
    fn release_after_deadline_fires_without_tick() {
        let start = Instant::now();
        let mut state = Selection::new();
        state.handle(Input::PressStart { id: 2, at: start });
        assert_eq!(
            state.handle(Input::PressEnd {
                at: start + Duration::from_secs(1)
            }),
            Effect::EnteredSelection(2)
        );
    }

    #[test]
    fn untoggling_last_item_returns_to_browsing() {
        let mut state = Selection::new();
        long_press(&mut state, 3, Instant::now());
        state.handle(Input::PressEnd { at: Instant::now() + LONG_PRESS });
        state.handle(Input::Tap { id: 3 });

        assert_eq!(state.handle(Input::Tap { id: 5 }), Effect::Toggled { id: 5, selected: true });
        assert_eq!(state.handle(Input::Tap { id: 3 }), Effect::Toggled { id: 3, selected: false });
        assert_eq!(state.handle(Input::Tap { id: 5 }), Effect::ExitedSelection);
        assert_eq!(state.mode(), Mode::Browsing);
        assert!(state.selected().is_empty());
    }

    #[test]
    fn select_all_toggles() {
        let mut state = Selection::new();
        long_press(&mut state, 1, Instant::now());
        let visible = vec![1, 2, 3];
        assert_eq!(
            state.handle(Input::SelectAll {
                visible: visible.clone()
            }),
            Effect::SelectionChanged
        );
        assert_eq!(state.selected(), &[1, 2, 3]);
        assert_eq!(state.handle(Input::SelectAll { visible }), Effect::ExitedSelection);
        assert_eq!(state.mode(), Mode::Browsing);
    }

    #[test]
    fn select_only_dedups_and_keeps_order() {
        let mut state = Selection::new();
        assert_eq!(
            state.handle(Input::SelectOnly { ids: vec![4, 2, 4] }),
            Effect::SelectionChanged
        );
        assert_eq!(state.selected(), &[4, 2]);
        assert_eq!(state.mode(), Mode::Selecting);
    }

    #[test]
    fn cancel_clears_everything() {
        let mut state = Selection::new();
        long_press(&mut state, 1, Instant::now());
        assert_eq!(state.handle(Input::Cancel), Effect::ExitedSelection);
        assert_eq!(state, Selection::new());
    }

    #[test]
    fn apply_is_pure() {
        let before = Selection::new();
        let (after, effect) = before.clone().apply(Input::Tap { id: 9 });
        assert_eq!(effect, Effect::OpenDetail(9));
        assert_eq!(after, before);
    }
}
