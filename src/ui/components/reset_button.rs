//! Reset button with a click-again-to-confirm step
//!
//! The first click arms the button and starts a 3 second timer; a second click
//! inside that window fires the reset. The timer is cancelled as soon as the
//! button leaves the confirming state.

use dioxus::prelude::*;
use std::time::Duration;

/// How long the button waits for the confirming click
pub const CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Something that can be cancelled, such as a spawned timer task
pub trait TimerHandle {
    fn cancel(self);
}

impl TimerHandle for Task {
    fn cancel(self) {
        Task::cancel(self)
    }
}

/// State of the reset button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState<H> {
    Idle,
    /// Armed; holds the timer that will disarm it
    Confirming(H),
}

impl<H> Default for ConfirmState<H> {
    fn default() -> Self {
        ConfirmState::Idle
    }
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// First click; waiting for confirmation
    Armed,
    /// Confirming click; the reset should run now
    Fire,
}

impl<H: TimerHandle> ConfirmState<H> {
    pub fn is_confirming(&self) -> bool {
        matches!(self, ConfirmState::Confirming(_))
    }

    /// Handle a click. `arm` starts the disarm timer and is only called when
    /// moving from `Idle` to `Confirming`.
    pub fn click(&mut self, arm: impl FnOnce() -> H) -> ClickOutcome {
        match std::mem::take(self) {
            ConfirmState::Idle => {
                *self = ConfirmState::Confirming(arm());
                ClickOutcome::Armed
            }
            ConfirmState::Confirming(timer) => {
                timer.cancel();
                ClickOutcome::Fire
            }
        }
    }

    /// The timer ran out; its handle is spent so it is not cancelled
    pub fn expire(&mut self) {
        *self = ConfirmState::Idle;
    }
}

#[component]
pub fn ResetButton(on_reset: EventHandler<()>) -> Element {
    let mut state = use_signal(|| ConfirmState::<Task>::Idle);

    let handle_click = move |_| {
        let mut timer_state = state;
        let outcome = state.write().click(|| {
            spawn(async move {
                tokio::time::sleep(CONFIRM_WINDOW).await;
                timer_state.write().expire();
            })
        });
        if outcome == ClickOutcome::Fire {
            on_reset.call(());
        }
    };

    let confirming = state.read().is_confirming();
    let class = if confirming {
        "reset-button confirming"
    } else {
        "reset-button"
    };
    let title = if confirming {
        "Click again to confirm"
    } else {
        "Reset conversation"
    };

    rsx! {
        button {
            class: "{class}",
            title: "{title}",
            onclick: handle_click,

            if confirming {
                svg {
                    width: "16",
                    height: "16",
                    view_box: "0 0 24 24",
                    fill: "none",
                    path {
                        d: "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z",
                        stroke: "currentColor",
                        stroke_width: "2",
                        stroke_linecap: "round",
                        stroke_linejoin: "round",
                    }
                }
                "Confirm Reset"
            } else {
                svg {
                    width: "16",
                    height: "16",
                    view_box: "0 0 24 24",
                    fill: "none",
                    path {
                        d: "M4 4v5h.582m15.356 2A8.001 8.001 0 004.582 9m0 0H9m11 11v-5h-.581m0 0a8.003 8.003 0 01-15.357-2m15.357 2H15",
                        stroke: "currentColor",
                        stroke_width: "2",
                        stroke_linecap: "round",
                        stroke_linejoin: "round",
                    }
                }
                "Reset"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeTimer(Rc<Cell<u32>>);

    impl TimerHandle for FakeTimer {
        fn cancel(self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_first_click_arms() {
        let cancels = Rc::new(Cell::new(0));
        let mut state = ConfirmState::Idle;
        let mut armed = 0;

        let outcome = state.click(|| {
            armed += 1;
            FakeTimer(cancels.clone())
        });
        assert_eq!(outcome, ClickOutcome::Armed);
        assert!(state.is_confirming());
        assert_eq!(armed, 1);
        assert_eq!(cancels.get(), 0);
    }

    #[test]
    fn test_second_click_fires_and_cancels_timer() {
        let cancels = Rc::new(Cell::new(0));
        let mut state = ConfirmState::Idle;
        state.click(|| FakeTimer(cancels.clone()));

        let outcome = state.click(|| panic!("must not re-arm"));
        assert_eq!(outcome, ClickOutcome::Fire);
        assert!(!state.is_confirming());
        assert_eq!(cancels.get(), 1);
    }

    #[test]
    fn test_timeout_disarms_without_firing() {
        let cancels = Rc::new(Cell::new(0));
        let mut state = ConfirmState::Idle;
        state.click(|| FakeTimer(cancels.clone()));

        state.expire();
        assert!(!state.is_confirming());
        assert_eq!(cancels.get(), 0);

        // next click arms again rather than firing
        assert_eq!(state.click(|| FakeTimer(cancels.clone())), ClickOutcome::Armed);
    }
}
