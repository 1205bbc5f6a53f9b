//! Delivery lifecycle FSM (base station).
//!
//! Source of truth for whether a delivery has arrived and whether the
//! container was opened again afterwards. Lid position events move it
//! from awaiting arrival through suspected and confirmed arrival,
//! suspected and confirmed completion, and finally tamper detection.
//! Suspicion is resolved by the debounce timer: entering a suspect
//! state arms a confirmation window whose expiry feeds a timeout event
//! back into this FSM, and a contradicting lid event inside the window
//! cancels the suspicion.
//!
//! `ConfirmedTampering` is terminal. The appliance keeps its alert
//! pattern until a human resets it.

use crate::error::TimerError;
use crate::events::{
    AlarmEvent, DisplayCommand, DisplayMessage, LedIllumination, LidPosition,
};
use crate::fsm::{TableEnum, TransitionTable};

impl TableEnum for LidPosition {
    const COUNT: usize = 5;
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeliveryState {
    Created = 0,
    AwaitingArrival = 1,
    SuspectArrivalBegun = 2,
    ConfirmedArrivalBegun = 3,
    SuspectComplete = 4,
    ConfirmedComplete = 5,
    SuspectTampering = 6,
    ConfirmedTampering = 7,
}

impl TableEnum for DeliveryState {
    const COUNT: usize = 8;
    fn index(self) -> usize {
        self as usize
    }
}

/// Everything entering a delivery state can touch: the activity LED,
/// the delivery indicator, the alarm, the display, the elapsed-time
/// stopwatch, and the confirmation window.
pub trait DeliveryOutputs {
    fn activity_led(&mut self, on: bool);
    fn illumination(&mut self, level: LedIllumination);
    fn alarm(&mut self, event: AlarmEvent);
    fn display(&mut self, message: DisplayMessage);
    fn start_stopwatch(&mut self);
    /// Arm a one-shot window that feeds `on_expiry` back into this
    /// FSM's input queue when it elapses.
    fn arm_window(&mut self, duration_ms: u32, on_expiry: LidPosition) -> Result<(), TimerError>;
    /// Disarm any pending window.
    fn halt_window(&mut self) -> Result<(), TimerError>;
}

/// (state, lid event) → next state. Timeout events are accepted only
/// in the suspect state that armed them; everywhere else they are
/// stale expiries and ignored.
const TRANSITIONS: TransitionTable<DeliveryState, 8, 5> = {
    use DeliveryState::{
        AwaitingArrival, ConfirmedArrivalBegun, ConfirmedComplete, ConfirmedTampering,
        SuspectArrivalBegun, SuspectComplete, SuspectTampering,
    };
    TransitionTable::new([
        // Unchanged  Open                   Closed                  OpenTimeout              CloseTimeout
        [None, Some(SuspectArrivalBegun), Some(AwaitingArrival), None, None], // Created
        [None, Some(SuspectArrivalBegun), None, None, None],                  // AwaitingArrival
        [None, None, Some(AwaitingArrival), Some(ConfirmedArrivalBegun), None], // SuspectArrivalBegun
        [None, None, Some(SuspectComplete), None, None],                      // ConfirmedArrivalBegun
        [None, None, None, None, Some(ConfirmedComplete)],                    // SuspectComplete
        [None, Some(SuspectTampering), None, None, None],                     // ConfirmedComplete
        [None, None, Some(ConfirmedComplete), Some(ConfirmedTampering), None], // SuspectTampering
        [None, None, None, None, None],                                       // ConfirmedTampering
    ])
};

pub struct DeliveryFsm {
    state: DeliveryState,
    open_confirm_ms: u32,
    close_confirm_ms: u32,
}

impl DeliveryFsm {
    pub fn new(open_confirm_ms: u32, close_confirm_ms: u32) -> Self {
        Self {
            state: DeliveryState::Created,
            open_confirm_ms,
            close_confirm_ms,
        }
    }

    /// Feed one lid position event through the table and run the entry
    /// effects of the state entered. A timer backend failure is
    /// surfaced to the owning service for escalation.
    pub fn on_position(
        &mut self,
        position: LidPosition,
        outputs: &mut impl DeliveryOutputs,
    ) -> Result<(), TimerError> {
        let Some(entered) = TRANSITIONS.step(&mut self.state, position, "delivery") else {
            return Ok(());
        };
        let mut activity = false;
        match entered {
            DeliveryState::Created => {}
            DeliveryState::AwaitingArrival => {
                outputs.halt_window()?;
            }
            DeliveryState::SuspectArrivalBegun | DeliveryState::SuspectTampering => {
                activity = true;
                self.start_window(outputs, self.open_confirm_ms, LidPosition::OpenTimeout)?;
            }
            DeliveryState::ConfirmedArrivalBegun => {
                activity = true;
                self.lid_is_open(outputs);
                outputs.display(DisplayMessage::command(DisplayCommand::Arriving));
            }
            DeliveryState::SuspectComplete => {
                self.start_window(outputs, self.close_confirm_ms, LidPosition::CloseTimeout)?;
            }
            DeliveryState::ConfirmedComplete => {
                outputs.start_stopwatch();
                outputs.illumination(LedIllumination::On);
                outputs.alarm(AlarmEvent::Delivered);
                outputs.display(DisplayMessage::command(DisplayCommand::Delivered));
            }
            DeliveryState::ConfirmedTampering => {
                activity = true;
                self.lid_is_open(outputs);
                outputs.display(DisplayMessage::command(DisplayCommand::TamperAlert));
            }
        }
        outputs.activity_led(activity);
        Ok(())
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Hard invariant: any running window is disarmed before a new one
    /// is armed, so two windows can never race against this FSM.
    fn start_window(
        &self,
        outputs: &mut impl DeliveryOutputs,
        duration_ms: u32,
        on_expiry: LidPosition,
    ) -> Result<(), TimerError> {
        outputs.halt_window()?;
        outputs.arm_window(duration_ms, on_expiry)
    }

    fn lid_is_open(&self, outputs: &mut impl DeliveryOutputs) {
        outputs.illumination(LedIllumination::Blink);
        outputs.alarm(AlarmEvent::LidOpen);
    }
}
