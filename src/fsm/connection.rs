//! Connection status FSM (base station).
//!
//! Folds the watchdog's link verdicts into a user-visible connection
//! state: a steady "connected" indicator, a "disconnected" blink
//! pattern, and one display command per edge. `SenderPanic` is
//! terminal; a failed sender needs human intervention, so the row
//! ignores all further link events.

use crate::events::{AlarmEvent, DisplayCommand, DisplayMessage, LinkEvent};
use crate::fsm::{TableEnum, TransitionTable};

impl TableEnum for LinkEvent {
    const COUNT: usize = 3;
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Initialized = 0,
    GoingDown = 1,
    Disconnected = 2,
    ComingUp = 3,
    Connected = 4,
    SenderPanic = 5,
}

impl TableEnum for ConnectionState {
    const COUNT: usize = 6;
    fn index(self) -> usize {
        self as usize
    }
}

/// Side effects of entering a connection state. One implementation
/// drives GPIO and the display queue; tests record calls.
pub trait ConnectionOutputs {
    fn connected_indicator(&mut self, on: bool);
    fn disconnected_blink(&mut self, enabled: bool);
    fn display(&mut self, message: DisplayMessage);
    fn alarm(&mut self, event: AlarmEvent);
}

/// (state, event) → next state. `Disconnected` and `Connected` absorb
/// repeats of their own verdict so the edge states fire exactly once
/// per direction change.
const TRANSITIONS: TransitionTable<ConnectionState, 6, 3> = {
    use ConnectionState::{ComingUp, Connected, Disconnected, GoingDown, SenderPanic};
    TransitionTable::new([
        // Down                Up               SenderFailed
        [Some(GoingDown), Some(ComingUp), Some(SenderPanic)],    // Initialized
        [Some(Disconnected), Some(ComingUp), Some(SenderPanic)], // GoingDown
        [Some(Disconnected), Some(ComingUp), Some(SenderPanic)], // Disconnected
        [Some(GoingDown), Some(Connected), Some(SenderPanic)],   // ComingUp
        [Some(GoingDown), Some(Connected), Some(SenderPanic)],   // Connected
        [None, None, None],                                      // SenderPanic
    ])
};

pub struct ConnectionFsm {
    state: ConnectionState,
}

impl Default for ConnectionFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFsm {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Initialized,
        }
    }

    pub fn on_link_event(&mut self, event: LinkEvent, outputs: &mut impl ConnectionOutputs) {
        let Some(entered) = TRANSITIONS.step(&mut self.state, event, "connection") else {
            return;
        };
        match entered {
            ConnectionState::Initialized
            | ConnectionState::Disconnected
            | ConnectionState::Connected => {}
            ConnectionState::GoingDown => {
                outputs.connected_indicator(false);
                outputs.disconnected_blink(true);
                outputs.display(DisplayMessage::command(DisplayCommand::Disconnected));
                outputs.alarm(AlarmEvent::Disconnected);
            }
            ConnectionState::ComingUp => {
                outputs.disconnected_blink(false);
                outputs.connected_indicator(true);
                outputs.display(DisplayMessage::command(DisplayCommand::Connected));
                outputs.alarm(AlarmEvent::Connected);
            }
            ConnectionState::SenderPanic => {
                outputs.disconnected_blink(true);
                outputs.connected_indicator(false);
                outputs.display(DisplayMessage::command(DisplayCommand::Panic));
                outputs.alarm(AlarmEvent::SenderPanic);
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded {
        indicator: Vec<bool>,
        blink: Vec<bool>,
        displayed: Vec<DisplayCommand>,
        alarms: Vec<AlarmEvent>,
    }

    impl ConnectionOutputs for Recorded {
        fn connected_indicator(&mut self, on: bool) {
            self.indicator.push(on);
        }
        fn disconnected_blink(&mut self, enabled: bool) {
            self.blink.push(enabled);
        }
        fn display(&mut self, message: DisplayMessage) {
            self.displayed.push(message.command);
        }
        fn alarm(&mut self, event: AlarmEvent) {
            self.alarms.push(event);
        }
    }

    #[test]
    fn first_up_connects() {
        let mut fsm = ConnectionFsm::new();
        let mut out = Recorded::default();
        fsm.on_link_event(LinkEvent::Up, &mut out);
        assert_eq!(fsm.state(), ConnectionState::ComingUp);
        assert_eq!(out.displayed, vec![DisplayCommand::Connected]);
        assert_eq!(out.indicator, vec![true]);
        assert_eq!(out.blink, vec![false]);
    }

    #[test]
    fn repeated_down_announces_once() {
        let mut fsm = ConnectionFsm::new();
        let mut out = Recorded::default();
        fsm.on_link_event(LinkEvent::Down, &mut out);
        fsm.on_link_event(LinkEvent::Down, &mut out);
        fsm.on_link_event(LinkEvent::Down, &mut out);
        assert_eq!(fsm.state(), ConnectionState::Disconnected);
        // Only the GoingDown edge has side effects.
        assert_eq!(out.displayed, vec![DisplayCommand::Disconnected]);
        assert_eq!(out.blink, vec![true]);
        assert_eq!(out.alarms, vec![AlarmEvent::Disconnected]);
    }

    #[test]
    fn repeated_up_announces_once() {
        let mut fsm = ConnectionFsm::new();
        let mut out = Recorded::default();
        fsm.on_link_event(LinkEvent::Up, &mut out);
        fsm.on_link_event(LinkEvent::Up, &mut out);
        fsm.on_link_event(LinkEvent::Up, &mut out);
        assert_eq!(fsm.state(), ConnectionState::Connected);
        assert_eq!(out.displayed, vec![DisplayCommand::Connected]);
    }

    #[test]
    fn flapping_link_announces_each_edge() {
        let mut fsm = ConnectionFsm::new();
        let mut out = Recorded::default();
        for event in [
            LinkEvent::Down,
            LinkEvent::Up,
            LinkEvent::Down,
            LinkEvent::Up,
        ] {
            fsm.on_link_event(event, &mut out);
        }
        assert_eq!(
            out.displayed,
            vec![
                DisplayCommand::Disconnected,
                DisplayCommand::Connected,
                DisplayCommand::Disconnected,
                DisplayCommand::Connected,
            ]
        );
    }

    #[test]
    fn sender_panic_is_terminal() {
        let mut fsm = ConnectionFsm::new();
        let mut out = Recorded::default();
        fsm.on_link_event(LinkEvent::Up, &mut out);
        fsm.on_link_event(LinkEvent::SenderFailed, &mut out);
        assert_eq!(fsm.state(), ConnectionState::SenderPanic);
        assert_eq!(
            out.displayed,
            vec![DisplayCommand::Connected, DisplayCommand::Panic]
        );
        assert_eq!(
            out.alarms,
            vec![AlarmEvent::Connected, AlarmEvent::SenderPanic]
        );

        out.displayed.clear();
        for event in [LinkEvent::Down, LinkEvent::Up, LinkEvent::SenderFailed] {
            fsm.on_link_event(event, &mut out);
        }
        assert_eq!(fsm.state(), ConnectionState::SenderPanic);
        assert!(out.displayed.is_empty());
    }
}
