//! Tilt confirmation FSM (sensor node).
//!
//! The inclination sampler flickers near the threshold, so a position
//! change is not forwarded until it has persisted for the confirmation
//! window. While a candidate position is being verified, each
//! re-observation of the same candidate is forwarded as a keep-alive
//! `Ping` instead of the raw status; the window is measured from the
//! most recent consistent observation. Every inbound sample yields
//! exactly one outbound record, which doubles as the link heartbeat.
//!
//! Time is supplied by the caller as a wrapping millisecond uptime
//! clock, one reading per sample.

use crate::events::{MotionReport, MotionStatus};
use crate::fsm::{TableEnum, TransitionTable};

impl TableEnum for MotionStatus {
    const COUNT: usize = 4;
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TiltState {
    Created = 0,
    NewClosureReceived = 1,
    VerifyingClosure = 2,
    ConfirmedClosure = 3,
    NewOpenReceived = 4,
    VerifyingOpen = 5,
    ConfirmedOpen = 6,
    SignalLost = 7,
}

impl TableEnum for TiltState {
    const COUNT: usize = 8;
    fn index(self) -> usize {
        self as usize
    }
}

/// (state, sample status) → next state. The confirmed states ignore
/// repeats of their own position; `SignalLost` is left only by fresh
/// position samples.
const TRANSITIONS: TransitionTable<TiltState, 8, 4> = {
    use TiltState::{
        NewClosureReceived, NewOpenReceived, SignalLost, VerifyingClosure, VerifyingOpen,
    };
    TransitionTable::new([
        // NotMoved                 Raised                SignalLost        Ping
        [Some(NewClosureReceived), Some(NewOpenReceived), Some(SignalLost), None], // Created
        [Some(VerifyingClosure), Some(VerifyingOpen), Some(SignalLost), Some(VerifyingClosure)], // NewClosureReceived
        [Some(VerifyingClosure), Some(NewOpenReceived), Some(SignalLost), Some(VerifyingClosure)], // VerifyingClosure
        [None, Some(NewOpenReceived), Some(SignalLost), None], // ConfirmedClosure
        [Some(NewClosureReceived), Some(VerifyingOpen), Some(SignalLost), Some(VerifyingOpen)], // NewOpenReceived
        [Some(NewClosureReceived), Some(VerifyingOpen), Some(SignalLost), Some(VerifyingOpen)], // VerifyingOpen
        [Some(NewClosureReceived), Some(VerifyingOpen), Some(SignalLost), None], // ConfirmedOpen
        [Some(NewClosureReceived), Some(NewOpenReceived), None, None], // SignalLost
    ])
};

pub struct TiltConfirmer {
    state: TiltState,
    confirm_ms: u32,
    candidate_since_ms: u32,
}

impl TiltConfirmer {
    pub fn new(confirm_ms: u32) -> Self {
        Self {
            state: TiltState::Created,
            confirm_ms,
            candidate_since_ms: 0,
        }
    }

    /// Feed one raw sample; returns the record to transmit. Ignored
    /// transitions forward the sample unchanged (a confirmed position
    /// re-announces itself, keeping the heartbeat flowing).
    pub fn on_sample(&mut self, sample: MotionReport, now_ms: u32) -> MotionReport {
        let Some(entered) = TRANSITIONS.step(&mut self.state, sample.status, "tilt") else {
            return sample;
        };
        let mut out = sample;
        match entered {
            TiltState::Created | TiltState::SignalLost => {}
            TiltState::NewClosureReceived | TiltState::NewOpenReceived => {
                self.candidate_since_ms = now_ms;
                out.status = MotionStatus::Ping;
            }
            TiltState::VerifyingClosure => {
                if self.window_elapsed(now_ms) {
                    self.state = TiltState::ConfirmedClosure;
                } else {
                    out.status = MotionStatus::Ping;
                }
            }
            TiltState::VerifyingOpen => {
                if self.window_elapsed(now_ms) {
                    self.state = TiltState::ConfirmedOpen;
                } else {
                    out.status = MotionStatus::Ping;
                }
            }
            TiltState::ConfirmedClosure | TiltState::ConfirmedOpen => {}
        }
        out
    }

    pub fn state(&self) -> TiltState {
        self.state
    }

    fn window_elapsed(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.candidate_since_ms) >= self.confirm_ms
    }
}
