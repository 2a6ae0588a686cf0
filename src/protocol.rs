//! Messages crossing the engine boundary
//!
//! Control messages flow in, frames flow out. Both are serde types so the
//! binary can speak JSON lines; the engine itself only sees the Rust values.

use serde::{Deserialize, Serialize};

use crate::settings::ParamUpdate;
use crate::sim::SimState;

/// Engine commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Resume physics
    Start,
    /// Pause physics (control messages are still consumed)
    Stop,
    /// Queue a beam of `photons_per_burst` particles and start
    Fire,
    /// Remove every particle, reset ids and the collision counter
    Clear,
}

/// One control message; either part may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ParamUpdate>,
}

impl ControlMessage {
    pub fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            params: None,
        }
    }

    pub fn params(params: ParamUpdate) -> Self {
        Self {
            command: None,
            params: Some(params),
        }
    }

    /// Parse a JSON control message
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

impl From<Command> for ControlMessage {
    fn from(command: Command) -> Self {
        Self::command(command)
    }
}

/// Snapshot exported after each running tick.
///
/// Arrays are parallel and indexed by position in the particle list, not by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub wavelength: Vec<f64>,
    pub count: usize,
    pub tick: u64,
    pub total_energy: f64,
    pub collisions: u64,
}

impl Frame {
    /// Capture the current state
    pub fn capture(state: &SimState, total_energy: f64) -> Self {
        let n = state.particles.len();
        let mut frame = Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            wavelength: Vec::with_capacity(n),
            count: n,
            tick: state.tick,
            total_energy,
            collisions: state.collisions,
        };
        for p in &state.particles {
            frame.x.push(p.pos.x);
            frame.y.push(p.pos.y);
            frame.wavelength.push(p.wavelength);
        }
        frame
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SPEED_OF_LIGHT;
    use glam::DVec2;

    #[test]
    fn test_parse_command_and_params() {
        let msg = ControlMessage::from_json(
            r#"{"command":"FIRE","params":{"photonsPerBurst":50,"globalDecay":0.02}}"#,
        )
        .unwrap();
        assert_eq!(msg.command, Some(Command::Fire));
        let params = msg.params.unwrap();
        assert_eq!(params.photons_per_burst, Some(50.0));
        assert_eq!(params.global_decay, Some(0.02));
        assert_eq!(params.time_scale, None);
    }

    #[test]
    fn test_parse_float_and_negative_burst() {
        let msg = ControlMessage::from_json(r#"{"params":{"photonsPerBurst":50.0}}"#).unwrap();
        assert_eq!(msg.params.unwrap().photons_per_burst, Some(50.0));

        let msg = ControlMessage::from_json(r#"{"command":"FIRE","params":{"photonsPerBurst":-5}}"#)
            .unwrap();
        assert_eq!(msg.command, Some(Command::Fire));
        assert_eq!(msg.params.unwrap().photons_per_burst, Some(-5.0));
    }

    #[test]
    fn test_parse_empty_message() {
        let msg = ControlMessage::from_json("{}").unwrap();
        assert_eq!(msg, ControlMessage::default());
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(ControlMessage::from_json(r#"{"command":"EXPLODE"}"#).is_err());
    }

    #[test]
    fn test_frame_capture_and_json() {
        let mut state = SimState::new(1);
        state.spawn(DVec2::new(10.0, 20.0), DVec2::X * SPEED_OF_LIGHT, 500.0);
        state.spawn(DVec2::new(30.0, 40.0), DVec2::X * SPEED_OF_LIGHT, 600.0);
        state.tick = 7;
        state.collisions = 2;

        let frame = Frame::capture(&state, 123.5);
        assert_eq!(frame.x, vec![10.0, 30.0]);
        assert_eq!(frame.y, vec![20.0, 40.0]);
        assert_eq!(frame.wavelength, vec![500.0, 600.0]);
        assert_eq!((frame.count, frame.tick, frame.collisions), (2, 7, 2));

        let json = frame.to_json().unwrap();
        assert!(json.contains("\"totalEnergy\":123.5"));
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
