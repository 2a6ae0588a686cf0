//! Engine channels
//!
//! - Control: bounded FIFO inbox, polled without blocking, one message per tick
//! - Data: holds at most `FRAME_BACKLOG` frames; the producer drops new frames
//!   while it is full and the consumer keeps only the newest

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};

use crate::consts::FRAME_BACKLOG;
use crate::error::ControlError;
use crate::protocol::{ControlMessage, Frame};

/// Create a control channel holding up to `capacity` pending messages
pub fn control_channel(capacity: usize) -> (ControlSender, ControlReceiver) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (ControlSender { tx }, ControlReceiver { rx })
}

/// Create the frame channel
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    let (tx, rx) = mpsc::sync_channel(FRAME_BACKLOG);
    (FrameSender { tx }, FrameReceiver { rx })
}

/// Control-surface side of the control channel
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: SyncSender<ControlMessage>,
}

impl ControlSender {
    /// Queue a message without blocking
    pub fn send(&self, msg: impl Into<ControlMessage>) -> Result<(), ControlError> {
        self.tx.try_send(msg.into()).map_err(|e| match e {
            TrySendError::Full(_) => ControlError::Full,
            TrySendError::Disconnected(_) => ControlError::Disconnected,
        })
    }
}

/// Result of polling the control inbox
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPoll {
    Message(ControlMessage),
    Empty,
    /// Every sender is gone
    Disconnected,
}

/// Engine side of the control channel
#[derive(Debug)]
pub struct ControlReceiver {
    rx: Receiver<ControlMessage>,
}

impl ControlReceiver {
    /// Take at most one pending message; never waits
    pub fn poll(&self) -> ControlPoll {
        match self.rx.try_recv() {
            Ok(msg) => ControlPoll::Message(msg),
            Err(TryRecvError::Empty) => ControlPoll::Empty,
            Err(TryRecvError::Disconnected) => ControlPoll::Disconnected,
        }
    }
}

/// Outcome of publishing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    Sent,
    /// Backlog was full; the frame is gone
    Dropped,
    /// No consumer left
    Disconnected,
}

/// Engine side of the data channel
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: SyncSender<Frame>,
}

impl FrameSender {
    /// Publish unless the consumer is already `FRAME_BACKLOG` frames behind
    pub fn publish(&self, frame: Frame) -> Publish {
        match self.tx.try_send(frame) {
            Ok(()) => Publish::Sent,
            Err(TrySendError::Full(_)) => Publish::Dropped,
            Err(TrySendError::Disconnected(_)) => Publish::Disconnected,
        }
    }
}

/// Renderer side of the data channel
#[derive(Debug)]
pub struct FrameReceiver {
    rx: Receiver<Frame>,
}

impl FrameReceiver {
    /// Drain everything buffered and keep the newest frame
    pub fn latest(&self) -> Option<Frame> {
        self.rx.try_iter().last()
    }

    /// Drain everything buffered, oldest first
    pub fn drain(&self) -> Vec<Frame> {
        self.rx.try_iter().collect()
    }

    /// Block until a frame arrives or the engine goes away
    pub fn recv(&self) -> Option<Frame> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Command;

    fn frame(tick: u64) -> Frame {
        Frame {
            tick,
            ..Frame::default()
        }
    }

    #[test]
    fn test_backlog_full_drops_new_frames() {
        let (tx, rx) = frame_channel();
        assert_eq!(tx.publish(frame(1)), Publish::Sent);
        assert_eq!(tx.publish(frame(2)), Publish::Sent);
        assert_eq!(tx.publish(frame(3)), Publish::Dropped);

        let frames = rx.drain();
        assert_eq!(frames.iter().map(|f| f.tick).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_latest_frame_wins() {
        let (tx, rx) = frame_channel();
        tx.publish(frame(1));
        tx.publish(frame(2));
        assert_eq!(rx.latest().map(|f| f.tick), Some(2));
        assert_eq!(rx.latest(), None);
        // Space again after draining
        assert_eq!(tx.publish(frame(3)), Publish::Sent);
    }

    #[test]
    fn test_publish_without_consumer() {
        let (tx, rx) = frame_channel();
        drop(rx);
        assert_eq!(tx.publish(frame(1)), Publish::Disconnected);
    }

    #[test]
    fn test_control_fifo_and_poll() {
        let (tx, rx) = control_channel(4);
        assert_eq!(rx.poll(), ControlPoll::Empty);
        tx.send(Command::Start).unwrap();
        tx.send(Command::Fire).unwrap();
        assert_eq!(rx.poll(), ControlPoll::Message(ControlMessage::command(Command::Start)));
        assert_eq!(rx.poll(), ControlPoll::Message(ControlMessage::command(Command::Fire)));
        assert_eq!(rx.poll(), ControlPoll::Empty);
        drop(tx);
        assert_eq!(rx.poll(), ControlPoll::Disconnected);
    }

    #[test]
    fn test_control_inbox_bounded() {
        let (tx, rx) = control_channel(1);
        tx.send(Command::Start).unwrap();
        assert_eq!(tx.send(Command::Stop), Err(ControlError::Full));
        drop(rx);
        assert_eq!(tx.send(Command::Stop), Err(ControlError::Disconnected));
    }
}
