//! Handshake mailbox
//!
//! A single lock guards both append and read. Reads are destructive and
//! predicate-based: the first queued message matching the predicate is
//! removed and returned, so a message reaches at most one consumer.

use super::lock;
use crate::models::Message;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MessageBus {
    queue: Mutex<Vec<Message>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, message: Message) {
        lock(&self.queue).push(message);
    }

    /// Remove and return the oldest message matching `pred`.
    pub fn take<P>(&self, pred: P) -> Option<Message>
    where
        P: Fn(&Message) -> bool,
    {
        let mut queue = lock(&self.queue);
        let index = queue.iter().position(|message| pred(message))?;
        Some(queue.remove(index))
    }

    /// Remove and return every message matching `pred`, oldest first.
    pub fn drain<P>(&self, pred: P) -> Vec<Message>
    where
        P: Fn(&Message) -> bool,
    {
        let mut queue = lock(&self.queue);
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(queue.len());
        for message in queue.drain(..) {
            if pred(&message) {
                taken.push(message);
            } else {
                kept.push(message);
            }
        }
        *queue = kept;
        taken
    }

    /// Discard every message matching `pred`. Returns how many were dropped.
    pub fn withdraw<P>(&self, pred: P) -> usize
    where
        P: Fn(&Message) -> bool,
    {
        let mut queue = lock(&self.queue);
        let before = queue.len();
        queue.retain(|message| !pred(message));
        before - queue.len()
    }

    /// Whether some queued message matches `pred`, without consuming it.
    pub fn contains<P>(&self, pred: P) -> bool
    where
        P: Fn(&Message) -> bool,
    {
        lock(&self.queue).iter().any(|message| pred(message))
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the queue, oldest first.
    pub fn pending(&self) -> Vec<Message> {
        lock(&self.queue).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageBody, MessageKind, Position, WasteKind};
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn offer(sender: u32) -> Message {
        Message::broadcast(
            sender,
            0,
            MessageBody::Offer {
                position: Position::new(0, 0),
                kind: WasteKind::Green,
            },
        )
    }

    #[test]
    fn test_take_is_fifo_and_destructive() {
        let bus = MessageBus::new();
        bus.send(offer(1));
        bus.send(Message::direct(2, 1, 0, MessageBody::Where));
        bus.send(offer(3));

        let first = bus.take(|m| m.kind() == MessageKind::Offer).unwrap();
        assert_eq!(first.sender, 1);
        let second = bus.take(|m| m.kind() == MessageKind::Offer).unwrap();
        assert_eq!(second.sender, 3);
        assert!(bus.take(|m| m.kind() == MessageKind::Offer).is_none());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_drain_and_withdraw() {
        let bus = MessageBus::new();
        for sender in 0..4 {
            bus.send(Message::direct(sender, 9, 0, MessageBody::Where));
        }
        bus.send(offer(5));

        let drained = bus.drain(|m| m.is_for(9) && m.sender % 2 == 0);
        assert_eq!(drained.len(), 2);
        assert_eq!(bus.withdraw(|m| m.sender == 5), 1);
        assert_eq!(bus.len(), 2);
        assert!(bus.contains(|m| m.sender == 3));
    }

    #[test]
    fn messages_are_consumed_once() {
        let bus = Arc::new(MessageBus::new());
        let total = 120;
        for sender in 0..total {
            bus.send(offer(sender));
        }

        let readers = 6;
        let barrier = Arc::new(Barrier::new(readers));
        let mut handles = Vec::new();
        for _ in 0..readers {
            let bus = Arc::clone(&bus);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let mut got = Vec::new();
                while let Some(message) = bus.take(|m| m.kind() == MessageKind::Offer) {
                    got.push(message.sender);
                }
                got
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for sender in handle.join().expect("reader thread panicked") {
                assert!(seen.insert(sender));
            }
        }
        assert_eq!(seen.len(), total as usize);
        assert!(bus.is_empty());
    }
}
