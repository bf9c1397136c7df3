//! Fixed-capacity reorder buffer
//!
//! A small slot array holding framed packets that arrived ahead of the
//! resequencer's cursor. Lookups are a linear scan; capacities are in the
//! tens of slots.

use crate::types::{Cursor, FramedPacket};

/// One reorder slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
    /// Free for insertion
    #[default]
    Empty,

    /// Holds a packet waiting for the cursor
    Occupied(FramedPacket),
}

impl Slot {
    /// The packet in this slot, if any
    pub fn packet(&self) -> Option<&FramedPacket> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(packet) => Some(packet),
        }
    }

    /// Returns true if the slot is free
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

/// Bounded collection of out-of-order packets
#[derive(Debug, Clone)]
pub struct ReorderBuffer {
    slots: Vec<Slot>,
    occupied: usize,
}

impl ReorderBuffer {
    /// Create a buffer with `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; capacity],
            occupied: 0,
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns true if no packet is buffered
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns true if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.occupied >= self.slots.len()
    }

    /// Store `packet` in the first empty slot
    ///
    /// Returns the slot index, or hands the packet back if the buffer is full.
    pub fn insert(&mut self, packet: FramedPacket) -> Result<usize, FramedPacket> {
        if self.is_full() {
            return Err(packet);
        }

        match self.slots.iter().position(Slot::is_empty) {
            Some(index) => {
                self.slots[index] = Slot::Occupied(packet);
                self.occupied += 1;
                Ok(index)
            }
            None => Err(packet),
        }
    }

    /// Index of the slot holding `(frame_index, sub_index)`
    pub fn position(&self, frame_index: u16, sub_index: u16) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.packet()
                .is_some_and(|p| p.frame_index == frame_index && p.sub_index == sub_index)
        })
    }

    /// Returns true if a packet with this key is buffered
    pub fn contains(&self, frame_index: u16, sub_index: u16) -> bool {
        self.position(frame_index, sub_index).is_some()
    }

    /// Free slot `index`, returning its packet
    pub fn remove(&mut self, index: usize) -> Option<FramedPacket> {
        let slot = self.slots.get_mut(index)?;
        match std::mem::take(slot) {
            Slot::Empty => None,
            Slot::Occupied(packet) => {
                self.occupied -= 1;
                Some(packet)
            }
        }
    }

    /// Remove and return the packet the cursor is waiting for
    pub fn take_matching(&mut self, cursor: Cursor) -> Option<FramedPacket> {
        let index = self.position(cursor.frame, cursor.sub)?;
        self.remove(index)
    }

    /// Free every slot
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.occupied = 0;
    }

    /// Iterate over buffered packets in slot order
    pub fn iter(&self) -> impl Iterator<Item = &FramedPacket> {
        self.slots.iter().filter_map(Slot::packet)
    }

    /// Raw slot view
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}
