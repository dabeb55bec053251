use crate::error::Error;

use super::{SocketEntry, SocketHandle};

/// Fixed capacity table of module sockets, indexed by slot.
#[derive(Debug, Clone)]
pub struct SocketSet<const N: usize> {
    entries: [SocketEntry; N],
}

impl<const N: usize> Default for SocketSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SocketSet<N> {
    pub const fn new() -> Self {
        Self {
            entries: [SocketEntry::CLOSED; N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot holding the socket the module calls `handle`
    pub fn find(&self, handle: SocketHandle) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.handle == Some(handle))
    }

    /// Take a free slot for a socket the module just opened.
    pub fn allocate(&mut self, handle: SocketHandle) -> Result<usize, Error> {
        if self.find(handle).is_some() {
            warn!("Socket {} already in the table", handle.0);
        }

        let index = self
            .entries
            .iter()
            .position(|e| e.handle.is_none())
            .ok_or(Error::ResourceExhausted)?;

        self.entries[index] = SocketEntry {
            handle: Some(handle),
            open: true,
            ..SocketEntry::CLOSED
        };
        Ok(index)
    }

    /// Clear slot `index`. Returns whether the slot existed and was in use.
    pub fn free(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                let in_use = entry.handle.is_some();
                *entry = SocketEntry::CLOSED;
                in_use
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&SocketEntry> {
        self.entries.get(index).filter(|e| e.handle.is_some())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SocketEntry> {
        self.entries.get_mut(index).filter(|e| e.handle.is_some())
    }

    /// Record `len` bytes waiting on the module for `handle`. Unknown handles
    /// are ignored.
    pub fn set_pending(&mut self, handle: SocketHandle, len: u32) -> bool {
        match self.find(handle) {
            Some(index) => {
                self.entries[index].pending = len;
                true
            }
            None => false,
        }
    }

    /// Occupied slots with their index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SocketEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.handle.is_some())
    }
}
