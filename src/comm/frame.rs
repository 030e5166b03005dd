//! Message framing between workers.

use std::io::{self, Read, Write};

/// Message category. Receivers name the tag they expect; a mismatch is a
/// protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Run header broadcast by the coordinator.
    Header,
    /// Initial partition rows from the coordinator.
    Scatter,
    /// Last owned row, travelling to rank + 1.
    HaloDown,
    /// First owned row, travelling to rank - 1.
    HaloUp,
    /// Per-generation snapshot rows (trace mode).
    Snapshot,
    /// Final partition rows back to the coordinator.
    Gather,
    /// Empty synchronization message.
    Barrier,
}

impl Tag {
    pub const ALL: [Tag; 7] = [
        Tag::Header,
        Tag::Scatter,
        Tag::HaloDown,
        Tag::HaloUp,
        Tag::Snapshot,
        Tag::Gather,
        Tag::Barrier,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A tagged byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub tag: Tag,
    pub data: Vec<u8>,
}

/// Run parameters broadcast from the coordinator before scatter.
///
/// ```text
/// Rows: u64 (LE)
/// Columns: u64 (LE)
/// Generations: u64 (LE)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunHeader {
    pub rows: u64,
    pub columns: u64,
    pub generations: u64,
}

impl RunHeader {
    /// Size of header in bytes.
    pub const SIZE: usize = 24;

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.rows.to_le_bytes())?;
        w.write_all(&self.columns.to_le_bytes())?;
        w.write_all(&self.generations.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf8 = [0u8; 8];

        r.read_exact(&mut buf8)?;
        let rows = u64::from_le_bytes(buf8);

        r.read_exact(&mut buf8)?;
        let columns = u64::from_le_bytes(buf8);

        r.read_exact(&mut buf8)?;
        let generations = u64::from_le_bytes(buf8);

        Ok(Self {
            rows,
            columns,
            generations,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        buf
    }

    /// Decode a header, rejecting payloads of the wrong size.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Run header must be {} bytes, got {}", Self::SIZE, bytes.len()),
            ));
        }
        Self::read_from(&mut &bytes[..])
    }
}

/// Per-tag message and byte counters for one worker's outgoing traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traffic {
    messages: [u64; Tag::ALL.len()],
    bytes: [u64; Tag::ALL.len()],
}

impl Traffic {
    pub(crate) fn record(&mut self, tag: Tag, bytes: usize) {
        self.messages[tag.index()] += 1;
        self.bytes[tag.index()] += bytes as u64;
    }

    pub fn messages(&self, tag: Tag) -> u64 {
        self.messages[tag.index()]
    }

    pub fn bytes(&self, tag: Tag) -> u64 {
        self.bytes[tag.index()]
    }

    /// Bytes sent in both halo directions.
    pub fn halo_bytes(&self) -> u64 {
        self.bytes(Tag::HaloDown) + self.bytes(Tag::HaloUp)
    }

    pub fn total_messages(&self) -> u64 {
        self.messages.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = RunHeader {
            rows: 640,
            columns: 480,
            generations: 1000,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), RunHeader::SIZE);
        assert_eq!(RunHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_wrong_size() {
        let err = RunHeader::from_bytes(&[0u8; 10]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_traffic_counters() {
        let mut traffic = Traffic::default();
        traffic.record(Tag::HaloDown, 5);
        traffic.record(Tag::HaloUp, 5);
        traffic.record(Tag::Gather, 20);
        assert_eq!(traffic.halo_bytes(), 10);
        assert_eq!(traffic.messages(Tag::Gather), 1);
        assert_eq!(traffic.total_messages(), 3);
    }
}
