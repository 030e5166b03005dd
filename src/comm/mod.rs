//! Rank-addressed message passing between workers.
//!
//! Workers share no memory. Every interaction goes through a [`Communicator`]:
//! blocking point-to-point `send`/`recv` addressed by rank, plus MPI-shaped
//! collectives (broadcast, scatter, gather, barrier) built on top of them.
//! Point-to-point messages between a given pair of ranks are delivered in
//! order.

mod channel;
mod frame;

pub use channel::ChannelComm;
pub use frame::{Envelope, RunHeader, Tag, Traffic};

/// Communication errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommError {
    #[error("Peer {peer} disconnected")]
    Disconnected { peer: usize },
    #[error("Rank {rank} received {actual:?} from {source_rank}, expected {expected:?}")]
    UnexpectedTag {
        rank: usize,
        source_rank: usize,
        expected: Tag,
        actual: Tag,
    },
    #[error("Rank {rank} cannot address peer {peer} (communicator size {size})")]
    InvalidPeer {
        rank: usize,
        peer: usize,
        size: usize,
    },
    #[error("Scatter root must supply {expected} parts, got {actual}")]
    ScatterParts { expected: usize, actual: usize },
}

/// Blocking message passing among a fixed group of ranks.
pub trait Communicator {
    /// This worker's rank in `0..size()`.
    fn rank(&self) -> usize;

    /// Number of workers in the group.
    fn size(&self) -> usize;

    /// Send a tagged payload to `dest`. Depending on the transport this may
    /// block until `dest` receives it.
    fn send(&self, dest: usize, tag: Tag, data: Vec<u8>) -> Result<(), CommError>;

    /// Receive the next payload from `source`, which must carry `tag`.
    fn recv(&self, source: usize, tag: Tag) -> Result<Vec<u8>, CommError>;

    /// Copy `data` from `root` to every rank.
    fn broadcast(&self, root: usize, data: &mut Vec<u8>) -> Result<(), CommError> {
        if self.rank() == root {
            for dest in (0..self.size()).filter(|&r| r != root) {
                self.send(dest, Tag::Header, data.clone())?;
            }
        } else {
            *data = self.recv(root, Tag::Header)?;
        }
        Ok(())
    }

    /// Distribute `parts[r]` from `root` to rank `r`; returns this rank's part.
    ///
    /// Only the root's `parts` are read.
    fn scatter(&self, root: usize, parts: Vec<Vec<u8>>) -> Result<Vec<u8>, CommError> {
        if self.rank() != root {
            return self.recv(root, Tag::Scatter);
        }
        if parts.len() != self.size() {
            return Err(CommError::ScatterParts {
                expected: self.size(),
                actual: parts.len(),
            });
        }

        let mut own = Vec::new();
        for (dest, part) in parts.into_iter().enumerate() {
            if dest == root {
                own = part;
            } else {
                self.send(dest, Tag::Scatter, part)?;
            }
        }
        Ok(own)
    }

    /// Collect one payload per rank at `root`, in rank order.
    ///
    /// Returns `Some(parts)` on the root and `None` elsewhere.
    fn gather(
        &self,
        root: usize,
        tag: Tag,
        part: Vec<u8>,
    ) -> Result<Option<Vec<Vec<u8>>>, CommError> {
        if self.rank() != root {
            self.send(root, tag, part)?;
            return Ok(None);
        }

        let mut parts = Vec::with_capacity(self.size());
        let mut own = Some(part);
        for source in 0..self.size() {
            if source == root {
                parts.push(own.take().unwrap_or_default());
            } else {
                parts.push(self.recv(source, tag)?);
            }
        }
        Ok(Some(parts))
    }

    /// Block until every rank has entered the barrier.
    fn barrier(&self) -> Result<(), CommError> {
        const ROOT: usize = 0;
        self.gather(ROOT, Tag::Barrier, Vec::new())?;
        if self.rank() == ROOT {
            for dest in 1..self.size() {
                self.send(dest, Tag::Barrier, Vec::new())?;
            }
        } else {
            self.recv(ROOT, Tag::Barrier)?;
        }
        Ok(())
    }
}
