//! In-process communicator backed by one channel per ordered pair of ranks.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};

use super::{CommError, Communicator, Envelope, Tag, Traffic};
use crate::schema::Transport;

enum Outbox {
    Rendezvous(SyncSender<Envelope>),
    Buffered(Sender<Envelope>),
}

impl Outbox {
    fn send(&self, envelope: Envelope) -> Result<(), mpsc::SendError<Envelope>> {
        match self {
            Outbox::Rendezvous(tx) => tx.send(envelope),
            Outbox::Buffered(tx) => tx.send(envelope),
        }
    }
}

/// One rank's endpoint in a fully connected channel mesh.
///
/// Each endpoint is moved into its worker thread; nothing is shared between
/// endpoints except the channels themselves. Dropping an endpoint (for example
/// when its worker fails) disconnects every peer blocked on it.
pub struct ChannelComm {
    rank: usize,
    size: usize,
    /// `outboxes[dest]`, `None` at `rank`.
    outboxes: Vec<Option<Outbox>>,
    /// `inboxes[source]`, `None` at `rank`.
    inboxes: Vec<Option<Receiver<Envelope>>>,
    traffic: RefCell<Traffic>,
}

impl ChannelComm {
    /// Build endpoints for `size` ranks, returned in rank order.
    pub fn mesh(size: usize, transport: Transport) -> Vec<ChannelComm> {
        let mut outboxes: Vec<Vec<Option<Outbox>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Envelope>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

        for src in 0..size {
            for dst in (0..size).filter(|&d| d != src) {
                let (outbox, inbox) = match transport {
                    Transport::Rendezvous => {
                        let (tx, rx) = mpsc::sync_channel(0);
                        (Outbox::Rendezvous(tx), rx)
                    }
                    Transport::Buffered => {
                        let (tx, rx) = mpsc::channel();
                        (Outbox::Buffered(tx), rx)
                    }
                };
                outboxes[src][dst] = Some(outbox);
                inboxes[dst][src] = Some(inbox);
            }
        }

        outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| ChannelComm {
                rank,
                size,
                outboxes,
                inboxes,
                traffic: RefCell::new(Traffic::default()),
            })
            .collect()
    }

    /// Outgoing traffic recorded so far.
    pub fn traffic(&self) -> Traffic {
        self.traffic.borrow().clone()
    }

    fn invalid_peer(&self, peer: usize) -> CommError {
        CommError::InvalidPeer {
            rank: self.rank,
            peer,
            size: self.size,
        }
    }
}

impl Communicator for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: usize, tag: Tag, data: Vec<u8>) -> Result<(), CommError> {
        let outbox = self
            .outboxes
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or_else(|| self.invalid_peer(dest))?;

        let len = data.len();
        outbox
            .send(Envelope { tag, data })
            .map_err(|_| CommError::Disconnected { peer: dest })?;
        self.traffic.borrow_mut().record(tag, len);
        Ok(())
    }

    fn recv(&self, source: usize, tag: Tag) -> Result<Vec<u8>, CommError> {
        let inbox = self
            .inboxes
            .get(source)
            .and_then(Option::as_ref)
            .ok_or_else(|| self.invalid_peer(source))?;

        let envelope = inbox
            .recv()
            .map_err(|_| CommError::Disconnected { peer: source })?;
        if envelope.tag != tag {
            return Err(CommError::UnexpectedTag {
                rank: self.rank,
                source_rank: source,
                expected: tag,
                actual: envelope.tag,
            });
        }
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_point_to_point_rendezvous() {
        let mut mesh = ChannelComm::mesh(2, Transport::Rendezvous);
        let b = mesh.pop().unwrap();
        let a = mesh.pop().unwrap();

        let handle = thread::spawn(move || b.recv(0, Tag::Scatter).unwrap());
        a.send(1, Tag::Scatter, vec![1, 0, 1]).unwrap();
        assert_eq!(handle.join().unwrap(), vec![1, 0, 1]);
        assert_eq!(a.traffic().bytes(Tag::Scatter), 3);
    }

    #[test]
    fn test_buffered_send_does_not_block() {
        let mut mesh = ChannelComm::mesh(2, Transport::Buffered);
        let b = mesh.pop().unwrap();
        let a = mesh.pop().unwrap();

        a.send(1, Tag::HaloDown, vec![1]).unwrap();
        a.send(1, Tag::HaloDown, vec![2]).unwrap();
        assert_eq!(b.recv(0, Tag::HaloDown).unwrap(), vec![1]);
        assert_eq!(b.recv(0, Tag::HaloDown).unwrap(), vec![2]);
    }

    #[test]
    fn test_unexpected_tag() {
        let mut mesh = ChannelComm::mesh(2, Transport::Buffered);
        let b = mesh.pop().unwrap();
        let a = mesh.pop().unwrap();

        a.send(1, Tag::Gather, vec![]).unwrap();
        let err = b.recv(0, Tag::HaloUp).unwrap_err();
        assert_eq!(
            err,
            CommError::UnexpectedTag {
                rank: 1,
                source_rank: 0,
                expected: Tag::HaloUp,
                actual: Tag::Gather,
            }
        );
    }

    #[test]
    fn test_self_and_out_of_range_peers() {
        let mesh = ChannelComm::mesh(2, Transport::Buffered);
        assert!(matches!(
            mesh[0].send(0, Tag::Barrier, vec![]),
            Err(CommError::InvalidPeer { peer: 0, .. })
        ));
        assert!(matches!(
            mesh[0].recv(5, Tag::Barrier),
            Err(CommError::InvalidPeer { peer: 5, .. })
        ));
    }

    #[test]
    fn test_dropped_peer_disconnects() {
        let mut mesh = ChannelComm::mesh(2, Transport::Rendezvous);
        drop(mesh.pop());
        let a = mesh.pop().unwrap();
        assert_eq!(
            a.recv(1, Tag::Gather),
            Err(CommError::Disconnected { peer: 1 })
        );
        assert_eq!(
            a.send(1, Tag::Gather, vec![0]),
            Err(CommError::Disconnected { peer: 1 })
        );
    }

    #[test]
    fn test_collectives() {
        let mesh = ChannelComm::mesh(4, Transport::Rendezvous);

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = mesh
                .into_iter()
                .map(|comm| {
                    s.spawn(move || {
                        let rank = comm.rank();
                        let mut header = if rank == 0 { vec![42] } else { Vec::new() };
                        comm.broadcast(0, &mut header).unwrap();

                        let parts = if rank == 0 {
                            (0..4u8).map(|r| vec![r * 10]).collect()
                        } else {
                            Vec::new()
                        };
                        let mine = comm.scatter(0, parts).unwrap();
                        comm.barrier().unwrap();

                        let gathered = comm.gather(0, Tag::Gather, vec![mine[0] + 1]).unwrap();
                        (header, mine, gathered)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (rank, (header, mine, gathered)) in results.iter().enumerate() {
            assert_eq!(header, &vec![42]);
            assert_eq!(mine, &vec![rank as u8 * 10]);
            if rank == 0 {
                assert_eq!(
                    gathered.as_ref().unwrap(),
                    &vec![vec![1], vec![11], vec![21], vec![31]]
                );
            } else {
                assert!(gathered.is_none());
            }
        }
    }
}
