// ABOUTME: Buffered PDU framing over any async byte stream used as an SMPP transport
// ABOUTME: Reads whole length-prefixed PDUs, flushes every write, supports a non-blocking fill

use crate::client::SmppError;
use crate::codec::{HEADER_LEN, Pdu, PduHeader};
use bytes::{Buf, BytesMut};
use std::future::Future;
use std::task::Poll;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};

/// Frame-level I/O for one SMPP session.
///
/// The connection does not track bind state; the client above it owns the
/// session state machine and the deadlines. Every future returned here is
/// cancel safe: dropping it part way leaves at most an incomplete frame in
/// the read buffer, which the caller removes with [`Connection::discard_buffered`].
#[derive(Debug)]
pub struct Connection<T> {
    // The transport, decorated with a `BufWriter` so a PDU goes out in one write.
    stream: BufWriter<T>,

    // The buffer for reading frames.
    buffer: BytesMut,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection<T> {
    pub fn new(socket: T) -> Connection<T> {
        Connection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read a single PDU from the underlying stream.
    ///
    /// Waits until a complete frame is buffered. Bytes beyond that frame stay
    /// in the buffer for the next call. End of stream is reported as
    /// `ConnectionClosed` whether or not a frame was cut in half.
    pub async fn read_pdu(&mut self) -> Result<Pdu, SmppError> {
        loop {
            if let Some(pdu) = self.parse_pdu()? {
                return Ok(pdu);
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return Err(SmppError::ConnectionClosed);
            }
        }
    }

    /// Parses one complete PDU out of the buffer, if one is there.
    ///
    /// A header with an impossible length is an error; the stream cannot be
    /// resynchronised after it.
    pub fn parse_pdu(&mut self) -> Result<Option<Pdu>, SmppError> {
        let Some(header_bytes) = self.buffer.first_chunk::<HEADER_LEN>() else {
            return Ok(None);
        };
        let header = PduHeader::parse(header_bytes)?;
        let len = header.command_length as usize;
        if self.buffer.len() < len {
            return Ok(None);
        }

        let pdu = Pdu::decode(&header, &self.buffer[HEADER_LEN..len]);
        self.buffer.advance(len);
        Ok(Some(pdu))
    }

    /// Moves whatever bytes the transport already has into the read buffer
    /// without waiting for more. Returns the number of bytes read.
    pub async fn fill_available(&mut self) -> Result<usize, SmppError> {
        // Let the reactor record readiness before the single poll below.
        tokio::task::yield_now().await;

        let read = self.stream.read_buf(&mut self.buffer);
        tokio::pin!(read);
        let polled = std::future::poll_fn(|cx| Poll::Ready(read.as_mut().poll(cx))).await;

        match polled {
            Poll::Pending => Ok(0),
            Poll::Ready(Ok(0)) => Err(SmppError::ConnectionClosed),
            Poll::Ready(Ok(n)) => Ok(n),
            Poll::Ready(Err(e)) => Err(e.into()),
        }
    }

    /// Drops any partially received frame.
    pub fn discard_buffered(&mut self) {
        self.buffer.clear();
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Write a single PDU and flush it to the transport.
    ///
    /// A PDU over `MAX_PDU_SIZE` is rejected before any byte is written.
    pub async fn write_pdu(&mut self, pdu: &Pdu) -> Result<(), SmppError> {
        pdu.check_length()?;
        self.stream.write_all(&pdu.encode()).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::CommandId;
    use tokio::io::duplex;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn reads_frames_split_across_writes() {
        runtime().block_on(async {
            let (client, mut peer) = duplex(1024);
            let mut conn = Connection::new(client);

            let mut first = Pdu::new(CommandId::EnquireLink, 1).encode().to_vec();
            let second = Pdu::new(CommandId::EnquireLinkResp, 2).encode();
            first.extend_from_slice(&second[..4]);

            peer.write_all(&first).await.unwrap();
            assert_eq!(conn.read_pdu().await.unwrap().sequence_number, 1);

            peer.write_all(&second[4..]).await.unwrap();
            let pdu = conn.read_pdu().await.unwrap();
            assert_eq!(pdu.command_id, CommandId::EnquireLinkResp);
            assert_eq!(conn.buffered_len(), 0);
        });
    }

    #[test]
    fn write_is_flushed() {
        runtime().block_on(async {
            let (client, mut peer) = duplex(1024);
            let mut conn = Connection::new(client);

            let pdu = Pdu::new(CommandId::Unbind, 9);
            conn.write_pdu(&pdu).await.unwrap();

            let mut buf = [0u8; HEADER_LEN];
            peer.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf[..], &pdu.encode()[..]);
        });
    }

    #[test]
    fn closed_peer_is_reported() {
        runtime().block_on(async {
            let (client, peer) = duplex(64);
            let mut conn = Connection::new(client);
            drop(peer);
            assert!(matches!(
                conn.read_pdu().await,
                Err(SmppError::ConnectionClosed)
            ));
        });
    }

    #[test]
    fn fill_available_does_not_wait() {
        runtime().block_on(async {
            let (client, mut peer) = duplex(1024);
            let mut conn = Connection::new(client);

            assert_eq!(conn.fill_available().await.unwrap(), 0);

            peer.write_all(&Pdu::new(CommandId::EnquireLink, 4).encode())
                .await
                .unwrap();
            assert_eq!(conn.fill_available().await.unwrap(), HEADER_LEN);
            assert_eq!(conn.parse_pdu().unwrap().map(|p| p.sequence_number), Some(4));
        });
    }

    #[test]
    fn bad_length_is_a_codec_error() {
        runtime().block_on(async {
            let (client, mut peer) = duplex(1024);
            let mut conn = Connection::new(client);

            let mut wire = Pdu::new(CommandId::EnquireLink, 1).encode().to_vec();
            wire[0..4].copy_from_slice(&4u32.to_be_bytes());
            peer.write_all(&wire).await.unwrap();

            assert!(matches!(conn.read_pdu().await, Err(SmppError::Codec(_))));
        });
    }

    #[test]
    fn oversized_pdu_is_not_written() {
        runtime().block_on(async {
            let (client, mut peer) = duplex(1024);
            let mut conn = Connection::new(client);

            let mut big = Pdu::new(CommandId::SubmitSm, 1);
            big.write_octets(&vec![b'x'; crate::codec::MAX_PDU_SIZE as usize]);
            assert!(matches!(
                conn.write_pdu(&big).await,
                Err(SmppError::Codec(crate::codec::CodecError::FieldTooLong { .. }))
            ));

            let small = Pdu::new(CommandId::EnquireLink, 2);
            conn.write_pdu(&small).await.unwrap();
            let mut buf = [0u8; HEADER_LEN];
            peer.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf[..], &small.encode()[..]);
        });
    }
}
