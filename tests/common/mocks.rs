//! Body stream doubles.

use bytes::Bytes;
use futures::stream;

use celine_chat::traits::{ByteStream, HttpError};

/// Body that yields `payload` as a single chunk.
pub fn single_chunk(payload: &[u8]) -> ByteStream {
    chunked(vec![payload.to_vec()])
}

/// Body made of the given chunks.
pub fn chunked(chunks: Vec<Vec<u8>>) -> ByteStream {
    Box::pin(stream::iter(
        chunks.into_iter().map(|c| Ok::<_, HttpError>(Bytes::from(c))),
    ))
}

/// Body split into two chunks at byte offset `at`.
pub fn split_at(payload: &[u8], at: usize) -> ByteStream {
    let (head, tail) = payload.split_at(at);
    chunked(vec![head.to_vec(), tail.to_vec()])
}

/// Body split at each offset in `cuts`. Offsets must be sorted and within
/// the payload; repeated offsets produce empty chunks.
pub fn split_at_all(payload: &[u8], cuts: &[usize]) -> ByteStream {
    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        chunks.push(payload[start..cut].to_vec());
        start = cut;
    }
    chunks.push(payload[start..].to_vec());
    chunked(chunks)
}

/// Body delivered one byte per chunk.
pub fn byte_by_byte(payload: &[u8]) -> ByteStream {
    chunked(payload.iter().map(|b| vec![*b]).collect())
}

/// Body that fails with `error` after the given chunks.
pub fn failing_after(chunks: Vec<Vec<u8>>, error: HttpError) -> ByteStream {
    let items = chunks
        .into_iter()
        .map(|c| Ok(Bytes::from(c)))
        .chain(std::iter::once(Err(error)));
    Box::pin(stream::iter(items))
}
