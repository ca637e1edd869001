// src/graph/codec.rs
//! Follow page wire codec.
//!
//! A page payload is, outside in:
//! - `0x`-prefixed hex
//! - an Avro-binary record with a single `bytes` field holding the
//!   compressed graph
//! - a zlib stream
//! - an Avro-binary array of `{userId: long, since: long}` records
//!
//! Longs use Avro's zigzag varint encoding. Decoding of a corrupt page
//! degrades to an empty edge list so one bad page cannot block an actor's
//! whole follow list; the failure is logged, not raised.

use crate::models::graph::GraphEdge;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

#[derive(Debug)]
enum CodecError {
    Truncated,
    TrailingBytes,
    Zlib(std::io::Error),
    Hex(hex::FromHexError),
    MissingPrefix,
    NegativeValue,
}

/// Encodes an edge list into a page payload.
pub fn encode_page(edges: &[GraphEdge]) -> String {
    let inner = encode_edge_list(edges);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    encoder.write_all(&inner).expect("write to Vec");
    let compressed = encoder.finish().expect("finish to Vec");

    let mut container = Vec::with_capacity(compressed.len() + 4);
    write_long(compressed.len() as i64, &mut container);
    container.extend_from_slice(&compressed);

    format!("0x{}", hex::encode(container))
}

/// Decodes a page payload into its edge list.
///
/// Corrupt payloads decode to an empty list.
pub fn decode_page(payload: &str) -> Vec<GraphEdge> {
    match try_decode_page(payload) {
        Ok(edges) => edges,
        Err(error) => {
            log::warn!("failed to parse follow page, treating as empty: {:?}", error);
            Vec::new()
        }
    }
}

fn try_decode_page(payload: &str) -> Result<Vec<GraphEdge>, CodecError> {
    let raw = payload.strip_prefix("0x").ok_or(CodecError::MissingPrefix)?;
    let container = hex::decode(raw).map_err(CodecError::Hex)?;

    let mut rest = container.as_slice();
    let compressed = read_bytes(&mut rest)?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes);
    }

    let mut inner = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut inner)
        .map_err(CodecError::Zlib)?;

    decode_edge_list(&inner)
}

fn encode_edge_list(edges: &[GraphEdge]) -> Vec<u8> {
    let mut out = Vec::with_capacity(edges.len() * 8 + 2);
    if !edges.is_empty() {
        write_long(edges.len() as i64, &mut out);
        for edge in edges {
            write_long(edge.user_id as i64, &mut out);
            write_long(edge.since as i64, &mut out);
        }
    }
    // Empty block terminates the array.
    write_long(0, &mut out);
    out
}

fn decode_edge_list(mut data: &[u8]) -> Result<Vec<GraphEdge>, CodecError> {
    let mut edges = Vec::new();
    loop {
        let mut count = read_long(&mut data)?;
        if count == 0 {
            break;
        }
        // A negative count carries the block byte size after it.
        if count < 0 {
            count = -count;
            let _block_size = read_long(&mut data)?;
        }
        for _ in 0..count {
            let user_id = read_long(&mut data)?;
            let since = read_long(&mut data)?;
            if user_id < 0 || since < 0 {
                return Err(CodecError::NegativeValue);
            }
            edges.push(GraphEdge {
                user_id: user_id as u64,
                since: since as u64,
            });
        }
    }
    if !data.is_empty() {
        return Err(CodecError::TrailingBytes);
    }
    Ok(edges)
}

fn read_bytes<'a>(data: &mut &'a [u8]) -> Result<&'a [u8], CodecError> {
    let length = read_long(data)?;
    if length < 0 || length as usize > data.len() {
        return Err(CodecError::Truncated);
    }
    let (bytes, rest) = data.split_at(length as usize);
    *data = rest;
    Ok(bytes)
}

fn write_long(value: i64, out: &mut Vec<u8>) {
    // zigzag then LEB128
    let mut encoded = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let mut byte = (encoded & 0x7f) as u8;
        encoded >>= 7;
        if encoded != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if encoded == 0 {
            break;
        }
    }
}

fn read_long(data: &mut &[u8]) -> Result<i64, CodecError> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    loop {
        let (byte, rest) = data.split_first().ok_or(CodecError::Truncated)?;
        *data = rest;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 63 {
            return Err(CodecError::Truncated);
        }
    }
    Ok(((value >> 1) as i64) ^ -((value & 1) as i64))
}
