//! Shallow TLS record parsing.
//!
//! Walks every record in a TCP segment and every handshake message in
//! each handshake record. Only the ClientHello is looked into, and only
//! far enough to find the server_name extension (RFC 6066).

use crate::domain::{HandshakeKind, HandshakeMessage};

const RECORD_HEADER_LEN: usize = 5;
const HANDSHAKE_HEADER_LEN: usize = 4;

const CONTENT_TYPE_CHANGE_CIPHER_SPEC: u8 = 20;
const CONTENT_TYPE_HANDSHAKE: u8 = 22;
const CONTENT_TYPE_APPLICATION_DATA: u8 = 23;

const EXTENSION_SERVER_NAME: u16 = 0;
const SERVER_NAME_TYPE_HOST_NAME: u8 = 0;

/// Bounds-checked big-endian cursor over a byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn u8(&mut self) -> Option<u8> {
        let value = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn u16(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u24(&mut self) -> Option<usize> {
        let bytes = self.take(3)?;
        Some(((bytes[0] as usize) << 16) | ((bytes[1] as usize) << 8) | bytes[2] as usize)
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(len)?;
        let slice = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    /// Take up to `len` bytes, clamped to what is left.
    fn take_clamped(&mut self, len: usize) -> &'a [u8] {
        let len = len.min(self.remaining());
        let data = self.data;
        let slice = &data[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    fn skip(&mut self, len: usize) -> Option<()> {
        self.take(len).map(|_| ())
    }
}

/// Check whether the payload starts with something that looks like a TLS record.
pub fn looks_like_tls(payload: &[u8]) -> bool {
    payload.len() >= RECORD_HEADER_LEN
        && (CONTENT_TYPE_CHANGE_CIPHER_SPEC..=CONTENT_TYPE_APPLICATION_DATA).contains(&payload[0])
        && payload[1] == 3
}

/// Collect every handshake message in the segment, in wire order.
///
/// Records that are cut short by the segment boundary are parsed as far
/// as the bytes go. Anything after an invalid record header is ignored.
pub fn parse_handshakes(payload: &[u8]) -> Vec<HandshakeMessage> {
    let mut messages = Vec::new();
    let mut reader = Reader::new(payload);

    while looks_like_tls(&payload[reader.pos..]) {
        let header = match reader.take(RECORD_HEADER_LEN) {
            Some(header) => header,
            None => break,
        };
        let content_type = header[0];
        let record_len = u16::from_be_bytes([header[3], header[4]]) as usize;
        let body = reader.take_clamped(record_len);

        if content_type == CONTENT_TYPE_HANDSHAKE {
            parse_handshake_record(body, &mut messages);
        }
    }

    messages
}

fn parse_handshake_record(body: &[u8], messages: &mut Vec<HandshakeMessage>) {
    let mut reader = Reader::new(body);

    while reader.remaining() >= HANDSHAKE_HEADER_LEN {
        let (msg_type, msg_len) = match (reader.u8(), reader.u24()) {
            (Some(t), Some(l)) => (t, l),
            _ => break,
        };
        let msg_body = reader.take_clamped(msg_len);

        let kind = HandshakeKind::from_u8(msg_type);
        let mut message = HandshakeMessage::new(kind);
        if kind == HandshakeKind::ClientHello {
            message.server_name = client_hello_server_name(msg_body);
        }
        messages.push(message);
    }
}

/// Extract the SNI host name from a ClientHello body (without the 4-byte header).
pub fn client_hello_server_name(body: &[u8]) -> Option<String> {
    let mut reader = Reader::new(body);

    // client_version(2) + random(32)
    reader.skip(34)?;
    let session_id_len = reader.u8()? as usize;
    reader.skip(session_id_len)?;
    let cipher_suites_len = reader.u16()? as usize;
    reader.skip(cipher_suites_len)?;
    let compression_len = reader.u8()? as usize;
    reader.skip(compression_len)?;

    let extensions_len = reader.u16()? as usize;
    let mut extensions = Reader::new(reader.take_clamped(extensions_len));

    while extensions.remaining() >= 4 {
        let ext_type = extensions.u16()?;
        let ext_len = extensions.u16()? as usize;
        let ext_data = extensions.take(ext_len)?;

        if ext_type == EXTENSION_SERVER_NAME {
            return server_name_from_extension(ext_data);
        }
    }

    None
}

fn server_name_from_extension(data: &[u8]) -> Option<String> {
    let mut reader = Reader::new(data);
    let list_len = reader.u16()? as usize;
    let mut list = Reader::new(reader.take_clamped(list_len));

    while list.remaining() >= 3 {
        let name_type = list.u8()?;
        let name_len = list.u16()? as usize;
        let name = list.take(name_len)?;

        if name_type == SERVER_NAME_TYPE_HOST_NAME && !name.is_empty() {
            return std::str::from_utf8(name).ok().map(str::to_string);
        }
    }

    None
}
