//! Wire format of rejection messages: a `u16` byte length, then UTF-8 of at most
//! [`MAX_MESSAGE_LENGTH`] bytes.

use bytes::{Buf, BufMut};
use commonware_codec::{Error, ReadExt, Write};

use super::MAX_MESSAGE_LENGTH;

/// Longest prefix of `message` that fits the cap without splitting a character.
pub fn truncate_message(message: &str) -> &str {
    if message.len() <= MAX_MESSAGE_LENGTH {
        return message;
    }
    let mut end = MAX_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

/// Write `message`, truncated to the cap.
pub fn write_message(message: &str, writer: &mut impl BufMut) {
    let bytes = truncate_message(message).as_bytes();
    (bytes.len() as u16).write(writer);
    writer.put_slice(bytes);
}

pub fn read_message(reader: &mut impl Buf) -> Result<String, Error> {
    let len = u16::read(reader)? as usize;
    if len > MAX_MESSAGE_LENGTH {
        return Err(Error::Invalid("Message", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("Message", "invalid UTF-8"))
}

pub fn message_encode_size(message: &str) -> usize {
    2 + truncate_message(message).len()
}
