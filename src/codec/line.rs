//! CRLF line scanning over the shared read buffer.
//!
//! Every protocol decision above the byte level happens at line
//! granularity, and lines arrive split at arbitrary read boundaries.
//! Centralizing the scan here keeps the partial-match handling in one
//! place: a line is complete only when its two-byte CRLF terminator is
//! buffered, and nothing is consumed until then.

use bytes::{Buf, BytesMut};

/// Consumes one CRLF-terminated line from the front of `src`.
///
/// Returns the line without its terminator, decoded as ISO-8859-1 (every
/// byte maps to the code point of the same value, so decoding never
/// fails). An immediate CRLF yields an empty string. Returns `None`
/// without touching `src` when no full line is buffered yet; a lone CR at
/// the end of the buffer stays put until its LF arrives.
pub(crate) fn take_crlf_line(src: &mut BytesMut) -> Option<String> {
    let end = src.windows(2).position(|window| window == b"\r\n")?;
    let line = latin1(&src[..end]);
    src.advance(end + 2);
    Some(line)
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_through_the_terminator() {
        let mut src = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: a\r\n"[..]);
        assert_eq!(take_crlf_line(&mut src).unwrap(), "GET / HTTP/1.1");
        assert_eq!(&src[..], b"Host: a\r\n");
    }

    #[test]
    fn empty_line_is_an_empty_string() {
        let mut src = BytesMut::from(&b"\r\nrest"[..]);
        assert_eq!(take_crlf_line(&mut src).unwrap(), "");
        assert_eq!(&src[..], b"rest");
    }

    #[test]
    fn straddled_crlf_waits_for_the_second_byte() {
        let mut src = BytesMut::from(&b"foo\r"[..]);
        assert_eq!(take_crlf_line(&mut src), None);
        assert_eq!(&src[..], b"foo\r");

        src.extend_from_slice(b"\nbar");
        assert_eq!(take_crlf_line(&mut src).unwrap(), "foo");
        assert_eq!(&src[..], b"bar");
    }

    #[test]
    fn bare_lf_is_not_a_terminator() {
        let mut src = BytesMut::from(&b"foo\nbar"[..]);
        assert_eq!(take_crlf_line(&mut src), None);
    }

    #[test]
    fn high_bytes_decode_as_latin1() {
        let mut src = BytesMut::from(&b"caf\xe9\r\n"[..]);
        assert_eq!(take_crlf_line(&mut src).unwrap(), "caf\u{e9}");
    }
}
