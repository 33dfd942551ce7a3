use crate::archive::format::{EntryType, Header, RECORD_SIZE};
use crate::error::{Result, TarError};

/// Raw 512-byte header record as it appears on the wire
pub type RawRecord = [u8; RECORD_SIZE];

// Field offsets within a raw record
//
// Structure (512 bytes fixed):
// - name: 100 bytes, NUL-terminated
// - mode, owner, group: 8 bytes each, octal ASCII
// - size, mtime: 12 bytes each, octal ASCII
// - checksum: 8 bytes, 6 octal digits + NUL + space
// - type: 1 byte
// - linkname: 100 bytes, NUL-terminated
// - zero padding: 255 bytes
const NAME: (usize, usize) = (0, 100);
const MODE: (usize, usize) = (100, 8);
const OWNER: (usize, usize) = (108, 8);
// group (116, 8) is never populated
const SIZE: (usize, usize) = (124, 12);
const MTIME: (usize, usize) = (136, 12);
const CHECKSUM: (usize, usize) = (148, 8);
const TYPE: usize = 156;
const LINKNAME: (usize, usize) = (157, 100);

fn field(record: &RawRecord, (offset, len): (usize, usize)) -> &[u8] {
    &record[offset..offset + len]
}

fn field_mut(record: &mut RawRecord, (offset, len): (usize, usize)) -> &mut [u8] {
    &mut record[offset..offset + len]
}

/// Header checksum: 256 plus the sum of every byte outside the checksum field.
///
/// The constant stands in for the checksum field itself counted as eight spaces.
pub fn checksum(record: &RawRecord) -> u32 {
    let (offset, len) = CHECKSUM;
    let sum: u32 = record[..offset]
        .iter()
        .chain(&record[offset + len..])
        .map(|&b| b as u32)
        .sum();
    sum + 256
}

/// Decode a raw record.
///
/// A checksum field starting with NUL marks a null record (the archive
/// terminator), reported as [`TarError::NullRecord`] rather than a bad checksum.
/// Names are taken byte for byte; a name that is not UTF-8 is rejected with
/// [`TarError::InvalidName`] instead of being rewritten.
pub fn decode(record: &RawRecord) -> Result<Header> {
    if record[CHECKSUM.0] == 0 {
        return Err(TarError::NullRecord);
    }

    let actual = checksum(record);
    let expected = parse_octal(field(record, CHECKSUM)) as u32;
    if actual != expected {
        return Err(TarError::BadChecksum { expected, actual });
    }

    Ok(Header {
        name: read_str("name", field(record, NAME))?,
        mode: parse_octal(field(record, MODE)) as u32,
        owner: parse_octal(field(record, OWNER)) as u32,
        size: parse_octal(field(record, SIZE)),
        mtime: parse_octal(field(record, MTIME)),
        kind: EntryType::from_byte(record[TYPE]),
        linkname: read_str("linkname", field(record, LINKNAME))?,
    })
}

/// Encode a header into a fresh raw record.
///
/// Names and numbers that do not fit are truncated; see [`Header::validate`].
pub fn encode(header: &Header) -> RawRecord {
    let mut record = [0u8; RECORD_SIZE];

    write_octal(field_mut(&mut record, MODE), header.mode as u64);
    write_octal(field_mut(&mut record, OWNER), header.owner as u64);
    write_octal(field_mut(&mut record, SIZE), header.size);
    write_octal(field_mut(&mut record, MTIME), header.mtime);
    record[TYPE] = header.kind.as_byte();
    write_str(field_mut(&mut record, NAME), &header.name);
    write_str(field_mut(&mut record, LINKNAME), &header.linkname);

    let sum = checksum(&record);
    let slot = field_mut(&mut record, CHECKSUM);
    write_octal_padded(&mut slot[..6], sum as u64);
    slot[6] = 0;
    slot[7] = b' ';

    record
}

/// True when every byte of the record is zero
pub fn is_null(record: &RawRecord) -> bool {
    record.iter().all(|&b| b == 0)
}

/// Parse an octal ASCII field: leading spaces skipped, stops at the first non-octal byte
fn parse_octal(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| (b'0'..=b'7').contains(&b))
        .fold(0u64, |acc, &b| (acc << 3) | (b - b'0') as u64)
}

/// Left-aligned octal digits, remainder of the field left as NUL
fn write_octal(dst: &mut [u8], value: u64) {
    let mut digits = [0u8; 22];
    let mut n = value;
    let mut len = 0;
    loop {
        digits[len] = b'0' + (n & 7) as u8;
        n >>= 3;
        len += 1;
        if n == 0 {
            break;
        }
    }
    let len = len.min(dst.len());
    for (slot, digit) in dst.iter_mut().zip(digits[..len].iter().rev()) {
        *slot = *digit;
    }
}

/// Right-aligned, zero-padded octal digits filling the whole slice
fn write_octal_padded(dst: &mut [u8], value: u64) {
    let mut n = value;
    for slot in dst.iter_mut().rev() {
        *slot = b'0' + (n & 7) as u8;
        n >>= 3;
    }
}

fn read_str(field: &'static str, bytes: &[u8]) -> Result<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[..end].to_vec()).map_err(|err| TarError::InvalidName {
        field,
        bytes: err.into_bytes(),
    })
}

fn write_str(dst: &mut [u8], value: &str) {
    // Last byte stays NUL; never cut a character in half
    let mut len = value.len().min(dst.len() - 1);
    while !value.is_char_boundary(len) {
        len -= 1;
    }
    dst[..len].copy_from_slice(&value.as_bytes()[..len]);
}
