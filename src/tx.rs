//! Translates a CBOR-described transaction into a canonical EIP-1559 RLP
//! payload, and parses the result back out.

use crate::cbor::{Cursor as CborCursor, Type as CborType};
use crate::error::{Error, Result};
use crate::rlp::{Builder as RlpBuilder, Cursor as RlpCursor};

/// The EIP-2718 envelope byte for a fee-market (EIP-1559) transaction.
const ENVELOPE_TYPE: u8 = 2;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Data,
    Address,
    NullableAddress,
    Number,
}

fn append_field(rlp: &mut RlpBuilder, format: Format, tx: CborCursor, key: &str) -> Result<()> {
    let value = match tx.follow_key(key) {
        Ok(v) => v,
        Err(Error::NotFound) => return rlp.append_data(&[]),
        Err(e) => return Err(e),
    };

    if !value.check_type(&[CborType::Data]) {
        return Err(Error::BadData);
    }
    let mut bytes = value.get_data()?;

    match format {
        Format::Number => {
            while !bytes.is_empty() && bytes[0] == 0 {
                bytes = &bytes[1..];
            }
            if bytes.len() > 32 {
                return Err(Error::Overflow);
            }
        }
        Format::Address => {
            if bytes.len() != 20 {
                return Err(Error::BadData);
            }
        }
        Format::NullableAddress => {
            if !bytes.is_empty() && bytes.len() != 20 {
                return Err(Error::BadData);
            }
        }
        Format::Data => {}
    }

    rlp.append_data(bytes)
}

fn append_access_list(rlp: &mut RlpBuilder, tx: CborCursor) -> Result<()> {
    let access_list = match tx.follow_key("accessList") {
        Ok(v) => v,
        Err(Error::NotFound) => return rlp.append_array(0),
        Err(e) => return Err(e),
    };
    if !access_list.check_type(&[CborType::Array]) {
        return Err(Error::BadData);
    }

    let outer_tag = rlp.append_array_mutable()?;
    let mut i = 0usize;
    let mut iter = access_list.iterate();
    while let Some(entry) = iter.next_child() {
        let entry = entry?;
        if !entry.check_length(&[CborType::Array], 2) {
            return Err(Error::BadData);
        }

        rlp.append_array(2)?;

        let address = entry.follow_index(0)?.get_data()?;
        if address.len() != 20 {
            return Err(Error::BadData);
        }
        rlp.append_data(address)?;

        let slots = entry.follow_index(1)?;
        if !slots.check_type(&[CborType::Array]) {
            return Err(Error::BadData);
        }

        let slots_tag = rlp.append_array_mutable()?;
        let mut si = 0usize;
        let mut slot_iter = slots.iterate();
        while let Some(slot) = slot_iter.next_child() {
            let data = slot?.get_data()?;
            if data.len() != 32 {
                return Err(Error::BadData);
            }
            rlp.append_data(data)?;
            si += 1;
            rlp.adjust_count(slots_tag, si)?;
        }

        i += 1;
        rlp.adjust_count(outer_tag, i)?;
    }

    Ok(())
}

fn serialize_1559(tx: CborCursor, rlp: &mut RlpBuilder) -> Result<()> {
    rlp.append_array(9)?;
    append_field(rlp, Format::Number, tx, "chainId")?;
    append_field(rlp, Format::Number, tx, "nonce")?;
    append_field(rlp, Format::Number, tx, "maxPriorityFeePerGas")?;
    append_field(rlp, Format::Number, tx, "maxFeePerGas")?;
    append_field(rlp, Format::Number, tx, "gasLimit")?;
    append_field(rlp, Format::NullableAddress, tx, "to")?;
    append_field(rlp, Format::Number, tx, "value")?;
    append_field(rlp, Format::Data, tx, "data")?;
    append_access_list(rlp, tx)
}

fn read_type(tx: CborCursor) -> Result<u8> {
    let value = tx.follow_key("type")?;
    if !value.check_type(&[CborType::Data]) {
        return Err(Error::BadData);
    }
    let bytes = value.get_data()?;
    if bytes.len() > 8 {
        return Err(Error::Overflow);
    }
    let raw = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
    if raw > 0x7f {
        return Err(Error::UnsupportedFeature);
    }
    Ok(raw as u8)
}

/// Serializes an unsigned EIP-1559 transaction as `[0x02] ||
/// RLP([chainId, nonce, maxPriorityFeePerGas, maxFeePerGas, gasLimit, to,
/// value, data, accessList])`, returning the number of bytes written.
///
/// `tx` must be a CBOR map with a `type` field of `2`; any other value
/// fails with [`Error::UnsupportedFeature`] (this serializer covers
/// EIP-1559 only).
pub fn serialize_unsigned(tx: CborCursor, out: &mut [u8]) -> Result<usize> {
    let ty = read_type(tx)?;
    if ty != ENVELOPE_TYPE {
        return Err(Error::UnsupportedFeature);
    }
    if out.is_empty() {
        return Err(Error::BufferOverrun);
    }
    out[0] = ENVELOPE_TYPE;

    let mut rlp = RlpBuilder::new(&mut out[1..]);
    serialize_1559(tx, &mut rlp)?;
    let length = rlp.finalize()?;
    Ok(length + 1)
}

fn rlp_body(tx: &[u8]) -> Result<RlpCursor<'_>> {
    if tx.is_empty() || tx[0] != ENVELOPE_TYPE {
        return Err(Error::UnsupportedFeature);
    }
    if tx.len() < 2 {
        return Err(Error::BadData);
    }
    Ok(RlpCursor::walk(&tx[1..]))
}

fn read_field(tx: &[u8], format: Format, index: usize) -> Result<&[u8]> {
    let rlp = rlp_body(tx)?;
    let count = rlp.get_array_count()?;
    if count != 9 && count != 12 {
        return Err(Error::BadData);
    }
    let data = rlp.follow_index(index)?.get_data()?;
    match format {
        Format::Address if data.len() == 20 => Ok(data),
        Format::NullableAddress if data.is_empty() || data.len() == 20 => Ok(data),
        Format::Number if data.len() <= 32 => Ok(data),
        Format::Data => Ok(data),
        _ => Err(Error::BadData),
    }
}

/// The `chainId` field of a serialized transaction.
pub fn get_chain_id(tx: &[u8]) -> Result<&[u8]> {
    read_field(tx, Format::Number, 0)
}

/// The `to` field; empty for a contract-creation transaction.
pub fn get_address(tx: &[u8]) -> Result<&[u8]> {
    read_field(tx, Format::NullableAddress, 5)
}

/// The `data` (calldata) field.
pub fn get_data(tx: &[u8]) -> Result<&[u8]> {
    read_field(tx, Format::Data, 7)
}

/// The `value` field.
pub fn get_value(tx: &[u8]) -> Result<&[u8]> {
    read_field(tx, Format::Number, 6)
}

/// True if the transaction carries a signature (`yParity, r, s` appended,
/// 12 fields total instead of 9).
pub fn is_signed(tx: &[u8]) -> bool {
    rlp_body(tx)
        .and_then(|rlp| rlp.get_array_count())
        .map(|count| count == 12)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cbor::Builder as CborBuilder;

    fn build_tx<'a>(buf: &'a mut [u8], to: Option<[u8; 20]>) -> &'a [u8] {
        let mut b = CborBuilder::new(buf);
        b.append_map(9).unwrap();
        b.append_string("type").unwrap();
        b.append_data(&[2]).unwrap();
        b.append_string("chainId").unwrap();
        b.append_data(&[1]).unwrap();
        b.append_string("nonce").unwrap();
        b.append_data(&[9]).unwrap();
        b.append_string("maxPriorityFeePerGas").unwrap();
        b.append_data(&1_000_000_000u32.to_be_bytes()).unwrap();
        b.append_string("maxFeePerGas").unwrap();
        b.append_data(&20_000_000_000u64.to_be_bytes()[3..]).unwrap();
        b.append_string("gasLimit").unwrap();
        b.append_data(&21000u32.to_be_bytes()[1..]).unwrap();
        b.append_string("to").unwrap();
        match to {
            Some(addr) => b.append_data(&addr).unwrap(),
            None => b.append_data(&[]).unwrap(),
        }
        b.append_string("value").unwrap();
        b.append_data(&1_000_000_000_000_000_000u64.to_be_bytes()).unwrap();
        b.append_string("data").unwrap();
        b.append_data(&[]).unwrap();
        b.as_bytes()
    }

    #[test]
    fn test_serialize_and_reparse() {
        let mut cbor_buf = [0u8; 256];
        let to = [0x35u8; 20];
        let cbor_bytes = build_tx(&mut cbor_buf, Some(to));
        let tx_cursor = CborCursor::walk(cbor_bytes);

        let mut rlp_buf = [0u8; 256];
        let len = serialize_unsigned(tx_cursor, &mut rlp_buf).unwrap();
        let tx = &rlp_buf[..len];

        assert_eq!(tx[0], 0x02);
        assert_eq!(get_chain_id(tx).unwrap(), &[1]);
        assert_eq!(get_address(tx).unwrap(), &to);
        assert_eq!(get_data(tx).unwrap(), &[] as &[u8]);
        assert!(!is_signed(tx));
    }

    #[test]
    fn test_contract_creation_has_empty_address() {
        let mut cbor_buf = [0u8; 256];
        let cbor_bytes = build_tx(&mut cbor_buf, None);
        let tx_cursor = CborCursor::walk(cbor_bytes);

        let mut rlp_buf = [0u8; 256];
        let len = serialize_unsigned(tx_cursor, &mut rlp_buf).unwrap();
        let tx = &rlp_buf[..len];

        assert_eq!(get_address(tx).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let mut cbor_buf = [0u8; 32];
        let mut b = CborBuilder::new(&mut cbor_buf);
        b.append_map(1).unwrap();
        b.append_string("type").unwrap();
        b.append_data(&[1]).unwrap();
        let tx_cursor = CborCursor::walk(b.as_bytes());

        let mut rlp_buf = [0u8; 32];
        assert_eq!(serialize_unsigned(tx_cursor, &mut rlp_buf), Err(Error::UnsupportedFeature));
    }

    #[test]
    fn test_access_list_round_trips() {
        let mut cbor_buf = [0u8; 512];
        let mut b = CborBuilder::new(&mut cbor_buf);
        b.append_map(9).unwrap();
        b.append_string("type").unwrap();
        b.append_data(&[2]).unwrap();
        b.append_string("chainId").unwrap();
        b.append_data(&[1]).unwrap();
        b.append_string("nonce").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("maxPriorityFeePerGas").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("maxFeePerGas").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("gasLimit").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("to").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("value").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("data").unwrap();
        b.append_data(&[]).unwrap();
        b.append_string("accessList").unwrap();
        b.append_array(1).unwrap();
        b.append_array(2).unwrap();
        b.append_data(&[0xaa; 20]).unwrap();
        b.append_array(2).unwrap();
        b.append_data(&[0x11; 32]).unwrap();
        b.append_data(&[0x22; 32]).unwrap();

        let tx_cursor = CborCursor::walk(b.as_bytes());
        let mut rlp_buf = [0u8; 512];
        let len = serialize_unsigned(tx_cursor, &mut rlp_buf).unwrap();
        let tx = &rlp_buf[..len];

        let rlp = rlp_body(tx).unwrap();
        let access_list = rlp.follow_index(8).unwrap();
        assert_eq!(access_list.get_array_count().unwrap(), 1);
        let entry = access_list.follow_index(0).unwrap();
        assert_eq!(entry.follow_index(0).unwrap().get_data().unwrap(), &[0xaa; 20]);
        let slots = entry.follow_index(1).unwrap();
        assert_eq!(slots.get_array_count().unwrap(), 2);
    }
}
