//! Decoder für das Plutus-Inline-Datum des Vertrags.
//! Erwartete Struktur: Tag121[ Tag121[pubKeyHash, stakeCredHash], lockStatus ]

use thiserror::Error;

use crate::address::{self, HASH_LEN};
use crate::cbor::{CborError, CborReader, Major};

/// Plutus "Constr 0"
pub const CONSTR_0_TAG: u64 = 121;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDatum {
    pub pub_key_hash: [u8; HASH_LEN],
    pub stake_cred_hash: [u8; HASH_LEN],
    /// Aus beiden Hashes abgeleitete bech32-Adresse
    pub authority_address: String,
    pub is_locked: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatumError {
    #[error("empty datum")]
    Empty,
    #[error("invalid hex")]
    BadHex,
    #[error("truncated datum")]
    Truncated,
    #[error("malformed CBOR")]
    Malformed,
    #[error("expected constructor tag")]
    ExpectedTag,
    #[error("expected constructor tag {expected}, got {got}")]
    TagMismatch { expected: u64, got: u64 },
    #[error("expected array after constructor tag")]
    ExpectedArray,
    #[error("expected hash bytes")]
    ExpectedHashBytes,
    #[error("expected hash of 28 bytes, got {got}")]
    HashLength { got: usize },
    #[error("expected lock status integer")]
    ExpectedLockStatus,
}

impl From<CborError> for DatumError {
    fn from(e: CborError) -> Self {
        match e {
            CborError::Truncated => DatumError::Truncated,
            CborError::Malformed => DatumError::Malformed,
        }
    }
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, DatumError> {
    if hex.len() % 2 != 0 {
        return Err(DatumError::BadHex);
    }
    let digit = |c: u8| -> Result<u8, DatumError> {
        match c {
            b'0'..=b'9' => Ok(c - b'0'),
            b'a'..=b'f' => Ok(c - b'a' + 10),
            b'A'..=b'F' => Ok(c - b'A' + 10),
            _ => Err(DatumError::BadHex),
        }
    };
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| Ok((digit(pair[0])? << 4) | digit(pair[1])?))
        .collect()
}

// Tag 121 plus folgendes Array konsumieren.
fn expect_constr(r: &mut CborReader<'_>) -> Result<(), DatumError> {
    match r.peek_major() {
        Some(Major::Tag) => {}
        Some(_) => return Err(DatumError::ExpectedTag),
        None => return Err(DatumError::Truncated),
    }
    let tag = r.read_tag()?;
    if tag != CONSTR_0_TAG {
        return Err(DatumError::TagMismatch {
            expected: CONSTR_0_TAG,
            got: tag,
        });
    }
    match r.peek_major() {
        Some(Major::Array) => {}
        Some(_) => return Err(DatumError::ExpectedArray),
        None => return Err(DatumError::Truncated),
    }
    r.read_array_header()?;
    Ok(())
}

fn read_hash(r: &mut CborReader<'_>) -> Result<[u8; HASH_LEN], DatumError> {
    match r.peek_major() {
        Some(Major::Bytes) => {}
        Some(_) => return Err(DatumError::ExpectedHashBytes),
        None => return Err(DatumError::Truncated),
    }
    let bytes = r.read_bytes()?;
    bytes
        .try_into()
        .map_err(|_| DatumError::HashLength { got: bytes.len() })
}

/// Parst das hex-kodierte Inline-Datum und leitet die Autoritätsadresse ab.
/// network: 0 = Testnet, 1 = Mainnet.
pub fn parse_datum(hex_datum: &str, network: u8) -> Result<ContractDatum, DatumError> {
    if hex_datum.is_empty() {
        return Err(DatumError::Empty);
    }
    let bytes = hex_to_bytes(hex_datum)?;
    let mut r = CborReader::new(&bytes);

    expect_constr(&mut r)?; // äußeres Constr: [credential, lockStatus]
    expect_constr(&mut r)?; // inneres Constr: [pubKeyHash, stakeCredHash]

    let pub_key_hash = read_hash(&mut r)?;
    let stake_cred_hash = read_hash(&mut r)?;

    match r.peek_major() {
        Some(Major::Uint) | Some(Major::Nint) => {}
        Some(_) => return Err(DatumError::ExpectedLockStatus),
        None => return Err(DatumError::Truncated),
    }
    let lock_status = r.read_int()?;

    let authority_address = address::encode_base_address(&pub_key_hash, &stake_cred_hash, network);

    Ok(ContractDatum {
        pub_key_hash,
        stake_cred_hash,
        authority_address,
        is_locked: lock_status == 1,
    })
}
