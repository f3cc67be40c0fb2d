//! Weapi request envelope.
//!
//! The encrypted platform only accepts request bodies of the form
//! `params=<base64>&encSecKey=<hex>`:
//!
//! 1. the JSON payload is AES-128-CBC encrypted under a fixed nonce,
//! 2. the base64 text of that ciphertext is encrypted again under a fresh
//!    16-character key,
//! 3. the fresh key is reversed and raised to the platform's public exponent
//!    modulo its 1024-bit modulus (textbook RSA, no padding).
//!
//! Every constant here has to match the platform bit for bit.

use std::fmt::{Debug, Formatter};

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use num_bigint::BigUint;
use serde::Serialize;
use thiserror::Error;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

const MODULUS_HEX: &str = "00e0b509f6259df8642dbc35662901477df22677ec152b5ff68ace615bb7b725152b3ab17a876aea8a5aa76d2e417629ec4ee341f56135fccf695280104e0312ecbda92557c93870114af6c9d05c4f7f0c3685b7a46bee255932575cce10b424d813cfe4875d3e82047b97ddef52741d546b8e289dc6935b3ece0462db0a22b8e7";
const PUBLIC_EXPONENT_HEX: &str = "010001";
const NONCE: &[u8; 16] = b"0CoJUm6Qyw8W8jud";
const IV: &[u8; 16] = b"0102030405060708";

const SECRET_KEY_ALPHABET: &[u8; 16] = b"0123456789abcdef";
pub const SECRET_KEY_LEN: usize = 16;

/// Width of the `encSecKey` field in hex characters.
pub const ENC_SEC_KEY_WIDTH: usize = 256;

/// Failures while building an envelope. All of them are programming errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("aes key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("invalid built-in constant: {0}")]
    InvalidConstant(&'static str),
}

/// Two-field encrypted request body.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct EncryptedEnvelope {
    pub params: String,
    #[serde(rename = "encSecKey")]
    pub enc_sec_key: String,
}

impl EncryptedEnvelope {
    /// Form fields in the order the endpoint expects them.
    pub fn form_fields(&self) -> [(&'static str, &str); 2] {
        [
            ("params", self.params.as_str()),
            ("encSecKey", self.enc_sec_key.as_str()),
        ]
    }
}

impl Debug for EncryptedEnvelope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedEnvelope")
            .field("params_len", &self.params.len())
            .field("enc_sec_key_len", &self.enc_sec_key.len())
            .finish()
    }
}

/// Per-request symmetric key over the lowercase hex alphabet.
///
/// Never cached and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    /// Draws a fresh key. Uniformity is all the platform needs, so the
    /// non-cryptographic `fastrand` generator is enough.
    pub fn generate() -> Self {
        let mut key = [0u8; SECRET_KEY_LEN];
        for byte in &mut key {
            *byte = SECRET_KEY_ALPHABET[fastrand::usize(..SECRET_KEY_ALPHABET.len())];
        }
        Self(key)
    }

    /// Builds a key from known text, for reproducible envelopes.
    pub fn from_text(text: &str) -> Option<Self> {
        let bytes: [u8; SECRET_KEY_LEN] = text.as_bytes().try_into().ok()?;
        bytes
            .iter()
            .all(|byte| SECRET_KEY_ALPHABET.contains(byte))
            .then_some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Encrypts `payload` under a freshly generated key.
pub fn weapi<T: Serialize>(payload: &T) -> Result<EncryptedEnvelope, CryptoError> {
    weapi_with_key(payload, &SecretKey::generate())
}

/// Encrypts `payload` under a caller-supplied key.
pub fn weapi_with_key<T: Serialize>(
    payload: &T,
    key: &SecretKey,
) -> Result<EncryptedEnvelope, CryptoError> {
    let json = serde_json::to_string(payload)?;
    let first_pass = aes_cbc_base64(json.as_bytes(), NONCE)?;
    let params = aes_cbc_base64(first_pass.as_bytes(), key.as_bytes())?;
    let enc_sec_key = wrap_secret_key(key)?;

    Ok(EncryptedEnvelope {
        params,
        enc_sec_key,
    })
}

/// Wraps the symmetric key for the `encSecKey` field.
pub fn wrap_secret_key(key: &SecretKey) -> Result<String, CryptoError> {
    mod_exp_reversed(key.as_bytes())
}

fn aes_cbc_base64(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    let encryptor = Aes128CbcEnc::new_from_slices(key, IV)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Ok(STANDARD.encode(ciphertext))
}

/// Reverses `text`, reads it as an unsigned big-endian integer and returns
/// `m^e mod n` as lowercase hex, left-padded to [`ENC_SEC_KEY_WIDTH`].
fn mod_exp_reversed(text: &[u8]) -> Result<String, CryptoError> {
    let reversed = text.iter().rev().copied().collect::<Vec<_>>();
    // The leading zero nibble keeps a high first byte from reading as negative.
    let message_hex = format!("0{}", hex::encode(&reversed));

    let message = parse_hex(&message_hex, "message")?;
    let exponent = parse_hex(PUBLIC_EXPONENT_HEX, "public exponent")?;
    let modulus = parse_hex(MODULUS_HEX, "modulus")?;

    let digest = message.modpow(&exponent, &modulus).to_str_radix(16);
    Ok(format!("{digest:0>width$}", width = ENC_SEC_KEY_WIDTH))
}

fn parse_hex(value: &str, name: &'static str) -> Result<BigUint, CryptoError> {
    BigUint::parse_bytes(value.as_bytes(), 16).ok_or(CryptoError::InvalidConstant(name))
}
