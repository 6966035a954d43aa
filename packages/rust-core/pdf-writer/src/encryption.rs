//! Standard Security Handler, revisions 3 and 4
//!
//! Key derivation and per-object encryption as defined by ISO 32000 §7.6:
//! RC4-128 under `V 2 / R 3`, AES-128-CBC under `V 4 / R 4`. The owner and
//! user entries, the file key, and the per-object keys all follow the
//! padded-MD5 construction; AES bodies are PKCS#7-padded by hand (the
//! cipher runs in no-padding mode) with a fresh IV prepended to each
//! ciphertext.

use aes::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
use bitflags::bitflags;
use rand::Rng;
use rc4::consts::U16;
use rc4::{KeyInit, Rc4, StreamCipher};
use thiserror::Error;

use crate::dict;
use crate::object::{Dictionary, Object, ObjectId};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// The 32-byte padding constant appended to passwords before hashing.
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// Appended to the per-object key input when the crypt filter is AES.
const AES_SALT: &[u8; 4] = b"sAlT";

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("unsupported encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Cipher selection; decides `V`, `R`, and the crypt-filter dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionAlgorithm {
    /// RC4 with a 128-bit key (`V 2`, `R 3`).
    Rc4,
    /// AES-128 in CBC mode (`V 4`, `R 4`, `/AESV2` crypt filter).
    Aes,
}

impl EncryptionAlgorithm {
    /// Parses the caller-facing algorithm name (`"rc4"` or `"aes"`).
    pub fn from_name(name: &str) -> Result<Self, EncryptionError> {
        match name {
            "rc4" => Ok(EncryptionAlgorithm::Rc4),
            "aes" => Ok(EncryptionAlgorithm::Aes),
            other => Err(EncryptionError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    fn v_value(self) -> i64 {
        match self {
            EncryptionAlgorithm::Rc4 => 2,
            EncryptionAlgorithm::Aes => 4,
        }
    }

    fn revision(self) -> i64 {
        match self {
            EncryptionAlgorithm::Rc4 => 3,
            EncryptionAlgorithm::Aes => 4,
        }
    }
}

bitflags! {
    /// User-access permission flags, by their 1-based bit positions in the
    /// PDF permission word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        /// Bit 3: print the document.
        const PRINT = 1 << 2;
        /// Bit 4: modify contents.
        const MODIFY = 1 << 3;
        /// Bit 5: copy text and graphics.
        const COPY = 1 << 4;
        /// Bit 6: add or modify annotations.
        const ANNOTATE = 1 << 5;
        /// Bit 9: fill in form fields.
        const FILL_FORMS = 1 << 8;
        /// Bit 10: extract for accessibility.
        const EXTRACT_FOR_ACCESSIBILITY = 1 << 9;
        /// Bit 11: assemble (insert, rotate, delete pages).
        const ASSEMBLE = 1 << 10;
        /// Bit 12: print at full resolution.
        const HIGH_QUALITY_PRINT = 1 << 11;
    }
}

impl Permissions {
    /// The signed 32-bit `P` entry: bits 1-2 zero, bits 7-8 and 13-32
    /// reserved-one, granted bits from `self`.
    pub fn to_p_value(self) -> i32 {
        (self.bits() | 0xFFFF_F0C0) as i32
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::all()
    }
}

/// Caller-supplied encryption settings.
#[derive(Debug, Clone)]
pub struct EncryptionOptions {
    pub user_password: String,
    pub owner_password: String,
    pub algorithm: EncryptionAlgorithm,
    pub permissions: Permissions,
    /// Derive AES IVs from a per-document counter instead of the system
    /// CSPRNG, so identically driven documents emit identical bytes.
    pub deterministic_ivs: bool,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        Self {
            user_password: String::new(),
            owner_password: String::new(),
            algorithm: EncryptionAlgorithm::Aes,
            permissions: Permissions::default(),
            deterministic_ivs: false,
        }
    }
}

/// Derived keys plus the id of the `/Encrypt` dictionary, which is the one
/// object the emit pass must never transform.
pub struct EncryptionState {
    algorithm: EncryptionAlgorithm,
    file_key: [u8; 16],
    owner_entry: [u8; 32],
    user_entry: [u8; 32],
    permissions_value: i32,
    encrypt_ref: ObjectId,
    file_id: [u8; 16],
    deterministic_ivs: bool,
    iv_counter: u64,
}

impl EncryptionState {
    /// Runs the full key derivation for a document.
    ///
    /// An empty owner password falls back to the user password, matching
    /// what interactive producers do.
    pub fn new(options: &EncryptionOptions, file_id: [u8; 16], encrypt_ref: ObjectId) -> Self {
        let owner_password = if options.owner_password.is_empty() {
            &options.user_password
        } else {
            &options.owner_password
        };
        let permissions_value = options.permissions.to_p_value();
        let owner_entry = compute_owner_entry(owner_password, &options.user_password);
        let file_key = compute_file_key(
            &options.user_password,
            &owner_entry,
            permissions_value,
            &file_id,
        );
        let user_entry = compute_user_entry(&file_key, &file_id);

        Self {
            algorithm: options.algorithm,
            file_key,
            owner_entry,
            user_entry,
            permissions_value,
            encrypt_ref,
            file_id,
            deterministic_ivs: options.deterministic_ivs,
            iv_counter: 0,
        }
    }

    pub fn encrypt_ref(&self) -> ObjectId {
        self.encrypt_ref
    }

    /// Encrypts a string value belonging to the given object.
    pub fn encrypt_string(&mut self, data: &[u8], id: ObjectId, generation: u16) -> Vec<u8> {
        self.transform(data, id, generation)
    }

    /// Encrypts a stream body belonging to the given object.
    pub fn encrypt_stream(&mut self, data: &[u8], id: ObjectId, generation: u16) -> Vec<u8> {
        self.transform(data, id, generation)
    }

    fn transform(&mut self, data: &[u8], id: ObjectId, generation: u16) -> Vec<u8> {
        let aes = self.algorithm == EncryptionAlgorithm::Aes;
        let key = object_key(&self.file_key, id, generation, aes);
        match self.algorithm {
            EncryptionAlgorithm::Rc4 => rc4_apply(&key, data),
            EncryptionAlgorithm::Aes => {
                let iv = self.next_iv();
                aes_cbc_encrypt(&key, &iv, data)
            }
        }
    }

    fn next_iv(&mut self) -> [u8; 16] {
        if self.deterministic_ivs {
            let mut input = Vec::with_capacity(8 + 16);
            input.extend_from_slice(&self.iv_counter.to_le_bytes());
            input.extend_from_slice(&self.file_id);
            self.iv_counter += 1;
            md5::compute(&input).0
        } else {
            rand::thread_rng().gen()
        }
    }

    /// The `/Encrypt` dictionary for the trailer to reference.
    pub fn encrypt_dict(&self) -> Dictionary {
        let mut dict = dict! {
            "Filter" => "Standard",
            "V" => self.algorithm.v_value(),
            "R" => self.algorithm.revision(),
            "O" => Object::HexBytes(self.owner_entry.to_vec()),
            "U" => Object::HexBytes(self.user_entry.to_vec()),
            "P" => self.permissions_value as i64,
            "Length" => 128i64,
        };
        if self.algorithm == EncryptionAlgorithm::Aes {
            dict.set("StmF", "StdCF");
            dict.set("StrF", "StdCF");
            dict.set(
                "CF",
                dict! {
                    "StdCF" => dict! {
                        "CFM" => "AESV2",
                        "AuthEvent" => "DocOpen",
                        "Length" => 16i64,
                    },
                },
            );
            dict.set("EncryptMetadata", true);
        }
        dict
    }
}

/// Pads or truncates a password to exactly 32 bytes.
fn pad_password(password: &str) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let bytes = password.as_bytes();
    let take = bytes.len().min(32);
    padded[..take].copy_from_slice(&bytes[..take]);
    padded[take..].copy_from_slice(&PASSWORD_PAD[..32 - take]);
    padded
}

/// The 32-byte `O` entry: the padded user password encrypted under a key
/// hashed from the owner password, with the revision-3 re-hash and the 19
/// XOR-keyed RC4 rounds.
fn compute_owner_entry(owner_password: &str, user_password: &str) -> [u8; 32] {
    let mut digest = md5::compute(pad_password(owner_password)).0;
    for _ in 0..50 {
        digest = md5::compute(digest).0;
    }
    let key = digest;

    let mut data = pad_password(user_password).to_vec();
    data = rc4_apply(&key, &data);
    for round in 1..=19u8 {
        let mut round_key = key;
        for byte in &mut round_key {
            *byte ^= round;
        }
        data = rc4_apply(&round_key, &data);
    }

    let mut entry = [0u8; 32];
    entry.copy_from_slice(&data);
    entry
}

/// The 128-bit file encryption key.
fn compute_file_key(
    user_password: &str,
    owner_entry: &[u8; 32],
    permissions_value: i32,
    file_id: &[u8; 16],
) -> [u8; 16] {
    let mut input = Vec::with_capacity(32 + 32 + 4 + 16);
    input.extend_from_slice(&pad_password(user_password));
    input.extend_from_slice(owner_entry);
    input.extend_from_slice(&permissions_value.to_le_bytes());
    input.extend_from_slice(file_id);
    // Metadata is always encrypted here, so the 0xFFFFFFFF suffix for
    // unencrypted metadata at revision 4 never applies.

    let mut digest = md5::compute(&input).0;
    for _ in 0..50 {
        digest = md5::compute(digest).0;
    }
    digest
}

/// The 32-byte `U` entry at revision 3+: hash of padding and file id,
/// encrypted and re-encrypted, right-padded to 32 bytes.
fn compute_user_entry(file_key: &[u8; 16], file_id: &[u8; 16]) -> [u8; 32] {
    let mut input = Vec::with_capacity(32 + 16);
    input.extend_from_slice(&PASSWORD_PAD);
    input.extend_from_slice(file_id);

    let mut data = md5::compute(&input).0.to_vec();
    data = rc4_apply(file_key, &data);
    for round in 1..=19u8 {
        let mut round_key = *file_key;
        for byte in &mut round_key {
            *byte ^= round;
        }
        data = rc4_apply(&round_key, &data);
    }

    let mut entry = [0u8; 32];
    entry[..16].copy_from_slice(&data);
    entry
}

/// Per-object key: file key, low three id bytes, low two generation
/// bytes, and the AES salt when applicable.
fn object_key(file_key: &[u8; 16], id: ObjectId, generation: u16, aes: bool) -> [u8; 16] {
    let mut input = Vec::with_capacity(16 + 5 + 4);
    input.extend_from_slice(file_key);
    input.extend_from_slice(&id.0.to_le_bytes()[..3]);
    input.extend_from_slice(&generation.to_le_bytes());
    if aes {
        input.extend_from_slice(AES_SALT);
    }
    // min(file_key_len + 5, 16) == 16 for 128-bit keys
    md5::compute(&input).0
}

fn rc4_apply(key: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let mut cipher = Rc4::<U16>::new(key.into());
    let mut buffer = data.to_vec();
    cipher.apply_keystream(&mut buffer);
    buffer
}

/// CBC-encrypts with manual PKCS#7 padding and prepends the IV.
fn aes_cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let pad = 16 - data.len() % 16;
    let mut buffer = Vec::with_capacity(16 + data.len() + pad);
    buffer.extend_from_slice(iv);
    buffer.extend_from_slice(data);
    buffer.resize(16 + data.len() + pad, pad as u8);

    let length = buffer.len() - 16;
    Aes128CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buffer[16..], length)
        .expect("buffer padded to a whole number of blocks");
    buffer
}
