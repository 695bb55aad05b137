//! Password credentials
//!
//! Credentials are stored as `argon2id$t=3,m=65536,p=4,l=32$<salt>$<hash>`
//! with a base64 salt and a hex hash. The parameters travel with the hash so
//! changing the configured cost never locks anyone out.
//!
//! Anything that does not parse as that format is a plaintext password
//! written by an older wallet; it is compared byte for byte and should be
//! re-hashed as soon as it verifies.

use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default Argon2id parameters
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_MEMORY_COST: u32 = 65536; // 64 MiB
pub const DEFAULT_PARALLELISM: u32 = 4;
pub const DEFAULT_HASH_LEN: u32 = 32;

const SCHEME: &str = "argon2id";
const SALT_LEN: usize = 16;

/// Argon2id parameters for password hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Params {
    pub time_cost: u32,
    pub memory_cost: u32,
    pub parallelism: u32,
    pub hash_len: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: DEFAULT_TIME_COST,
            memory_cost: DEFAULT_MEMORY_COST,
            parallelism: DEFAULT_PARALLELISM,
            hash_len: DEFAULT_HASH_LEN,
        }
    }
}

impl Argon2Params {
    fn encode(&self) -> String {
        format!(
            "t={},m={},p={},l={}",
            self.time_cost, self.memory_cost, self.parallelism, self.hash_len
        )
    }

    fn decode(s: &str) -> Option<Self> {
        let mut params = Self::default();
        for part in s.split(',') {
            let (key, value) = part.split_once('=')?;
            let value: u32 = value.parse().ok()?;
            match key {
                "t" => params.time_cost = value,
                "m" => params.memory_cost = value,
                "p" => params.parallelism = value,
                "l" => params.hash_len = value,
                _ => return None,
            }
        }
        Some(params)
    }
}

/// A stored credential, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCredential {
    Hashed {
        params: Argon2Params,
        salt: Vec<u8>,
        hash: Vec<u8>,
    },
    Plaintext(String),
}

impl StoredCredential {
    pub fn parse(stored: &str) -> Self {
        Self::parse_hashed(stored).unwrap_or_else(|| Self::Plaintext(stored.to_string()))
    }

    fn parse_hashed(stored: &str) -> Option<Self> {
        let mut parts = stored.split('$');
        if parts.next()? != SCHEME {
            return None;
        }
        let params = Argon2Params::decode(parts.next()?)?;
        let salt = base64::engine::general_purpose::STANDARD
            .decode(parts.next()?)
            .ok()?;
        let hash = hex::decode(parts.next()?).ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::Hashed { params, salt, hash })
    }

    pub fn is_plaintext(&self) -> bool {
        matches!(self, Self::Plaintext(_))
    }

    /// Check a claimed password against this credential
    ///
    /// A hashed credential whose parameters no longer derive (corrupted
    /// record) simply fails to verify.
    pub fn verify(&self, password: &str) -> bool {
        match self {
            Self::Plaintext(stored) => constant_time_eq(stored.as_bytes(), password.as_bytes()),
            Self::Hashed { params, salt, hash } => match derive(password, salt, params) {
                Ok(candidate) => constant_time_eq(&candidate, hash),
                Err(_) => false,
            },
        }
    }
}

/// Hash a password with a fresh random salt, returning the encoded credential
pub fn hash_password(password: &str, params: &Argon2Params) -> Result<String, String> {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    let hash = derive(password, &salt, params)?;
    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        params.encode(),
        base64::engine::general_purpose::STANDARD.encode(salt),
        hex::encode(hash)
    ))
}

/// Derive the raw Argon2id output for a password and salt
fn derive(password: &str, salt: &[u8], params: &Argon2Params) -> Result<Vec<u8>, String> {
    let argon2_params = argon2::Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(params.hash_len as usize),
    )
    .map_err(|e| format!("Failed to create argon2 params: {:?}", e))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut out = vec![0u8; params.hash_len as usize];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .map_err(|e| format!("Failed to hash password: {:?}", e))?;

    Ok(out)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
