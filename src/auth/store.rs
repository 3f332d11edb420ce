//! Token stores
//!
//! [`EncryptedFileStore`] keeps the token AES-256-GCM encrypted in
//! ~/.config/serenity/session.enc. The encryption key is derived from
//! machine-specific identifiers.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::TokenStore;
use crate::paths;

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

const NONCE_SIZE: usize = 12;

/// Machine-specific seed for the encryption key
fn machine_id() -> String {
    #[cfg(target_os = "linux")]
    {
        let from_file = ["/etc/machine-id", "/var/lib/dbus/machine-id"]
            .iter()
            .find_map(|path| fs::read_to_string(path).ok())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(id) = from_file {
            return id;
        }
    }

    #[cfg(target_os = "macos")]
    {
        let platform_uuid = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|output| {
                String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .find(|line| line.contains("IOPlatformUUID"))
                    .and_then(|line| line.split('"').nth(3).map(str::to_string))
            });
        if let Some(id) = platform_uuid {
            return id;
        }
    }

    dirs::home_dir().map_or_else(
        || "serenity-fallback-key".to_string(),
        |p| p.to_string_lossy().into_owned(),
    )
}

/// SHA-256 of the machine id, the home directory and a fixed salt
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"serenity-verse-client-v1");
    hasher.finalize().into()
}

/// Encrypted key/value file holding the bearer token
#[derive(Debug, Clone)]
pub struct EncryptedFileStore {
    path: PathBuf,
}

impl EncryptedFileStore {
    /// Store at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::at(paths::session_path()?))
    }

    /// Store at a specific path
    pub const fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn cipher() -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&derive_key()).map_err(|_| anyhow::anyhow!("Invalid key length"))
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let encrypted = fs::read(&self.path).context("Failed to read session file")?;
        if encrypted.len() < NONCE_SIZE {
            return Ok(HashMap::new());
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = Self::cipher()?
            .decrypt(nonce, ciphertext)
            .map_err(|_| anyhow::anyhow!("Failed to decrypt session"))?;

        let json = String::from_utf8(plaintext).context("Invalid UTF-8 in session")?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_string(entries)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = Self::cipher()?
            .encrypt(nonce, json.as_bytes())
            .map_err(|_| anyhow::anyhow!("Failed to encrypt session"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);
        fs::write(&self.path, output).context("Failed to write session file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}

impl TokenStore for EncryptedFileStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// In-process token store (tests, throwaway sessions)
#[derive(Debug, Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `token`
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
