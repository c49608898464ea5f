//! The secret store: an arena of handle-addressed secrets.
//!
//! Each live secret sits behind its own mutex, so operations on different
//! handles run in parallel while operations on the same handle serialize.
//! The slot table is guarded by a separate `RwLock` that is never held while
//! waiting on a secret's mutex, except by `destroy_all`.
//!
//! Destruction takes the material out under the secret's mutex and drops it
//! there (every material variant zeroizes on drop), then releases the slot.
//! Anyone who resolved the handle earlier finds the material gone and gets
//! `NotFound`; nobody can observe a half-wiped secret.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use zeroize::Zeroizing;

use super::secret::{SecretAttributes, SecretHandle, SecretMaterial, SecretType};
use crate::crypto::{RandomSource, P256_PRIVATE_KEY_LEN};
use crate::errors::{ErrorDomain, Result, VaultError};

/// Attempts at drawing a P-256 scalar in `[1, n)` before giving up.
/// A healthy generator fails a single draw with probability below 2^-32.
const MAX_SCALAR_DRAWS: usize = 16;

/// A secret and its metadata.  `material` is `None` once destroyed.
struct SecretEntry {
    attributes: SecretAttributes,
    material: Option<SecretMaterial>,
}

type SharedEntry = Arc<Mutex<SecretEntry>>;

struct Slot {
    generation: u32,
    entry: Option<SharedEntry>,
    /// Set once the generation counter is exhausted; the slot is never reused.
    retired: bool,
}

impl Slot {
    /// Advance the generation after the entry has been removed.
    ///
    /// Returns `false` when the counter cannot advance, in which case the
    /// slot is retired instead of handed out again.
    fn vacate(&mut self) -> bool {
        match self.generation.checked_add(1) {
            Some(next) => {
                self.generation = next;
                true
            }
            None => {
                self.retired = true;
                false
            }
        }
    }
}

#[derive(Default)]
struct Slots {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Slots {
    fn allocate(&mut self, entry: SecretEntry) -> SecretHandle {
        let entry = Some(Arc::new(Mutex::new(entry)));
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            return SecretHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry,
            retired: false,
        });
        SecretHandle {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, handle: SecretHandle) {
        if let Some(slot) = self.slots.get_mut(handle.index as usize) {
            if slot.generation == handle.generation && slot.entry.take().is_some() {
                if slot.vacate() {
                    self.free.push(handle.index);
                }
                self.live -= 1;
            }
        }
    }
}

/// Owns every secret created through a vault.
pub struct SecretStore {
    slots: RwLock<Slots>,
    max_secrets: usize,
    max_buffer_len: usize,
}

impl SecretStore {
    pub fn new(max_secrets: usize, max_buffer_len: usize) -> Self {
        Self {
            slots: RwLock::new(Slots::default()),
            max_secrets,
            max_buffer_len,
        }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a secret filled from `random`.
    ///
    /// For fixed-size types the requested length is ignored.  Curve25519
    /// scalars are clamped; P-256 scalars are redrawn until in range.
    pub fn generate(
        &self,
        attributes: &SecretAttributes,
        random: &RandomSource,
    ) -> Result<SecretHandle> {
        attributes.check_supported()?;

        let material = match attributes.secret_type {
            SecretType::P256PrivateKey => self.draw_p256_scalar(random)?,
            secret_type => {
                let len = match secret_type.fixed_len() {
                    Some(len) => len,
                    None if (1..=self.max_buffer_len).contains(&attributes.length) => {
                        attributes.length
                    }
                    None => {
                        return Err(VaultError::invalid(
                            ErrorDomain::Store,
                            format!(
                                "buffer secrets must be 1..={} bytes, got {}",
                                self.max_buffer_len, attributes.length
                            ),
                        ));
                    }
                };
                let mut bytes = Zeroizing::new(vec![0u8; len]);
                random.fill(&mut bytes)?;
                if secret_type == SecretType::Curve25519PrivateKey {
                    clamp_curve25519(&mut bytes);
                }
                SecretMaterial::from_bytes(secret_type, &bytes, self.max_buffer_len)?
            }
        };

        let handle = self.insert(*attributes, material)?;
        debug!(handle = %handle, secret_type = %attributes.secret_type, "secret generated");
        Ok(handle)
    }

    /// Create a secret from caller-supplied bytes.
    pub fn import(&self, attributes: &SecretAttributes, bytes: &[u8]) -> Result<SecretHandle> {
        attributes.check_supported()?;
        let material =
            SecretMaterial::from_bytes(attributes.secret_type, bytes, self.max_buffer_len)?;

        let handle = self.insert(*attributes, material)?;
        debug!(handle = %handle, secret_type = %attributes.secret_type, "secret imported");
        Ok(handle)
    }

    /// Store already-built material (ECDH and HKDF outputs).
    pub(crate) fn insert(
        &self,
        attributes: SecretAttributes,
        material: SecretMaterial,
    ) -> Result<SecretHandle> {
        let mut handles = self.insert_all(vec![(attributes, material)])?;
        handles
            .pop()
            .ok_or_else(|| VaultError::invalid(ErrorDomain::Store, "nothing to insert"))
    }

    /// Store several secrets at once: either all get handles or none do.
    pub(crate) fn insert_all(
        &self,
        secrets: Vec<(SecretAttributes, SecretMaterial)>,
    ) -> Result<Vec<SecretHandle>> {
        let mut slots = self.slots.write();
        if slots.live + secrets.len() > self.max_secrets {
            return Err(VaultError::CapacityExceeded(slots.live));
        }

        let handles = secrets
            .into_iter()
            .map(|(attributes, material)| {
                let attributes = SecretAttributes {
                    length: material.len(),
                    ..attributes
                };
                slots.allocate(SecretEntry {
                    attributes,
                    material: Some(material),
                })
            })
            .collect();
        Ok(handles)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// Run `f` against a live secret while holding its lock.
    pub(crate) fn with_secret<T>(
        &self,
        handle: SecretHandle,
        f: impl FnOnce(&SecretAttributes, &SecretMaterial) -> Result<T>,
    ) -> Result<T> {
        let entry = self.resolve(handle)?;
        let guard = entry.lock();
        match guard.material.as_ref() {
            Some(material) => f(&guard.attributes, material),
            None => Err(VaultError::NotFound(handle)),
        }
    }

    /// Copy out the raw content.
    pub fn export(&self, handle: SecretHandle) -> Result<Zeroizing<Vec<u8>>> {
        self.with_secret(handle, |_, material| Ok(material.to_bytes()))
    }

    /// Public key of an EC private key secret.
    pub fn public_key(&self, handle: SecretHandle) -> Result<Vec<u8>> {
        self.with_secret(handle, |_, material| material.public_key())
    }

    pub fn attributes(&self, handle: SecretHandle) -> Result<SecretAttributes> {
        self.with_secret(handle, |attributes, _| Ok(*attributes))
    }

    /// Reclassify a secret.  EC private keys are immutable.
    pub fn set_type(&self, handle: SecretHandle, secret_type: SecretType) -> Result<()> {
        let entry = self.resolve(handle)?;
        let mut guard = entry.lock();
        let material = guard
            .material
            .as_ref()
            .ok_or(VaultError::NotFound(handle))?;

        let retyped = material.retype(secret_type, self.max_buffer_len)?;
        guard.attributes.secret_type = secret_type;
        guard.attributes.length = retyped.len();
        guard.material = Some(retyped);

        debug!(handle = %handle, secret_type = %secret_type, "secret type changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------

    /// Zeroize a secret and invalidate its handle.
    ///
    /// Unknown or already-destroyed handles report `NotFound`.
    pub fn destroy(&self, handle: SecretHandle) -> Result<()> {
        let entry = self.resolve(handle)?;
        {
            let mut guard = entry.lock();
            // Dropping the material wipes it before the lock is released.
            let material = guard.material.take().ok_or(VaultError::NotFound(handle))?;
            drop(material);
        }
        self.slots.write().release(handle);

        debug!(handle = %handle, "secret destroyed");
        Ok(())
    }

    /// Zeroize every live secret.  Returns how many were destroyed.
    pub fn destroy_all(&self) -> usize {
        let mut slots = self.slots.write();
        let mut destroyed = 0;

        for slot in &mut slots.slots {
            if let Some(entry) = slot.entry.take() {
                if entry.lock().material.take().is_some() {
                    destroyed += 1;
                }
                slot.vacate();
            }
        }
        let free = (0..slots.slots.len() as u32)
            .rev()
            .filter(|&index| !slots.slots[index as usize].retired)
            .collect();
        slots.free = free;
        slots.live = 0;

        destroyed
    }

    /// Number of live secrets.
    pub fn len(&self) -> usize {
        self.slots.read().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn max_buffer_len(&self) -> usize {
        self.max_buffer_len
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve(&self, handle: SecretHandle) -> Result<SharedEntry> {
        let slots = self.slots.read();
        slots
            .slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.clone())
            .ok_or(VaultError::NotFound(handle))
    }

    fn draw_p256_scalar(&self, random: &RandomSource) -> Result<SecretMaterial> {
        let mut bytes = Zeroizing::new([0u8; P256_PRIVATE_KEY_LEN]);
        for _ in 0..MAX_SCALAR_DRAWS {
            random.fill(bytes.as_mut_slice())?;
            if let Ok(material) = SecretMaterial::from_bytes(
                SecretType::P256PrivateKey,
                bytes.as_slice(),
                self.max_buffer_len,
            ) {
                return Ok(material);
            }
        }
        Err(VaultError::Fatal(
            "random source keeps producing out-of-range P-256 scalars".into(),
        ))
    }
}

impl Drop for SecretStore {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

/// RFC 7748 scalar clamping.
fn clamp_curve25519(scalar: &mut [u8]) {
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
}
