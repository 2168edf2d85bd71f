//! Process-wide error-code registry.
//!
//! A [`Coder`] describes one error category: the HTTP status to answer
//! with, the user-safe message, and a documentation reference. Codes are
//! registered once at process startup and looked up on every render, so
//! the registry sits behind a read/write lock; lookups never contend with
//! each other, only with a registration in progress.
//!
//! Lookups never fail. A miss returns the fallback coder, so display code
//! cannot break just because metadata was never provisioned.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::CodedError;
use crate::metrics;

/// Code `0` is reserved and can never be registered; it is set aside for
/// the unknown-code fallback machinery.
pub const RESERVED_CODE: i32 = 0;

/// The code the fallback coder reports for itself. Deliberately distinct
/// from [`RESERVED_CODE`]: one is a forbidden registry key, the other is
/// the descriptor substituted on a miss.
pub const FALLBACK_CODE: i32 = 1;

const FALLBACK_MESSAGE: &str = "An internal server error occurred";

/// Capability set any error-code descriptor must satisfy.
pub trait Coder: Send + Sync {
    /// HTTP status communicated for this category.
    fn http_status(&self) -> u16;

    /// User-safe display message. May be empty, in which case the renderer
    /// falls back to the chain link's own message.
    fn message(&self) -> &str;

    /// Documentation reference for operators.
    fn reference(&self) -> &str;

    /// The registry key.
    fn code(&self) -> i32;
}

/// Plain value descriptor; the `Coder` implementation most services need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCoder {
    code: i32,
    http: u16,
    message: String,
    reference: String,
}

impl DefaultCoder {
    /// A descriptor with no documentation reference. Pass `http = 0` to
    /// take the 500 default.
    pub fn new(code: i32, http: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            http,
            message: message.into(),
            reference: String::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }
}

impl Coder for DefaultCoder {
    fn http_status(&self) -> u16 {
        if self.http == 0 {
            500
        } else {
            self.http
        }
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn reference(&self) -> &str {
        &self.reference
    }

    fn code(&self) -> i32 {
        self.code
    }
}

/// Misconfiguration detected during registration. Raised while the process
/// is initialising; not meant to be caught and retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("code `0` is reserved for the fallback coder")]
    ReservedCode,
    #[error("code {0} is already registered")]
    Duplicate(i32),
}

type CoderMap = HashMap<i32, Arc<dyn Coder>>;

static FALLBACK: OnceLock<Arc<dyn Coder>> = OnceLock::new();
static CODES: OnceLock<RwLock<CoderMap>> = OnceLock::new();

fn fallback() -> &'static Arc<dyn Coder> {
    FALLBACK.get_or_init(|| Arc::new(DefaultCoder::new(FALLBACK_CODE, 500, FALLBACK_MESSAGE)))
}

fn codes() -> &'static RwLock<CoderMap> {
    CODES.get_or_init(|| {
        let mut map = CoderMap::new();
        map.insert(FALLBACK_CODE, Arc::clone(fallback()));
        RwLock::new(map)
    })
}

/// The coder substituted whenever a lookup misses.
pub fn fallback_coder() -> Arc<dyn Coder> {
    Arc::clone(fallback())
}

/// Upsert registration: a coder already present under the same code is
/// silently replaced.
pub fn try_register(coder: Arc<dyn Coder>) -> Result<(), RegistryError> {
    if coder.code() == RESERVED_CODE {
        return Err(RegistryError::ReservedCode);
    }
    let code = coder.code();
    let mut map = codes().write().unwrap_or_else(PoisonError::into_inner);
    if map.insert(code, coder).is_some() {
        warn!(code, "replaced registered coder");
    } else {
        debug!(code, "registered coder");
    }
    if let Some(m) = metrics::installed() {
        m.set_registry_size(map.len());
    }
    Ok(())
}

/// Strict registration: additionally rejects a code that is already
/// present.
pub fn try_register_strict(coder: Arc<dyn Coder>) -> Result<(), RegistryError> {
    if coder.code() == RESERVED_CODE {
        return Err(RegistryError::ReservedCode);
    }
    let code = coder.code();
    let mut map = codes().write().unwrap_or_else(PoisonError::into_inner);
    if map.contains_key(&code) {
        return Err(RegistryError::Duplicate(code));
    }
    map.insert(code, coder);
    debug!(code, "registered coder");
    if let Some(m) = metrics::installed() {
        m.set_registry_size(map.len());
    }
    Ok(())
}

/// Upsert registration for process startup. Panics on the reserved code,
/// aborting initialisation.
pub fn register(coder: Arc<dyn Coder>) {
    if let Err(err) = try_register(coder) {
        panic!("{err}");
    }
}

/// Strict registration for process startup. Panics on the reserved code or
/// a duplicate, aborting initialisation.
pub fn register_strict(coder: Arc<dyn Coder>) {
    if let Err(err) = try_register_strict(coder) {
        panic!("{err}");
    }
}

/// The registered coder for `code`, or the fallback coder. Never fails.
pub fn lookup(code: i32) -> Arc<dyn Coder> {
    let map = codes().read().unwrap_or_else(PoisonError::into_inner);
    match map.get(&code) {
        Some(coder) => {
            if let Some(m) = metrics::installed() {
                m.record_lookup(true);
            }
            Arc::clone(coder)
        }
        None => {
            if let Some(m) = metrics::installed() {
                m.record_lookup(false);
            }
            fallback_coder()
        }
    }
}

/// Display metadata for any error: the registered coder when `err` is a
/// [`CodedError`] with a registered code, the fallback coder otherwise.
pub fn resolve(err: &(dyn StdError + 'static)) -> Arc<dyn Coder> {
    match err.downcast_ref::<CodedError>() {
        Some(coded) => lookup(coded.code()),
        None => fallback_coder(),
    }
}

/// `true` when `err` is a [`CodedError`] carrying `code` anywhere in its
/// causal chain. Foreign errors terminate the walk and answer `false`.
pub fn is_code(err: &(dyn StdError + 'static), code: i32) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        match e.downcast_ref::<CodedError>() {
            Some(coded) if coded.code() == code => return true,
            Some(coded) => current = coded.source(),
            None => return false,
        }
    }
    false
}
