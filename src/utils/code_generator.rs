//! Short code generation.
//!
//! Two strategies implement [`CodeGenerator`]:
//!
//! - [`RandomCodeGenerator`] - fixed-length alphanumeric codes (default)
//! - [`UuidCodeGenerator`] - hyphen-less UUID v4 codes
//!
//! Neither guarantees uniqueness; collisions are resolved by the link service
//! retrying with a fresh code.

use std::iter;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Alphabet of random codes.
pub const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_CODE_LENGTH: usize = 5;

/// Produces candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws `length` characters uniformly from [`CHARSET`].
///
/// The entropy source is injectable so tests can get reproducible codes:
///
/// ```ignore
/// let a = RandomCodeGenerator::with_seed(5, 42);
/// let b = RandomCodeGenerator::with_seed(5, 42);
/// assert_eq!(a.generate(), b.generate());
/// ```
#[derive(Debug)]
pub struct RandomCodeGenerator<R = StdRng> {
    rng: Mutex<R>,
    length: usize,
}

impl RandomCodeGenerator<StdRng> {
    /// Seeds from the operating system.
    pub fn new(length: usize) -> Self {
        Self::from_rng(length, StdRng::from_os_rng())
    }

    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self::from_rng(length, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomCodeGenerator<R> {
    pub fn from_rng(length: usize, rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
            length,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl<R: Rng + Send> CodeGenerator for RandomCodeGenerator<R> {
    fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        iter::repeat_with(|| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .take(self.length)
            .collect()
    }
}

/// Uses a random UUID in its 32-character simple form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCodeGenerator;

impl CodeGenerator for UuidCodeGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
