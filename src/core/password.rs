use std::{fmt, sync::Arc};

use tracing::debug;

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    TooLong,
    /// bcrypt NUL-terminates its input, so `p` and `p + "\0"` would collide.
    ContainsNul,
    Hashing(String),
}

/// Checks the input limits bcrypt needs to keep distinct passwords distinct.
pub fn check_password_input(plaintext: &str) -> Result<(), PasswordError> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    if plaintext.contains('\0') {
        return Err(PasswordError::ContainsNul);
    }
    Ok(())
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::TooLong => write!(
                f,
                "Password must be at most {} bytes long",
                MAX_PASSWORD_BYTES
            ),
            PasswordError::ContainsNul => write!(f, "Password must not contain NUL characters"),
            PasswordError::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(err: bcrypt::BcryptError) -> Self {
        PasswordError::Hashing(err.to_string())
    }
}

/// Salted bcrypt hashing with a fixed work factor.
///
/// Hashes are self-describing (`$2b$<cost>$<salt><digest>`), so verification
/// needs nothing but the stored string. Cloning is cheap.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Builds a hasher for `cost`. Fails if bcrypt rejects the cost.
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        // Used by `verify_dummy`; computing it up front also validates `cost`.
        let dummy_hash = bcrypt::hash("authly-dummy-password", cost)?;
        debug!("Password hasher ready with cost {}", cost);
        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        check_password_input(plaintext)?;
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Never fails: a malformed hash simply does not match.
    /// Inputs that could never have been hashed still cost one bcrypt round.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if check_password_input(plaintext).is_err() {
            return self.verify_dummy(plaintext);
        }
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }

    /// Spends the same work as a real verification and always returns false.
    /// Keeps "unknown user" indistinguishable from "wrong password" by timing.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = bcrypt::verify(plaintext, &self.dummy_hash);
        false
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish()
    }
}
