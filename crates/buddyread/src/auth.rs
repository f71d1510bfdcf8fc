//! Caller identity and the password hashing collaborator.

use crate::error::Result;

/// One-way password hashing, supplied by the application.
///
/// Implementations wrap a real algorithm (bcrypt, argon2, ...). Errors from
/// the algorithm should be reported as [`crate::Error::Hash`].
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

impl<H: PasswordHasher + ?Sized> PasswordHasher for &H {
    fn hash(&self, password: &str) -> Result<String> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        (**self).verify(password, hash)
    }
}

/// The already-authenticated user a request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// Admins may act for anyone; everyone else only for themselves.
    pub fn can_act_for(&self, user_id: i32) -> bool {
        self.is_admin || self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_user_or_admin() {
        assert!(Caller::user(1).can_act_for(1));
        assert!(!Caller::user(1).can_act_for(2));
        assert!(Caller::admin(1).can_act_for(2));
    }
}
