//! Principal identity as supplied by the session provider.

opaque_id!(
    /// Identifier of an authenticated user. Source of every ownership check.
    UserId
);
