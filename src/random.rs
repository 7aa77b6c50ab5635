//! Opaque token generation backed by the OS CSPRNG.

/// Generate `n_bytes` of OS randomness, hex-encoded (two chars per byte).
///
/// Used for authorization codes and presign tokens, which must be
/// unguessable rather than merely unique.
pub fn hex_token(n_bytes: usize) -> Result<String, getrandom::Error> {
    let mut buf = vec![0u8; n_bytes];
    getrandom::fill(&mut buf)?;
    Ok(hex::encode(buf))
}
