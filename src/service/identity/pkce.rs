use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::Digest;

use crate::helper::generate_token;

pub(crate) const VERIFIER_LENGTH: usize = 56;

/// Method name as the identity provider expects it.
pub(crate) const METHOD: &str = "s256";

pub(crate) fn generate_verifier() -> String {
    generate_token(VERIFIER_LENGTH)
}

pub(crate) fn challenge(verifier: &str) -> String {
    let hash = sha2::Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
