use base64::Engine;
use rand::RngCore;

const SECRET_TOKEN_BYTES: usize = 32;

/// Random webhook secret: 32 bytes as unpadded URL-safe base64 (43 chars).
pub fn generate_secret_token() -> String {
    let mut bytes = [0u8; SECRET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
