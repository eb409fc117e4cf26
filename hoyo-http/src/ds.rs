//! Dynamic secret (DS) generation
//!
//! Certain portal endpoints authorize requests through a `DS` header: a
//! time-salted MD5 token of the form `<unix seconds>,<6 random letters>,<hex digest>`.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Salt the portal web client uses for DS tokens
const DS_SALT: &str = "6s25p5ox5y14umn1p61aqyyvbvvl3lrt";

/// Alphabet for the random segment
const DS_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a fresh dynamic secret.
///
/// The digest covers `salt=<salt>&t=<time>&r=<random>`; timestamp and random
/// segment are fresh on every call.
pub fn generate_ds() -> String {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let mut rng = rand::thread_rng();
    let random: String = (0..6)
        .map(|_| DS_CHARSET[rng.gen_range(0..DS_CHARSET.len())] as char)
        .collect();

    let digest = md5::compute(format!("salt={DS_SALT}&t={time}&r={random}"));

    format!("{time},{random},{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ds_shape() {
        let ds = generate_ds();
        let parts: Vec<&str> = ds.split(',').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts[0].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(parts[2].len(), 32);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ds_hash_matches_inputs() {
        let ds = generate_ds();
        let parts: Vec<&str> = ds.split(',').collect();

        let expected = md5::compute(format!("salt={DS_SALT}&t={}&r={}", parts[0], parts[1]));
        assert_eq!(parts[2], format!("{expected:x}"));
    }

    #[test]
    fn test_ds_random_segment_is_fresh() {
        let first = generate_ds();
        let second = generate_ds();

        let random = |ds: &str| ds.split(',').nth(1).map(str::to_owned);
        assert_ne!(random(&first), random(&second));
    }
}
