use rand::{Rng, distributions::Alphanumeric};

/// Generates a random alphanumeric string of the specified length.
///
/// The generated string contains uppercase letters (A-Z), lowercase letters
/// (a-z), and digits (0-9), drawn from the thread-local CSPRNG. Used for
/// CSRF token values.
///
/// # Arguments
///
/// * `length` - The desired length of the generated string
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate_random_string(32).len(), 32);
        assert_eq!(generate_random_string(0).len(), 0);
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
