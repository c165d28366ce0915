use rand::Rng;

/// Per-invocation source of globally unique class-name tokens.
///
/// Uniqueness within one compile comes from the counter; the random
/// salt keeps independent compiler invocations from colliding without
/// any cross-process coordination.
pub struct TokenGenerator {
    salt: String,
    counter: u64,
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::thread_rng())
    }

    fn with_rng(rng: &mut impl Rng) -> Self {
        // Leading character forced alphabetic so every generated token
        // is a valid CSS identifier.
        let mut salt = String::with_capacity(16);
        salt.push(rng.gen_range(b'a'..=b'z') as char);
        salt.push_str(&base36(rng.gen::<u64>()));
        Self { salt, counter: 0 }
    }

    /// Replacement for one class-attribute occurrence:
    /// `<uniqueId>_<originalName>`, so debugging tools can recover the
    /// original name from the rewritten output.
    pub fn token(&mut self, class_name: &str) -> String {
        format!("{}_{class_name}", self.unique_id())
    }

    fn unique_id(&mut self) -> String {
        let id = format!("{}{}", self.salt, base36(self.counter));
        self.counter += 1;
        id
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}
