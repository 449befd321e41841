use chrono::Utc;
use rand::Rng;

/// Length of the random suffix
const SUFFIX_LEN: usize = 7;

/// Builds an opaque id: `<prefix>_<unix millis>_<7 base36 chars>`
pub fn generate_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}
