use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier correlating the turns of one conversation with the bot,
/// e.g. `web-ui-1718000000000-k3x9qa`.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("web-ui-{}-{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_have_expected_shape() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.splitn(4, '-').collect();

        assert_eq!(parts[0], "web");
        assert_eq!(parts[1], "ui");
        let (millis, suffix) = (parts[2], parts[3]);
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 6);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
