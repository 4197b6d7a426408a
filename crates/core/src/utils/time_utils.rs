use chrono::Utc;

/// Current instant as epoch milliseconds, the unit transaction timestamps use.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_millisecond_precision() {
        let before = Utc::now().timestamp_millis();
        let now = now_millis();
        assert!(now >= before);
        assert!(now < before + 60_000);
    }
}
