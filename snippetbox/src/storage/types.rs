use serde::{Deserialize, Serialize};

/// Data stored in the cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheData {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_data_serialization() {
        // Given a CacheData instance
        let data = CacheData {
            value: "test value".to_string(),
        };

        // When serializing to JSON
        let json = serde_json::to_string(&data).expect("Failed to serialize CacheData");

        // Then it should produce valid JSON with the expected structure
        assert_eq!(json, "{\"value\":\"test value\"}");
    }

    #[test]
    fn test_cache_data_rejects_missing_value() {
        let result = serde_json::from_str::<CacheData>("{}");
        assert!(result.is_err());
    }
}
