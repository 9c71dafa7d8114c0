use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Generation pipeline configuration.
///
/// Every field is optional and anything the client does not know about is
/// kept in `extra`, so a load/save cycle never drops server-side settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    // Models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_trainee_model: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesizer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesizer_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainee_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainee_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainee_api_key: Option<String>,

    // Chunking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_chunk_size: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_samples: Option<u32>,

    // Partitioning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dfs_max_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bfs_max_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leiden_max_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leiden_use_lcc: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leiden_random_seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ece_max_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ece_min_units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ece_max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ece_unit_sampling: Option<String>,

    // Generation
    /// Generation modes. The backend has used both a single string and a list.
    #[serde(
        default,
        deserialize_with = "deserialize_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_pair_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_ratio_atomic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_ratio_aggregated: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_ratio_multi_hop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa_ratio_cot: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_multi_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_seed: Option<u64>,

    // Batching and caching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_extraction_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_batch_requests: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_time: Option<f64>,

    // Rate limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u32>,

    /// Fields this client does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_mode<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ModeField {
        One(String),
        Many(Vec<String>),
        Other(Value),
    }

    Ok(match Option::<ModeField>::deserialize(deserializer)? {
        Some(ModeField::One(mode)) => Some(vec![mode]),
        Some(ModeField::Many(modes)) => Some(modes),
        // Unusable shapes fall back to the defaults on merge.
        Some(ModeField::Other(_)) | None => None,
    })
}

impl TaskConfig {
    /// The console's default generation configuration
    pub fn defaults() -> Self {
        Self {
            if_trainee_model: Some(false),
            tokenizer: Some("cl100k_base".to_string()),
            synthesizer_url: Some("https://api.siliconflow.cn/v1".to_string()),
            synthesizer_model: Some("Qwen/Qwen2.5-7B-Instruct".to_string()),
            trainee_url: Some("https://api.siliconflow.cn/v1".to_string()),
            trainee_model: Some("Qwen/Qwen2.5-7B-Instruct".to_string()),
            api_key: Some(String::new()),
            trainee_api_key: Some(String::new()),
            chunk_size: Some(1024),
            chunk_overlap: Some(100),
            quiz_samples: Some(2),
            partition_method: Some("ece".to_string()),
            dfs_max_units: Some(5),
            bfs_max_units: Some(5),
            leiden_max_size: Some(20),
            leiden_use_lcc: Some(false),
            leiden_random_seed: Some(42),
            ece_max_units: Some(20),
            ece_min_units: Some(3),
            ece_max_tokens: Some(10240),
            ece_unit_sampling: Some("random".to_string()),
            mode: Some(vec!["aggregated".to_string()]),
            data_format: Some("Alpaca".to_string()),
            rpm: Some(1000),
            tpm: Some(50000),
            ..Self::default()
        }
    }

    /// Overlay this config on `base`: fields set here win, unset fields
    /// (and unknown extras) are inherited from `base`.
    pub fn merged_over(&self, base: &TaskConfig) -> TaskConfig {
        let mut merged = match serde_json::to_value(base) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if let Ok(Value::Object(overlay)) = serde_json::to_value(self) {
            for (key, value) in overlay {
                if !value.is_null() {
                    merged.insert(key, value);
                }
            }
        }
        serde_json::from_value(Value::Object(merged)).unwrap_or_else(|_| self.clone())
    }

    /// Set the generation modes
    pub fn with_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mode = Some(modes.into_iter().map(Into::into).collect());
        self
    }

    /// Set chunking parameters
    pub fn with_chunking(mut self, chunk_size: u32, chunk_overlap: u32) -> Self {
        self.chunk_size = Some(chunk_size);
        self.chunk_overlap = Some(chunk_overlap);
        self
    }
}
