use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "db_path": { "type": "string" },
                    "max_concurrent_captures": { "type": "integer", "minimum": 1 }
                }
            },
            "storage": {
                "type": "object",
                "properties": {
                    "data_dir": { "type": "string" }
                }
            },
            "processing": {
                "type": "object",
                "properties": {
                    "min_duration_secs": { "type": "number", "minimum": 0 },
                    "max_duration_secs": { "type": "number", "exclusiveMinimum": 0 },
                    "max_video_bytes": { "type": "integer", "minimum": 1 },
                    "allowed_extensions": { "type": "array", "items": { "type": "string" } },
                    "issue_threshold": { "type": "number", "minimum": 0, "maximum": 1 },
                    "model_id": { "type": "string" },
                    "upload_timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "pose": {
                "type": "object",
                "properties": {
                    "backend": { "type": "string", "enum": ["sidecar", "command"] },
                    "command": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "taxonomy": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                }
            }
        }
    })
});
