use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::Value;

/// Catalog entry advertised to the model for one tool
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Describe a function tool whose parameters are generated from `T`
    pub fn for_args<T: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::function(name, description, parameters_schema::<T>())
    }

    /// Describe a function tool with an explicit parameter schema
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Generate a self-contained JSON schema for a typed argument struct.
///
/// Subschemas are inlined so the result carries no `$ref`/`definitions`, which
/// several local inference servers do not resolve.
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();

    let mut value = serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(object) = value.as_object_mut() {
        object.remove("title");
        object.remove("definitions");
        object.entry("type").or_insert_with(|| Value::String("object".to_string()));
        object
            .entry("properties")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct LookupArgs {
        /// The record ID
        id: u32,
        /// Optional note
        note: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}

    #[test]
    fn test_tool_descriptor_serialization() {
        let descriptor = ToolDescriptor::function(
            "test_tool",
            "A test tool",
            json!({"type": "object", "properties": {"arg1": {"type": "string"}}}),
        );

        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"type\":\"function\""));
        assert!(json.contains("test_tool"));
        assert!(json.contains("A test tool"));
        assert_eq!(descriptor.name(), "test_tool");
    }

    #[test]
    fn test_tool_descriptor_deserialization() {
        let json = r#"{
            "type": "function",
            "function": {
                "name": "calculator",
                "description": "Perform calculations",
                "parameters": {"type": "object"}
            }
        }"#;

        let descriptor: ToolDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.r#type, "function");
        assert_eq!(descriptor.function.name, "calculator");
    }

    #[test]
    fn test_parameters_schema_from_struct() {
        let schema = parameters_schema::<LookupArgs>();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["id"]["description"], "The record ID");
        assert_eq!(schema["required"], json!(["id"]));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert!(schema.get("title").is_none());
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn test_parameters_schema_for_empty_struct() {
        let schema = parameters_schema::<NoArgs>();

        assert_eq!(schema["type"], "object");
        assert!(schema["properties"].is_object());
    }
}
