use crate::providers::ToolProvider;
use std::fmt::Write;
use std::sync::Arc;

pub const DEFAULT_ASSISTANT_NAME: &str = "Switchyard";

/// Assemble the system turn from the enabled providers.
///
/// Providers contribute one capability line each, followed by their optional
/// prompt sections in registration order.
pub fn build_system_prompt(assistant_name: &str, providers: &[Arc<dyn ToolProvider>]) -> String {
    let mut prompt = format!("You are {}, a helpful and capable AI assistant.\n\n", assistant_name);

    prompt.push_str("## Your Capabilities\n");
    prompt.push_str("- Answer questions clearly and objectively\n");
    prompt.push_str("- Help with programming and software development tasks\n");
    for provider in providers {
        let _ = writeln!(prompt, "- {}", provider.capability_summary());
    }

    for section in providers.iter().filter_map(|p| p.prompt_section()) {
        prompt.push('\n');
        prompt.push_str(&section);
    }

    prompt.push_str("\n## Guidelines\n");
    prompt.push_str("- Be concise and direct\n");
    prompt.push_str("- Use Markdown formatting where appropriate\n");
    prompt.push_str("- When you use a tool, explain what you are doing\n");
    prompt.push_str("- Reply in the user's language\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tools::ToolDescriptor;
    use crate::providers::Dispatch;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Stub {
        section: Option<&'static str>,
    }

    #[async_trait]
    impl ToolProvider for Stub {
        fn key(&self) -> &str {
            "stub"
        }

        fn capability_summary(&self) -> String {
            "Track stub things".to_string()
        }

        fn prompt_section(&self) -> Option<String> {
            self.section.map(str::to_string)
        }

        fn descriptors(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }

        async fn execute(&self, _name: &str, _arguments: &Value) -> Dispatch {
            Dispatch::NotMine
        }
    }

    #[test]
    fn test_prompt_without_providers() {
        let prompt = build_system_prompt("Nomad", &[]);

        assert!(prompt.starts_with("You are Nomad,"));
        assert!(prompt.contains("## Your Capabilities\n"));
        assert!(prompt.contains("## Guidelines\n"));
        assert!(prompt.ends_with("- Reply in the user's language\n"));
    }

    #[test]
    fn test_provider_contributions_in_order() {
        let providers: Vec<Arc<dyn ToolProvider>> = vec![
            Arc::new(Stub {
                section: Some("## Stub\nWorkspace: alpha\n"),
            }),
            Arc::new(Stub { section: None }),
        ];

        let prompt = build_system_prompt(DEFAULT_ASSISTANT_NAME, &providers);

        assert_eq!(prompt.matches("- Track stub things\n").count(), 2);
        let section = prompt.find("## Stub\nWorkspace: alpha").unwrap();
        let capabilities = prompt.find("## Your Capabilities").unwrap();
        let guidelines = prompt.find("## Guidelines").unwrap();
        assert!(capabilities < section && section < guidelines);
    }
}
