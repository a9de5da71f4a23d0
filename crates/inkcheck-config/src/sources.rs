use std::collections::BTreeMap;

use inkcheck_utils::types::ConfigSource;

use crate::model::Config;

fn join_argv(argv: &[String]) -> String {
    argv.join(" ")
}

impl Config {
    /// Where a key's effective value came from.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    /// Effective configuration as `key -> (value, source)` pairs.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let entries: Vec<(&str, String)> = vec![
            ("workspace.dir", self.workspace.dir.display().to_string()),
            ("workspace.source_file", self.workspace.source_file.clone()),
            ("workspace.report_file", self.workspace.report_file.clone()),
            ("workspace.manifest_file", self.workspace.manifest_file.clone()),
            ("workspace.scaffold_poll_ms", self.workspace.scaffold_poll_ms.to_string()),
            (
                "workspace.scaffold_deadline_secs",
                self.workspace.scaffold_deadline_secs.to_string(),
            ),
            ("toolchain.build", join_argv(&self.toolchain.build)),
            ("toolchain.audit", join_argv(&self.toolchain.audit)),
            ("toolchain.scaffold", join_argv(&self.toolchain.scaffold)),
            ("toolchain.timeout_secs", self.toolchain.timeout_secs.to_string()),
            ("output.root", self.output.root.display().to_string()),
            (
                "output.generated_dir",
                self.output.generated_dir().display().to_string(),
            ),
            (
                "generation.categories_file",
                self.generation.categories_file.display().to_string(),
            ),
            (
                "generation.prompt_file",
                self.generation.prompt_file.display().to_string(),
            ),
            (
                "generation.max_categories",
                self.generation.max_categories.to_string(),
            ),
            (
                "generation.contracts_per_category",
                self.generation.contracts_per_category.to_string(),
            ),
            (
                "generation.category_placeholder",
                self.generation.category_placeholder.clone(),
            ),
            ("generation.language_tag", self.generation.language_tag.clone()),
            ("llm.provider", self.llm.provider.clone()),
            ("llm.model", self.llm.model.clone()),
            ("llm.base_url", self.llm.base_url.clone()),
            ("llm.api_key_env", self.llm.api_key_env.clone()),
            ("llm.temperature", self.llm.temperature.to_string()),
            ("llm.max_tokens", self.llm.max_tokens.to_string()),
            ("llm.timeout_secs", self.llm.timeout_secs.to_string()),
        ];

        entries
            .into_iter()
            .map(|(key, value)| {
                let source = self.source_of(key).as_str().to_string();
                (key.to_string(), (value, source))
            })
            .collect()
    }
}
