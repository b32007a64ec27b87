use std::env;

const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_PROMPT: &str = "A roller derby jersey design for the skater name \"{name}\", \
bold numbering and typography, vibrant team colors, flat product photo on a plain background";

/// Settings for the jersey image generation side effect.
///
/// Generation is enabled only when `HF_TOKEN` is present in the environment;
/// everything else has a default that can be overridden per deployment.
#[derive(Clone, Debug)]
pub struct ImageGenConfig {
    pub token: String,
    pub model: String,
    pub endpoint: String,
    pub prompt_template: String,
}

impl ImageGenConfig {
    pub fn from_env() -> Option<Self> {
        let token = env::var("HF_TOKEN").ok().filter(|t| !t.trim().is_empty())?;
        Some(Self {
            token,
            model: env_or("JERSEY_IMAGE_MODEL", DEFAULT_MODEL),
            endpoint: env_or("JERSEY_IMAGE_ENDPOINT", DEFAULT_ENDPOINT),
            prompt_template: env_or("JERSEY_IMAGE_PROMPT", DEFAULT_PROMPT),
        })
    }

    /// Fill the `{name}` placeholder in the prompt template.
    pub fn render_prompt(&self, name: &str) -> String {
        self.prompt_template.replace("{name}", name)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ImageGenConfig {
        ImageGenConfig {
            token: "token".to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prompt_template: DEFAULT_PROMPT.to_string(),
        }
    }

    #[test]
    fn prompt_template_substitutes_name() {
        let config = test_config();
        let prompt = config.render_prompt("Annie Maul");
        assert!(prompt.contains("\"Annie Maul\""));
        assert!(!prompt.contains("{name}"));
    }

    #[test]
    fn custom_template_with_repeated_placeholder() {
        let mut config = test_config();
        config.prompt_template = "{name} jersey for {name}".to_string();
        assert_eq!(config.render_prompt("Maul"), "Maul jersey for Maul");
    }
}
