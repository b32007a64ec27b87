use handlebars::{handlebars_helper, Handlebars};
use include_dir::{include_dir, Dir};
use serde_json::Value;

static TEMPLATES: Dir = include_dir!("templates");

/// Handlebars registry with every embedded page template registered under
/// its file stem (`index.hbs` -> `index`).
pub fn get_handlebars() -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| {
        match v {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed != "null"
            }
            _ => true,
        }
    });
    handlebars.register_helper("exists", Box::new(exists));

    for file in TEMPLATES.files() {
        let path = std::path::Path::new(file.path());
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid template filename: {:?}", path))?;
        let body = file
            .contents_utf8()
            .ok_or_else(|| anyhow::anyhow!("Template {} is not valid UTF-8", name))?;
        handlebars.register_template_string(name, body)?;
    }

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registers_all_page_templates() {
        let handlebars = get_handlebars().unwrap();
        for template in ["index", "detail", "jerseys", "admin"] {
            assert!(
                handlebars.has_template(template),
                "missing template {}",
                template
            );
        }
    }

    #[test]
    fn exists_helper_treats_blank_strings_as_missing() {
        let handlebars = get_handlebars().unwrap();
        let rendered = handlebars
            .render_template(
                "{{#if (exists value)}}yes{{else}}no{{/if}}",
                &json!({"value": "  "}),
            )
            .unwrap();
        assert_eq!(rendered, "no");

        let rendered = handlebars
            .render_template(
                "{{#if (exists value)}}yes{{else}}no{{/if}}",
                &json!({"value": "jerseys/a.png"}),
            )
            .unwrap();
        assert_eq!(rendered, "yes");
    }
}
