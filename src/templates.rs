//! CSR-configuration template rendering.
//!
//! The template is an OpenSSL request-configuration document with four named
//! substitution variables: COUNTRY, STATE, LOCALITY and DOMAIN.

use anyhow::{Context, Result};
use minijinja::{context, Environment};
use std::fs;
use std::path::Path;

/// A loaded CSR-configuration template.
pub struct CsrTemplate {
    source: String,
}

impl CsrTemplate {
    /// Load the template from a file
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSR template: {}", path.display()))?;
        Ok(Self { source })
    }

    /// Create a template directly from source text
    pub fn from_source(source: String) -> Self {
        Self { source }
    }

    /// Render the template with the given subject fields and domain
    pub fn render(
        &self,
        country: &str,
        state: &str,
        locality: &str,
        domain: &str,
    ) -> Result<String> {
        let mut env = Environment::new();
        env.add_template("csr.conf", &self.source)
            .context("Failed to compile CSR template")?;
        let template = env.get_template("csr.conf")?;
        let rendered = template
            .render(context! {
                COUNTRY => country,
                STATE => state,
                LOCALITY => locality,
                DOMAIN => domain,
            })
            .context("Failed to render CSR template")?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "\
[dn]
C = {{ COUNTRY }}
ST = {{ STATE }}
L = {{ LOCALITY }}
CN = {{ DOMAIN }}
";

    #[test]
    fn test_render_substitutes_all_variables() {
        let template = CsrTemplate::from_source(TEMPLATE.to_string());
        let rendered = template
            .render("IR", "Tehran", "Tehran", "test.co")
            .unwrap();

        assert!(rendered.contains("C = IR"));
        assert!(rendered.contains("ST = Tehran"));
        assert!(rendered.contains("L = Tehran"));
        assert!(rendered.contains("CN = test.co"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_load_missing_template_is_an_error() {
        let result = CsrTemplate::load(Path::new("/nonexistent/csr_template.conf.j2"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_template_syntax_is_an_error() {
        let template = CsrTemplate::from_source("C = {{ COUNTRY".to_string());
        let result = template.render("IR", "Tehran", "Tehran", "test.co");
        assert!(result.is_err());
    }
}
