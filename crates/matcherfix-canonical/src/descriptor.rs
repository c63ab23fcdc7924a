use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// A tenant's alerting configuration as persisted: identifier, raw YAML and
/// the template files it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDescriptor {
    /// Tenant identifier.
    pub user: String,
    /// Raw YAML text of the configuration.
    pub raw_config: String,
    /// Template files shipped alongside the configuration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<TemplateDesc>,
}

/// A template file attached to a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDesc {
    /// File name the configuration refers to.
    pub filename: String,
    /// Template source.
    #[serde(default)]
    pub body: String,
}

impl ConfigDescriptor {
    /// Creates a descriptor with no templates.
    pub fn new(user: impl Into<String>, raw_config: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            raw_config: raw_config.into(),
            templates: Vec::new(),
        }
    }

    /// Returns a copy with `raw_config` replaced; everything else is kept.
    pub fn with_raw_config(&self, raw_config: impl Into<String>) -> Self {
        Self {
            raw_config: raw_config.into(),
            ..self.clone()
        }
    }

    /// SHA-256 of the raw configuration text.
    pub fn digest(&self) -> Digest {
        Digest::sha256(self.raw_config.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_raw_config_keeps_user_and_templates() {
        let mut desc = ConfigDescriptor::new("2", "route: {}");
        desc.templates.push(TemplateDesc {
            filename: "tmpl1.yml".into(),
            body: String::new(),
        });
        let replaced = desc.with_raw_config("templates: []\n");
        assert_eq!(replaced.user, "2");
        assert_eq!(replaced.templates, desc.templates);
        assert_eq!(replaced.raw_config, "templates: []\n");
    }

    #[test]
    fn json_omits_empty_templates() {
        let desc = ConfigDescriptor::new("1", "");
        let json = serde_json::to_string(&desc).unwrap();
        assert_eq!(json, r#"{"user":"1","raw_config":""}"#);
        let back: ConfigDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn digest_tracks_raw_config() {
        let a = ConfigDescriptor::new("1", "a");
        let b = ConfigDescriptor::new("2", "a");
        let c = ConfigDescriptor::new("1", "b");
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }
}
