use matcherfix_canonical::descriptor;
use matcherfix_canonical::ConfigDescriptor;

/// Wire form of a tenant configuration.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AlertConfigDesc {
    /// Tenant identifier.
    #[prost(string, tag = "1")]
    pub user: String,
    /// Raw YAML configuration.
    #[prost(string, tag = "2")]
    pub raw_config: String,
    /// Template files.
    #[prost(message, repeated, tag = "3")]
    pub templates: Vec<TemplateDesc>,
}

/// Wire form of a template file.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TemplateDesc {
    /// File name.
    #[prost(string, tag = "1")]
    pub filename: String,
    /// Template source.
    #[prost(string, tag = "2")]
    pub body: String,
}

impl From<&ConfigDescriptor> for AlertConfigDesc {
    fn from(desc: &ConfigDescriptor) -> Self {
        Self {
            user: desc.user.clone(),
            raw_config: desc.raw_config.clone(),
            templates: desc
                .templates
                .iter()
                .map(|template| TemplateDesc {
                    filename: template.filename.clone(),
                    body: template.body.clone(),
                })
                .collect(),
        }
    }
}

impl From<AlertConfigDesc> for ConfigDescriptor {
    fn from(desc: AlertConfigDesc) -> Self {
        Self {
            user: desc.user,
            raw_config: desc.raw_config,
            templates: desc
                .templates
                .into_iter()
                .map(|template| descriptor::TemplateDesc {
                    filename: template.filename,
                    body: template.body,
                })
                .collect(),
        }
    }
}
