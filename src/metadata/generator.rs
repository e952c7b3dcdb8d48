//! Tool and toolbox metadata documents.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use super::wrap_in_html_div;
use super::xml::Element;
use crate::error::{Result, ToolboxError};
use crate::factory::NameAllocator;
use crate::loader::ResolvedToolbox;
use crate::schema::{ToolConfig, ToolboxConfig};

pub const ARC_TOOLBOX_HELP_PATH: &str = r"c:\program files\arcgis\pro\Resources\Help\gp";

const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// `<toolbox>.pyt.xml`
pub fn toolbox_file_name(toolbox_name: &str) -> String {
    format!("{}.pyt.xml", toolbox_name)
}

/// `<toolbox>.<GeneratedName>.pyt.xml`
pub fn tool_file_name(toolbox_name: &str, generated_name: &str) -> String {
    format!("{}.{}.pyt.xml", toolbox_name, generated_name)
}

#[derive(Debug, Clone)]
pub struct MetadataGenerator {
    toolbox_name: String,
    created: NaiveDateTime,
}

impl MetadataGenerator {
    /// Generator stamping documents with the current local time
    pub fn new(toolbox_name: impl Into<String>) -> Self {
        Self {
            toolbox_name: toolbox_name.into(),
            created: Local::now().naive_local(),
        }
    }

    pub fn with_timestamp(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self
    }

    pub fn toolbox_name(&self) -> &str {
        &self.toolbox_name
    }

    fn date(&self) -> String {
        self.created.format("%Y%m%d").to_string()
    }

    fn esri(&self) -> Element {
        Element::new("Esri")
            .child(Element::leaf("CreaDate", self.date()))
            .child(Element::leaf("CreaTime", self.created.format("%H%M%S00").to_string()))
            .child(Element::leaf("ArcGISFormat", "1.0"))
            .child(Element::leaf("SyncOnce", "TRUE"))
    }

    fn root(&self) -> Element {
        Element::new("metadata").attr("xml:lang", "en").child(self.esri())
    }

    fn finish(root: Element) -> String {
        format!("{}{}", XML_DECLARATION, root.render())
    }

    fn distribution(format_name: &str) -> Element {
        Element::new("distInfo").child(
            Element::new("distributor")
                .child(Element::new("distorFormat").child(Element::leaf("formatName", format_name))),
        )
    }

    fn keywords(tags: &[String]) -> Element {
        tags.iter()
            .fold(Element::new("searchKeys"), |keys, tag| keys.child(Element::leaf("keyword", tag.as_str())))
    }

    fn use_limitations(text: &str) -> Element {
        Element::new("resConst").child(
            Element::new("Consts").child(Element::leaf("useLimit", wrap_in_html_div(text, true))),
        )
    }

    fn date_stamp(&self) -> Element {
        Element::leaf("mdDateSt", self.date()).attr("Sync", "TRUE")
    }

    /// Metadata document for one tool
    pub fn tool_xml(&self, config: &ToolConfig, generated_name: &str, toolbox_alias: &str) -> String {
        let mut root = self.root();
        let Some(doc) = &config.documentation else {
            return Self::finish(root);
        };

        let mut tool = Element::new("tool")
            .attr("name", generated_name)
            .attr("displayname", config.label())
            .attr("toolboxalias", toolbox_alias)
            .attr("xmlns", "")
            .child(Element::leaf("arcToolboxHelpPath", ARC_TOOLBOX_HELP_PATH));

        if !doc.parameter_syntax.is_empty() {
            let mut parameters = Element::new("parameters");
            for param in config.sorted_parameters() {
                let mut element = Element::new("param")
                    .attr("name", param.name.as_str())
                    .attr("displayname", param.display_name.as_str())
                    .attr("type", param.parameter_type.as_str())
                    .attr("direction", param.direction.as_str())
                    .attr("datatype", param.datatype.as_str())
                    .attr("expression", param.name.as_str());
                if let Some(syntax) = doc.parameter_syntax.get(&param.name) {
                    element.push(Element::leaf(
                        "dialogReference",
                        wrap_in_html_div(&syntax.dialog_explanation, false),
                    ));
                    element.push(Element::leaf(
                        "pythonReference",
                        wrap_in_html_div(&syntax.scripting_explanation, false),
                    ));
                }
                parameters.push(element);
            }
            tool.push(parameters);
        }

        tool.push(Element::leaf("summary", wrap_in_html_div(&doc.summary, false)));
        tool.push(Element::leaf("usage", wrap_in_html_div(&doc.usage, true)));

        if !doc.code_samples.is_empty() {
            let mut examples = Element::new("scriptExamples");
            for sample in &doc.code_samples {
                examples.push(
                    Element::new("scriptExample")
                        .child(Element::leaf("title", sample.title.as_str()))
                        .child(Element::leaf("para", wrap_in_html_div(&sample.description, false)))
                        .child(Element::leaf("code", sample.code.trim())),
                );
            }
            tool.push(examples);
        }
        root.push(tool);

        let mut data_id = Element::new("dataIdInfo")
            .child(Element::new("idCitation").child(Element::leaf("resTitle", config.label())));
        if !doc.tags.is_empty() {
            data_id.push(Self::keywords(&doc.tags));
        }
        if !doc.credits.is_empty() {
            data_id.push(Element::leaf("idCredit", doc.credits.as_str()));
        }
        if !doc.use_limitations.is_empty() {
            data_id.push(Self::use_limitations(&doc.use_limitations));
        }
        root.push(data_id);

        root.push(Self::distribution("ArcToolbox Tool"));
        root.push(Element::new("mdHrLv").child(Element::new("ScopeCd").attr("value", "005")));
        root.push(self.date_stamp());

        Self::finish(root)
    }

    /// Metadata document for the toolbox itself
    pub fn toolbox_xml(&self, config: &ToolboxConfig) -> String {
        let mut root = self.root();
        let Some(doc) = &config.documentation else {
            return Self::finish(root);
        };

        root.push(
            Element::new("toolbox")
                .attr("name", self.toolbox_name.as_str())
                .attr("alias", config.toolbox.alias.as_str())
                .child(Element::leaf("arcToolboxHelpPath", ARC_TOOLBOX_HELP_PATH))
                .child(Element::new("toolsets")),
        );

        let mut data_id = Element::new("dataIdInfo")
            .child(Element::new("idCitation").child(Element::leaf("resTitle", config.toolbox.label.as_str())))
            .child(Element::leaf("idPurp", doc.summary.trim()))
            .child(Element::leaf("idAbs", wrap_in_html_div(&doc.description, true)));
        if !doc.credits.is_empty() {
            data_id.push(Element::leaf("idCredit", doc.credits.trim()));
        }
        if !doc.tags.is_empty() {
            data_id.push(Self::keywords(&doc.tags));
        }
        if !doc.use_limitations.is_empty() {
            data_id.push(Self::use_limitations(&doc.use_limitations));
        }
        root.push(data_id);

        root.push(Self::distribution("ArcToolbox Toolbox"));
        root.push(self.date_stamp());

        Self::finish(root)
    }

    /// Write the toolbox document and one document per enabled tool into
    /// `out_dir`, returning the written paths
    pub fn write_all(&self, resolved: &ResolvedToolbox, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir).map_err(|source| ToolboxError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        let toolbox_path = out_dir.join(toolbox_file_name(&self.toolbox_name));
        write_file(&toolbox_path, &self.toolbox_xml(&resolved.toolbox.config))?;
        written.push(toolbox_path);

        let mut names = NameAllocator::new();
        for tool in resolved.enabled_tools() {
            let generated = names.allocate(tool.config.name());
            let path = out_dir.join(tool_file_name(&self.toolbox_name, &generated));
            write_file(&path, &self.tool_xml(&tool.config, &generated, resolved.toolbox.alias()))?;
            log::debug!("Wrote metadata for {}: {}", tool.config.name(), path.display());
            written.push(path);
        }

        log::info!("Wrote {} metadata file(s) to {}", written.len(), out_dir.display());
        Ok(written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| ToolboxError::Io {
        path: path.to_path_buf(),
        source,
    })
}
