//! `contractly lint` -- check a blueprint JSON document against the
//! authoring rules before it is posted to a server.

use std::path::Path;
use std::process;

use contractly_core::{lint_blueprint, FieldDraft, LintWarning};
use serde::Deserialize;

use crate::{report_error, OutputFormat};

/// Same shape as the `POST /api/blueprints` body.
#[derive(Debug, Deserialize)]
struct BlueprintDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: Vec<FieldDraft>,
}

fn parse_document(text: &str) -> Result<BlueprintDocument, serde_json::Error> {
    serde_json::from_str(text)
}

/// Lint a parsed document. Fields without an id are named by position.
fn lint_document(doc: BlueprintDocument) -> Vec<LintWarning> {
    let fields: Vec<_> = doc
        .fields
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft.into_definition(|| format!("#{}", i + 1)))
        .collect();
    lint_blueprint(&doc.name, &fields)
}

pub(crate) fn cmd_lint(file: &Path, strict: bool, output: OutputFormat, quiet: bool) {
    let text = match std::fs::read_to_string(file) {
        Ok(t) => t,
        Err(e) => {
            report_error(
                &format!("error reading '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };
    let doc = match parse_document(&text) {
        Ok(d) => d,
        Err(e) => {
            report_error(
                &format!("invalid blueprint '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let warnings = lint_document(doc);
    match output {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "file": file.display().to_string(),
                "warnings": warnings,
            });
            match serde_json::to_string_pretty(&body) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    report_error(&format!("error serializing report: {}", e), output, quiet);
                    process::exit(1);
                }
            }
        }
        OutputFormat::Text => {
            if !quiet {
                for w in &warnings {
                    match &w.field_id {
                        Some(id) => println!("warning [{}]: {}", id, w.message),
                        None => println!("warning: {}", w.message),
                    }
                }
                if warnings.is_empty() {
                    println!("{}: ok", file.display());
                } else {
                    println!("{}: {} warning(s)", file.display(), warnings.len());
                }
            }
        }
    }

    if strict && !warnings.is_empty() {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_fields_are_reported_by_position() {
        let doc = parse_document(
            r#"{"name":"NDA","fields":[{"type":"Text","label":""},{"type":"Checkbox","label":"Terms"}]}"#,
        )
        .unwrap();
        let warnings = lint_document(doc);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field_id.as_deref(), Some("#1"));
    }

    #[test]
    fn unknown_field_type_fails_to_parse() {
        assert!(parse_document(r#"{"name":"X","fields":[{"type":"Hologram"}]}"#).is_err());
    }
}
