// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Embedded manifest templates and their expansion into Kubernetes objects.

use kube::api::DynamicObject;
use minijinja::{Environment, Value};
use serde::Serialize;

use crate::error::{OperatorError, Result};

/// A named manifest template compiled into the binary
pub type ManifestTemplate = (&'static str, &'static str);

/// Database component templates, deployed before the manager
pub const DATABASE_MANIFESTS: &[ManifestTemplate] = &[
    (
        "postgres-secret",
        include_str!("../../manifests/database/postgres-secret.yaml"),
    ),
    (
        "postgres-service",
        include_str!("../../manifests/database/postgres-service.yaml"),
    ),
    (
        "postgres-statefulset",
        include_str!("../../manifests/database/postgres-statefulset.yaml"),
    ),
    (
        "postgres-init-job",
        include_str!("../../manifests/database/postgres-init-job.yaml"),
    ),
];

/// Manager component templates
pub const MANAGER_MANIFESTS: &[ManifestTemplate] = &[
    (
        "manager-serviceaccount",
        include_str!("../../manifests/manager/manager-serviceaccount.yaml"),
    ),
    (
        "manager-deployment",
        include_str!("../../manifests/manager/manager-deployment.yaml"),
    ),
];

/// Expand a template set against the given values and decode every YAML
/// document into a dynamic Kubernetes object. Documents without a kind are
/// skipped, an empty template set is an error.
pub fn render_manifests<T: Serialize>(
    templates: &[ManifestTemplate],
    values: &T,
) -> Result<Vec<DynamicObject>> {
    if templates.is_empty() {
        return Err(OperatorError::RenderError(
            "no template files found".to_string(),
        ));
    }

    let mut env = Environment::new();
    for (name, source) in templates {
        env.add_template(name, source)
            .map_err(|e| OperatorError::RenderError(format!("invalid template {}: {}", name, e)))?;
    }

    let context = Value::from_serialize(values);
    let mut objects = Vec::new();
    for (name, _) in templates {
        let rendered = env
            .get_template(name)
            .and_then(|template| template.render(&context))
            .map_err(|e| OperatorError::RenderError(format!("template {}: {}", name, e)))?;

        for document in split_documents(&rendered) {
            let object: DynamicObject = serde_yaml::from_str(&document).map_err(|e| {
                OperatorError::MalformedManifest(format!("template {}: {}", name, e))
            })?;
            if object.types.is_none() {
                continue;
            }
            objects.push(object);
        }
    }

    Ok(objects)
}

/// Split rendered YAML into its documents, dropping empty ones
fn split_documents(rendered: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in rendered.lines() {
        if line.trim_end() == "---" {
            if !current.trim().is_empty() {
                documents.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        documents.push(current);
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestValues {
        registry: String,
        image_tag: String,
        transport_type: String,
        operator_image: String,
    }

    fn make_values() -> TestValues {
        TestValues {
            registry: "quay.io/test".to_string(),
            image_tag: "v1.2.3".to_string(),
            transport_type: "sync-service".to_string(),
            operator_image: "quay.io/test/operator:v1.2.3".to_string(),
        }
    }

    #[test]
    fn test_render_database_manifests() {
        let objects = render_manifests(DATABASE_MANIFESTS, &make_values()).unwrap();

        let kinds: Vec<_> = objects
            .iter()
            .map(|o| o.types.as_ref().unwrap().kind.clone())
            .collect();
        assert!(kinds.contains(&"Secret".to_string()));
        assert!(kinds.contains(&"Service".to_string()));
        assert!(kinds.contains(&"StatefulSet".to_string()));
        assert!(kinds.contains(&"Job".to_string()));
    }

    #[test]
    fn test_render_substitutes_values() {
        let objects = render_manifests(MANAGER_MANIFESTS, &make_values()).unwrap();

        let rendered = serde_json::to_string(&objects).unwrap();
        assert!(rendered.contains("quay.io/test/hub-of-hubs-manager:v1.2.3"));
        assert!(rendered.contains("sync-service"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn test_render_empty_set_is_an_error() {
        let result = render_manifests(&[], &make_values());
        assert!(matches!(result, Err(OperatorError::RenderError(_))));
    }

    #[test]
    fn test_split_documents() {
        let rendered = "---\nkind: A\n---\n\nkind: B\n---\n";

        let documents = split_documents(rendered);

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].trim(), "kind: A");
        assert_eq!(documents[1].trim(), "kind: B");
    }

    #[test]
    fn test_documents_without_kind_are_skipped() {
        const TEMPLATES: &[ManifestTemplate] =
            &[("comment-only", "# nothing to deploy here\nfoo: bar\n")];

        let objects = render_manifests(TEMPLATES, &make_values()).unwrap();

        assert!(objects.is_empty());
    }
}
